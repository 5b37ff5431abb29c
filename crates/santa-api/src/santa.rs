//! Handler for `POST /santa`.
//!
//! | Action | Notes |
//! |--------|-------|
//! | `check` (default) | Return the stored assignment for `email` + `password` |
//! | `create` | Register `name` and draw a person; fails if already assigned |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use santa_core::{
  assignment::PersonSnapshot,
  service::{Credentials, SecretSanta},
  store::SantaStore,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

const INVALID_ACTION: &str = "Invalid action";
const INVALID_BODY: &str = "Invalid request body";
const LOOKUP_FAILED: &str = "Internal storage error";
const SAVE_FAILED: &str = "Failed to save assignment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Check,
  Create,
}

impl Action {
  /// `None` for anything other than a missing, `check` or `create` action.
  pub fn parse(raw: Option<&str>) -> Option<Self> {
    match raw {
      None | Some("check") => Some(Self::Check),
      Some("create") => Some(Self::Create),
      Some(_) => None,
    }
  }
}

/// JSON body accepted by `POST /santa`. Every field is optional at the
/// wire level so missing values get the friendly validation messages.
#[derive(Debug, Default, Deserialize)]
pub struct SantaRequest {
  pub email:    Option<String>,
  pub password: Option<String>,
  pub name:     Option<String>,
  pub action:   Option<String>,
}

/// The public fields of the drawn person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedPerson {
  pub name:        String,
  pub description: String,
  pub drive_link:  String,
}

impl From<PersonSnapshot> for AssignedPerson {
  fn from(p: PersonSnapshot) -> Self {
    Self { name: p.name, description: p.description, drive_link: p.drive_link }
  }
}

/// `POST /santa` — body: [`SantaRequest`]; returns [`AssignedPerson`].
pub async fn handler<S>(
  State(santa): State<Arc<SecretSanta<S>>>,
  payload: Result<Json<SantaRequest>, JsonRejection>,
) -> Result<Json<AssignedPerson>, ApiError>
where
  S: SantaStore + 'static,
{
  let Json(body) = payload.map_err(|rejection| {
    debug!(%rejection, "rejected request body");
    ApiError::BadRequest(INVALID_BODY.to_owned())
  })?;

  let credentials = Credentials::new(
    body.email.as_deref().unwrap_or_default(),
    body.password.as_deref().unwrap_or_default(),
  )
  .map_err(|e| ApiError::from_core(e, LOOKUP_FAILED))?;

  let assignment = match Action::parse(body.action.as_deref()) {
    Some(Action::Check) => santa
      .lookup(&credentials)
      .await
      .map_err(|e| ApiError::from_core(e, LOOKUP_FAILED))?,
    Some(Action::Create) => santa
      .allocate(&credentials, body.name.as_deref().unwrap_or_default())
      .await
      .map_err(|e| ApiError::from_core(e, SAVE_FAILED))?,
    None => return Err(ApiError::BadRequest(INVALID_ACTION.to_owned())),
  };

  Ok(Json(assignment.assigned_person.into()))
}
