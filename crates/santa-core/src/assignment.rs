//! Assignments — the append-only ledger records.
//!
//! An assignment is written once, when a registrant draws, and never touched
//! again. It carries a frozen snapshot of the drawn person so later registry
//! changes do not alter what the registrant sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::EligiblePerson;

/// The person who registered and drew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
  pub name:  String,
  pub email: String,
}

/// The drawn person's fields as they were at allocation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSnapshot {
  pub name:        String,
  pub email:       String,
  pub description: String,
  pub drive_link:  String,
}

impl From<&EligiblePerson> for PersonSnapshot {
  fn from(p: &EligiblePerson) -> Self {
    Self {
      name:        p.name.clone(),
      email:       p.email.clone(),
      description: p.description.clone(),
      drive_link:  p.drive_link.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub assignment_id:   Uuid,
  pub registrant:      Registrant,
  pub assigned_person: PersonSnapshot,
  pub created_at:      DateTime<Utc>,
}

/// An assignment together with the credential that unlocks it.
///
/// Only stores and the lookup path see this; the credential never leaves
/// `santa-core`.
#[derive(Debug, Clone)]
pub struct StoredAssignment {
  pub assignment:    Assignment,
  /// Argon2 PHC string.
  pub password_hash: String,
}

/// Everything a store needs to record an allocation, except the draw itself.
#[derive(Debug, Clone)]
pub struct NewAssignment {
  /// Registry id of the registrant; excluded from their own pool.
  pub registrant_id: Uuid,
  pub registrant:    Registrant,
  pub password_hash: String,
}
