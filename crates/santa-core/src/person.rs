//! Eligible people — the registry of everyone who can be drawn.
//!
//! Names compare case-insensitively and emails are stored lowercased, so
//! both go through the normalisers here before they reach a store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person who can be the target of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligiblePerson {
  pub person_id:   Uuid,
  pub name:        String,
  pub email:       String,
  pub description: String,
  pub drive_link:  String,
}

/// A registry entry as loaded from a seed file, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:        String,
  pub email:       String,
  pub description: String,
  pub drive_link:  String,
}

impl NewPerson {
  /// Trim the name and normalise the email the way the registry stores them.
  pub fn normalized(self) -> Self {
    Self {
      name: self.name.trim().to_owned(),
      email: normalize_email(&self.email),
      ..self
    }
  }
}

/// The comparison key for a person's name.
pub fn name_key(name: &str) -> String { name.trim().to_lowercase() }

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
