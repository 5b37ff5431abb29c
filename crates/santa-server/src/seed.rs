//! The registry seed file.
//!
//! ```json
//! { "unassigned": [
//!   { "name": "Alice", "email": "alice@x.com",
//!     "drive_link": "https://...", "description": "..." }
//! ] }
//! ```

use std::path::Path;

use santa_core::person::NewPerson;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
  #[error("failed to read seed file: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid seed file: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid file structure: expected an \"unassigned\" array")]
  InvalidStructure,

  #[error("entry {index}: {field} must not be blank")]
  BlankField { index: usize, field: &'static str },
}

/// Parse a seed document. Names and emails come back normalised; every
/// field must be non-blank.
pub fn parse(raw: &str) -> Result<Vec<NewPerson>, SeedError> {
  let mut doc: Value = serde_json::from_str(raw)?;
  let people: Vec<NewPerson> = match doc.get_mut("unassigned").map(Value::take) {
    Some(list @ Value::Array(_)) => serde_json::from_value(list)?,
    _ => return Err(SeedError::InvalidStructure),
  };

  people
    .into_iter()
    .map(NewPerson::normalized)
    .enumerate()
    .map(|(index, person)| {
      let fields = [
        ("name", &person.name),
        ("email", &person.email),
        ("description", &person.description),
        ("drive_link", &person.drive_link),
      ];
      let blank = fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|&(field, _)| field);
      match blank {
        Some(field) => Err(SeedError::BlankField { index, field }),
        None => Ok(person),
      }
    })
    .collect()
}

pub fn read(path: &Path) -> Result<Vec<NewPerson>, SeedError> {
  parse(&std::fs::read_to_string(path)?)
}
