//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Decoding happens inside row mappers so failures surface
//! as ordinary `rusqlite` conversion errors.

use chrono::{DateTime, Utc};
use rusqlite::{Row, types::Type};
use santa_core::{
  assignment::{Assignment, PersonSnapshot, Registrant, StoredAssignment},
  person::EligiblePerson,
};
use uuid::Uuid;

// ─── Scalars ────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
  let raw: String = row.get(idx)?;
  Uuid::parse_str(&raw)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn dt_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let raw: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── People ─────────────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str = "person_id, name, email, description, drive_link";

pub fn person_from_row(row: &Row<'_>) -> rusqlite::Result<EligiblePerson> {
  Ok(EligiblePerson {
    person_id:   uuid_column(row, 0)?,
    name:        row.get(1)?,
    email:       row.get(2)?,
    description: row.get(3)?,
    drive_link:  row.get(4)?,
  })
}

// ─── Assignments ────────────────────────────────────────────────────────────

pub const ASSIGNMENT_COLUMNS: &str = "assignment_id, registrant_name, registrant_email,
  assigned_name, assigned_email, assigned_description, assigned_drive_link,
  created_at, password_hash";

pub fn stored_assignment_from_row(row: &Row<'_>) -> rusqlite::Result<StoredAssignment> {
  Ok(StoredAssignment {
    assignment:    Assignment {
      assignment_id:   uuid_column(row, 0)?,
      registrant:      Registrant { name: row.get(1)?, email: row.get(2)? },
      assigned_person: PersonSnapshot {
        name:        row.get(3)?,
        email:       row.get(4)?,
        description: row.get(5)?,
        drive_link:  row.get(6)?,
      },
      created_at:      dt_column(row, 7)?,
    },
    password_hash: row.get(8)?,
  })
}
