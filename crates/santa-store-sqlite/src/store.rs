//! [`SqliteStore`] — the SQLite implementation of [`SantaStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use santa_core::{
  allocator::{Draw, candidate_pool, draw_candidate},
  assignment::{Assignment, NewAssignment, PersonSnapshot, StoredAssignment},
  person::{EligiblePerson, NewPerson, name_key, normalize_email},
  store::{AllocationOutcome, SantaStore},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    ASSIGNMENT_COLUMNS, PERSON_COLUMNS, encode_dt, encode_uuid, person_from_row,
    stored_assignment_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Secret Santa store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's single worker thread, one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Other clones become unusable.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_person(
    &self,
    clause: &'static str,
    args: Vec<String>,
  ) -> Result<Option<EligiblePerson>> {
    let person = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people WHERE {clause}"),
              rusqlite::params_from_iter(args.iter()),
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(person)
  }
}

// ─── Allocation unit ─────────────────────────────────────────────────────────

/// Why an allocation transaction did not commit.
enum Failure {
  /// The transaction is closed and nothing was persisted.
  Write(rusqlite::Error),
  Inconsistent {
    cause:    rusqlite::Error,
    rollback: rusqlite::Error,
  },
}

fn load_people(conn: &Connection) -> rusqlite::Result<Vec<EligiblePerson>> {
  let mut stmt = conn.prepare(&format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY rowid"))?;
  let rows = stmt.query_map([], person_from_row)?.collect();
  rows
}

fn load_assigned_names(conn: &Connection) -> rusqlite::Result<HashSet<String>> {
  let mut stmt = conn.prepare("SELECT assigned_name FROM assignments")?;
  let rows = stmt.query_map([], |row| row.get(0))?.collect();
  rows
}

/// Steps run inside the open transaction: check, pool, draw, insert.
fn draw_and_record<D: Draw>(
  conn: &Connection,
  request: NewAssignment,
  draw: &mut D,
) -> rusqlite::Result<AllocationOutcome> {
  let already: bool = conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM assignments WHERE registrant_email = ?1)",
    rusqlite::params![request.registrant.email],
    |row| row.get(0),
  )?;
  if already {
    return Ok(AllocationOutcome::AlreadyAssigned);
  }

  let taken = load_assigned_names(conn)?;
  let pool = candidate_pool(load_people(conn)?, Some(request.registrant_id), &taken);
  debug!(pool_size = pool.len(), "candidate pool computed");

  let Some(chosen) = draw_candidate(pool, draw) else {
    return Ok(AllocationOutcome::ExhaustedPool);
  };

  let assignment = Assignment {
    assignment_id:   Uuid::new_v4(),
    registrant:      request.registrant,
    assigned_person: PersonSnapshot::from(&chosen),
    created_at:      Utc::now(),
  };

  conn.execute(
    "INSERT INTO assignments (
       assignment_id, registrant_id, registrant_name, registrant_email,
       password_hash, assigned_id, assigned_name, assigned_name_key,
       assigned_email, assigned_description, assigned_drive_link, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    rusqlite::params![
      encode_uuid(assignment.assignment_id),
      encode_uuid(request.registrant_id),
      assignment.registrant.name,
      assignment.registrant.email,
      request.password_hash,
      encode_uuid(chosen.person_id),
      assignment.assigned_person.name,
      name_key(&assignment.assigned_person.name),
      assignment.assigned_person.email,
      assignment.assigned_person.description,
      assignment.assigned_person.drive_link,
      encode_dt(assignment.created_at),
    ],
  )?;

  Ok(AllocationOutcome::Assigned(assignment))
}

/// Commit a successful draw, or undo whatever the transaction wrote.
fn finish(
  conn: &Connection,
  drawn: rusqlite::Result<AllocationOutcome>,
) -> Result<AllocationOutcome, Failure> {
  match drawn {
    Ok(outcome @ AllocationOutcome::Assigned(_)) => match conn.execute_batch("COMMIT") {
      Ok(()) => Ok(outcome),
      Err(cause) => Err(compensate(conn, cause)),
    },
    // Nothing was written; just release the write lock.
    Ok(outcome) => conn
      .execute_batch("ROLLBACK")
      .map(|()| outcome)
      .map_err(Failure::Write),
    Err(cause) => Err(compensate(conn, cause)),
  }
}

/// Roll back a failed allocation write, once.
fn compensate(conn: &Connection, cause: rusqlite::Error) -> Failure {
  // SQLite already rolled the transaction back on its own.
  if conn.is_autocommit() {
    return Failure::Write(cause);
  }
  match conn.execute_batch("ROLLBACK") {
    Ok(()) => Failure::Write(cause),
    Err(rollback) => Failure::Inconsistent { cause, rollback },
  }
}

/// Roll back a transaction that an earlier failed compensation left open.
///
/// Until this runs, the shared connection would read the stranded row and
/// every `BEGIN IMMEDIATE` would fail.
fn discard_stranded(conn: &Connection) -> rusqlite::Result<()> {
  if conn.is_autocommit() {
    return Ok(());
  }
  warn!("rolling back a transaction left open by a failed allocation");
  conn.execute_batch("ROLLBACK")
}

// ─── SantaStore impl ─────────────────────────────────────────────────────────

impl SantaStore for SqliteStore {
  type Error = Error;

  // ── Registry ──────────────────────────────────────────────────────────────

  async fn seed_people(&self, people: Vec<NewPerson>) -> Result<usize> {
    let rows: Vec<(String, NewPerson)> = people
      .into_iter()
      .map(|p| (encode_uuid(Uuid::new_v4()), p.normalized()))
      .collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO people (person_id, name, name_key, email, description, drive_link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (id, p) in &rows {
            stmt.execute(rusqlite::params![
              id,
              p.name,
              name_key(&p.name),
              p.email,
              p.description,
              p.drive_link,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    Ok(inserted)
  }

  async fn list_people(&self) -> Result<Vec<EligiblePerson>> {
    let people = self.conn.call(|conn| Ok(load_people(conn)?)).await?;
    Ok(people)
  }

  async fn list_available(&self, exclude_names: &HashSet<String>) -> Result<Vec<EligiblePerson>> {
    let people = self.list_people().await?;
    Ok(candidate_pool(people, None, exclude_names))
  }

  async fn remove_person(&self, person_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(person_id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM people WHERE person_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn find_person_by_name(&self, name: &str) -> Result<Option<EligiblePerson>> {
    self.find_person("name_key = ?1", vec![name_key(name)]).await
  }

  async fn find_person_by_email(&self, email: &str) -> Result<Option<EligiblePerson>> {
    self.find_person("email = ?1", vec![normalize_email(email)]).await
  }

  async fn find_person_by_name_and_email(
    &self,
    name: &str,
    email: &str,
  ) -> Result<Option<EligiblePerson>> {
    self
      .find_person("name_key = ?1 AND email = ?2", vec![name_key(name), normalize_email(email)])
      .await
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn find_assignment(&self, email: &str) -> Result<Option<StoredAssignment>> {
    let email = normalize_email(email);
    let stored = self
      .conn
      .call(move |conn| {
        discard_stranded(conn)?;
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE registrant_email = ?1"
              ),
              rusqlite::params![email],
              stored_assignment_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(stored)
  }

  async fn assigned_names(&self) -> Result<HashSet<String>> {
    let names = self
      .conn
      .call(|conn| {
        discard_stranded(conn)?;
        Ok(load_assigned_names(conn)?)
      })
      .await?;
    Ok(names)
  }

  async fn allocate<D: Draw>(
    &self,
    request: NewAssignment,
    mut draw: D,
  ) -> Result<AllocationOutcome> {
    let attempt = self
      .conn
      .call(move |conn| {
        discard_stranded(conn)?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        let drawn = draw_and_record(conn, request, &mut draw);
        Ok(finish(conn, drawn))
      })
      .await?;

    match attempt {
      Ok(outcome) => Ok(outcome),
      Err(Failure::Write(cause)) => {
        warn!(error = %cause, "allocation write rolled back");
        Err(cause.into())
      }
      Err(Failure::Inconsistent { cause, rollback }) => Err(Error::Inconsistent { cause, rollback }),
    }
  }
}
