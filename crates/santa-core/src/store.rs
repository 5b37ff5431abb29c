//! The `SantaStore` trait: Person Registry and Assignment Ledger contracts.
//!
//! Implemented by storage backends (e.g. `santa-store-sqlite`). The service
//! layer depends on this abstraction only.

use std::{collections::HashSet, future::Future};

use uuid::Uuid;

use crate::{
  allocator::Draw,
  assignment::{Assignment, NewAssignment, StoredAssignment},
  person::{EligiblePerson, NewPerson},
};

/// Error bound for store backends.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// Whether this error left a partial write behind that could not be rolled
  /// back.
  fn is_inconsistent(&self) -> bool { false }
}

/// Result of the atomic allocation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
  Assigned(Assignment),
  /// The registrant already holds an assignment; nothing was written.
  AlreadyAssigned,
  /// The candidate pool was empty; nothing was written.
  ExhaustedPool,
}

/// Abstraction over a Secret Santa store backend.
///
/// Assignments are append-only. Registry rows change only through the
/// administrative `seed_people` and `remove_person` operations.
pub trait SantaStore: Send + Sync {
  type Error: StoreError;

  // ── Registry ──────────────────────────────────────────────────────────

  /// Insert a batch of people. Either every row is inserted or none is.
  fn seed_people(
    &self,
    people: Vec<NewPerson>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<EligiblePerson>, Self::Error>> + Send + '_;

  /// Every person whose name is not in `exclude_names` (case-insensitive).
  fn list_available<'a>(
    &'a self,
    exclude_names: &'a HashSet<String>,
  ) -> impl Future<Output = Result<Vec<EligiblePerson>, Self::Error>> + Send + 'a;

  /// Returns `false` if no such person exists.
  fn remove_person(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Case-insensitive exact match on name.
  fn find_person_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<EligiblePerson>, Self::Error>> + Send + 'a;

  /// Exact match on the lowercased email.
  fn find_person_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<EligiblePerson>, Self::Error>> + Send + 'a;

  /// A single person matching both name and email.
  fn find_person_by_name_and_email<'a>(
    &'a self,
    name: &'a str,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<EligiblePerson>, Self::Error>> + Send + 'a;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// The assignment recorded for a registrant email, if any.
  fn find_assignment<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<StoredAssignment>, Self::Error>> + Send + 'a;

  /// Names of everyone already drawn, as recorded in the ledger.
  fn assigned_names(
    &self,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + '_;

  /// Compute the candidate pool, draw from it and record the assignment, as
  /// one atomic unit.
  ///
  /// No two concurrent calls may draw the same person. If the write fails
  /// the implementation rolls it back once; if that fails too the returned
  /// error reports [`StoreError::is_inconsistent`].
  fn allocate<D: Draw>(
    &self,
    request: NewAssignment,
    draw: D,
  ) -> impl Future<Output = Result<AllocationOutcome, Self::Error>> + Send + '_;
}
