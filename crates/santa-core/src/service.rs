//! [`SecretSanta`] — the allocation and lookup flows over any [`SantaStore`].

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
  Error, Mismatch, Result,
  allocator::{Draw, UniformDraw},
  assignment::{Assignment, NewAssignment, Registrant},
  credential::CredentialHasher,
  person::{EligiblePerson, normalize_email},
  store::{AllocationOutcome, SantaStore, StoreError as _},
};

const MISSING_CREDENTIALS: &str = "Email and password are required";
const MISSING_NAME: &str = "Name is required for new assignment";

/// Validated registrant credentials.
///
/// The email is lowercased; the password is kept exactly as submitted.
#[derive(Clone)]
pub struct Credentials {
  email:    String,
  password: String,
}

impl Credentials {
  pub fn new(email: &str, password: &str) -> Result<Self> {
    if email.trim().is_empty() || password.trim().is_empty() {
      return Err(Error::Validation(MISSING_CREDENTIALS));
    }
    Ok(Self { email: normalize_email(email), password: password.to_owned() })
  }

  pub fn email(&self) -> &str { &self.email }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Resolve a submitted name and email to exactly one registry entry.
///
/// On failure the name check wins over the email check, so a registrant who
/// typed someone else's name hears about the name first.
pub async fn resolve_registrant<S: SantaStore>(
  store: &S,
  name: &str,
  email: &str,
) -> Result<EligiblePerson> {
  if let Some(person) = store
    .find_person_by_name_and_email(name, email)
    .await
    .map_err(storage)?
  {
    return Ok(person);
  }

  if store.find_person_by_name(name).await.map_err(storage)?.is_some() {
    return Err(Mismatch::NameElsewhere.into());
  }
  if store.find_person_by_email(email).await.map_err(storage)?.is_some() {
    return Err(Mismatch::EmailElsewhere.into());
  }
  Err(Mismatch::NotListed.into())
}

/// Allocation and lookup over a shared store.
pub struct SecretSanta<S> {
  store:  Arc<S>,
  hasher: CredentialHasher,
}

impl<S> Clone for SecretSanta<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), hasher: self.hasher.clone() }
  }
}

impl<S: SantaStore> SecretSanta<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_hasher(store, CredentialHasher::default()) }

  pub fn with_hasher(store: Arc<S>, hasher: CredentialHasher) -> Self { Self { store, hasher } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Return the assignment previously recorded for `credentials`.
  ///
  /// Never allocates. Unknown email and wrong password are indistinguishable
  /// to the caller.
  pub async fn lookup(&self, credentials: &Credentials) -> Result<Assignment> {
    let stored = self
      .store
      .find_assignment(credentials.email())
      .await
      .map_err(storage)?
      .ok_or(Error::Auth)?;

    if !self.hasher.verify(&credentials.password, &stored.password_hash) {
      return Err(Error::Auth);
    }
    Ok(stored.assignment)
  }

  /// Draw a person for a first-time registrant, uniformly at random.
  pub async fn allocate(&self, credentials: &Credentials, name: &str) -> Result<Assignment> {
    self.allocate_with(credentials, name, UniformDraw::default()).await
  }

  /// [`allocate`](Self::allocate) with a caller-supplied draw.
  pub async fn allocate_with<D: Draw>(
    &self,
    credentials: &Credentials,
    name: &str,
    draw: D,
  ) -> Result<Assignment> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::Validation(MISSING_NAME));
    }

    if self
      .store
      .find_assignment(credentials.email())
      .await
      .map_err(storage)?
      .is_some()
    {
      return Err(Error::AlreadyAssigned);
    }

    let person = resolve_registrant(self.store.as_ref(), name, credentials.email()).await?;
    let request = NewAssignment {
      registrant_id: person.person_id,
      registrant:    Registrant { name: person.name, email: person.email },
      password_hash: self.hasher.hash(&credentials.password)?,
    };

    debug!(registrant = %request.registrant.email, "allocating");
    match self.store.allocate(request, draw).await {
      Ok(AllocationOutcome::Assigned(assignment)) => {
        info!(
          registrant = %assignment.registrant.email,
          assignment_id = %assignment.assignment_id,
          "assignment recorded"
        );
        Ok(assignment)
      }
      Ok(AllocationOutcome::AlreadyAssigned) => Err(Error::AlreadyAssigned),
      Ok(AllocationOutcome::ExhaustedPool) => Err(Error::ExhaustedPool),
      Err(e) if e.is_inconsistent() => {
        error!(error = %e, "allocation rollback failed; ledger may be inconsistent");
        Err(Error::Inconsistent(Box::new(e)))
      }
      Err(e) => {
        error!(error = %e, "allocation failed");
        Err(Error::Storage(Box::new(e)))
      }
    }
  }
}

fn storage<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Storage(Box::new(e))
}
