//! Candidate-pool computation and the uniform draw.
//!
//! Stores call these from inside their allocation transaction, so the pool
//! they see and the row they write belong to the same snapshot.

use std::collections::HashSet;

use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use uuid::Uuid;

use crate::person::{EligiblePerson, name_key};

/// Source of the index chosen from a candidate pool.
///
/// Implementations must return a value in `0..pool_size`; `pool_size` is
/// never zero.
pub trait Draw: Send + 'static {
  fn index(&mut self, pool_size: usize) -> usize;
}

/// Uniform draw over the pool, seeded from OS entropy.
///
/// Not cryptographically secure; it only needs to be fair.
pub struct UniformDraw {
  rng: StdRng,
}

impl Default for UniformDraw {
  fn default() -> Self { Self { rng: StdRng::from_entropy() } }
}

impl UniformDraw {
  /// A reproducible draw, for tests and simulations.
  pub fn seeded(seed: u64) -> Self { Self { rng: StdRng::seed_from_u64(seed) } }
}

impl Draw for UniformDraw {
  fn index(&mut self, pool_size: usize) -> usize { self.rng.gen_range(0..pool_size) }
}

/// Every person in `people` except `registrant_id` and anyone whose name is in
/// `assigned_names`.
///
/// Names in `assigned_names` are compared by [`name_key`], so callers may pass
/// them exactly as recorded.
pub fn candidate_pool(
  people: Vec<EligiblePerson>,
  registrant_id: Option<Uuid>,
  assigned_names: &HashSet<String>,
) -> Vec<EligiblePerson> {
  let taken: HashSet<String> = assigned_names.iter().map(|n| name_key(n)).collect();

  people
    .into_iter()
    .filter(|p| Some(p.person_id) != registrant_id)
    .filter(|p| !taken.contains(&name_key(&p.name)))
    .collect()
}

/// Remove and return one candidate chosen by `draw`, or `None` if the pool is
/// empty.
pub fn draw_candidate<D: Draw>(
  mut pool: Vec<EligiblePerson>,
  draw: &mut D,
) -> Option<EligiblePerson> {
  if pool.is_empty() {
    return None;
  }
  let index = draw.index(pool.len());
  debug_assert!(index < pool.len(), "draw returned {index} for pool of {}", pool.len());
  let index = index.min(pool.len() - 1);
  Some(pool.swap_remove(index))
}
