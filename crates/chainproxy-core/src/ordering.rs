//! Per-request candidate ordering.
//!
//! Every request gets its own uniformly random permutation of the route's
//! providers so load is spread and no provider is always tried first. The
//! random source is injected so tests can pin it.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::registry::ProviderEndpoint;

/// Produces the order in which candidates are attempted.
pub trait OrderingStrategy: Send + Sync + 'static {
    /// Return a permutation of `providers`. The input is never mutated.
    fn order(&self, providers: &[ProviderEndpoint]) -> Vec<ProviderEndpoint>;
}

/// Copy `providers` and Fisher–Yates shuffle the copy with `rng`.
pub fn permute<R: Rng + ?Sized>(providers: &[ProviderEndpoint], rng: &mut R) -> Vec<ProviderEndpoint> {
    let mut ordered = providers.to_vec();
    if ordered.len() > 1 {
        ordered.shuffle(rng);
    }
    ordered
}

/// Thread-local OS-seeded randomness. The production strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrdering;

impl OrderingStrategy for RandomOrdering {
    fn order(&self, providers: &[ProviderEndpoint]) -> Vec<ProviderEndpoint> {
        permute(providers, &mut rand::thread_rng())
    }
}

/// Reproducible orderings from a fixed seed.
#[derive(Debug)]
pub struct SeededOrdering {
    rng: Mutex<StdRng>,
}

impl SeededOrdering {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl OrderingStrategy for SeededOrdering {
    fn order(&self, providers: &[ProviderEndpoint]) -> Vec<ProviderEndpoint> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        permute(providers, &mut *rng)
    }
}

/// Keeps configuration order. Useful where attempt order must be known.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredOrdering;

impl OrderingStrategy for ConfiguredOrdering {
    fn order(&self, providers: &[ProviderEndpoint]) -> Vec<ProviderEndpoint> {
        providers.to_vec()
    }
}
