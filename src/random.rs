//! Process-scoped random source.
//!
//! Seeded once at startup and handed to the components that need it, rather
//! than living in a global.

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use uuid::Uuid;

/// Shared pseudo-random generator. Clones draw from the same stream.
#[derive(Clone)]
pub struct RandomSource {
    rng: Arc<Mutex<StdRng>>,
}

impl RandomSource {
    /// Seed from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic stream, for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// A version 4 UUID drawn from this source.
    pub fn uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}
