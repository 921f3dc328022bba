//! Injectable randomness for template and recommendation selection.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

/// Random source shared by the engine's selection steps.
///
/// `Fixed` re-seeds for every draw, so the same call with the same inputs
/// always picks the same element. `Seeded` is a reproducible stream and
/// `Entropy` is the production default.
pub enum RandomSource {
    Entropy(Mutex<StdRng>),
    Seeded(Mutex<StdRng>),
    Fixed(u64),
}

impl RandomSource {
    pub fn entropy() -> Self {
        RandomSource::Entropy(Mutex::new(StdRng::from_entropy()))
    }

    pub fn seeded(seed: u64) -> Self {
        RandomSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    pub fn fixed(seed: u64) -> Self {
        RandomSource::Fixed(seed)
    }

    /// Run `f` with exclusive access to the generator.
    ///
    /// The lock is held only for the duration of `f`; never call this
    /// across an `.await`.
    pub fn with<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        match self {
            RandomSource::Entropy(rng) | RandomSource::Seeded(rng) => {
                let mut guard = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                f(&mut guard)
            }
            RandomSource::Fixed(seed) => {
                let mut rng = StdRng::seed_from_u64(*seed);
                f(&mut rng)
            }
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::entropy()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RandomSource::Entropy(_) => write!(f, "RandomSource::Entropy"),
            RandomSource::Seeded(_) => write!(f, "RandomSource::Seeded"),
            RandomSource::Fixed(seed) => write!(f, "RandomSource::Fixed({})", seed),
        }
    }
}
