use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use super::cache::ScoreKey;

/// Noise added to regression predictions.
pub trait JitterSource: Send + Sync {
    /// Uniform draw in `[-amplitude, amplitude]` for `key`.
    fn draw(&self, key: &ScoreKey, amplitude: f64) -> f64;
}

/// Draws from a ChaCha stream seeded by (run seed, key), so the result does
/// not depend on which worker asks first.
#[derive(Debug, Clone, Copy)]
pub struct SeededJitter {
    seed: u64,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl JitterSource for SeededJitter {
    fn draw(&self, key: &ScoreKey, amplitude: f64) -> f64 {
        if amplitude <= 0.0 {
            return 0.0;
        }

        let mut rng = ChaCha8Rng::from_seed(stream_seed(self.seed, key));
        rng.gen_range(-amplitude..=amplitude)
    }
}

/// SHA-256 over the run seed and the length-prefixed key fields.
fn stream_seed(seed: u64, key: &ScoreKey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    for field in [key.entity_name.as_str(), key.source_year.as_str(), key.caption.code()] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hasher.update(key.day.to_le_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn draw(&self, _key: &ScoreKey, _amplitude: f64) -> f64 {
        0.0
    }
}
