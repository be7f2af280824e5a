pub mod cache;
pub mod captions;
pub mod jitter;
pub mod regression;
pub mod scorer;
pub mod synergy;

pub use cache::{ScoreCache, ScoreKey};
pub use captions::{ShowScore, aggregate_captions, cap_caption};
pub use jitter::{JitterSource, NoJitter, SeededJitter};
pub use regression::{Estimate, LogLinearFit, estimate};
pub use scorer::{CorpsScore, CorpsScorer};
pub use synergy::{NoSynergy, SynergyBonus, SynergyCalculator, TagSynergy};

/// Scores are reported to three decimals.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
