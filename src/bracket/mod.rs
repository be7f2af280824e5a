pub mod progression;
pub mod rounds;
pub mod standings;

pub use progression::{ChampionshipRoundConfig, EligibilitySource, RoundEligibility, build_round_config};
pub use rounds::{Advancement, Cutoff, RoundKind};
pub use standings::{Standing, season_standings, tie_inclusive_cutoff};

use std::ops::RangeInclusive;

pub const CHAMPIONSHIP_DAYS: RangeInclusive<u32> = 45..=49;

pub fn is_championship_day(day: u32) -> bool {
    CHAMPIONSHIP_DAYS.contains(&day)
}
