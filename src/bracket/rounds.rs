use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

use crate::domain::CorpsClass;

const OPEN_AND_A: &[CorpsClass] = &[CorpsClass::OpenClass, CorpsClass::AClass];
const WORLD_OPEN_A: &[CorpsClass] = &[CorpsClass::WorldClass, CorpsClass::OpenClass, CorpsClass::AClass];
const SOUND_SPORT: &[CorpsClass] = &[CorpsClass::SoundSport];

/// How many advance out of the source round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Separate cutoffs per class.
    PerClass(&'static [(CorpsClass, usize)]),
    /// One cutoff over every eligible class.
    Overall(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advancement {
    /// Everyone in the class filter with a lineup.
    Open,
    FromRound {
        source_day: u32,
        cutoff: Cutoff,
        /// Fall back to season standings before auto-enrolling.
        standings_fallback: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoundKind {
    OpenAPrelims,
    OpenAFinals,
    WorldPrelims,
    WorldSemifinals,
    WorldFinals,
    SoundSportFestival,
}

impl RoundKind {
    pub const ALL: [RoundKind; 6] = [
        RoundKind::OpenAPrelims,
        RoundKind::OpenAFinals,
        RoundKind::WorldPrelims,
        RoundKind::WorldSemifinals,
        RoundKind::WorldFinals,
        RoundKind::SoundSportFestival,
    ];

    pub fn day(&self) -> u32 {
        match self {
            RoundKind::OpenAPrelims => 45,
            RoundKind::OpenAFinals => 46,
            RoundKind::WorldPrelims => 47,
            RoundKind::WorldSemifinals => 48,
            RoundKind::WorldFinals | RoundKind::SoundSportFestival => 49,
        }
    }

    pub fn for_day(day: u32) -> Vec<RoundKind> {
        Self::ALL.into_iter().filter(|k| k.day() == day).collect()
    }

    pub fn class_filter(&self) -> &'static [CorpsClass] {
        match self {
            RoundKind::OpenAPrelims | RoundKind::OpenAFinals => OPEN_AND_A,
            RoundKind::WorldPrelims | RoundKind::WorldSemifinals | RoundKind::WorldFinals => WORLD_OPEN_A,
            RoundKind::SoundSportFestival => SOUND_SPORT,
        }
    }

    pub fn advancement(&self) -> Advancement {
        match self {
            RoundKind::OpenAPrelims | RoundKind::WorldPrelims | RoundKind::SoundSportFestival => Advancement::Open,
            RoundKind::OpenAFinals => Advancement::FromRound {
                source_day: 45,
                cutoff: Cutoff::PerClass(&[(CorpsClass::OpenClass, 8), (CorpsClass::AClass, 4)]),
                standings_fallback: false,
            },
            RoundKind::WorldSemifinals => Advancement::FromRound {
                source_day: 47,
                cutoff: Cutoff::Overall(25),
                standings_fallback: true,
            },
            RoundKind::WorldFinals => Advancement::FromRound {
                source_day: 48,
                cutoff: Cutoff::Overall(12),
                standings_fallback: true,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundKind::OpenAPrelims => "open_a_prelims",
            RoundKind::OpenAFinals => "open_a_finals",
            RoundKind::WorldPrelims => "world_prelims",
            RoundKind::WorldSemifinals => "world_semifinals",
            RoundKind::WorldFinals => "world_finals",
            RoundKind::SoundSportFestival => "soundsport_festival",
        }
    }
}

impl FromStr for RoundKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown championship round: {}", s))
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_per_day() {
        assert!(RoundKind::for_day(44).is_empty());
        assert_eq!(RoundKind::for_day(45), vec![RoundKind::OpenAPrelims]);
        assert_eq!(
            RoundKind::for_day(49),
            vec![RoundKind::WorldFinals, RoundKind::SoundSportFestival]
        );
    }

    #[test]
    fn test_sources_precede_their_round() {
        for kind in RoundKind::ALL {
            if let Advancement::FromRound { source_day, .. } = kind.advancement() {
                assert!(source_day < kind.day());
            }
        }
    }

    #[test]
    fn test_round_names_parse() {
        for kind in RoundKind::ALL {
            assert_eq!(kind.as_str().parse::<RoundKind>().unwrap(), kind);
        }
    }
}
