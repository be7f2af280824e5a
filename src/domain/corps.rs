use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use super::lineup::Lineup;

pub type ParticipantId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorpsClass {
    WorldClass,
    OpenClass,
    AClass,
    SoundSport,
}

impl CorpsClass {
    pub const ALL: [CorpsClass; 4] = [
        CorpsClass::WorldClass,
        CorpsClass::OpenClass,
        CorpsClass::AClass,
        CorpsClass::SoundSport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CorpsClass::WorldClass => "worldClass",
            CorpsClass::OpenClass => "openClass",
            CorpsClass::AClass => "aClass",
            CorpsClass::SoundSport => "soundSport",
        }
    }
}

impl FromStr for CorpsClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown corps class: {}", s))
    }
}

impl fmt::Display for CorpsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one corps: a participant's entry in one class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorpsKey {
    pub participant_id: ParticipantId,
    pub corps_class: CorpsClass,
}

impl CorpsKey {
    pub fn new(participant_id: impl Into<ParticipantId>, corps_class: CorpsClass) -> Self {
        Self {
            participant_id: participant_id.into(),
            corps_class,
        }
    }
}

/// Declared show-concept tags used for synergy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowConcept {
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorpsRecord {
    pub corps_class: CorpsClass,
    pub corps_name: String,
    pub lineup: Lineup,
    /// Week number → event names the corps registered for.
    pub selected_shows: BTreeMap<u32, Vec<String>>,
    pub show_concept: ShowConcept,
    pub total_season_score: f64,
    pub last_scored_day: Option<u32>,
}

impl CorpsRecord {
    pub fn new(corps_class: CorpsClass, corps_name: impl Into<String>, lineup: Lineup) -> Self {
        Self {
            corps_class,
            corps_name: corps_name.into(),
            lineup,
            selected_shows: BTreeMap::new(),
            show_concept: ShowConcept::default(),
            total_season_score: 0.0,
            last_scored_day: None,
        }
    }

    pub fn has_lineup(&self) -> bool {
        !self.lineup.is_empty()
    }

    /// Event names only; stored dates are not comparable across representations.
    pub fn selected(&self, week: u32, event_name: &str) -> bool {
        self.selected_shows
            .get(&week)
            .is_some_and(|shows| shows.iter().any(|s| s == event_name))
    }

    pub fn select_show(&mut self, week: u32, event_name: impl Into<String>) {
        self.selected_shows.entry(week).or_default().push(event_name.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub participant_id: ParticipantId,
    pub username: String,
    pub corps: BTreeMap<CorpsClass, CorpsRecord>,
}

impl Profile {
    pub fn new(participant_id: impl Into<ParticipantId>, username: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            username: username.into(),
            corps: BTreeMap::new(),
        }
    }

    pub fn with_corps(mut self, corps: CorpsRecord) -> Self {
        self.corps.insert(corps.corps_class, corps);
        self
    }

    pub fn active_corps(&self) -> impl Iterator<Item = &CorpsRecord> {
        self.corps.values().filter(|c| c.has_lineup())
    }
}
