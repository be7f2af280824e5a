use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::corps::{CorpsClass, CorpsKey, ParticipantId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResult {
    pub participant_id: ParticipantId,
    pub corps_class: CorpsClass,
    pub corps_name: String,
    pub total_score: f64,
    pub ge_score: f64,
    pub visual_score: f64,
    pub music_score: f64,
}

impl ShowResult {
    pub fn key(&self) -> CorpsKey {
        CorpsKey::new(self.participant_id.clone(), self.corps_class)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRecap {
    pub event_name: String,
    pub location: String,
    pub results: Vec<ShowResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayRecap {
    pub day: u32,
    pub date: NaiveDate,
    pub shows: Vec<ShowRecap>,
}

impl DayRecap {
    pub fn results(&self) -> impl Iterator<Item = &ShowResult> {
        self.shows.iter().flat_map(|s| s.results.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.results().next().is_none()
    }
}

/// A season's recaps keyed by day; a day has at most one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonRecaps {
    days: BTreeMap<u32, DayRecap>,
}

impl SeasonRecaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any existing entry for the same day.
    pub fn upsert(&mut self, recap: DayRecap) -> Option<DayRecap> {
        self.days.insert(recap.day, recap)
    }

    pub fn get(&self, day: u32) -> Option<&DayRecap> {
        self.days.get(&day)
    }

    /// Recap for `day` when it holds at least one result.
    pub fn non_empty(&self, day: u32) -> Option<&DayRecap> {
        self.get(day).filter(|r| !r.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayRecap> {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<DayRecap> for SeasonRecaps {
    fn from_iter<I: IntoIterator<Item = DayRecap>>(iter: I) -> Self {
        let mut recaps = Self::new();
        for recap in iter {
            recaps.upsert(recap);
        }
        recaps
    }
}
