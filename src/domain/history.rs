use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::lineup::Caption;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityScores {
    pub entity_name: String,
    pub caption_scores: BTreeMap<Caption, f64>,
}

/// One scraped event. Immutable once stored; the store only merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub source_year: String,
    pub event_name: String,
    /// `None` for pre-season events.
    pub day_index: Option<u32>,
    pub scores: Vec<EntityScores>,
}

/// Source year → events, in stored order.
pub type HistoricalData = HashMap<String, Vec<HistoricalEvent>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub day: Option<u32>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    source_year: String,
    entity_name: String,
    caption: Caption,
}

/// Per (year, entity, caption) observation series, in record order.
#[derive(Debug, Default)]
pub struct HistoryIndex {
    years: HashSet<String>,
    series: HashMap<SeriesKey, Vec<Observation>>,
}

impl HistoryIndex {
    pub fn from_data(data: &HistoricalData) -> Self {
        let mut index = Self::default();

        for (year, events) in data {
            index.years.insert(year.clone());
            for event in events {
                index.add_event(year, event);
            }
        }

        index
    }

    fn add_event(&mut self, year: &str, event: &HistoricalEvent) {
        for entity in &event.scores {
            for (&caption, &score) in &entity.caption_scores {
                let key = SeriesKey {
                    source_year: year.to_string(),
                    entity_name: entity.entity_name.clone(),
                    caption,
                };
                self.series.entry(key).or_default().push(Observation {
                    day: event.day_index,
                    score,
                });
            }
        }
    }

    pub fn has_year(&self, year: &str) -> bool {
        self.years.contains(year)
    }

    pub fn records(&self, year: &str, entity_name: &str, caption: Caption) -> &[Observation] {
        let key = SeriesKey {
            source_year: year.to_string(),
            entity_name: entity_name.to_string(),
            caption,
        };
        self.series.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Usable (day, score) points: dated, positive, first record per day.
    pub fn distinct_day_points(&self, year: &str, entity_name: &str, caption: Caption) -> Vec<(u32, f64)> {
        let mut seen = HashSet::new();
        self.records(year, entity_name, caption)
            .iter()
            .filter(|o| o.score > 0.0)
            .filter_map(|o| o.day.map(|day| (day, o.score)))
            .filter(|(day, _)| seen.insert(*day))
            .collect()
    }
}
