use std::collections::BTreeMap;

use log::warn;

use super::cache::{ScoreCache, ScoreKey};
use super::captions::{ShowScore, aggregate_captions, cap_caption};
use super::jitter::JitterSource;
use super::regression::estimate;
use super::synergy::SynergyCalculator;
use crate::config::settings::ScoringSettings;
use crate::domain::{Caption, CorpsRecord, HistoryIndex, LineupSlot};

#[derive(Debug, Clone, PartialEq)]
pub struct CorpsScore {
    pub captions: BTreeMap<Caption, f64>,
    pub show: ShowScore,
}

/// Turns a lineup into a day's caption and show scores.
pub struct CorpsScorer<'a> {
    history: &'a HistoryIndex,
    cache: &'a ScoreCache,
    settings: &'a ScoringSettings,
    jitter: &'a dyn JitterSource,
    synergy: &'a dyn SynergyCalculator,
    live_year: Option<&'a str>,
}

impl<'a> CorpsScorer<'a> {
    pub fn new(
        history: &'a HistoryIndex,
        cache: &'a ScoreCache,
        settings: &'a ScoringSettings,
        jitter: &'a dyn JitterSource,
        synergy: &'a dyn SynergyCalculator,
    ) -> Self {
        Self {
            history,
            cache,
            settings,
            jitter,
            synergy,
            live_year: None,
        }
    }

    /// Prefer this year's results over lineup source years when there are enough.
    pub fn with_live_year(mut self, live_year: Option<&'a str>) -> Self {
        self.live_year = live_year;
        self
    }

    pub fn score_corps(&self, corps: &CorpsRecord, day: u32) -> CorpsScore {
        let bonus = self.synergy.compute(&corps.show_concept, &corps.lineup);
        let mut captions = BTreeMap::new();

        for caption in Caption::ALL {
            let base = match corps.lineup.slot(caption) {
                Ok(Some(slot)) => self.base_score(&slot, caption, day),
                Ok(None) => 0.0,
                Err(e) => {
                    warn!("{} ({}): {:#}", corps.corps_name, caption, e);
                    0.0
                }
            };
            let score = cap_caption(base + bonus.for_caption(caption), self.settings.caption_cap);
            captions.insert(caption, score);
        }

        let show = aggregate_captions(&captions, self.settings.show_cap);
        CorpsScore { captions, show }
    }

    pub fn base_score(&self, slot: &LineupSlot, caption: Caption, day: u32) -> f64 {
        let year = self.scoring_year(slot, caption);
        let key = ScoreKey::new(&slot.entity_name, year, caption, day);
        self.cache
            .get_or_insert_with(key, |k| estimate(self.history, k, self.jitter, self.settings).value())
    }

    fn scoring_year<'s>(&'s self, slot: &'s LineupSlot, caption: Caption) -> &'s str {
        match self.live_year {
            Some(year) if self.current_observations(year, slot, caption) >= self.settings.live_min_observations => year,
            _ => slot.source_year.as_str(),
        }
    }

    fn current_observations(&self, year: &str, slot: &LineupSlot, caption: Caption) -> usize {
        self.history.distinct_day_points(year, &slot.entity_name, caption).len()
    }
}
