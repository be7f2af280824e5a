use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{Caption, Lineup, ShowConcept};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynergyBonus {
    pub total: f64,
    pub per_caption: BTreeMap<Caption, f64>,
}

impl SynergyBonus {
    pub fn for_caption(&self, caption: Caption) -> f64 {
        self.per_caption.get(&caption).copied().unwrap_or(0.0)
    }
}

/// Bonus in `[0, 1]` per caption for a show concept against a lineup.
pub trait SynergyCalculator: Send + Sync {
    fn compute(&self, concept: &ShowConcept, lineup: &Lineup) -> SynergyBonus;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynergy;

impl SynergyCalculator for NoSynergy {
    fn compute(&self, _concept: &ShowConcept, _lineup: &Lineup) -> SynergyBonus {
        SynergyBonus::default()
    }
}

const BONUS_PER_MATCH: f64 = 0.25;
const MAX_CAPTION_BONUS: f64 = 1.0;

/// Matches concept tags against characteristic tags of each slot's entity.
#[derive(Debug, Clone, Default)]
pub struct TagSynergy {
    entity_tags: HashMap<String, HashSet<String>>,
}

impl TagSynergy {
    pub fn new(entity_tags: HashMap<String, Vec<String>>) -> Self {
        let entity_tags = entity_tags
            .into_iter()
            .map(|(entity, tags)| (entity, tags.iter().map(|t| normalize_tag(t)).collect()))
            .collect();
        Self { entity_tags }
    }

    fn caption_bonus(&self, concept_tags: &HashSet<String>, entity_name: &str) -> f64 {
        let Some(tags) = self.entity_tags.get(entity_name) else {
            return 0.0;
        };
        let matches = concept_tags.intersection(tags).count();
        (matches as f64 * BONUS_PER_MATCH).min(MAX_CAPTION_BONUS)
    }
}

impl SynergyCalculator for TagSynergy {
    fn compute(&self, concept: &ShowConcept, lineup: &Lineup) -> SynergyBonus {
        let concept_tags: HashSet<String> = concept.tags.iter().map(|t| normalize_tag(t)).collect();
        if concept_tags.is_empty() {
            return SynergyBonus::default();
        }

        let mut bonus = SynergyBonus::default();
        for caption in Caption::ALL {
            let Ok(Some(slot)) = lineup.slot(caption) else {
                continue;
            };
            let value = self.caption_bonus(&concept_tags, &slot.entity_name);
            if value > 0.0 {
                bonus.per_caption.insert(caption, value);
                bonus.total += value;
            }
        }
        bonus
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}
