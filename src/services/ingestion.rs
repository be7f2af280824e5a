use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::database::{self, DbPool, history};
use crate::domain::{HistoricalEvent, is_valid_day};

const MAX_CAPTION_SCORE: f64 = 20.0;

/// Scraper output: historical events plus optional characteristic tags per entity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryDump {
    #[serde(default)]
    pub events: Vec<HistoricalEvent>,
    #[serde(default)]
    pub entity_tags: HashMap<String, Vec<String>>,
}

impl HistoryDump {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history dump {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse history dump {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub events_read: usize,
    pub events_skipped: usize,
    pub scores_inserted: usize,
    pub scores_rejected: usize,
    pub tagged_entities: usize,
}

/// Merges historical dumps into the store. Existing rows are never replaced.
pub struct IngestionService {
    pool: DbPool,
}

impl IngestionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn run(&self, path: &Path) -> Result<ImportSummary> {
        info!("=== Starting History Import ===\n");

        let dump = HistoryDump::from_path(path)?;
        info!("  → Read {} events from {}", dump.events.len(), path.display());

        let summary = self.merge(dump)?;
        info!(
            "  → Merged {} new scores ({} events skipped, {} scores rejected), tagged {} entities",
            summary.scores_inserted, summary.events_skipped, summary.scores_rejected, summary.tagged_entities
        );

        info!("=== Import Complete ===");
        Ok(summary)
    }

    pub fn merge(&self, dump: HistoryDump) -> Result<ImportSummary> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction().context("Failed to open import transaction")?;

        let mut summary = ImportSummary {
            events_read: dump.events.len(),
            ..ImportSummary::default()
        };

        for mut event in dump.events {
            if event.day_index.is_some_and(|day| !is_valid_day(day)) {
                warn!(
                    "Skipping {} {}: day {:?} is outside the season calendar",
                    event.source_year, event.event_name, event.day_index
                );
                summary.events_skipped += 1;
                continue;
            }

            summary.scores_rejected += drop_out_of_range_scores(&mut event);
            summary.scores_inserted += history::merge_event(&tx, &event)?;
        }

        for (entity_name, tags) in &dump.entity_tags {
            history::upsert_entity_tags(&tx, entity_name, tags)?;
            summary.tagged_entities += 1;
        }

        tx.commit().context("Failed to commit history import")?;
        Ok(summary)
    }
}

/// Removes caption scores outside `[0, 20]`. Returns how many were removed.
fn drop_out_of_range_scores(event: &mut HistoricalEvent) -> usize {
    let mut rejected = 0;
    for entity in &mut event.scores {
        entity.caption_scores.retain(|caption, score| {
            let valid = score.is_finite() && (0.0..=MAX_CAPTION_SCORE).contains(score);
            if !valid {
                warn!(
                    "Rejecting {} {} score {} for {} at {}",
                    entity.entity_name, caption, score, event.source_year, event.event_name
                );
                rejected += 1;
            }
            valid
        });
    }
    rejected
}
