use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result};
use log::warn;
use rusqlite::{Connection, params, params_from_iter};

use crate::domain::{Caption, EntityScores, HistoricalData, HistoricalEvent};
use crate::errors::decode_context;

/// Adds an event and any scores not already stored. Never overwrites.
/// Returns the number of new score rows.
pub fn merge_event(conn: &Connection, event: &HistoricalEvent) -> Result<usize> {
    conn.execute(
        "INSERT OR IGNORE INTO historical_events (source_year, event_name, day_index) VALUES (?1, ?2, ?3)",
        params![event.source_year, event.event_name, event.day_index],
    )
    .context("Failed to insert historical event")?;

    let event_id: i64 = conn
        .query_row(
            "SELECT id FROM historical_events WHERE source_year = ?1 AND event_name = ?2 AND day_index IS ?3",
            params![event.source_year, event.event_name, event.day_index],
            |row| row.get(0),
        )
        .context("Failed to look up historical event id")?;

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO historical_scores (event_id, entity_name, caption, score) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut inserted = 0;
    for entity in &event.scores {
        for (caption, score) in &entity.caption_scores {
            inserted += stmt
                .execute(params![event_id, entity.entity_name, caption.code(), score])
                .context("Failed to insert historical score")?;
        }
    }

    Ok(inserted)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

struct ScoreRow {
    event_id: i64,
    source_year: String,
    event_name: String,
    day_index: Option<u32>,
    entity_name: Option<String>,
    caption: Option<String>,
    score: Option<f64>,
}

fn parse_score_row(row: &rusqlite::Row) -> rusqlite::Result<ScoreRow> {
    Ok(ScoreRow {
        event_id: row.get(0)?,
        source_year: row.get(1)?,
        event_name: row.get(2)?,
        day_index: row.get(3)?,
        entity_name: row.get(4)?,
        caption: row.get(5)?,
        score: row.get(6)?,
    })
}

/// Bulk read of every event for the requested source years.
pub fn get_historical_data(conn: &Connection, years: &BTreeSet<String>) -> Result<HistoricalData> {
    let mut data = HistoricalData::new();
    if years.is_empty() {
        return Ok(data);
    }

    let sql = format!(
        "SELECT e.id, e.source_year, e.event_name, e.day_index, s.entity_name, s.caption, s.score
         FROM historical_events e
         LEFT JOIN historical_scores s ON s.event_id = e.id
         WHERE e.source_year IN ({})
         ORDER BY e.id, s.rowid",
        placeholders(years.len())
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(years.iter()), parse_score_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query historical data")?;

    let mut current: Option<(i64, HistoricalEvent)> = None;
    for row in rows {
        if current.as_ref().is_none_or(|(id, _)| *id != row.event_id) {
            if let Some((_, event)) = current.take() {
                push_event(&mut data, event);
            }
            current = Some((
                row.event_id,
                HistoricalEvent {
                    source_year: row.source_year.clone(),
                    event_name: row.event_name.clone(),
                    day_index: row.day_index,
                    scores: Vec::new(),
                },
            ));
        }

        if let Some((_, event)) = current.as_mut() {
            add_score(event, row);
        }
    }
    if let Some((_, event)) = current {
        push_event(&mut data, event);
    }

    Ok(data)
}

fn push_event(data: &mut HistoricalData, event: HistoricalEvent) {
    data.entry(event.source_year.clone()).or_default().push(event);
}

fn add_score(event: &mut HistoricalEvent, row: ScoreRow) {
    let (Some(entity_name), Some(code), Some(score)) = (row.entity_name, row.caption, row.score) else {
        return;
    };
    let Some(caption) = Caption::from_code(&code) else {
        warn!("Skipping unknown caption {:?} in {} {}", code, event.source_year, event.event_name);
        return;
    };

    match event.scores.iter_mut().find(|e| e.entity_name == entity_name) {
        Some(entity) => {
            entity.caption_scores.insert(caption, score);
        }
        None => event.scores.push(EntityScores {
            entity_name,
            caption_scores: BTreeMap::from([(caption, score)]),
        }),
    }
}

pub fn upsert_entity_tags(conn: &Connection, entity_name: &str, tags: &[String]) -> Result<()> {
    let tags_json = serde_json::to_string(tags)?;
    conn.execute(
        "INSERT OR REPLACE INTO entity_tags (entity_name, tags_json) VALUES (?1, ?2)",
        params![entity_name, tags_json],
    )
    .context("Failed to upsert entity tags")?;
    Ok(())
}

pub fn list_entity_tags(conn: &Connection) -> Result<HashMap<String, Vec<String>>> {
    let mut stmt = conn.prepare("SELECT entity_name, tags_json FROM entity_tags")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query entity tags")?;

    rows.into_iter()
        .map(|(entity, json)| {
            let tags = serde_json::from_str(&json).with_context(|| decode_context("tags_json"))?;
            Ok((entity, tags))
        })
        .collect()
}
