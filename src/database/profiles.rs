use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use log::warn;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{CorpsClass, CorpsKey, CorpsRecord, Profile, ShowConcept};
use crate::errors::decode_context;

pub fn upsert_profile(conn: &Connection, participant_id: &str, username: &str, season_id: &str) -> Result<()> {
    let sql = "INSERT INTO profiles (participant_id, username, season_id) VALUES (?1, ?2, ?3)
        ON CONFLICT (participant_id) DO UPDATE SET username = excluded.username, season_id = excluded.season_id";

    conn.execute(sql, params![participant_id, username, season_id])
        .context("Failed to upsert profile")?;
    Ok(())
}

pub fn set_active(conn: &Connection, participant_id: &str, active: bool) -> Result<()> {
    conn.execute(
        "UPDATE profiles SET active = ?1 WHERE participant_id = ?2",
        params![active, participant_id],
    )
    .context("Failed to update profile activity")?;
    Ok(())
}

pub fn upsert_corps(conn: &Connection, participant_id: &str, corps: &CorpsRecord) -> Result<()> {
    let sql = "INSERT OR REPLACE INTO corps (participant_id, corps_class, corps_name, lineup_json, selected_shows_json, show_concept_json, total_season_score, last_scored_day) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

    conn.execute(
        sql,
        params![
            participant_id,
            corps.corps_class.as_str(),
            corps.corps_name,
            serde_json::to_string(&corps.lineup)?,
            serde_json::to_string(&corps.selected_shows)?,
            serde_json::to_string(&corps.show_concept)?,
            corps.total_season_score,
            corps.last_scored_day
        ],
    )
    .context("Failed to upsert corps")?;
    Ok(())
}

struct CorpsRow {
    participant_id: String,
    corps_class: String,
    corps_name: String,
    lineup_json: String,
    selected_shows_json: String,
    show_concept_json: String,
    total_season_score: f64,
    last_scored_day: Option<u32>,
}

const CORPS_COLUMNS: &str = "participant_id, corps_class, corps_name, lineup_json, selected_shows_json, show_concept_json, total_season_score, last_scored_day";

fn parse_corps_row(row: &rusqlite::Row) -> rusqlite::Result<CorpsRow> {
    Ok(CorpsRow {
        participant_id: row.get(0)?,
        corps_class: row.get(1)?,
        corps_name: row.get(2)?,
        lineup_json: row.get(3)?,
        selected_shows_json: row.get(4)?,
        show_concept_json: row.get(5)?,
        total_season_score: row.get(6)?,
        last_scored_day: row.get(7)?,
    })
}

impl CorpsRow {
    fn into_record(self) -> Result<CorpsRecord> {
        let show_concept: ShowConcept = serde_json::from_str(&self.show_concept_json)
            .with_context(|| decode_context("show_concept_json"))?;

        Ok(CorpsRecord {
            corps_class: self.corps_class.parse()?,
            corps_name: self.corps_name,
            lineup: serde_json::from_str(&self.lineup_json).with_context(|| decode_context("lineup_json"))?,
            selected_shows: serde_json::from_str(&self.selected_shows_json)
                .with_context(|| decode_context("selected_shows_json"))?,
            show_concept,
            total_season_score: self.total_season_score,
            last_scored_day: self.last_scored_day,
        })
    }
}

pub fn get_corps(conn: &Connection, participant_id: &str, class: CorpsClass) -> Result<Option<CorpsRecord>> {
    let sql = format!("SELECT {} FROM corps WHERE participant_id = ?1 AND corps_class = ?2", CORPS_COLUMNS);

    conn.query_row(&sql, params![participant_id, class.as_str()], parse_corps_row)
        .optional()
        .context("Failed to query corps")?
        .map(CorpsRow::into_record)
        .transpose()
}

/// Active profiles of a season with their corps, read in two bulk queries.
///
/// At most `cap` profiles are returned; there is no cursor beyond that.
pub fn list_active_profiles(conn: &Connection, season_id: &str, cap: usize) -> Result<Vec<Profile>> {
    let mut stmt = conn.prepare(
        "SELECT participant_id, username FROM profiles WHERE season_id = ?1 AND active = 1 ORDER BY participant_id LIMIT ?2",
    )?;
    let heads = stmt
        .query_map(params![season_id, cap as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query active profiles")?;

    if heads.len() >= cap {
        warn!(
            "Profile read cap of {} reached for season {}; remaining participants are NOT scored",
            cap, season_id
        );
    }

    let sql = format!(
        "SELECT {} FROM corps WHERE participant_id IN (SELECT participant_id FROM profiles WHERE season_id = ?1 AND active = 1 ORDER BY participant_id LIMIT ?2)",
        CORPS_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![season_id, cap as i64], parse_corps_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query corps for active profiles")?;

    let mut corps_by_participant: HashMap<String, BTreeMap<CorpsClass, CorpsRecord>> = HashMap::new();
    for row in rows {
        let participant_id = row.participant_id.clone();
        let record = row.into_record()?;
        corps_by_participant
            .entry(participant_id)
            .or_default()
            .insert(record.corps_class, record);
    }

    Ok(heads
        .into_iter()
        .map(|(participant_id, username)| {
            let corps = corps_by_participant.remove(&participant_id).unwrap_or_default();
            Profile { participant_id, username, corps }
        })
        .collect())
}

/// Writes a day's score over the previous one. A zero score keeps the score
/// the corps had before the day but still marks the day.
///
/// The state before the day's first write is kept in `corps_day_scores`, so
/// re-runs of the day start from the same place.
pub fn update_corps_score(
    conn: &Connection,
    season_id: &str,
    participant_id: &str,
    class: CorpsClass,
    total_score: Option<f64>,
    day: u32,
) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO corps_day_scores (season_id, participant_id, corps_class, day, previous_score, previous_day)
         SELECT ?1, participant_id, corps_class, ?4, total_season_score, last_scored_day FROM corps WHERE participant_id = ?2 AND corps_class = ?3",
        params![season_id, participant_id, class.as_str(), day],
    )
    .context("Failed to snapshot corps score")?;

    let sql = "UPDATE corps SET total_season_score = COALESCE(?1, (SELECT previous_score FROM corps_day_scores WHERE season_id = ?5 AND participant_id = ?3 AND corps_class = ?4 AND day = ?2), total_season_score), last_scored_day = ?2 WHERE participant_id = ?3 AND corps_class = ?4";

    conn.execute(sql, params![total_score, day, participant_id, class.as_str(), season_id])
        .context("Failed to update corps score")?;
    Ok(())
}

/// Corps holding a score written for `day`.
pub fn corps_scored_on_day(conn: &Connection, season_id: &str, day: u32) -> Result<Vec<CorpsKey>> {
    let mut stmt = conn.prepare(
        "SELECT participant_id, corps_class FROM corps_day_scores WHERE season_id = ?1 AND day = ?2 ORDER BY participant_id, corps_class",
    )?;
    let rows = stmt
        .query_map(params![season_id, day], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query corps day scores")?;

    rows.into_iter()
        .map(|(participant_id, class)| Ok(CorpsKey::new(participant_id, class.parse()?)))
        .collect()
}

/// Puts back the score a corps had before `day` was written for it. A corps
/// scored on a later day since then keeps its current score.
pub fn restore_corps_score(
    conn: &Connection,
    season_id: &str,
    participant_id: &str,
    class: CorpsClass,
    day: u32,
) -> Result<()> {
    let snapshot: Option<(f64, Option<u32>)> = conn
        .query_row(
            "SELECT previous_score, previous_day FROM corps_day_scores WHERE season_id = ?1 AND participant_id = ?2 AND corps_class = ?3 AND day = ?4",
            params![season_id, participant_id, class.as_str(), day],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .context("Failed to query corps day score")?;

    let Some((previous_score, previous_day)) = snapshot else {
        return Ok(());
    };

    conn.execute(
        "UPDATE corps SET total_season_score = ?1, last_scored_day = ?2 WHERE participant_id = ?3 AND corps_class = ?4 AND last_scored_day = ?5",
        params![previous_score, previous_day, participant_id, class.as_str(), day],
    )
    .context("Failed to restore corps score")?;
    conn.execute(
        "DELETE FROM corps_day_scores WHERE season_id = ?1 AND participant_id = ?2 AND corps_class = ?3 AND day = ?4",
        params![season_id, participant_id, class.as_str(), day],
    )
    .context("Failed to clear corps day score")?;
    Ok(())
}

/// Latest stored score for every corps.
pub fn list_class_scores(conn: &Connection) -> Result<HashMap<CorpsKey, f64>> {
    let mut stmt = conn.prepare("SELECT participant_id, corps_class, total_season_score FROM corps")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, f64>(2)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query corps scores")?;

    rows.into_iter()
        .map(|(participant_id, class, score)| Ok((CorpsKey::new(participant_id, class.parse()?), score)))
        .collect()
}

pub fn get_currency(conn: &Connection, participant_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT currency FROM profiles WHERE participant_id = ?1",
        params![participant_id],
        |row| row.get(0),
    )
    .optional()
    .context("Failed to query currency")
    .map(|balance| balance.unwrap_or(0))
}

pub fn add_currency(conn: &Connection, participant_id: &str, delta: i64) -> Result<()> {
    conn.execute(
        "UPDATE profiles SET currency = currency + ?1 WHERE participant_id = ?2",
        params![delta, participant_id],
    )
    .context("Failed to update currency")?;
    Ok(())
}
