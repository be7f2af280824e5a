use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::domain::Award;

/// Removes a day's awards so the day's set can be written again.
pub fn clear_day(conn: &Connection, season_id: &str, day: u32) -> Result<usize> {
    conn.execute(
        "DELETE FROM awards WHERE season_id = ?1 AND day = ?2",
        params![season_id, day],
    )
    .context("Failed to clear awards for day")
}

pub fn insert_award(conn: &Connection, season_id: &str, award: &Award) -> Result<()> {
    let sql = "INSERT OR REPLACE INTO awards (season_id, participant_id, corps_class, day, event_name, kind, tier, rank, score) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

    conn.execute(
        sql,
        params![
            season_id,
            award.participant_id,
            award.corps_class.as_str(),
            award.day,
            award.event_name,
            award.kind.as_str(),
            award.tier.as_str(),
            award.rank,
            award.score
        ],
    )
    .context("Failed to insert award")?;
    Ok(())
}

struct AwardRow {
    participant_id: String,
    corps_class: String,
    day: u32,
    event_name: String,
    kind: String,
    tier: String,
    rank: u32,
    score: f64,
}

fn parse_award_row(row: &rusqlite::Row) -> rusqlite::Result<AwardRow> {
    Ok(AwardRow {
        participant_id: row.get(0)?,
        corps_class: row.get(1)?,
        day: row.get(2)?,
        event_name: row.get(3)?,
        kind: row.get(4)?,
        tier: row.get(5)?,
        rank: row.get(6)?,
        score: row.get(7)?,
    })
}

/// A participant's trophy case for one season.
pub fn list_for_participant(conn: &Connection, season_id: &str, participant_id: &str) -> Result<Vec<Award>> {
    let sql = "SELECT participant_id, corps_class, day, event_name, kind, tier, rank, score FROM awards WHERE season_id = ?1 AND participant_id = ?2 ORDER BY day, event_name, rank";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![season_id, participant_id], parse_award_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query awards")?;

    rows.into_iter()
        .map(|row| {
            Ok(Award {
                participant_id: row.participant_id,
                corps_class: row.corps_class.parse()?,
                kind: row.kind.parse()?,
                tier: row.tier.parse()?,
                rank: row.rank,
                event_name: row.event_name,
                day: row.day,
                score: row.score,
            })
        })
        .collect()
}
