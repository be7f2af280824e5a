use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{DayRecap, SeasonRecaps, ShowRecap};
use crate::errors::decode_context;

/// Stores a day's recap, replacing any earlier entry for the same day.
pub fn put_recap(conn: &Connection, season_id: &str, recap: &DayRecap) -> Result<()> {
    let shows_json = serde_json::to_string(&recap.shows)?;
    conn.execute(
        "INSERT OR REPLACE INTO recaps (season_id, day, date, shows_json) VALUES (?1, ?2, ?3, ?4)",
        params![season_id, recap.day, recap.date, shows_json],
    )
    .with_context(|| format!("Failed to write recap for day {}", recap.day))?;
    Ok(())
}

fn parse_recap_row(row: &rusqlite::Row) -> rusqlite::Result<(u32, NaiveDate, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_recap((day, date, shows_json): (u32, NaiveDate, String)) -> Result<DayRecap> {
    let shows: Vec<ShowRecap> = serde_json::from_str(&shows_json).with_context(|| decode_context("shows_json"))?;
    Ok(DayRecap { day, date, shows })
}

pub fn get_recaps(conn: &Connection, season_id: &str) -> Result<SeasonRecaps> {
    let mut stmt = conn.prepare("SELECT day, date, shows_json FROM recaps WHERE season_id = ?1 ORDER BY day")?;
    let rows = stmt
        .query_map(params![season_id], parse_recap_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query recaps")?;

    rows.into_iter().map(into_recap).collect()
}

pub fn get_recap(conn: &Connection, season_id: &str, day: u32) -> Result<Option<DayRecap>> {
    conn.query_row(
        "SELECT day, date, shows_json FROM recaps WHERE season_id = ?1 AND day = ?2",
        params![season_id, day],
        parse_recap_row,
    )
    .optional()
    .context("Failed to query recap")?
    .map(into_recap)
    .transpose()
}

pub fn count_for_day(conn: &Connection, season_id: &str, day: u32) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM recaps WHERE season_id = ?1 AND day = ?2",
        params![season_id, day],
        |row| row.get(0),
    )
    .context("Failed to count recaps")
}
