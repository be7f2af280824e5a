use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::profiles;
use crate::domain::CurrencyEntry;
use crate::errors::decode_context;

/// Records a participant's coins for one day and moves the balance by the
/// difference from what was recorded for that day before. Returns the delta.
pub fn credit_day(
    conn: &Connection,
    season_id: &str,
    participant_id: &str,
    day: u32,
    amount: i64,
    entries: &[CurrencyEntry],
) -> Result<i64> {
    let previous: i64 = conn
        .query_row(
            "SELECT amount FROM currency_history WHERE participant_id = ?1 AND season_id = ?2 AND day = ?3",
            params![participant_id, season_id, day],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query currency history")?
        .unwrap_or(0);

    conn.execute(
        "INSERT OR REPLACE INTO currency_history (participant_id, season_id, day, amount, entries_json) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![participant_id, season_id, day, amount, serde_json::to_string(entries)?],
    )
    .context("Failed to write currency history")?;

    let delta = amount - previous;
    if delta != 0 {
        profiles::add_currency(conn, participant_id, delta)?;
    }
    Ok(delta)
}

/// Participants with coins recorded for `day`.
pub fn participants_for_day(conn: &Connection, season_id: &str, day: u32) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT participant_id FROM currency_history WHERE season_id = ?1 AND day = ?2 ORDER BY participant_id",
    )?;
    let rows = stmt
        .query_map(params![season_id, day], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()
        .context("Failed to query currency history")?;
    Ok(rows)
}

/// Takes back a participant's coins for `day` and drops the day's history row.
/// Returns the delta applied to the balance.
pub fn revoke_day(conn: &Connection, season_id: &str, participant_id: &str, day: u32) -> Result<i64> {
    let previous: Option<i64> = conn
        .query_row(
            "SELECT amount FROM currency_history WHERE participant_id = ?1 AND season_id = ?2 AND day = ?3",
            params![participant_id, season_id, day],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query currency history")?;

    let Some(previous) = previous else {
        return Ok(0);
    };

    conn.execute(
        "DELETE FROM currency_history WHERE participant_id = ?1 AND season_id = ?2 AND day = ?3",
        params![participant_id, season_id, day],
    )
    .context("Failed to delete currency history")?;
    if previous != 0 {
        profiles::add_currency(conn, participant_id, -previous)?;
    }
    Ok(-previous)
}

pub fn history_for_day(
    conn: &Connection,
    season_id: &str,
    participant_id: &str,
    day: u32,
) -> Result<Option<(i64, Vec<CurrencyEntry>)>> {
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT amount, entries_json FROM currency_history WHERE participant_id = ?1 AND season_id = ?2 AND day = ?3",
            params![participant_id, season_id, day],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .context("Failed to query currency history")?;

    row.map(|(amount, json)| {
        let entries = serde_json::from_str(&json).with_context(|| decode_context("entries_json"))?;
        Ok((amount, entries))
    })
    .transpose()
}
