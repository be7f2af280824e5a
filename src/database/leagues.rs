use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{CorpsClass, Matchup, RecordResult, SeasonRecord};

pub fn create_league(conn: &Connection, league_id: &str, name: &str, season_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO leagues (league_id, name, season_id) VALUES (?1, ?2, ?3)",
        params![league_id, name, season_id],
    )
    .context("Failed to create league")?;
    Ok(())
}

pub fn insert_matchup(
    conn: &Connection,
    league_id: &str,
    week: u32,
    class: CorpsClass,
    participant_a: &str,
    participant_b: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO matchups (league_id, week, corps_class, participant_a, participant_b) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![league_id, week, class.as_str(), participant_a, participant_b],
    )
    .context("Failed to insert matchup")?;
    Ok(conn.last_insert_rowid())
}

const MATCHUP_COLUMNS: &str = "m.id, m.league_id, m.week, m.corps_class, m.participant_a, m.participant_b, m.winner, m.score_a, m.score_b, m.completed";

struct MatchupRow {
    id: i64,
    league_id: String,
    week: u32,
    corps_class: String,
    participant_a: String,
    participant_b: Option<String>,
    winner: Option<String>,
    score_a: Option<f64>,
    score_b: Option<f64>,
    completed: bool,
}

fn parse_matchup_row(row: &rusqlite::Row) -> rusqlite::Result<MatchupRow> {
    Ok(MatchupRow {
        id: row.get(0)?,
        league_id: row.get(1)?,
        week: row.get(2)?,
        corps_class: row.get(3)?,
        participant_a: row.get(4)?,
        participant_b: row.get(5)?,
        winner: row.get(6)?,
        score_a: row.get(7)?,
        score_b: row.get(8)?,
        completed: row.get(9)?,
    })
}

impl MatchupRow {
    fn into_matchup(self) -> Result<Matchup> {
        Ok(Matchup {
            id: self.id,
            league_id: self.league_id,
            week: self.week,
            corps_class: self.corps_class.parse()?,
            participant_a: self.participant_a,
            participant_b: self.participant_b,
            winner: self.winner,
            score_a: self.score_a,
            score_b: self.score_b,
            completed: self.completed,
        })
    }
}

/// Every matchup up to and including `week` across the season's leagues,
/// decided or not.
pub fn list_matchups_through_week(conn: &Connection, season_id: &str, week: u32) -> Result<Vec<Matchup>> {
    let sql = format!(
        "SELECT {} FROM matchups m JOIN leagues l ON l.league_id = m.league_id
         WHERE l.season_id = ?1 AND m.week <= ?2
         ORDER BY m.week, m.league_id, m.corps_class, m.id",
        MATCHUP_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![season_id, week], parse_matchup_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query matchups")?;

    rows.into_iter().map(MatchupRow::into_matchup).collect()
}

pub fn get_matchup(conn: &Connection, matchup_id: i64) -> Result<Option<Matchup>> {
    let sql = format!("SELECT {} FROM matchups m WHERE m.id = ?1", MATCHUP_COLUMNS);

    conn.query_row(&sql, params![matchup_id], parse_matchup_row)
        .optional()
        .context("Failed to query matchup")?
        .map(MatchupRow::into_matchup)
        .transpose()
}

/// Marks a matchup decided. Returns false if it was already decided.
pub fn record_result(
    conn: &Connection,
    matchup_id: i64,
    winner: Option<&str>,
    score_a: Option<f64>,
    score_b: Option<f64>,
) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE matchups SET winner = ?1, score_a = ?2, score_b = ?3, completed = 1 WHERE id = ?4 AND completed = 0 AND winner IS NULL",
            params![winner, score_a, score_b, matchup_id],
        )
        .context("Failed to record matchup result")?;
    Ok(updated == 1)
}

pub fn increment_record(
    conn: &Connection,
    league_id: &str,
    participant_id: &str,
    class: CorpsClass,
    result: RecordResult,
) -> Result<()> {
    let (wins, losses, ties) = match result {
        RecordResult::Win => (1, 0, 0),
        RecordResult::Loss => (0, 1, 0),
        RecordResult::Tie => (0, 0, 1),
    };

    conn.execute(
        "INSERT INTO league_records (league_id, participant_id, corps_class, wins, losses, ties) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (league_id, participant_id, corps_class) DO UPDATE SET wins = wins + excluded.wins, losses = losses + excluded.losses, ties = ties + excluded.ties",
        params![league_id, participant_id, class.as_str(), wins, losses, ties],
    )
    .context("Failed to update league record")?;
    Ok(())
}

pub fn get_record(conn: &Connection, league_id: &str, participant_id: &str, class: CorpsClass) -> Result<SeasonRecord> {
    conn.query_row(
        "SELECT wins, losses, ties FROM league_records WHERE league_id = ?1 AND participant_id = ?2 AND corps_class = ?3",
        params![league_id, participant_id, class.as_str()],
        |row| {
            Ok(SeasonRecord {
                wins: row.get(0)?,
                losses: row.get(1)?,
                ties: row.get(2)?,
            })
        },
    )
    .optional()
    .context("Failed to query league record")
    .map(Option::unwrap_or_default)
}
