use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{ScheduleDay, ScheduledShow, SeasonContext, SeasonMode, SeasonStatus, ShowFormat};

pub fn upsert_season(conn: &Connection, season: &SeasonContext) -> Result<()> {
    let sql = "INSERT INTO seasons (season_id, status, mode, schedule_start_date, data_set_id, current_year) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (season_id) DO UPDATE SET status = excluded.status, mode = excluded.mode, schedule_start_date = excluded.schedule_start_date, data_set_id = excluded.data_set_id, current_year = excluded.current_year";

    conn.execute(
        sql,
        params![
            season.season_id,
            season.status.as_str(),
            season.mode.as_str(),
            season.schedule_start_date,
            season.data_set_id,
            season.current_year
        ],
    )
    .context("Failed to upsert season")?;
    Ok(())
}

struct SeasonRow {
    season_id: String,
    status: String,
    mode: String,
    schedule_start_date: NaiveDate,
    data_set_id: String,
    current_year: String,
}

fn parse_season_row(row: &rusqlite::Row) -> rusqlite::Result<SeasonRow> {
    Ok(SeasonRow {
        season_id: row.get(0)?,
        status: row.get(1)?,
        mode: row.get(2)?,
        schedule_start_date: row.get(3)?,
        data_set_id: row.get(4)?,
        current_year: row.get(5)?,
    })
}

impl SeasonRow {
    fn into_context(self) -> Result<SeasonContext> {
        Ok(SeasonContext {
            season_id: self.season_id,
            status: SeasonStatus::from_db(&self.status),
            mode: SeasonMode::from_db(&self.mode)?,
            schedule_start_date: self.schedule_start_date,
            data_set_id: self.data_set_id,
            current_year: self.current_year,
        })
    }
}

/// The season document the pipeline runs against: the most recently created one.
pub fn get_current_season(conn: &Connection) -> Result<Option<SeasonContext>> {
    let sql = "SELECT season_id, status, mode, schedule_start_date, data_set_id, current_year FROM seasons ORDER BY created_at DESC, rowid DESC LIMIT 1";

    conn.query_row(sql, [], parse_season_row)
        .optional()
        .context("Failed to query current season")?
        .map(SeasonRow::into_context)
        .transpose()
}

pub fn insert_show(conn: &Connection, season_id: &str, day: u32, show: &ScheduledShow) -> Result<()> {
    let sql = "INSERT OR REPLACE INTO schedule_shows (season_id, day, event_name, location, format) VALUES (?1, ?2, ?3, ?4, ?5)";

    conn.execute(
        sql,
        params![season_id, day, show.event_name, show.location, show.format.to_db()],
    )
    .with_context(|| format!("Failed to insert show {} on day {}", show.event_name, day))?;
    Ok(())
}

pub fn get_schedule_day(conn: &Connection, season_id: &str, day: u32) -> Result<ScheduleDay> {
    let sql = "SELECT event_name, location, format FROM schedule_shows WHERE season_id = ?1 AND day = ?2 ORDER BY rowid";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![season_id, day], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query schedule day")?;

    let shows = rows
        .into_iter()
        .map(|(event_name, location, format)| {
            Ok(ScheduledShow::new(event_name, location, ShowFormat::from_db(&format)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScheduleDay { day, shows })
}
