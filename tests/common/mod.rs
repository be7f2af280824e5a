#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::NaiveDate;
use corps_scoring::config::AppConfig;
use corps_scoring::database::{self, DbConn, DbPool, history, profiles, seasons, setup};
use corps_scoring::domain::{
    Caption, CorpsClass, CorpsRecord, EntityScores, HistoricalEvent, Lineup, LineupSlot, ScheduledShow,
    SeasonContext, SeasonMode, SeasonStatus, ShowFormat,
};
use corps_scoring::scoring::{NoJitter, NoSynergy};
use corps_scoring::services::DailyScoreProcessor;
use tempfile::TempDir;

pub const SEASON: &str = "season-2025";
pub const SOURCE_YEAR: &str = "2019";

pub struct TestStore {
    _dir: TempDir,
    pub config: AppConfig,
    pub pool: DbPool,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::new();
        config.persistence.database_path = dir.path().join("scoring.db").to_string_lossy().into_owned();
        config.scoring.worker_threads = 2;

        let pool = database::create_pool(&config.persistence).unwrap();
        setup::init_schema(&database::get_connection(&pool).unwrap()).unwrap();

        Self { _dir: dir, config, pool }
    }

    pub fn conn(&self) -> DbConn {
        database::get_connection(&self.pool).unwrap()
    }

    /// A processor with no jitter and no synergy, so scores equal history.
    pub fn processor(&self) -> DailyScoreProcessor {
        DailyScoreProcessor::new(self.config.clone(), self.pool.clone(), Box::new(NoJitter))
            .with_synergy(Box::new(NoSynergy))
    }

    pub fn season(&self, status: SeasonStatus) -> SeasonContext {
        let season = SeasonContext {
            season_id: SEASON.to_string(),
            status,
            mode: SeasonMode::OffSeason,
            schedule_start_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            data_set_id: "dataset-1".to_string(),
            current_year: "2025".to_string(),
        };
        seasons::upsert_season(&self.conn(), &season).unwrap();
        season
    }

    pub fn show(&self, day: u32, event_name: &str, format: ShowFormat) {
        seasons::insert_show(&self.conn(), SEASON, day, &ScheduledShow::new(event_name, "Somewhere", format)).unwrap();
    }

    /// Every caption of `entity` scores `score` on `day` in the source year.
    pub fn history(&self, entity: &str, day: u32, score: f64) {
        let event = HistoricalEvent {
            source_year: SOURCE_YEAR.to_string(),
            event_name: format!("{} day {}", entity, day),
            day_index: Some(day),
            scores: vec![EntityScores {
                entity_name: entity.to_string(),
                caption_scores: Caption::ALL.iter().map(|c| (*c, score)).collect(),
            }],
        };
        history::merge_event(&self.conn(), &event).unwrap();
    }

    /// A participant fielding one corps whose every caption is `entity`.
    pub fn participant(&self, id: &str, class: CorpsClass, entity: &str, selections: &[(u32, &str)]) {
        let conn = self.conn();
        profiles::upsert_profile(&conn, id, &format!("user-{}", id), SEASON).unwrap();

        let mut corps = CorpsRecord::new(class, format!("{} Corps", id), full_lineup(entity));
        for (week, event_name) in selections {
            corps.select_show(*week, *event_name);
        }
        profiles::upsert_corps(&conn, id, &corps).unwrap();
    }

    pub fn corps(&self, id: &str, class: CorpsClass) -> CorpsRecord {
        profiles::get_corps(&self.conn(), id, class).unwrap().unwrap()
    }
}

pub fn full_lineup(entity: &str) -> Lineup {
    let slot = LineupSlot {
        entity_name: entity.to_string(),
        point_cost: 10,
        source_year: SOURCE_YEAR.to_string(),
    };
    Caption::ALL
        .iter()
        .fold(Lineup::new(), |lineup, caption| lineup.with_slot(*caption, &slot))
}

/// Show score produced when every caption scores `caption_score`.
pub fn show_total(caption_score: f64) -> f64 {
    let captions: BTreeMap<Caption, f64> = Caption::ALL.iter().map(|c| (*c, caption_score)).collect();
    corps_scoring::scoring::aggregate_captions(&captions, 100.0).total_score
}
