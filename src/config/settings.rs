use std::time::Duration;

use crate::domain::CorpsClass;

#[derive(Debug, Clone)]
pub struct ScoringSettings {
    pub caption_cap: f64,
    pub show_cap: f64,
    pub jitter_amplitude: f64,
    pub live_min_observations: usize,
    pub worker_threads: usize,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            caption_cap: 20.0,
            show_cap: 100.0,
            jitter_amplitude: 0.25,
            live_min_observations: 3,
            worker_threads: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceSettings {
    pub database_path: String,
    pub batch_size: usize,
    pub profile_read_cap: usize,
    pub busy_timeout: Duration,
    pub connection_timeout: Duration,
    pub run_timeout: Duration,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            database_path: "corps_scoring.db".to_string(),
            batch_size: 450,
            profile_read_cap: 5000,
            busy_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(540),
        }
    }
}

/// Participation coins credited per attended show.
#[derive(Debug, Clone)]
pub struct CurrencySettings {
    pub world_class: i64,
    pub open_class: i64,
    pub a_class: i64,
    pub sound_sport: i64,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            world_class: 100,
            open_class: 75,
            a_class: 50,
            sound_sport: 25,
        }
    }
}

impl CurrencySettings {
    pub fn participation(&self, class: CorpsClass) -> i64 {
        match class {
            CorpsClass::WorldClass => self.world_class,
            CorpsClass::OpenClass => self.open_class,
            CorpsClass::AClass => self.a_class,
            CorpsClass::SoundSport => self.sound_sport,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scoring: ScoringSettings,
    pub persistence: PersistenceSettings,
    pub currency: CurrencySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            scoring: ScoringSettings::default(),
            persistence: PersistenceSettings::default(),
            currency: CurrencySettings::default(),
        }
    }

    /// Defaults with `DATABASE_PATH`, `SCORING_WORKERS` and `RUN_TIMEOUT_SECS` applied.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.persistence.database_path = path;
        }
        if let Some(workers) = read_env_number("SCORING_WORKERS") {
            config.scoring.worker_threads = (workers as usize).max(1);
        }
        if let Some(secs) = read_env_number("RUN_TIMEOUT_SECS") {
            config.persistence.run_timeout = Duration::from_secs(secs);
        }

        config
    }
}

fn read_env_number(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a number", name, raw);
            None
        }
    }
}
