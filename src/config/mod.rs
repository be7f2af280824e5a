pub mod settings;

pub use settings::{AppConfig, CurrencySettings, PersistenceSettings, ScoringSettings};
