pub mod attendance;
pub mod awards;
pub mod ingestion;
pub mod matchups;
pub mod processing;

pub use ingestion::{HistoryDump, ImportSummary, IngestionService};
pub use matchups::{MatchupSummary, WeeklyMatchupResolver, resolve_matchup};
pub use processing::{DailyScoreProcessor, DaySummary};
