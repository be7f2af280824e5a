pub mod awards;
pub mod corps;
pub mod currency;
pub mod history;
pub mod league;
pub mod lineup;
pub mod recap;
pub mod season;

pub use awards::{Award, AwardKind, AwardTier};
pub use corps::{CorpsClass, CorpsKey, CorpsRecord, ParticipantId, Profile, ShowConcept};
pub use currency::CurrencyEntry;
pub use history::{EntityScores, HistoricalData, HistoricalEvent, HistoryIndex, Observation};
pub use league::{Matchup, MatchupOutcome, RecordResult, SeasonRecord};
pub use lineup::{Caption, CaptionGroup, Lineup, LineupSlot};
pub use recap::{DayRecap, SeasonRecaps, ShowRecap, ShowResult};
pub use season::{
    ScheduleDay, ScheduledShow, SeasonContext, SeasonMode, SeasonStatus, ShowFormat,
    week_for_day, is_valid_day,
};
