use std::fmt;

/// Why a run ended without doing any work. None of these are failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DayOutOfRange(u32),
    NoSeason,
    SeasonInactive(String),
    NoShows(u32),
    NotWeekBoundary(u32),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DayOutOfRange(day) => write!(f, "day {} is outside the season calendar", day),
            SkipReason::NoSeason => write!(f, "no season document found"),
            SkipReason::SeasonInactive(id) => write!(f, "season {} is not active", id),
            SkipReason::NoShows(day) => write!(f, "no shows scheduled for day {}", day),
            SkipReason::NotWeekBoundary(day) => write!(f, "day {} is not a week boundary", day),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<T> {
    Completed(T),
    Skipped(SkipReason),
}

impl<T> RunOutcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            RunOutcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped(_))
    }
}

/// Add context to JSON column decoding
pub fn decode_context(column: &str) -> String {
    format!("Failed to decode {} column", column)
}
