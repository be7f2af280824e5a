use anyhow::{Result, anyhow};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::bracket::RoundKind;

pub const SEASON_LENGTH: u32 = 49;

/// Days 41 and 42 split a regional's field in half.
pub const SPLIT_REGIONAL_DAYS: [u32; 2] = [41, 42];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Active,
    Inactive,
}

impl SeasonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonStatus::Active => "active",
            SeasonStatus::Inactive => "inactive",
        }
    }

    pub fn from_db(s: &str) -> Self {
        if s == "active" { SeasonStatus::Active } else { SeasonStatus::Inactive }
    }
}

/// Off-season runs replay a historical data set; live seasons may score
/// against the current year's results once enough exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonMode {
    OffSeason,
    Live,
}

impl SeasonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonMode::OffSeason => "off_season",
            SeasonMode::Live => "live",
        }
    }

    pub fn from_db(s: &str) -> Result<Self> {
        match s {
            "off_season" => Ok(SeasonMode::OffSeason),
            "live" => Ok(SeasonMode::Live),
            other => Err(anyhow!("Unknown season mode: {}", other)),
        }
    }
}

/// Season state passed explicitly into every pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonContext {
    pub season_id: String,
    pub status: SeasonStatus,
    pub mode: SeasonMode,
    pub schedule_start_date: NaiveDate,
    pub data_set_id: String,
    pub current_year: String,
}

impl SeasonContext {
    pub fn is_active(&self) -> bool {
        self.status == SeasonStatus::Active
    }

    pub fn date_for_day(&self, day: u32) -> NaiveDate {
        self.schedule_start_date
            .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
            .unwrap_or(self.schedule_start_date)
    }

    /// Year whose results may override lineup source years.
    pub fn live_year(&self) -> Option<&str> {
        match self.mode {
            SeasonMode::Live => Some(self.current_year.as_str()),
            SeasonMode::OffSeason => None,
        }
    }
}

pub fn week_for_day(day: u32) -> u32 {
    day.div_ceil(7)
}

pub fn is_valid_day(day: u32) -> bool {
    (1..=SEASON_LENGTH).contains(&day)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowFormat {
    Regular,
    SplitRegional,
    Championship(RoundKind),
}

impl ShowFormat {
    pub fn to_db(&self) -> String {
        match self {
            ShowFormat::Regular => "regular".to_string(),
            ShowFormat::SplitRegional => "split_regional".to_string(),
            ShowFormat::Championship(kind) => format!("championship:{}", kind.as_str()),
        }
    }

    pub fn from_db(s: &str) -> Result<Self> {
        match s {
            "regular" => Ok(ShowFormat::Regular),
            "split_regional" => Ok(ShowFormat::SplitRegional),
            other => {
                let kind = other
                    .strip_prefix("championship:")
                    .ok_or_else(|| anyhow!("Unknown show format: {}", other))?;
                Ok(ShowFormat::Championship(kind.parse()?))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledShow {
    pub event_name: String,
    pub location: String,
    pub format: ShowFormat,
}

impl ScheduledShow {
    pub fn new(event_name: impl Into<String>, location: impl Into<String>, format: ShowFormat) -> Self {
        Self {
            event_name: event_name.into(),
            location: location.into(),
            format,
        }
    }

    pub fn regular(event_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(event_name, location, ShowFormat::Regular)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDay {
    pub day: u32,
    pub shows: Vec<ScheduledShow>,
}

impl ScheduleDay {
    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_boundaries() {
        assert_eq!(week_for_day(1), 1);
        assert_eq!(week_for_day(7), 1);
        assert_eq!(week_for_day(8), 2);
        assert_eq!(week_for_day(41), 6);
        assert_eq!(week_for_day(42), 6);
        assert_eq!(week_for_day(49), 7);
    }

    #[test]
    fn test_date_for_day_counts_from_start() {
        let season = SeasonContext {
            season_id: "s1".into(),
            status: SeasonStatus::Active,
            mode: SeasonMode::OffSeason,
            schedule_start_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            data_set_id: "ds".into(),
            current_year: "2025".into(),
        };
        assert_eq!(season.date_for_day(1), NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(season.date_for_day(49), NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(season.live_year(), None);
    }

    #[test]
    fn test_show_format_db_values() {
        let finals = ShowFormat::Championship(RoundKind::WorldFinals);
        assert_eq!(ShowFormat::from_db(&finals.to_db()).unwrap(), finals);
        assert_eq!(ShowFormat::from_db("split_regional").unwrap(), ShowFormat::SplitRegional);
        assert!(ShowFormat::from_db("championship:bogus").is_err());
    }
}
