use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use super::corps::{CorpsClass, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    Trophy,
    Ribbon,
    Medal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardTier {
    Gold,
    Silver,
    Bronze,
    Finalist,
}

impl AwardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwardKind::Trophy => "trophy",
            AwardKind::Ribbon => "ribbon",
            AwardKind::Medal => "medal",
        }
    }
}

impl FromStr for AwardKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trophy" => Ok(AwardKind::Trophy),
            "ribbon" => Ok(AwardKind::Ribbon),
            "medal" => Ok(AwardKind::Medal),
            other => Err(anyhow!("Unknown award kind: {}", other)),
        }
    }
}

impl AwardTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwardTier::Gold => "gold",
            AwardTier::Silver => "silver",
            AwardTier::Bronze => "bronze",
            AwardTier::Finalist => "finalist",
        }
    }

    /// Podium tier for places 1-3.
    pub fn for_place(place: u32) -> Option<Self> {
        match place {
            1 => Some(AwardTier::Gold),
            2 => Some(AwardTier::Silver),
            3 => Some(AwardTier::Bronze),
            _ => None,
        }
    }
}

impl FromStr for AwardTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gold" => Ok(AwardTier::Gold),
            "silver" => Ok(AwardTier::Silver),
            "bronze" => Ok(AwardTier::Bronze),
            "finalist" => Ok(AwardTier::Finalist),
            other => Err(anyhow!("Unknown award tier: {}", other)),
        }
    }
}

/// An entry in a participant's trophy case.
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub participant_id: ParticipantId,
    pub corps_class: CorpsClass,
    pub kind: AwardKind,
    pub tier: AwardTier,
    pub rank: u32,
    pub event_name: String,
    pub day: u32,
    pub score: f64,
}
