use serde::{Deserialize, Serialize};

use super::corps::{CorpsClass, ParticipantId};

/// A weekly head-to-head pairing. `participant_b = None` is a bye.
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub id: i64,
    pub league_id: String,
    pub week: u32,
    pub corps_class: CorpsClass,
    pub participant_a: ParticipantId,
    pub participant_b: Option<ParticipantId>,
    pub winner: Option<ParticipantId>,
    pub score_a: Option<f64>,
    pub score_b: Option<f64>,
    pub completed: bool,
}

impl Matchup {
    /// Decided matchups are never revisited.
    pub fn is_resolved(&self) -> bool {
        self.completed || self.winner.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordResult {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeasonRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchupOutcome {
    Bye {
        winner: ParticipantId,
    },
    Decided {
        winner: ParticipantId,
        loser: ParticipantId,
        score_a: f64,
        score_b: f64,
    },
    Tie {
        participant_a: ParticipantId,
        participant_b: ParticipantId,
        score: f64,
    },
}

impl MatchupOutcome {
    pub fn winner(&self) -> Option<&ParticipantId> {
        match self {
            MatchupOutcome::Bye { winner } | MatchupOutcome::Decided { winner, .. } => Some(winner),
            MatchupOutcome::Tie { .. } => None,
        }
    }

    /// (participant, result) pairs to add to season records.
    pub fn record_updates(&self) -> Vec<(ParticipantId, RecordResult)> {
        match self {
            MatchupOutcome::Bye { winner } => vec![(winner.clone(), RecordResult::Win)],
            MatchupOutcome::Decided { winner, loser, .. } => vec![
                (winner.clone(), RecordResult::Win),
                (loser.clone(), RecordResult::Loss),
            ],
            MatchupOutcome::Tie { participant_a, participant_b, .. } => vec![
                (participant_a.clone(), RecordResult::Tie),
                (participant_b.clone(), RecordResult::Tie),
            ],
        }
    }
}
