use std::collections::HashMap;

use anyhow::Result;
use log::{debug, info};

use crate::config::settings::AppConfig;
use crate::database::{self, CommitStats, DbPool, Mutation};
use crate::database::{leagues, profiles, seasons};
use crate::domain::{CorpsKey, Matchup, MatchupOutcome, is_valid_day};
use crate::errors::{RunOutcome, SkipReason};

const TIE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchupSummary {
    pub week: u32,
    pub resolved: usize,
    pub byes: usize,
    pub ties: usize,
    pub skipped: usize,
    pub writes: CommitStats,
}

/// Settles head-to-head pairings from each side's latest class score. A week
/// boundary also picks up pairings from earlier weeks that were never decided.
pub struct WeeklyMatchupResolver {
    config: AppConfig,
    pool: DbPool,
}

impl WeeklyMatchupResolver {
    pub fn new(config: AppConfig, pool: DbPool) -> Self {
        Self { config, pool }
    }

    pub fn run(&self, day: u32) -> Result<RunOutcome<MatchupSummary>> {
        if !is_valid_day(day) {
            return Ok(RunOutcome::Skipped(SkipReason::DayOutOfRange(day)));
        }
        if day % 7 != 0 {
            return Ok(RunOutcome::Skipped(SkipReason::NotWeekBoundary(day)));
        }

        let week = day / 7;
        info!("=== Resolving Matchups (week {}) ===\n", week);

        let mut conn = database::get_connection(&self.pool)?;
        let Some(season) = seasons::get_current_season(&conn)? else {
            return Ok(RunOutcome::Skipped(SkipReason::NoSeason));
        };
        if !season.is_active() {
            return Ok(RunOutcome::Skipped(SkipReason::SeasonInactive(season.season_id)));
        }

        let matchups = leagues::list_matchups_through_week(&conn, &season.season_id, week)?;
        let scores = profiles::list_class_scores(&conn)?;

        let mut summary = MatchupSummary {
            week,
            ..MatchupSummary::default()
        };
        let mut mutations = Vec::new();

        for matchup in matchups {
            if matchup.is_resolved() {
                debug!("Matchup {} already decided, skipping", matchup.id);
                summary.skipped += 1;
                continue;
            }

            if matchup.week < week {
                info!("  → Matchup {} from week {} was left open, resolving now", matchup.id, matchup.week);
            }
            let outcome = resolve_matchup(&matchup, &scores);
            match &outcome {
                MatchupOutcome::Bye { .. } => summary.byes += 1,
                MatchupOutcome::Tie { .. } => summary.ties += 1,
                MatchupOutcome::Decided { .. } => {}
            }
            summary.resolved += 1;
            mutations.push(Mutation::MatchupResult { matchup, outcome });
        }

        summary.writes = database::commit(&mut conn, &mutations, self.config.persistence.batch_size)?;

        info!(
            "  → Resolved {} matchups ({} byes, {} ties), {} already decided",
            summary.resolved, summary.byes, summary.ties, summary.skipped
        );
        info!("=== Matchup Resolution Complete ===");
        Ok(RunOutcome::Completed(summary))
    }
}

/// Higher class score wins; equal scores tie. A side with no score counts as zero.
pub fn resolve_matchup(matchup: &Matchup, scores: &HashMap<CorpsKey, f64>) -> MatchupOutcome {
    let Some(participant_b) = &matchup.participant_b else {
        return MatchupOutcome::Bye {
            winner: matchup.participant_a.clone(),
        };
    };

    let score_of = |participant: &str| {
        scores
            .get(&CorpsKey::new(participant, matchup.corps_class))
            .copied()
            .unwrap_or(0.0)
    };
    let score_a = score_of(&matchup.participant_a);
    let score_b = score_of(participant_b);

    if (score_a - score_b).abs() < TIE_EPSILON {
        return MatchupOutcome::Tie {
            participant_a: matchup.participant_a.clone(),
            participant_b: participant_b.clone(),
            score: score_a,
        };
    }

    let (winner, loser) = if score_a > score_b {
        (matchup.participant_a.clone(), participant_b.clone())
    } else {
        (participant_b.clone(), matchup.participant_a.clone())
    };
    MatchupOutcome::Decided {
        winner,
        loser,
        score_a,
        score_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CorpsClass;

    fn matchup(b: Option<&str>) -> Matchup {
        Matchup {
            id: 1,
            league_id: "league".into(),
            week: 2,
            corps_class: CorpsClass::WorldClass,
            participant_a: "alice".into(),
            participant_b: b.map(String::from),
            winner: None,
            score_a: None,
            score_b: None,
            completed: false,
        }
    }

    #[test]
    fn test_bye_is_auto_won() {
        let outcome = resolve_matchup(&matchup(None), &HashMap::new());
        assert_eq!(outcome, MatchupOutcome::Bye { winner: "alice".into() });
    }

    #[test]
    fn test_uses_class_specific_score() {
        let scores = HashMap::from([
            (CorpsKey::new("alice", CorpsClass::WorldClass), 70.0),
            (CorpsKey::new("bob", CorpsClass::WorldClass), 75.0),
            (CorpsKey::new("alice", CorpsClass::OpenClass), 99.0),
        ]);
        let outcome = resolve_matchup(&matchup(Some("bob")), &scores);

        assert_eq!(outcome.winner().map(String::as_str), Some("bob"));
        assert!(matches!(outcome, MatchupOutcome::Decided { score_a, .. } if score_a == 70.0));
    }

    #[test]
    fn test_equal_scores_tie() {
        let scores = HashMap::from([
            (CorpsKey::new("alice", CorpsClass::WorldClass), 81.25),
            (CorpsKey::new("bob", CorpsClass::WorldClass), 81.25),
        ]);
        let outcome = resolve_matchup(&matchup(Some("bob")), &scores);

        assert!(matches!(outcome, MatchupOutcome::Tie { .. }));
        assert_eq!(outcome.winner(), None);
    }

    #[test]
    fn test_missing_score_counts_as_zero() {
        let scores = HashMap::from([(CorpsKey::new("bob", CorpsClass::WorldClass), 10.0)]);
        let outcome = resolve_matchup(&matchup(Some("bob")), &scores);
        assert_eq!(outcome.winner().map(String::as_str), Some("bob"));
    }
}
