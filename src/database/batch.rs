use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

use super::{awards, currency, leagues, profiles, recaps};
use crate::domain::{
    Award, CorpsClass, CurrencyEntry, DayRecap, Matchup, MatchupOutcome, ParticipantId,
};

/// One logical write. A batch applies a chunk of these in one transaction.
#[derive(Debug, Clone)]
pub enum Mutation {
    CorpsScore {
        season_id: String,
        participant_id: ParticipantId,
        corps_class: CorpsClass,
        total_score: Option<f64>,
        day: u32,
    },
    /// A corps scored in an earlier run of the day that no longer marched it.
    RestoreCorpsScore {
        season_id: String,
        participant_id: ParticipantId,
        corps_class: CorpsClass,
        day: u32,
    },
    Recap {
        season_id: String,
        recap: DayRecap,
    },
    ClearAwards {
        season_id: String,
        day: u32,
    },
    Award {
        season_id: String,
        award: Award,
    },
    Currency {
        season_id: String,
        participant_id: ParticipantId,
        day: u32,
        amount: i64,
        entries: Vec<CurrencyEntry>,
    },
    RevokeCurrency {
        season_id: String,
        participant_id: ParticipantId,
        day: u32,
    },
    MatchupResult {
        matchup: Matchup,
        outcome: MatchupOutcome,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub mutations: usize,
    pub batches: usize,
}

/// Applies mutations in order, `batch_size` per transaction. The first
/// failure aborts; batches already committed stay committed.
pub fn commit(conn: &mut Connection, mutations: &[Mutation], batch_size: usize) -> Result<CommitStats> {
    let batch_size = batch_size.max(1);
    let total_batches = mutations.len().div_ceil(batch_size);
    let mut stats = CommitStats::default();

    for (idx, chunk) in mutations.chunks(batch_size).enumerate() {
        let tx = conn.transaction().context("Failed to open write batch")?;
        for mutation in chunk {
            apply(&tx, mutation)?;
        }
        tx.commit()
            .with_context(|| format!("Failed to commit batch {}/{}", idx + 1, total_batches))?;

        stats.batches += 1;
        stats.mutations += chunk.len();
        debug!("  Committed batch {}/{} ({} writes)", idx + 1, total_batches, chunk.len());
    }

    if stats.batches > 0 {
        info!("  → Committed {} writes in {} batches", stats.mutations, stats.batches);
    }
    Ok(stats)
}

fn apply(conn: &Connection, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::CorpsScore { season_id, participant_id, corps_class, total_score, day } => {
            profiles::update_corps_score(conn, season_id, participant_id, *corps_class, *total_score, *day)
        }
        Mutation::RestoreCorpsScore { season_id, participant_id, corps_class, day } => {
            profiles::restore_corps_score(conn, season_id, participant_id, *corps_class, *day)
        }
        Mutation::Recap { season_id, recap } => recaps::put_recap(conn, season_id, recap),
        Mutation::ClearAwards { season_id, day } => awards::clear_day(conn, season_id, *day).map(|_| ()),
        Mutation::Award { season_id, award } => awards::insert_award(conn, season_id, award),
        Mutation::Currency { season_id, participant_id, day, amount, entries } => {
            currency::credit_day(conn, season_id, participant_id, *day, *amount, entries).map(|_| ())
        }
        Mutation::RevokeCurrency { season_id, participant_id, day } => {
            currency::revoke_day(conn, season_id, participant_id, *day).map(|_| ())
        }
        Mutation::MatchupResult { matchup, outcome } => apply_matchup(conn, matchup, outcome),
    }
}

/// Season records only move when this write is the one that decides the matchup.
fn apply_matchup(conn: &Connection, matchup: &Matchup, outcome: &MatchupOutcome) -> Result<()> {
    let (score_a, score_b) = match outcome {
        MatchupOutcome::Bye { .. } => (None, None),
        MatchupOutcome::Decided { score_a, score_b, .. } => (Some(*score_a), Some(*score_b)),
        MatchupOutcome::Tie { score, .. } => (Some(*score), Some(*score)),
    };

    let decided = leagues::record_result(
        conn,
        matchup.id,
        outcome.winner().map(String::as_str),
        score_a,
        score_b,
    )?;
    if !decided {
        debug!("Matchup {} was already decided", matchup.id);
        return Ok(());
    }

    for (participant_id, result) in outcome.record_updates() {
        leagues::increment_record(conn, &matchup.league_id, &participant_id, matchup.corps_class, result)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::init_schema;
    use crate::domain::{AwardKind, AwardTier, CorpsRecord, Lineup};

    const SEASON: &str = "s";

    fn store(ids: &[&str]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        for id in ids {
            profiles::upsert_profile(&conn, id, id, SEASON).unwrap();
            profiles::upsert_corps(&conn, id, &CorpsRecord::new(CorpsClass::WorldClass, *id, Lineup::new())).unwrap();
        }
        conn
    }

    fn score(participant_id: &str, total: f64) -> Mutation {
        Mutation::CorpsScore {
            season_id: SEASON.into(),
            participant_id: participant_id.into(),
            corps_class: CorpsClass::WorldClass,
            total_score: Some(total),
            day: 4,
        }
    }

    fn award(participant_id: &str) -> Mutation {
        Mutation::Award {
            season_id: SEASON.into(),
            award: Award {
                participant_id: participant_id.into(),
                corps_class: CorpsClass::WorldClass,
                kind: AwardKind::Medal,
                tier: AwardTier::Gold,
                rank: 1,
                event_name: "Opener".into(),
                day: 4,
                score: 80.0,
            },
        }
    }

    fn stored(conn: &Connection, participant_id: &str) -> (f64, Option<u32>) {
        let corps = profiles::get_corps(conn, participant_id, CorpsClass::WorldClass).unwrap().unwrap();
        (corps.total_season_score, corps.last_scored_day)
    }

    fn mutations() -> Vec<Mutation> {
        vec![
            score("p1", 71.0),
            score("p2", 72.0),
            score("p3", 73.0),
            award("p3"),
            score("p4", 74.0),
        ]
    }

    #[test]
    fn test_commit_applies_in_chunks() {
        let mut conn = store(&["p1", "p2", "p3", "p4"]);

        let stats = commit(&mut conn, &mutations(), 2).unwrap();

        assert_eq!(stats, CommitStats { mutations: 5, batches: 3 });
        assert_eq!(stored(&conn, "p4"), (74.0, Some(4)));
        assert_eq!(awards::list_for_participant(&conn, SEASON, "p3").unwrap().len(), 1);
    }

    #[test]
    fn test_failed_chunk_keeps_earlier_chunks_only() {
        let mut conn = store(&["p1", "p2", "p3", "p4"]);
        conn.execute("DROP TABLE awards", []).unwrap();

        assert!(commit(&mut conn, &mutations(), 2).is_err());

        assert_eq!(stored(&conn, "p1"), (71.0, Some(4)));
        assert_eq!(stored(&conn, "p2"), (72.0, Some(4)));
        assert_eq!(stored(&conn, "p3"), (0.0, None));
        assert_eq!(stored(&conn, "p4"), (0.0, None));
    }

    #[test]
    fn test_revoking_currency_twice_takes_it_back_once() {
        let mut conn = store(&["p1"]);
        let credit = Mutation::Currency {
            season_id: SEASON.into(),
            participant_id: "p1".into(),
            day: 4,
            amount: 100,
            entries: Vec::new(),
        };
        commit(&mut conn, &[credit], 10).unwrap();

        let revoke = Mutation::RevokeCurrency {
            season_id: SEASON.into(),
            participant_id: "p1".into(),
            day: 4,
        };
        commit(&mut conn, &[revoke.clone(), revoke], 10).unwrap();

        assert_eq!(profiles::get_currency(&conn, "p1").unwrap(), 0);
        assert!(currency::participants_for_day(&conn, SEASON, 4).unwrap().is_empty());
    }
}
