use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;

use super::attendance::{Attendance, determine_attendance};
use super::awards::{ScoredShow, derive_awards};
use crate::bracket::{ChampionshipRoundConfig, build_round_config, is_championship_day};
use crate::config::settings::AppConfig;
use crate::database::{self, CommitStats, DbConn, DbPool, Mutation};
use crate::database::{currency, history, profiles, recaps, seasons};
use crate::domain::{
    Award, CorpsKey, CurrencyEntry, DayRecap, HistoryIndex, ParticipantId, ScheduleDay, SeasonContext, ShowRecap,
    ShowResult, is_valid_day,
};
use crate::errors::{RunOutcome, SkipReason};
use crate::scoring::{CorpsScore, CorpsScorer, JitterSource, ScoreCache, SynergyCalculator, TagSynergy, round3};

/// What a completed day run wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySummary {
    pub day: u32,
    pub shows_scored: usize,
    pub corps_scored: usize,
    pub recap_results: usize,
    pub currency_awarded: i64,
    pub awards_written: usize,
    pub writes: CommitStats,
}

/// Scores every show of one season-day and persists the outcome.
///
/// One instance may run many days; the score cache is cleared at the start
/// of each run.
pub struct DailyScoreProcessor {
    config: AppConfig,
    pool: DbPool,
    jitter: Box<dyn JitterSource>,
    synergy: Option<Box<dyn SynergyCalculator>>,
    cache: ScoreCache,
}

impl DailyScoreProcessor {
    pub fn new(config: AppConfig, pool: DbPool, jitter: Box<dyn JitterSource>) -> Self {
        Self {
            config,
            pool,
            jitter,
            synergy: None,
            cache: ScoreCache::new(),
        }
    }

    /// Replaces the tag-based synergy loaded from the store.
    pub fn with_synergy(mut self, synergy: Box<dyn SynergyCalculator>) -> Self {
        self.synergy = Some(synergy);
        self
    }

    pub fn run(&self, day: u32) -> Result<RunOutcome<DaySummary>> {
        info!("=== Starting Daily Scoring (day {}) ===\n", day);
        self.cache.clear();

        if !is_valid_day(day) {
            return Ok(skipped(SkipReason::DayOutOfRange(day)));
        }

        let mut conn = database::get_connection(&self.pool)?;

        let Some(season) = seasons::get_current_season(&conn)? else {
            return Ok(skipped(SkipReason::NoSeason));
        };
        if !season.is_active() {
            return Ok(skipped(SkipReason::SeasonInactive(season.season_id)));
        }

        let schedule = seasons::get_schedule_day(&conn, &season.season_id, day)?;
        if schedule.is_empty() {
            return Ok(skipped(SkipReason::NoShows(day)));
        }
        info!("  → {} shows scheduled for day {}", schedule.shows.len(), day);

        let participants = profiles::list_active_profiles(
            &conn,
            &season.season_id,
            self.config.persistence.profile_read_cap,
        )?;
        info!("  → Loaded {} active profiles", participants.len());

        let bracket = self.championship_config(&conn, &season, day)?;
        let attendance = determine_attendance(day, &schedule, &participants, bracket.as_ref());
        info!("  → {} corps performances to score", attendance.len());

        let index = self.load_history(&conn, &season, &attendance)?;
        let scores = self.score_attendance(&conn, &season, &index, &attendance, day)?;

        let shows = assemble_shows(&schedule, &attendance, &scores);
        let awards = derive_awards(day, &shows);
        let daily_totals = daily_totals(&attendance, &scores);
        let currency = self.participation_currency(&attendance, &schedule);

        let mut summary = DaySummary {
            day,
            shows_scored: shows.iter().filter(|s| !s.results.is_empty()).count(),
            corps_scored: daily_totals.len(),
            recap_results: shows.iter().map(|s| s.results.len()).sum(),
            currency_awarded: currency.values().map(|(amount, _)| amount).sum(),
            awards_written: awards.len(),
            writes: CommitStats::default(),
        };

        let prior = PriorDay::load(&conn, &season.season_id, day)?;
        if !prior.is_empty() {
            debug!(
                "  Day {} was written before for {} corps and {} payees",
                day,
                prior.corps.len(),
                prior.payees.len()
            );
        }

        let mutations = build_mutations(&season, day, &shows, daily_totals, awards, currency, prior);
        summary.writes = database::commit(&mut conn, &mutations, self.config.persistence.batch_size)?;

        info!(
            "  → Scored {} corps across {} shows, {} awards, {} coins",
            summary.corps_scored, summary.shows_scored, summary.awards_written, summary.currency_awarded
        );
        info!("=== Daily Scoring Complete ===");
        Ok(RunOutcome::Completed(summary))
    }

    fn championship_config(
        &self,
        conn: &DbConn,
        season: &SeasonContext,
        day: u32,
    ) -> Result<Option<ChampionshipRoundConfig>> {
        if !is_championship_day(day) {
            return Ok(None);
        }

        let season_recaps = recaps::get_recaps(conn, &season.season_id)?;
        let config = build_round_config(day, &season_recaps);
        for round in config.rounds() {
            info!(
                "  → {}: {:?} eligibility, field {}",
                round.kind,
                round.source,
                round.field_size().map_or_else(|| "open".to_string(), |n| n.to_string())
            );
        }
        Ok(Some(config))
    }

    /// One bulk read covering every source year a scored lineup references.
    fn load_history(
        &self,
        conn: &DbConn,
        season: &SeasonContext,
        attendance: &[Attendance<'_>],
    ) -> Result<HistoryIndex> {
        let mut years: BTreeSet<String> = attendance
            .iter()
            .flat_map(|a| a.corps.lineup.source_years())
            .collect();
        if let Some(live_year) = season.live_year() {
            years.insert(live_year.to_string());
        }

        let data = history::get_historical_data(conn, &years)?;
        debug!("  Loaded history for {} of {} source years", data.len(), years.len());
        Ok(HistoryIndex::from_data(&data))
    }

    fn score_attendance(
        &self,
        conn: &DbConn,
        season: &SeasonContext,
        index: &HistoryIndex,
        attendance: &[Attendance<'_>],
        day: u32,
    ) -> Result<Vec<CorpsScore>> {
        let tag_synergy;
        let synergy: &dyn SynergyCalculator = match &self.synergy {
            Some(synergy) => synergy.as_ref(),
            None => {
                tag_synergy = TagSynergy::new(history::list_entity_tags(conn)?);
                &tag_synergy
            }
        };

        let scorer = CorpsScorer::new(index, &self.cache, &self.config.scoring, self.jitter.as_ref(), synergy)
            .with_live_year(season.live_year());

        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.scoring.worker_threads.max(1))
            .build()
            .context("Failed to build scoring worker pool")?;

        let scores = workers.install(|| {
            attendance
                .par_iter()
                .map(|a| scorer.score_corps(a.corps, day))
                .collect::<Vec<_>>()
        });
        debug!("  Score cache holds {} entries", self.cache.len());
        Ok(scores)
    }

    /// Coins per participant, summed across every show they marched today.
    fn participation_currency(
        &self,
        attendance: &[Attendance<'_>],
        schedule: &ScheduleDay,
    ) -> BTreeMap<ParticipantId, (i64, Vec<CurrencyEntry>)> {
        let mut currency: BTreeMap<ParticipantId, (i64, Vec<CurrencyEntry>)> = BTreeMap::new();

        for a in attendance {
            let amount = self.config.currency.participation(a.corps.corps_class);
            let entry = currency.entry(a.participant_id.to_string()).or_default();
            entry.0 += amount;
            entry.1.push(CurrencyEntry {
                event_name: schedule.shows[a.show_index].event_name.clone(),
                corps_class: a.corps.corps_class,
                amount,
            });
        }

        currency
    }
}

/// What an earlier run of the same day wrote, so a re-run can take back
/// writes for corps and participants that no longer march.
#[derive(Debug, Default)]
struct PriorDay {
    corps: Vec<CorpsKey>,
    payees: Vec<ParticipantId>,
}

impl PriorDay {
    fn load(conn: &DbConn, season_id: &str, day: u32) -> Result<Self> {
        Ok(Self {
            corps: profiles::corps_scored_on_day(conn, season_id, day)?,
            payees: currency::participants_for_day(conn, season_id, day)?,
        })
    }

    fn is_empty(&self) -> bool {
        self.corps.is_empty() && self.payees.is_empty()
    }
}

fn skipped(reason: SkipReason) -> RunOutcome<DaySummary> {
    info!("  → Nothing to score: {}", reason);
    RunOutcome::Skipped(reason)
}

/// Results per show, best first.
fn assemble_shows(schedule: &ScheduleDay, attendance: &[Attendance<'_>], scores: &[CorpsScore]) -> Vec<ScoredShow> {
    let mut shows: Vec<ScoredShow> = schedule
        .shows
        .iter()
        .map(|show| ScoredShow {
            show: show.clone(),
            results: Vec::new(),
        })
        .collect();

    for (a, score) in attendance.iter().zip(scores) {
        shows[a.show_index].results.push(ShowResult {
            participant_id: a.participant_id.to_string(),
            corps_class: a.corps.corps_class,
            corps_name: a.corps.corps_name.clone(),
            total_score: score.show.total_score,
            ge_score: score.show.ge_score,
            visual_score: score.show.visual_score,
            music_score: score.show.music_score,
        });
    }

    for show in &mut shows {
        show.results.sort_by(|a, b| {
            b.total_score
                .total_cmp(&a.total_score)
                .then_with(|| a.participant_id.cmp(&b.participant_id))
        });
    }
    shows
}

/// A corps marching more than one show in a day gets the sum.
fn daily_totals(attendance: &[Attendance<'_>], scores: &[CorpsScore]) -> BTreeMap<CorpsKey, f64> {
    let mut totals = BTreeMap::new();
    for (a, score) in attendance.iter().zip(scores) {
        *totals
            .entry(CorpsKey::new(a.participant_id, a.corps.corps_class))
            .or_insert(0.0) += score.show.total_score;
    }
    totals
}

/// Writes in commit order: corps scores, recap, awards, currency. Corps and
/// payees from an earlier run of the day that are missing now get their
/// writes taken back.
fn build_mutations(
    season: &SeasonContext,
    day: u32,
    shows: &[ScoredShow],
    daily_totals: BTreeMap<CorpsKey, f64>,
    awards: Vec<Award>,
    currency: BTreeMap<ParticipantId, (i64, Vec<CurrencyEntry>)>,
    prior: PriorDay,
) -> Vec<Mutation> {
    let season_id = &season.season_id;
    let mut mutations =
        Vec::with_capacity(daily_totals.len() + awards.len() + currency.len() + prior.corps.len() + prior.payees.len() + 2);

    mutations.extend(
        prior
            .corps
            .into_iter()
            .filter(|key| !daily_totals.contains_key(key))
            .map(|key| Mutation::RestoreCorpsScore {
                season_id: season_id.clone(),
                participant_id: key.participant_id,
                corps_class: key.corps_class,
                day,
            }),
    );
    mutations.extend(
        prior
            .payees
            .into_iter()
            .filter(|participant_id| !currency.contains_key(participant_id))
            .map(|participant_id| Mutation::RevokeCurrency {
                season_id: season_id.clone(),
                participant_id,
                day,
            }),
    );

    mutations.extend(daily_totals.into_iter().map(|(key, total)| Mutation::CorpsScore {
        season_id: season_id.clone(),
        participant_id: key.participant_id,
        corps_class: key.corps_class,
        total_score: (total > 0.0).then_some(round3(total)),
        day,
    }));

    mutations.push(Mutation::Recap {
        season_id: season_id.clone(),
        recap: DayRecap {
            day,
            date: season.date_for_day(day),
            shows: shows
                .iter()
                .map(|s| ShowRecap {
                    event_name: s.show.event_name.clone(),
                    location: s.show.location.clone(),
                    results: s.results.clone(),
                })
                .collect(),
        },
    });

    mutations.push(Mutation::ClearAwards {
        season_id: season_id.clone(),
        day,
    });
    mutations.extend(awards.into_iter().map(|award| Mutation::Award {
        season_id: season_id.clone(),
        award,
    }));

    mutations.extend(currency.into_iter().map(|(participant_id, (amount, entries))| Mutation::Currency {
        season_id: season_id.clone(),
        participant_id,
        day,
        amount,
        entries,
    }));

    mutations
}
