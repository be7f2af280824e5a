use std::collections::{BTreeMap, HashSet};

use log::{info, warn};

use super::rounds::{Advancement, Cutoff, RoundKind};
use super::standings::{Standing, season_standings, tie_inclusive_cutoff};
use crate::domain::{CorpsClass, CorpsKey, SeasonRecaps};

/// Where a round's field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilitySource {
    Open,
    PriorRound,
    SeasonStandings,
    AutoEnroll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundEligibility {
    pub kind: RoundKind,
    pub class_filter: &'static [CorpsClass],
    /// `None` admits every corps in `class_filter` with a lineup.
    pub participants: Option<HashSet<CorpsKey>>,
    pub source: EligibilitySource,
}

impl RoundEligibility {
    fn everyone(kind: RoundKind, source: EligibilitySource) -> Self {
        Self {
            kind,
            class_filter: kind.class_filter(),
            participants: None,
            source,
        }
    }

    fn advancing(kind: RoundKind, advancers: Vec<Standing>, source: EligibilitySource) -> Self {
        Self {
            kind,
            class_filter: kind.class_filter(),
            participants: Some(advancers.into_iter().map(|s| s.key).collect()),
            source,
        }
    }

    pub fn admits(&self, key: &CorpsKey) -> bool {
        self.class_filter.contains(&key.corps_class)
            && self.participants.as_ref().is_none_or(|field| field.contains(key))
    }

    pub fn field_size(&self) -> Option<usize> {
        self.participants.as_ref().map(HashSet::len)
    }
}

/// Eligibility for each championship round scored on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionshipRoundConfig {
    pub day: u32,
    rounds: BTreeMap<RoundKind, RoundEligibility>,
}

impl ChampionshipRoundConfig {
    pub fn get(&self, kind: RoundKind) -> Option<&RoundEligibility> {
        self.rounds.get(&kind)
    }

    pub fn rounds(&self) -> impl Iterator<Item = &RoundEligibility> {
        self.rounds.values()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Pure function of the season's earlier recaps.
pub fn build_round_config(day: u32, recaps: &SeasonRecaps) -> ChampionshipRoundConfig {
    let rounds = RoundKind::for_day(day)
        .into_iter()
        .map(|kind| {
            let eligibility = eligibility_for(kind, recaps);
            log_eligibility(&eligibility);
            (kind, eligibility)
        })
        .collect();

    ChampionshipRoundConfig { day, rounds }
}

fn eligibility_for(kind: RoundKind, recaps: &SeasonRecaps) -> RoundEligibility {
    let Advancement::FromRound { source_day, cutoff, standings_fallback } = kind.advancement() else {
        return RoundEligibility::everyone(kind, EligibilitySource::Open);
    };

    let classes = kind.class_filter();

    let prior: Vec<Standing> = recaps
        .non_empty(source_day)
        .map(|recap| {
            recap
                .results()
                .filter(|r| classes.contains(&r.corps_class))
                .map(Standing::from_result)
                .collect()
        })
        .unwrap_or_default();

    if !prior.is_empty() {
        let advancers = apply_cutoff(prior, cutoff);
        return RoundEligibility::advancing(kind, advancers, EligibilitySource::PriorRound);
    }

    warn!("No results for day {}; {} falls back", source_day, kind);

    if standings_fallback {
        let standings = season_standings(recaps, classes);
        if !standings.is_empty() {
            let advancers = apply_cutoff(standings, cutoff);
            return RoundEligibility::advancing(kind, advancers, EligibilitySource::SeasonStandings);
        }
    }

    RoundEligibility::everyone(kind, EligibilitySource::AutoEnroll)
}

fn apply_cutoff(standings: Vec<Standing>, cutoff: Cutoff) -> Vec<Standing> {
    match cutoff {
        Cutoff::Overall(n) => tie_inclusive_cutoff(standings, n),
        Cutoff::PerClass(limits) => limits
            .iter()
            .flat_map(|&(class, n)| {
                let in_class = standings
                    .iter()
                    .filter(|s| s.key.corps_class == class)
                    .cloned()
                    .collect();
                tie_inclusive_cutoff(in_class, n)
            })
            .collect(),
    }
}

fn log_eligibility(eligibility: &RoundEligibility) {
    match eligibility.field_size() {
        Some(size) => info!(
            "  → {}: {} corps advance ({:?})",
            eligibility.kind, size, eligibility.source
        ),
        None => info!(
            "  → {}: open to all {:?} corps ({:?})",
            eligibility.kind, eligibility.class_filter, eligibility.source
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{DayRecap, ShowRecap, ShowResult};

    fn result(id: &str, class: CorpsClass, score: f64) -> ShowResult {
        ShowResult {
            participant_id: id.to_string(),
            corps_class: class,
            corps_name: format!("{} Corps", id),
            total_score: score,
            ge_score: 0.0,
            visual_score: 0.0,
            music_score: 0.0,
        }
    }

    fn recap(day: u32, results: Vec<ShowResult>) -> DayRecap {
        DayRecap {
            day,
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            shows: vec![ShowRecap {
                event_name: format!("Day {}", day),
                location: "Indianapolis, IN".into(),
                results,
            }],
        }
    }

    fn world(id: usize, score: f64) -> ShowResult {
        result(&format!("w{:02}", id), CorpsClass::WorldClass, score)
    }

    #[test]
    fn test_open_rounds_admit_class_filter() {
        let config = build_round_config(47, &SeasonRecaps::new());
        let prelims = config.get(RoundKind::WorldPrelims).unwrap();

        assert_eq!(prelims.source, EligibilitySource::Open);
        assert!(prelims.admits(&CorpsKey::new("x", CorpsClass::AClass)));
        assert!(!prelims.admits(&CorpsKey::new("x", CorpsClass::SoundSport)));
    }

    #[test]
    fn test_semifinals_include_tie_at_cutoff() {
        let mut results: Vec<ShowResult> = (1..=24).map(|i| world(i, 100.0 - i as f64)).collect();
        results.push(world(25, 70.0));
        results.push(world(26, 70.0));
        results.push(world(27, 60.0));
        let recaps: SeasonRecaps = vec![recap(47, results)].into_iter().collect();

        let config = build_round_config(48, &recaps);
        let semis = config.get(RoundKind::WorldSemifinals).unwrap();

        assert_eq!(semis.source, EligibilitySource::PriorRound);
        assert_eq!(semis.field_size(), Some(26));
        assert!(semis.admits(&CorpsKey::new("w26", CorpsClass::WorldClass)));
        assert!(!semis.admits(&CorpsKey::new("w27", CorpsClass::WorldClass)));
    }

    #[test]
    fn test_empty_prior_round_uses_standings() {
        let recaps: SeasonRecaps = vec![
            recap(20, vec![world(1, 80.0), world(2, 70.0)]),
            recap(47, vec![]),
        ]
        .into_iter()
        .collect();

        let semis = build_round_config(48, &recaps);
        let semis = semis.get(RoundKind::WorldSemifinals).unwrap();
        assert_eq!(semis.source, EligibilitySource::SeasonStandings);
        assert_eq!(semis.field_size(), Some(2));
    }

    #[test]
    fn test_missing_everything_auto_enrolls() {
        let config = build_round_config(49, &SeasonRecaps::new());
        let finals = config.get(RoundKind::WorldFinals).unwrap();
        let festival = config.get(RoundKind::SoundSportFestival).unwrap();

        assert_eq!(finals.source, EligibilitySource::AutoEnroll);
        assert!(finals.admits(&CorpsKey::new("anyone", CorpsClass::OpenClass)));
        assert_eq!(festival.source, EligibilitySource::Open);
        assert!(festival.admits(&CorpsKey::new("anyone", CorpsClass::SoundSport)));
    }

    #[test]
    fn test_open_a_finals_cut_per_class() {
        let mut results: Vec<ShowResult> = (0..10)
            .map(|i| result(&format!("o{}", i), CorpsClass::OpenClass, 80.0 - i as f64))
            .collect();
        results.extend((0..6).map(|i| result(&format!("a{}", i), CorpsClass::AClass, 70.0 - i as f64)));
        let recaps: SeasonRecaps = vec![recap(45, results)].into_iter().collect();

        let config = build_round_config(46, &recaps);
        let finals = config.get(RoundKind::OpenAFinals).unwrap();

        assert_eq!(finals.field_size(), Some(12));
        assert!(finals.admits(&CorpsKey::new("o7", CorpsClass::OpenClass)));
        assert!(!finals.admits(&CorpsKey::new("o8", CorpsClass::OpenClass)));
        assert!(finals.admits(&CorpsKey::new("a3", CorpsClass::AClass)));
        assert!(!finals.admits(&CorpsKey::new("a4", CorpsClass::AClass)));
    }

    #[test]
    fn test_open_a_finals_skip_standings() {
        let recaps: SeasonRecaps = vec![recap(20, vec![result("o1", CorpsClass::OpenClass, 60.0)])]
            .into_iter()
            .collect();
        let config = build_round_config(46, &recaps);
        assert_eq!(config.get(RoundKind::OpenAFinals).unwrap().source, EligibilitySource::AutoEnroll);
    }
}
