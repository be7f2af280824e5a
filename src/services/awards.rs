use crate::bracket::RoundKind;
use crate::domain::{Award, AwardKind, AwardTier, CorpsClass, ScheduledShow, ShowFormat, ShowResult};

const FINALIST_PLACES: u32 = 12;
const SOUNDSPORT_GOLD: f64 = 90.0;
const SOUNDSPORT_SILVER: f64 = 75.0;

/// A scheduled show with its results, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredShow {
    pub show: ScheduledShow,
    pub results: Vec<ShowResult>,
}

/// The full award set for a day. Same shows in, same awards out.
pub fn derive_awards(day: u32, shows: &[ScoredShow]) -> Vec<Award> {
    shows.iter().flat_map(|show| awards_for_show(day, show)).collect()
}

fn awards_for_show(day: u32, scored: &ScoredShow) -> Vec<Award> {
    let scoring: Vec<&ShowResult> = scored.results.iter().filter(|r| r.total_score > 0.0).collect();
    let event_name = &scored.show.event_name;

    match scored.show.format {
        ShowFormat::Regular | ShowFormat::SplitRegional => per_class(&scoring)
            .into_iter()
            .flat_map(|placed| podium(day, event_name, &placed, AwardKind::Medal))
            .collect(),
        ShowFormat::Championship(RoundKind::OpenAFinals) => per_class(&scoring)
            .into_iter()
            .flat_map(|placed| podium(day, event_name, &placed, AwardKind::Trophy))
            .collect(),
        ShowFormat::Championship(RoundKind::WorldFinals) => {
            let placed = placings(scoring);
            let mut awards = podium(day, event_name, &placed, AwardKind::Trophy);
            awards.extend(
                placed
                    .iter()
                    .filter(|(place, _)| (4..=FINALIST_PLACES).contains(place))
                    .map(|(place, r)| award(day, event_name, r, AwardKind::Ribbon, AwardTier::Finalist, *place)),
            );
            awards
        }
        ShowFormat::Championship(RoundKind::SoundSportFestival) => {
            let in_class = scoring.into_iter().filter(|r| r.corps_class == CorpsClass::SoundSport).collect();
            placings(in_class)
                .into_iter()
                .map(|(place, r)| award(day, event_name, r, AwardKind::Ribbon, soundsport_rating(r.total_score), place))
                .collect()
        }
        ShowFormat::Championship(_) => Vec::new(),
    }
}

fn per_class<'r>(results: &[&'r ShowResult]) -> Vec<Vec<(u32, &'r ShowResult)>> {
    CorpsClass::ALL
        .iter()
        .map(|class| placings(results.iter().copied().filter(|r| r.corps_class == *class).collect()))
        .filter(|placed| !placed.is_empty())
        .collect()
}

/// Competition ranking: equal scores share a place.
fn placings(mut results: Vec<&ShowResult>) -> Vec<(u32, &ShowResult)> {
    results.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });

    let mut placed = Vec::with_capacity(results.len());
    let mut place = 0;
    let mut previous: Option<f64> = None;
    for (idx, result) in results.into_iter().enumerate() {
        if previous != Some(result.total_score) {
            place = idx as u32 + 1;
            previous = Some(result.total_score);
        }
        placed.push((place, result));
    }
    placed
}

fn podium(day: u32, event_name: &str, placed: &[(u32, &ShowResult)], kind: AwardKind) -> Vec<Award> {
    placed
        .iter()
        .filter_map(|(place, r)| AwardTier::for_place(*place).map(|tier| award(day, event_name, r, kind, tier, *place)))
        .collect()
}

fn soundsport_rating(score: f64) -> AwardTier {
    if score >= SOUNDSPORT_GOLD {
        AwardTier::Gold
    } else if score >= SOUNDSPORT_SILVER {
        AwardTier::Silver
    } else {
        AwardTier::Bronze
    }
}

fn award(day: u32, event_name: &str, result: &ShowResult, kind: AwardKind, tier: AwardTier, rank: u32) -> Award {
    Award {
        participant_id: result.participant_id.clone(),
        corps_class: result.corps_class,
        kind,
        tier,
        rank,
        event_name: event_name.to_string(),
        day,
        score: result.total_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, class: CorpsClass, score: f64) -> ShowResult {
        ShowResult {
            participant_id: id.to_string(),
            corps_class: class,
            corps_name: id.to_uppercase(),
            total_score: score,
            ge_score: 0.0,
            visual_score: 0.0,
            music_score: 0.0,
        }
    }

    fn show(format: ShowFormat, results: Vec<ShowResult>) -> ScoredShow {
        ScoredShow {
            show: ScheduledShow::new("Test Show", "Test City", format),
            results,
        }
    }

    #[test]
    fn test_regular_show_medals_per_class() {
        let scored = show(
            ShowFormat::Regular,
            vec![
                result("w1", CorpsClass::WorldClass, 88.0),
                result("w2", CorpsClass::WorldClass, 86.0),
                result("w3", CorpsClass::WorldClass, 84.0),
                result("w4", CorpsClass::WorldClass, 82.0),
                result("o1", CorpsClass::OpenClass, 70.0),
            ],
        );
        let awards = derive_awards(12, &[scored]);

        assert_eq!(awards.len(), 4);
        assert!(awards.iter().all(|a| a.kind == AwardKind::Medal));
        let open = awards.iter().find(|a| a.participant_id == "o1").unwrap();
        assert_eq!((open.rank, open.tier), (1, AwardTier::Gold));
    }

    #[test]
    fn test_shared_place_shares_tier() {
        let scored = show(
            ShowFormat::Regular,
            vec![
                result("a", CorpsClass::AClass, 60.0),
                result("b", CorpsClass::AClass, 60.0),
                result("c", CorpsClass::AClass, 55.0),
            ],
        );
        let awards = derive_awards(3, &[scored]);
        let tiers: Vec<(String, AwardTier)> = awards.iter().map(|a| (a.participant_id.clone(), a.tier)).collect();

        assert_eq!(tiers, vec![
            ("a".to_string(), AwardTier::Gold),
            ("b".to_string(), AwardTier::Gold),
            ("c".to_string(), AwardTier::Bronze),
        ]);
    }

    #[test]
    fn test_world_finals_trophies_and_finalist_ribbons() {
        let results = (0..14).map(|i| result(&format!("f{:02}", i), CorpsClass::WorldClass, 99.0 - i as f64)).collect();
        let awards = derive_awards(49, &[show(ShowFormat::Championship(RoundKind::WorldFinals), results)]);

        assert_eq!(awards.iter().filter(|a| a.kind == AwardKind::Trophy).count(), 3);
        assert_eq!(awards.iter().filter(|a| a.kind == AwardKind::Ribbon).count(), 9);
    }

    #[test]
    fn test_soundsport_ratings() {
        let results = vec![
            result("s1", CorpsClass::SoundSport, 92.0),
            result("s2", CorpsClass::SoundSport, 80.0),
            result("s3", CorpsClass::SoundSport, 40.0),
        ];
        let awards = derive_awards(49, &[show(ShowFormat::Championship(RoundKind::SoundSportFestival), results)]);
        let tiers: Vec<AwardTier> = awards.iter().map(|a| a.tier).collect();
        assert_eq!(tiers, vec![AwardTier::Gold, AwardTier::Silver, AwardTier::Bronze]);
    }

    #[test]
    fn test_prelims_award_nothing() {
        let results = vec![result("w", CorpsClass::WorldClass, 90.0)];
        assert!(derive_awards(47, &[show(ShowFormat::Championship(RoundKind::WorldPrelims), results)]).is_empty());
    }
}
