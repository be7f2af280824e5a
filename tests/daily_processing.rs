mod common;

use common::{SEASON, TestStore, show_total};
use corps_scoring::database::{awards, currency, profiles, recaps};
use corps_scoring::domain::{AwardKind, AwardTier, CorpsClass, SeasonStatus, ShowFormat};
use corps_scoring::errors::{RunOutcome, SkipReason};

fn regular_day(store: &TestStore) {
    store.season(SeasonStatus::Active);
    store.show(3, "Opener", ShowFormat::Regular);
    store.history("Blue Devils", 3, 18.0);
    store.history("Cavaliers", 3, 16.0);
    store.participant("p1", CorpsClass::WorldClass, "Blue Devils", &[(1, "Opener")]);
    store.participant("p2", CorpsClass::WorldClass, "Cavaliers", &[(1, "Opener")]);
    store.participant("p3", CorpsClass::WorldClass, "Cavaliers", &[(2, "Opener")]);
}

#[test]
fn test_regular_day_scores_registered_corps() {
    let store = TestStore::new();
    regular_day(&store);

    let outcome = store.processor().run(3).unwrap();
    let summary = outcome.completed().unwrap();

    assert_eq!(summary.corps_scored, 2);
    assert_eq!(summary.recap_results, 2);
    assert_eq!(summary.currency_awarded, 200);

    let recap = recaps::get_recap(&store.conn(), SEASON, 3).unwrap().unwrap();
    let results = &recap.shows[0].results;
    assert_eq!(results[0].participant_id, "p1");
    assert_eq!(results[0].total_score, show_total(18.0));
    assert_eq!(results[1].total_score, show_total(16.0));
    assert_eq!(recap.date, chrono::NaiveDate::from_ymd_opt(2025, 6, 16).unwrap());

    let unregistered = store.corps("p3", CorpsClass::WorldClass);
    assert_eq!(unregistered.last_scored_day, None);
}

#[test]
fn test_rerunning_a_day_is_idempotent() {
    let store = TestStore::new();
    regular_day(&store);
    let processor = store.processor();

    processor.run(3).unwrap();
    processor.run(3).unwrap();

    let conn = store.conn();
    assert_eq!(recaps::count_for_day(&conn, SEASON, 3).unwrap(), 1);
    assert_eq!(profiles::get_currency(&conn, "p1").unwrap(), 100);
    assert_eq!(currency::history_for_day(&conn, SEASON, "p1", 3).unwrap().unwrap().0, 100);

    let case = awards::list_for_participant(&conn, SEASON, "p1").unwrap();
    assert_eq!(case.len(), 1);
    assert_eq!((case[0].kind, case[0].tier), (AwardKind::Medal, AwardTier::Gold));

    let corps = store.corps("p1", CorpsClass::WorldClass);
    assert_eq!(corps.total_season_score, show_total(18.0));
    assert_eq!(corps.last_scored_day, Some(3));
}

#[test]
fn test_rerun_takes_back_writes_for_dropped_corps() {
    let store = TestStore::new();
    regular_day(&store);
    let conn = store.conn();

    let mut before = store.corps("p2", CorpsClass::WorldClass);
    before.total_season_score = 42.0;
    before.last_scored_day = Some(1);
    profiles::upsert_corps(&conn, "p2", &before).unwrap();

    let processor = store.processor();
    processor.run(3).unwrap();
    assert_eq!(profiles::get_currency(&conn, "p2").unwrap(), 100);
    assert_eq!(store.corps("p2", CorpsClass::WorldClass).last_scored_day, Some(3));

    let mut withdrawn = store.corps("p2", CorpsClass::WorldClass);
    withdrawn.selected_shows.clear();
    profiles::upsert_corps(&conn, "p2", &withdrawn).unwrap();

    let outcome = processor.run(3).unwrap();
    assert_eq!(outcome.completed().unwrap().corps_scored, 1);

    let recap = recaps::get_recap(&conn, SEASON, 3).unwrap().unwrap();
    let ids: Vec<_> = recap.results().map(|r| r.participant_id.clone()).collect();
    assert_eq!(ids, vec!["p1".to_string()]);

    assert_eq!(profiles::get_currency(&conn, "p2").unwrap(), 0);
    assert!(currency::history_for_day(&conn, SEASON, "p2", 3).unwrap().is_none());
    assert_eq!(profiles::get_currency(&conn, "p1").unwrap(), 100);

    let restored = store.corps("p2", CorpsClass::WorldClass);
    assert_eq!(restored.total_season_score, 42.0);
    assert_eq!(restored.last_scored_day, Some(1));

    let kept = store.corps("p1", CorpsClass::WorldClass);
    assert_eq!(kept.total_season_score, show_total(18.0));
    assert_eq!(kept.last_scored_day, Some(3));
}

#[test]
fn test_later_day_overwrites_season_score() {
    let store = TestStore::new();
    regular_day(&store);
    store.show(10, "Midseason", ShowFormat::Regular);
    store.history("Blue Devils", 10, 19.0);
    store.participant("p1", CorpsClass::WorldClass, "Blue Devils", &[(1, "Opener"), (2, "Midseason")]);
    let processor = store.processor();

    processor.run(3).unwrap();
    processor.run(10).unwrap();

    let corps = store.corps("p1", CorpsClass::WorldClass);
    assert_eq!(corps.total_season_score, show_total(19.0));
    assert_eq!(corps.last_scored_day, Some(10));
    assert_eq!(profiles::get_currency(&store.conn(), "p1").unwrap(), 200);
}

#[test]
fn test_preconditions_skip_without_error() {
    let store = TestStore::new();
    assert_eq!(store.processor().run(3).unwrap(), RunOutcome::Skipped(SkipReason::NoSeason));
    assert_eq!(store.processor().run(50).unwrap(), RunOutcome::Skipped(SkipReason::DayOutOfRange(50)));

    store.season(SeasonStatus::Active);
    assert_eq!(store.processor().run(4).unwrap(), RunOutcome::Skipped(SkipReason::NoShows(4)));

    store.season(SeasonStatus::Inactive);
    store.show(4, "Opener", ShowFormat::Regular);
    assert_eq!(
        store.processor().run(4).unwrap(),
        RunOutcome::Skipped(SkipReason::SeasonInactive(SEASON.to_string()))
    );
    assert_eq!(recaps::count_for_day(&store.conn(), SEASON, 4).unwrap(), 0);
}

#[test]
fn test_split_regional_scores_each_half_once() {
    let store = TestStore::new();
    store.season(SeasonStatus::Active);
    store.show(41, "Eastern Classic", ShowFormat::SplitRegional);
    store.show(42, "Eastern Classic", ShowFormat::SplitRegional);
    for id in ["c", "a", "b"] {
        store.participant(id, CorpsClass::OpenClass, "Crossmen", &[(6, "Eastern Classic")]);
    }
    let processor = store.processor();

    processor.run(41).unwrap();
    processor.run(42).unwrap();

    let conn = store.conn();
    let first = recaps::get_recap(&conn, SEASON, 41).unwrap().unwrap();
    let second = recaps::get_recap(&conn, SEASON, 42).unwrap().unwrap();
    let mut first_ids: Vec<_> = first.results().map(|r| r.participant_id.clone()).collect();
    first_ids.sort();
    let second_ids: Vec<_> = second.results().map(|r| r.participant_id.clone()).collect();

    assert_eq!(first_ids, vec!["a", "b"]);
    assert_eq!(second_ids, vec!["c"]);
}

#[test]
fn test_inactive_profiles_are_not_scored() {
    let store = TestStore::new();
    regular_day(&store);
    profiles::set_active(&store.conn(), "p2", false).unwrap();

    let outcome = store.processor().run(3).unwrap();

    assert_eq!(outcome.completed().unwrap().corps_scored, 1);
    assert_eq!(profiles::get_currency(&store.conn(), "p2").unwrap(), 0);
}
