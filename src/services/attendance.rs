use std::collections::HashSet;

use crate::bracket::{ChampionshipRoundConfig, RoundEligibility};
use crate::domain::season::SPLIT_REGIONAL_DAYS;
use crate::domain::{CorpsKey, CorpsRecord, Profile, ScheduleDay, ScheduledShow, ShowFormat, week_for_day};

/// A corps marching in one show today.
#[derive(Debug, Clone, Copy)]
pub struct Attendance<'a> {
    pub show_index: usize,
    pub participant_id: &'a str,
    pub corps: &'a CorpsRecord,
}

enum AttendanceRule<'c> {
    Registered,
    SplitHalf(HashSet<String>),
    Bracket(&'c RoundEligibility),
}

impl AttendanceRule<'_> {
    fn admits(&self, week: u32, show: &ScheduledShow, participant_id: &str, corps: &CorpsRecord) -> bool {
        match self {
            AttendanceRule::Registered => corps.selected(week, &show.event_name),
            AttendanceRule::SplitHalf(half) => {
                half.contains(participant_id) && corps.selected(week, &show.event_name)
            }
            AttendanceRule::Bracket(eligibility) => {
                eligibility.admits(&CorpsKey::new(participant_id, corps.corps_class))
            }
        }
    }
}

/// Every (show, corps) pairing for the day, in schedule then participant order.
pub fn determine_attendance<'a>(
    day: u32,
    schedule: &ScheduleDay,
    profiles: &'a [Profile],
    bracket: Option<&ChampionshipRoundConfig>,
) -> Vec<Attendance<'a>> {
    let week = week_for_day(day);
    let mut attendance = Vec::new();

    for (show_index, show) in schedule.shows.iter().enumerate() {
        let rule = rule_for_show(day, week, show, profiles, bracket);

        for profile in profiles {
            for corps in profile.active_corps() {
                if rule.admits(week, show, &profile.participant_id, corps) {
                    attendance.push(Attendance {
                        show_index,
                        participant_id: &profile.participant_id,
                        corps,
                    });
                }
            }
        }
    }

    attendance
}

fn rule_for_show<'c>(
    day: u32,
    week: u32,
    show: &ScheduledShow,
    profiles: &[Profile],
    bracket: Option<&'c ChampionshipRoundConfig>,
) -> AttendanceRule<'c> {
    match show.format {
        ShowFormat::Championship(kind) => match bracket.and_then(|config| config.get(kind)) {
            Some(eligibility) => AttendanceRule::Bracket(eligibility),
            None => AttendanceRule::Registered,
        },
        ShowFormat::SplitRegional if SPLIT_REGIONAL_DAYS.contains(&day) => {
            AttendanceRule::SplitHalf(split_half(day, week, &show.event_name, profiles))
        }
        _ => AttendanceRule::Registered,
    }
}

/// Participants enrolled in a split regional, sorted by id; the first day
/// takes the first half (the larger half when the count is odd).
pub fn split_half(day: u32, week: u32, event_name: &str, profiles: &[Profile]) -> HashSet<String> {
    let mut enrolled: Vec<&str> = profiles
        .iter()
        .filter(|p| p.active_corps().any(|c| c.selected(week, event_name)))
        .map(|p| p.participant_id.as_str())
        .collect();
    enrolled.sort_unstable();
    enrolled.dedup();

    let mid = enrolled.len().div_ceil(2);
    let half = if day == SPLIT_REGIONAL_DAYS[0] { &enrolled[..mid] } else { &enrolled[mid..] };
    half.iter().map(|id| id.to_string()).collect()
}
