use std::cmp::Ordering;
use std::collections::HashMap;

use super::is_championship_day;
use crate::domain::{CorpsClass, CorpsKey, SeasonRecaps, ShowResult};

const SCORE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub key: CorpsKey,
    pub score: f64,
}

impl Standing {
    pub fn from_result(result: &ShowResult) -> Self {
        Self {
            key: result.key(),
            score: result.total_score,
        }
    }
}

fn by_score_desc(a: &Standing, b: &Standing) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.key.cmp(&b.key))
}

/// Top `n` by score, plus everyone tied with the `n`th place.
pub fn tie_inclusive_cutoff(mut standings: Vec<Standing>, n: usize) -> Vec<Standing> {
    if n == 0 {
        return Vec::new();
    }

    standings.sort_by(by_score_desc);
    if standings.len() <= n {
        return standings;
    }

    let threshold = standings[n - 1].score;
    standings.retain(|s| s.score >= threshold - SCORE_EPSILON);
    standings
}

/// Best single-day score per corps over non-championship days.
pub fn season_standings(recaps: &SeasonRecaps, classes: &[CorpsClass]) -> Vec<Standing> {
    let mut best: HashMap<CorpsKey, f64> = HashMap::new();

    let results = recaps
        .iter()
        .filter(|recap| !is_championship_day(recap.day))
        .flat_map(|recap| recap.results())
        .filter(|result| classes.contains(&result.corps_class));

    for result in results {
        let entry = best.entry(result.key()).or_insert(result.total_score);
        *entry = entry.max(result.total_score);
    }

    let mut standings: Vec<Standing> = best
        .into_iter()
        .map(|(key, score)| Standing { key, score })
        .collect();
    standings.sort_by(by_score_desc);
    standings
}
