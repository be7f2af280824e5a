use log::warn;
use ndarray::Array1;

use super::cache::ScoreKey;
use super::jitter::JitterSource;
use super::round3;
use crate::config::settings::ScoringSettings;
use crate::domain::HistoryIndex;

/// `ln(score) = slope * day + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LogLinearFit {
    /// Ordinary least squares on (day, ln score). Scores must be positive.
    pub fn fit(points: &[(u32, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let days = Array1::from_iter(points.iter().map(|&(day, _)| f64::from(day)));
        let logs = Array1::from_iter(points.iter().map(|&(_, score)| score.ln()));

        let day_mean = days.mean()?;
        let log_mean = logs.mean()?;
        let day_dev = &days - day_mean;
        let log_dev = &logs - log_mean;

        let sxx = day_dev.dot(&day_dev);
        if sxx <= f64::EPSILON {
            return None;
        }

        let slope = day_dev.dot(&log_dev) / sxx;
        Some(Self {
            slope,
            intercept: log_mean - slope * day_mean,
        })
    }

    pub fn predict(&self, day: u32) -> f64 {
        (self.slope * f64::from(day) + self.intercept).exp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// Recorded score for the requested day.
    Exact(f64),
    /// Regression prediction with jitter, clamped and rounded.
    Predicted(f64),
    /// Only one usable observation; returned as is.
    SinglePoint(f64),
    Missing,
}

impl Estimate {
    pub fn value(&self) -> f64 {
        match self {
            Estimate::Exact(v) | Estimate::Predicted(v) | Estimate::SinglePoint(v) => *v,
            Estimate::Missing => 0.0,
        }
    }
}

/// Base caption score for one key: exact lookup first, then regression.
pub fn estimate(
    history: &HistoryIndex,
    key: &ScoreKey,
    jitter: &dyn JitterSource,
    settings: &ScoringSettings,
) -> Estimate {
    if let Some(score) = exact_score(history, key) {
        return Estimate::Exact(score);
    }

    let points = history.distinct_day_points(&key.source_year, &key.entity_name, key.caption);

    match points.as_slice() {
        [] => {
            if history.has_year(&key.source_year) {
                warn!(
                    "No {} observations for {} in {}; scoring 0",
                    key.caption, key.entity_name, key.source_year
                );
            }
            Estimate::Missing
        }
        [(_, score)] => Estimate::SinglePoint(*score),
        _ => match LogLinearFit::fit(&points) {
            Some(fit) => Estimate::Predicted(predict_with_jitter(&fit, key, jitter, settings)),
            None => Estimate::SinglePoint(points[0].1),
        },
    }
}

fn exact_score(history: &HistoryIndex, key: &ScoreKey) -> Option<f64> {
    history
        .records(&key.source_year, &key.entity_name, key.caption)
        .iter()
        .find(|o| o.day == Some(key.day) && o.score > 0.0)
        .map(|o| o.score)
}

fn predict_with_jitter(
    fit: &LogLinearFit,
    key: &ScoreKey,
    jitter: &dyn JitterSource,
    settings: &ScoringSettings,
) -> f64 {
    let noisy = fit.predict(key.day) + jitter.draw(key, settings.jitter_amplitude);
    round3(noisy.clamp(0.0, settings.caption_cap))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{Caption, EntityScores, HistoricalData, HistoricalEvent};
    use crate::scoring::jitter::{NoJitter, SeededJitter};

    fn history(points: &[(Option<u32>, f64)]) -> HistoryIndex {
        let events = points
            .iter()
            .map(|&(day, score)| HistoricalEvent {
                source_year: "2012".to_string(),
                event_name: "Tour Stop".to_string(),
                day_index: day,
                scores: vec![EntityScores {
                    entity_name: "Carolina Crown".to_string(),
                    caption_scores: BTreeMap::from([(Caption::GE1, score)]),
                }],
            })
            .collect();
        HistoryIndex::from_data(&HistoricalData::from([("2012".to_string(), events)]))
    }

    fn key(day: u32) -> ScoreKey {
        ScoreKey::new("Carolina Crown", "2012", Caption::GE1, day)
    }

    #[test]
    fn test_exact_observation_wins() {
        let index = history(&[(Some(10), 10.0), (Some(20), 12.0), (Some(25), 17.85)]);
        let result = estimate(&index, &key(25), &SeededJitter::new(3), &ScoringSettings::default());
        assert_eq!(result, Estimate::Exact(17.85));
    }

    #[test]
    fn test_first_duplicate_record_wins() {
        let index = history(&[(Some(25), 15.1), (Some(25), 15.9)]);
        let result = estimate(&index, &key(25), &NoJitter, &ScoringSettings::default());
        assert_eq!(result, Estimate::Exact(15.1));
    }

    #[test]
    fn test_single_point_is_not_extrapolated() {
        let index = history(&[(Some(10), 14.2)]);
        for day in [1, 11, 30, 49] {
            let result = estimate(&index, &key(day), &SeededJitter::new(9), &ScoringSettings::default());
            assert_eq!(result, Estimate::SinglePoint(14.2));
        }
    }

    #[test]
    fn test_log_linear_growth_prediction() {
        let fit = LogLinearFit::fit(&[(10, 10.0), (20, 12.0)]).unwrap();
        let m = (12.0_f64.ln() - 10.0_f64.ln()) / 10.0;
        let c = 10.0_f64.ln() - m * 10.0;

        assert!((fit.slope - m).abs() < 1e-12);
        assert!((fit.intercept - c).abs() < 1e-12);
        assert!((fit.predict(30) - 14.4).abs() < 1e-9);

        let index = history(&[(Some(10), 10.0), (Some(20), 12.0)]);
        let result = estimate(&index, &key(30), &NoJitter, &ScoringSettings::default());
        assert_eq!(result, Estimate::Predicted(14.4));
    }

    #[test]
    fn test_prediction_stays_within_jitter_band() {
        let index = history(&[(Some(10), 10.0), (Some(20), 12.0)]);
        for seed in 0..20 {
            let value = estimate(&index, &key(30), &SeededJitter::new(seed), &ScoringSettings::default()).value();
            assert!((14.15..=14.65).contains(&value), "seed {} gave {}", seed, value);
        }
    }

    #[test]
    fn test_prediction_is_clamped_to_caption_cap() {
        let index = history(&[(Some(1), 10.0), (Some(2), 19.0)]);
        let result = estimate(&index, &key(40), &NoJitter, &ScoringSettings::default());
        assert_eq!(result, Estimate::Predicted(20.0));
    }

    #[test]
    fn test_missing_entity_scores_zero() {
        let index = history(&[(Some(10), 10.0)]);
        let other = ScoreKey::new("Spirit of Atlanta", "2012", Caption::GE1, 10);
        assert_eq!(estimate(&index, &other, &NoJitter, &ScoringSettings::default()), Estimate::Missing);

        let missing_year = ScoreKey::new("Carolina Crown", "1975", Caption::GE1, 10);
        assert_eq!(estimate(&index, &missing_year, &NoJitter, &ScoringSettings::default()).value(), 0.0);
    }

    #[test]
    fn test_undated_and_zero_records_are_ignored() {
        let index = history(&[(None, 11.0), (Some(8), 0.0), (Some(15), 13.0)]);
        let result = estimate(&index, &key(30), &NoJitter, &ScoringSettings::default());
        assert_eq!(result, Estimate::SinglePoint(13.0));
    }
}
