use std::collections::BTreeMap;

use super::round3;
use crate::domain::{Caption, CaptionGroup};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShowScore {
    pub ge_score: f64,
    pub visual_score: f64,
    pub music_score: f64,
    pub total_score: f64,
}

pub fn cap_caption(raw: f64, cap: f64) -> f64 {
    raw.clamp(0.0, cap)
}

/// GE is summed; Visual and Music are summed then halved. Total is capped.
pub fn aggregate_captions(captions: &BTreeMap<Caption, f64>, show_cap: f64) -> ShowScore {
    let group_sum = |group: CaptionGroup| -> f64 {
        captions
            .iter()
            .filter(|(caption, _)| caption.group() == group)
            .map(|(_, score)| *score)
            .sum()
    };

    let ge_score = group_sum(CaptionGroup::GeneralEffect);
    let visual_score = group_sum(CaptionGroup::Visual) / 2.0;
    let music_score = group_sum(CaptionGroup::Music) / 2.0;
    let total_score = (ge_score + visual_score + music_score).min(show_cap);

    ShowScore {
        ge_score: round3(ge_score),
        visual_score: round3(visual_score),
        music_score: round3(music_score),
        total_score: round3(total_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_weights() {
        let captions = BTreeMap::from([
            (Caption::GE1, 18.0),
            (Caption::GE2, 17.0),
            (Caption::VP, 16.0),
            (Caption::VA, 15.0),
            (Caption::CG, 14.0),
            (Caption::B, 19.0),
            (Caption::MA, 18.0),
            (Caption::P, 17.0),
        ]);
        let score = aggregate_captions(&captions, 100.0);

        assert_eq!(score.ge_score, 35.0);
        assert_eq!(score.visual_score, 22.5);
        assert_eq!(score.music_score, 27.0);
        assert_eq!(score.total_score, 84.5);
    }

    #[test]
    fn test_perfect_lineup_hits_show_cap() {
        let captions = Caption::ALL.iter().map(|c| (*c, 20.0)).collect();
        assert_eq!(aggregate_captions(&captions, 100.0).total_score, 100.0);
        assert_eq!(cap_caption(20.7, 20.0), 20.0);
        assert_eq!(cap_caption(-1.0, 20.0), 0.0);
    }
}
