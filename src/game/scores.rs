use crate::game::gameplay::{self, State};
use crate::game::judgment::JudgeGrade;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rating {
    SS,
    S,
    AA,
    A,
    B,
    C,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rating::SS => "SS",
            Rating::S => "S",
            Rating::AA => "AA",
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
        };
        f.write_str(s)
    }
}

pub fn grade_weight(grade: JudgeGrade) -> f64 {
    match grade {
        JudgeGrade::Perfect => 1.0,
        JudgeGrade::Great => 0.8,
        JudgeGrade::Near => 0.5,
        JudgeGrade::Miss | JudgeGrade::None => 0.0,
    }
}

/// Weighted share of the possible combo, 0.0 to 1.0.
pub fn score_ratio(counts: &HashMap<JudgeGrade, u32>, possible_combo: u32) -> f64 {
    if possible_combo == 0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|(grade, count)| *count as f64 / possible_combo as f64 * grade_weight(*grade))
        .sum()
}

/// Percentage rounded to two decimals.
pub fn ratio_to_score(ratio: f64) -> f64 {
    (ratio * 10000.0).round() / 100.0
}

pub fn ratio_to_rating(ratio: f64) -> Rating {
    if ratio >= 1.0 { Rating::SS }
    else if ratio >= 0.9 { Rating::S }
    else if ratio >= 0.8 { Rating::AA }
    else if ratio >= 0.75 { Rating::A }
    else if ratio >= 0.5 { Rating::B }
    else { Rating::C }
}

/// Snapshot of a finished session for the result screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayResult {
    pub judgment_counts: HashMap<JudgeGrade, u32>,
    pub max_combo: u32,
    pub possible_combo: u32,
    pub score: f64,
    pub rating: Rating,
}

impl PlayResult {
    pub fn from_state(state: &State) -> Self {
        let judgment_counts: HashMap<JudgeGrade, u32> = JudgeGrade::COUNTED
            .iter()
            .map(|g| (*g, gameplay::count(state, *g)))
            .collect();
        let ratio = score_ratio(&judgment_counts, state.possible_combo);
        Self {
            judgment_counts,
            max_combo: state.max_combo,
            possible_combo: state.possible_combo,
            score: ratio_to_score(ratio),
            rating: ratio_to_rating(ratio),
        }
    }

    pub fn is_full_combo(&self) -> bool {
        self.possible_combo > 0 && self.max_combo == self.possible_combo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(perfect: u32, great: u32, near: u32, miss: u32) -> HashMap<JudgeGrade, u32> {
        HashMap::from([
            (JudgeGrade::Perfect, perfect),
            (JudgeGrade::Great, great),
            (JudgeGrade::Near, near),
            (JudgeGrade::Miss, miss),
        ])
    }

    #[test]
    fn test_all_perfect_is_ss() {
        let ratio = score_ratio(&counts(10, 0, 0, 0), 10);
        assert_eq!(ratio_to_score(ratio), 100.0);
        assert_eq!(ratio_to_rating(ratio), Rating::SS);
    }

    #[test]
    fn test_weighted_ratio() {
        // (2*1.0 + 1*0.8 + 1*0.5) / 4
        let ratio = score_ratio(&counts(2, 1, 1, 0), 4);
        assert!((ratio - 0.825).abs() < 1e-9);
        assert_eq!(ratio_to_score(ratio), 82.5);
        assert_eq!(ratio_to_rating(ratio), Rating::AA);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(ratio_to_rating(0.95), Rating::S);
        assert_eq!(ratio_to_rating(0.9), Rating::S);
        assert_eq!(ratio_to_rating(0.85), Rating::AA);
        assert_eq!(ratio_to_rating(0.78), Rating::A);
        assert_eq!(ratio_to_rating(0.6), Rating::B);
        assert_eq!(ratio_to_rating(0.2), Rating::C);
    }

    #[test]
    fn test_empty_chart() {
        assert_eq!(score_ratio(&counts(0, 0, 0, 0), 0), 0.0);
        assert_eq!(ratio_to_rating(0.0), Rating::C);
    }

    #[test]
    fn test_result_serializes() {
        let result = PlayResult {
            judgment_counts: counts(1, 0, 0, 0),
            max_combo: 1,
            possible_combo: 1,
            score: 100.0,
            rating: Rating::SS,
        };
        assert!(result.is_full_combo());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"Perfect\":1"));
        assert!(json.contains("\"rating\":\"SS\""));
    }
}
