use crate::config::{GREAT_WINDOW_MS, NEAR_WINDOW_MS, PERFECT_WINDOW_MS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JudgeGrade {
    Perfect,
    Great,
    Near,
    Miss,
    /// Nothing to judge yet. Never counted or displayed.
    None,
}

impl JudgeGrade {
    /// The tiers that are tallied by a session, best first.
    pub const COUNTED: [JudgeGrade; 4] = [
        JudgeGrade::Perfect,
        JudgeGrade::Great,
        JudgeGrade::Near,
        JudgeGrade::Miss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            JudgeGrade::Perfect => "Perfect",
            JudgeGrade::Great => "Great",
            JudgeGrade::Near => "Near",
            JudgeGrade::Miss => "Miss",
            JudgeGrade::None => "None",
        }
    }

    #[inline(always)]
    pub fn is_hit(self) -> bool {
        matches!(self, JudgeGrade::Perfect | JudgeGrade::Great | JudgeGrade::Near)
    }
}

impl fmt::Display for JudgeGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("timing windows must be positive and ascending, got {perfect_ms}/{great_ms}/{near_ms} ms")]
pub struct InvalidWindows {
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub near_ms: f64,
}

/// Maximum absolute timing error, in milliseconds, accepted for each tier.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimingWindows {
    perfect_ms: f64,
    great_ms: f64,
    near_ms: f64,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self {
            perfect_ms: PERFECT_WINDOW_MS,
            great_ms: GREAT_WINDOW_MS,
            near_ms: NEAR_WINDOW_MS,
        }
    }
}

impl TimingWindows {
    pub fn new(perfect_ms: f64, great_ms: f64, near_ms: f64) -> Result<Self, InvalidWindows> {
        let valid = [perfect_ms, great_ms, near_ms]
            .iter()
            .all(|w| w.is_finite() && *w > 0.0)
            && perfect_ms < great_ms
            && great_ms < near_ms;
        if !valid {
            return Err(InvalidWindows { perfect_ms, great_ms, near_ms });
        }
        Ok(Self { perfect_ms, great_ms, near_ms })
    }

    /// Tightest first.
    pub fn tiers(&self) -> [(JudgeGrade, f64); 3] {
        [
            (JudgeGrade::Perfect, self.perfect_ms),
            (JudgeGrade::Great, self.great_ms),
            (JudgeGrade::Near, self.near_ms),
        ]
    }

    pub fn near_ms(&self) -> f64 {
        self.near_ms
    }

    pub fn perfect_ms(&self) -> f64 {
        self.perfect_ms
    }
}

/// Classifies `diff_sec` (target time minus current time).
///
/// Returns `Miss` once the target is further in the past than the loosest
/// window, the tightest tier that contains the error otherwise, and `None`
/// while the target is still too far ahead.
pub fn classify(diff_sec: f64, windows: &TimingWindows) -> JudgeGrade {
    let diff_ms = diff_sec * 1000.0;
    if diff_ms < -windows.near_ms {
        return JudgeGrade::Miss;
    }

    let abs_ms = diff_ms.abs();
    windows
        .tiers()
        .into_iter()
        .find(|&(_, bound)| abs_ms <= bound)
        .map_or(JudgeGrade::None, |(grade, _)| grade)
}

pub fn empty_counts() -> HashMap<JudgeGrade, u32> {
    JudgeGrade::COUNTED.iter().map(|g| (*g, 0)).collect()
}
