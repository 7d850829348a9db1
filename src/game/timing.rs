use crate::config::{BEATS_PER_MEASURE, COUNT_IN_BEATS};
use serde::Deserialize;

/// A position in the chart grid: line `num` at `lpb` lines per beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NotePosition {
    #[serde(rename = "LPB")]
    pub lpb: u32,
    pub num: u32,
}

impl NotePosition {
    pub fn beat(&self) -> f64 {
        self.num as f64 / self.lpb as f64
    }
}

/// Constant-BPM timing for a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingData {
    bpm: f64,
    /// Seconds from song time zero to beat zero, count-in included.
    offset_sec: f64,
}

impl TimingData {
    /// `offset_ms` is the chart's own offset. With `count_in` set, one extra
    /// measure is inserted before beat zero.
    pub fn new(bpm: f64, offset_ms: f64, count_in: bool) -> Self {
        let mut offset_sec = offset_ms / 1000.0;
        if count_in {
            offset_sec += seconds_per_beat(bpm) * COUNT_IN_BEATS as f64;
        }
        Self { bpm, offset_sec }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn offset_sec(&self) -> f64 {
        self.offset_sec
    }

    pub fn seconds_per_beat(&self) -> f64 {
        seconds_per_beat(self.bpm)
    }

    pub fn measure_duration(&self) -> f64 {
        self.seconds_per_beat() * BEATS_PER_MEASURE
    }

    /// Time of `pos` relative to beat zero, without the offset.
    pub fn relative_time(&self, pos: NotePosition) -> f64 {
        (self.seconds_per_beat() / pos.lpb as f64) * pos.num as f64
    }

    pub fn get_time_for_position(&self, pos: NotePosition) -> f64 {
        self.offset_sec + self.relative_time(pos)
    }

    pub fn get_time_for_beat(&self, beat: f64) -> f64 {
        self.offset_sec + beat * self.seconds_per_beat()
    }

    pub fn get_beat_for_time(&self, time_sec: f64) -> f64 {
        (time_sec - self.offset_sec) / self.seconds_per_beat()
    }
}

#[inline(always)]
pub fn seconds_per_beat(bpm: f64) -> f64 {
    60.0 / bpm
}
