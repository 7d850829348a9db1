use crate::game::note::Note;
use crate::game::parsing::notes::{parse_chart_notes, RawChart};
use crate::game::timing::TimingData;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse chart: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid BPM: {0}")]
    InvalidBpm(f64),

    #[error("Invalid offset: {0}")]
    InvalidOffset(f64),

    #[error("Invalid note #{index}: {reason}")]
    InvalidNote { index: usize, reason: String },
}

/// A fully timed chart, ready to be handed to a gameplay session.
#[derive(Debug, Clone)]
pub struct Beatmap {
    pub bpm: f64,
    /// Seconds from song time zero to beat zero.
    pub offset: f64,
    /// Song duration in seconds.
    pub length: f64,
    pub notes: Vec<Note>,
    /// Judgeable events in the chart; holds count twice.
    pub max_combo: u32,
    timing: TimingData,
}

impl Beatmap {
    pub fn from_json_str(json: &str, length: f64, count_in: bool) -> Result<Beatmap, ChartError> {
        let raw: RawChart = serde_json::from_str(json)?;
        Self::from_raw(&raw, length, count_in)
    }

    pub fn from_raw(raw: &RawChart, length: f64, count_in: bool) -> Result<Beatmap, ChartError> {
        if !(raw.bpm.is_finite() && raw.bpm > 0.0) {
            return Err(ChartError::InvalidBpm(raw.bpm));
        }
        if !raw.offset.is_finite() {
            return Err(ChartError::InvalidOffset(raw.offset));
        }

        let timing = TimingData::new(raw.bpm, raw.offset, count_in);
        let (notes, max_combo) = parse_chart_notes(raw, &timing)?;

        Ok(Beatmap {
            bpm: raw.bpm,
            offset: timing.offset_sec(),
            length,
            notes,
            max_combo,
            timing,
        })
    }

    pub fn load(path: &Path, length: f64, count_in: bool) -> Result<Beatmap, ChartError> {
        let json = fs::read_to_string(path).map_err(|source| ChartError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let beatmap = Self::from_json_str(&json, length, count_in)?;
        info!(
            "Loaded chart '{}': BPM {}, offset {:.3}s, {} notes.",
            path.display(),
            beatmap.bpm,
            beatmap.offset,
            beatmap.notes.len()
        );
        Ok(beatmap)
    }

    pub fn timing(&self) -> &TimingData {
        &self.timing
    }

    /// Latest time any note still needs judging.
    pub fn last_note_time(&self) -> f64 {
        self.notes
            .iter()
            .map(Note::end_time)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
