use crate::game::beatmap::ChartError;
use crate::game::note::{Note, NoteType};
use crate::game::timing::{NotePosition, TimingData};
use log::{info, warn};
use serde::Deserialize;

/// Top level of a chart file, as exported by the note editor.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChart {
    #[serde(rename = "BPM")]
    pub bpm: f64,
    /// Milliseconds.
    pub offset: f64,
    pub notes: Vec<RawNote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNote {
    /// 1 = tap, 2 = hold, 3 = stay.
    #[serde(rename = "type")]
    pub type_code: u32,
    /// Lane index.
    pub block: usize,
    #[serde(rename = "LPB")]
    pub lpb: u32,
    pub num: u32,
    /// Hold tail; the first entry is used.
    #[serde(default)]
    pub notes: Vec<NotePosition>,
}

impl RawNote {
    fn position(&self) -> NotePosition {
        NotePosition { lpb: self.lpb, num: self.num }
    }
}

fn invalid(index: usize, reason: impl Into<String>) -> ChartError {
    ChartError::InvalidNote {
        index,
        reason: reason.into(),
    }
}

fn checked_position(index: usize, pos: NotePosition) -> Result<NotePosition, ChartError> {
    if pos.lpb == 0 {
        return Err(invalid(index, "LPB must be at least 1"));
    }
    Ok(pos)
}

/// Converts raw chart notes into absolute-time notes.
///
/// Returns the notes in file order together with the chart's maximum
/// combo. The first malformed note aborts the whole conversion.
pub fn parse_chart_notes(raw: &RawChart, timing: &TimingData) -> Result<(Vec<Note>, u32), ChartError> {
    let mut notes = Vec::with_capacity(raw.notes.len());
    let mut max_combo = 0u32;
    let mut negative_timings = 0usize;

    for (index, raw_note) in raw.notes.iter().enumerate() {
        let note_type = NoteType::from_code(raw_note.type_code)
            .ok_or_else(|| invalid(index, format!("unknown note type {}", raw_note.type_code)))?;
        let start = timing.get_time_for_position(checked_position(index, raw_note.position())?);

        let note = match note_type {
            NoteType::Hold => {
                let tail = raw_note
                    .notes
                    .first()
                    .copied()
                    .ok_or_else(|| invalid(index, "hold note has no end position"))?;
                let end = timing.get_time_for_position(checked_position(index, tail)?);
                Note::new_hold(note_type, raw_note.block, start, end - start, 1.0)
            }
            NoteType::Tap | NoteType::Stay => Note::new(note_type, raw_note.block, start, 1.0),
        }
        .map_err(|e| invalid(index, e.to_string()))?;

        if note.timing < 0.0 {
            negative_timings += 1;
        }
        max_combo += note_type.combo_weight();
        notes.push(note);
    }

    if negative_timings > 0 {
        warn!(
            "{} notes land before song time zero; consider enabling the count-in.",
            negative_timings
        );
    }
    info!("Parsed {} notes (max combo {}).", notes.len(), max_combo);
    Ok((notes, max_combo))
}
