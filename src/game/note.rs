use crate::config::LANE_COUNT;
use crate::core::input::LaneInput;
use crate::game::judgment::{self, JudgeGrade, TimingWindows};
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NoteType {
    Tap,
    Hold,
    Stay,
}

impl NoteType {
    /// Chart files number the types from 1.
    pub fn from_code(code: u32) -> Option<NoteType> {
        match code {
            1 => Some(NoteType::Tap),
            2 => Some(NoteType::Hold),
            3 => Some(NoteType::Stay),
            _ => None,
        }
    }

    /// Judgeable events a note of this type contributes to a full combo.
    pub fn combo_weight(self) -> u32 {
        match self {
            NoteType::Hold => 2,
            NoteType::Tap | NoteType::Stay => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoldPhase {
    AwaitingStart,
    Holding,
    /// End judged. Only reachable from `Holding`.
    Finished,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NoteKind {
    Tap,
    Hold { length: f64, phase: HoldPhase },
    Stay,
}

#[derive(Debug, Error, PartialEq)]
pub enum NoteError {
    #[error("hold notes need a length")]
    HoldNeedsLength,
    #[error("{0:?} notes do not take a length")]
    UnexpectedLength(NoteType),
    #[error("lane {0} is out of range")]
    LaneOutOfRange(usize),
    #[error("hold length must be positive, got {0}")]
    InvalidLength(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub lane: usize,
    /// Absolute target time in song seconds.
    pub timing: f64,
    /// Per-note scroll multiplier.
    pub speed: f64,
    pub removable: bool,
    pub kind: NoteKind,
}

impl Note {
    /// Builds a Tap or Stay note.
    pub fn new(note_type: NoteType, lane: usize, timing: f64, speed: f64) -> Result<Note, NoteError> {
        let kind = match note_type {
            NoteType::Tap => NoteKind::Tap,
            NoteType::Stay => NoteKind::Stay,
            NoteType::Hold => return Err(NoteError::HoldNeedsLength),
        };
        Self::build(kind, lane, timing, speed)
    }

    /// Builds a Hold note lasting `length` seconds from `timing`.
    pub fn new_hold(
        note_type: NoteType,
        lane: usize,
        timing: f64,
        length: f64,
        speed: f64,
    ) -> Result<Note, NoteError> {
        if note_type != NoteType::Hold {
            return Err(NoteError::UnexpectedLength(note_type));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(NoteError::InvalidLength(length));
        }
        let kind = NoteKind::Hold {
            length,
            phase: HoldPhase::AwaitingStart,
        };
        Self::build(kind, lane, timing, speed)
    }

    fn build(kind: NoteKind, lane: usize, timing: f64, speed: f64) -> Result<Note, NoteError> {
        if lane >= LANE_COUNT {
            return Err(NoteError::LaneOutOfRange(lane));
        }
        Ok(Note {
            lane,
            timing,
            speed,
            removable: false,
            kind,
        })
    }

    pub fn note_type(&self) -> NoteType {
        match self.kind {
            NoteKind::Tap => NoteType::Tap,
            NoteKind::Hold { .. } => NoteType::Hold,
            NoteKind::Stay => NoteType::Stay,
        }
    }

    /// Target time minus `t`; positive while the note is still ahead.
    #[inline(always)]
    pub fn time_diff(&self, t: f64) -> f64 {
        self.timing - t
    }

    /// Hold tail time; the head time for other notes.
    pub fn end_time(&self) -> f64 {
        match self.kind {
            NoteKind::Hold { length, .. } => self.timing + length,
            _ => self.timing,
        }
    }

    /// Whether the hold is being held right now.
    pub fn is_holding(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { phase: HoldPhase::Holding, .. })
    }

    /// Whether a hold's start has been caught, whether or not it has ended since.
    pub fn has_caught_start(&self) -> bool {
        matches!(
            self.kind,
            NoteKind::Hold { phase: HoldPhase::Holding | HoldPhase::Finished, .. }
        )
    }

    /// Advances the note with player input. Call at most once per tick.
    pub fn update(&mut self, t: f64, input: &LaneInput, windows: &TimingWindows) -> JudgeGrade {
        let head = judgment::classify(self.time_diff(t), windows);
        let end_time = self.end_time();

        match &mut self.kind {
            NoteKind::Tap => {
                if head == JudgeGrade::Miss {
                    // The session marks it removable once it counts the miss.
                    return head;
                }
                if !input.pressed {
                    return JudgeGrade::None;
                }
                if head != JudgeGrade::None {
                    self.removable = true;
                }
                head
            }
            NoteKind::Hold { phase, .. } => match *phase {
                HoldPhase::AwaitingStart => {
                    if head == JudgeGrade::Miss {
                        return head;
                    }
                    if input.pressed && head != JudgeGrade::None {
                        *phase = HoldPhase::Holding;
                        return head;
                    }
                    JudgeGrade::None
                }
                HoldPhase::Holding => {
                    let tail = judgment::classify(end_time - t, windows);
                    if tail == JudgeGrade::Perfect {
                        *phase = HoldPhase::Finished;
                        self.removable = true;
                        return tail;
                    }
                    if input.released || tail == JudgeGrade::Miss {
                        *phase = HoldPhase::Finished;
                        self.removable = true;
                        // Let go before any window opened.
                        if tail == JudgeGrade::None {
                            return JudgeGrade::Miss;
                        }
                        return tail;
                    }
                    JudgeGrade::None
                }
                HoldPhase::Finished => JudgeGrade::None,
            },
            NoteKind::Stay => {
                if head == JudgeGrade::Miss {
                    return head;
                }
                if !input.held || self.timing > t {
                    return JudgeGrade::None;
                }
                if head == JudgeGrade::None {
                    return head;
                }
                self.removable = true;
                JudgeGrade::Perfect
            }
        }
    }

    /// Advances the note as an ideal player would: every head and tail
    /// lands exactly on time.
    pub fn auto_update(&mut self, t: f64) -> JudgeGrade {
        if self.time_diff(t) > 0.0 {
            return JudgeGrade::None;
        }
        let end_time = self.end_time();

        match &mut self.kind {
            NoteKind::Hold { phase, .. } => match *phase {
                HoldPhase::AwaitingStart => {
                    *phase = HoldPhase::Holding;
                    JudgeGrade::Perfect
                }
                HoldPhase::Holding if end_time > t => JudgeGrade::None,
                HoldPhase::Holding => {
                    *phase = HoldPhase::Finished;
                    self.removable = true;
                    JudgeGrade::Perfect
                }
                HoldPhase::Finished => JudgeGrade::None,
            },
            NoteKind::Tap | NoteKind::Stay => {
                self.removable = true;
                JudgeGrade::Perfect
            }
        }
    }
}
