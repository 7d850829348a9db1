use crate::config::{LANE_COUNT, STATUS_LOG_INTERVAL};
use crate::core::input::InputState;
use crate::game::beatmap::Beatmap;
use crate::game::judgment::{self, JudgeGrade, TimingWindows};
use crate::game::note::{Note, NoteKind};
use crate::game::timing::TimingData;
use log::{debug, info};
use std::collections::HashMap;

/// How strongly a lane is claimed during the current tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LaneLock {
    #[default]
    Free,
    /// A hold caught its start and is still running. Later notes in the
    /// lane may still be judged this tick.
    Weak,
    /// A judgement was counted; later notes in the lane are skipped.
    Consumed,
}

/// A counted judgement, queued for the presentation layer (hit sound,
/// judgement popup).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JudgmentEvent {
    pub lane: usize,
    pub grade: JudgeGrade,
    pub time: f64,
}

pub struct State {
    pub bpm: f64,
    pub song_length: f64,
    pub timing: TimingData,
    notes: Vec<Note>,
    windows: TimingWindows,

    pub current_time: f64,
    lane_locks: [LaneLock; LANE_COUNT],

    pub combo: u32,
    pub max_combo: u32,
    pub possible_combo: u32,
    pub judgment_counts: HashMap<JudgeGrade, u32>,
    pub last_judgment: Option<JudgmentEvent>,
    feedback: Vec<JudgmentEvent>,

    last_status_log: f64,
}

pub fn init(beatmap: Beatmap, windows: TimingWindows) -> State {
    info!(
        "Starting session: {} notes, max combo {}, windows {:?}.",
        beatmap.notes.len(),
        beatmap.max_combo,
        windows
    );

    let timing = *beatmap.timing();
    State {
        bpm: beatmap.bpm,
        song_length: beatmap.length,
        timing,
        notes: beatmap.notes,
        windows,
        current_time: f64::NEG_INFINITY,
        lane_locks: [LaneLock::Free; LANE_COUNT],
        combo: 0,
        max_combo: 0,
        possible_combo: beatmap.max_combo,
        judgment_counts: judgment::empty_counts(),
        last_judgment: None,
        feedback: Vec::new(),
        last_status_log: f64::NEG_INFINITY,
    }
}

#[inline(always)]
fn record(counts: &mut HashMap<JudgeGrade, u32>, grade: JudgeGrade) {
    *counts.entry(grade).or_insert(0) += 1;
}

#[inline(always)]
fn lock_for(note: &Note) -> LaneLock {
    match note.kind {
        NoteKind::Hold { .. } if note.has_caught_start() && !note.removable => LaneLock::Weak,
        _ => LaneLock::Consumed,
    }
}

/// Advances the session to `current_time` (song seconds, already scaled by
/// the game speed).
///
/// Every live note is stepped once, in chart order. At most one judgement
/// per lane is counted per tick; resolved notes are dropped after the scan.
pub fn update(state: &mut State, current_time: f64, input: &InputState, auto_play: bool) {
    state.current_time = current_time;
    state.lane_locks = [LaneLock::Free; LANE_COUNT];

    for note in state.notes.iter_mut() {
        let grade = if auto_play {
            note.auto_update(current_time)
        } else {
            note.update(current_time, &input.lane(note.lane), &state.windows)
        };

        if grade == JudgeGrade::None {
            continue;
        }
        if state.lane_locks[note.lane] == LaneLock::Consumed {
            continue;
        }

        if grade == JudgeGrade::Miss {
            note.removable = true;
            state.combo = 0;

            // A hold that never started also loses its end.
            if matches!(note.kind, NoteKind::Hold { .. }) && !note.has_caught_start() {
                record(&mut state.judgment_counts, JudgeGrade::Miss);
            }
        } else {
            state.combo += 1;
            state.max_combo = state.max_combo.max(state.combo);
        }

        record(&mut state.judgment_counts, grade);

        let event = JudgmentEvent {
            lane: note.lane,
            grade,
            time: current_time,
        };
        state.feedback.push(event);
        state.last_judgment = Some(event);

        debug!(
            "JUDGED: Lane {}, Target {:.3}s, Error {:.1}ms, Grade {}",
            note.lane,
            note.timing,
            note.time_diff(current_time) * -1000.0,
            grade
        );

        state.lane_locks[note.lane] = lock_for(note);
    }

    state.notes.retain(|note| !note.removable);

    if current_time - state.last_status_log >= STATUS_LOG_INTERVAL {
        info!(
            "Time: {:.2}, Combo: {}, Max Combo: {}, Live Notes: {}",
            current_time,
            state.combo,
            state.max_combo,
            state.notes.len()
        );
        state.last_status_log = current_time;
    }
}

/// Live notes, in chart order.
pub fn notes(state: &State) -> &[Note] {
    &state.notes
}

pub fn lane_locks(state: &State) -> &[LaneLock; LANE_COUNT] {
    &state.lane_locks
}

pub fn windows(state: &State) -> &TimingWindows {
    &state.windows
}

/// Takes the judgements counted since the last call.
pub fn drain_feedback(state: &mut State) -> Vec<JudgmentEvent> {
    std::mem::take(&mut state.feedback)
}

pub fn count(state: &State, grade: JudgeGrade) -> u32 {
    state.judgment_counts.get(&grade).copied().unwrap_or(0)
}

/// Every note has been judged.
pub fn is_cleared(state: &State) -> bool {
    state.notes.is_empty()
}

pub fn is_song_over(state: &State) -> bool {
    state.current_time >= state.song_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::Lane;
    use crate::game::note::NoteType;

    fn tap(lane: usize, t: f64) -> Note {
        Note::new(NoteType::Tap, lane, t, 1.0).unwrap()
    }

    fn hold(lane: usize, t: f64, length: f64) -> Note {
        Note::new_hold(NoteType::Hold, lane, t, length, 1.0).unwrap()
    }

    fn session(notes: Vec<Note>) -> State {
        let mut beatmap =
            Beatmap::from_json_str(r#"{"BPM": 120, "offset": 0, "notes": []}"#, 60.0, false).unwrap();
        beatmap.max_combo = notes.iter().map(|n| n.note_type().combo_weight()).sum();
        beatmap.notes = notes;
        init(beatmap, TimingWindows::default())
    }

    fn pressed(lane: Lane) -> InputState {
        let mut input = InputState::new();
        input.press(lane);
        input
    }

    #[test]
    fn test_combo_and_miss_reset() {
        let notes = (0..6).map(|i| tap(0, 1.0 + i as f64)).collect();
        let mut state = session(notes);

        for i in 0..5 {
            update(&mut state, 1.0 + i as f64, &pressed(Lane::D), false);
        }
        assert_eq!(state.combo, 5);
        assert_eq!(state.max_combo, 5);
        assert_eq!(count(&state, JudgeGrade::Perfect), 5);

        // Let the last tap pass.
        update(&mut state, 6.2, &InputState::new(), false);
        assert_eq!(state.combo, 0);
        assert_eq!(state.max_combo, 5);
        assert_eq!(count(&state, JudgeGrade::Miss), 1);
        assert!(is_cleared(&state));
    }

    #[test]
    fn test_one_judgement_per_lane_per_tick() {
        let mut state = session(vec![tap(1, 1.0), tap(1, 1.02)]);
        update(&mut state, 1.0, &pressed(Lane::F), false);

        let total: u32 = JudgeGrade::COUNTED.iter().map(|g| count(&state, *g)).sum();
        assert_eq!(total, 1);
        assert_eq!(state.combo, 1);
        assert_eq!(lane_locks(&state)[1], LaneLock::Consumed);
        assert_eq!(drain_feedback(&mut state).len(), 1);
    }

    #[test]
    fn test_other_lanes_unaffected_by_lock() {
        let mut state = session(vec![tap(0, 1.0), tap(2, 1.0)]);
        let mut input = InputState::new();
        input.press(Lane::D);
        input.press(Lane::J);
        update(&mut state, 1.0, &input, false);
        assert_eq!(count(&state, JudgeGrade::Perfect), 2);
    }

    #[test]
    fn test_skipped_miss_is_counted_next_tick() {
        let mut state = session(vec![tap(0, 0.0), tap(0, 0.3)]);
        // Both overdue: only the first miss counts this tick.
        update(&mut state, 0.5, &InputState::new(), false);
        assert_eq!(count(&state, JudgeGrade::Miss), 1);
        assert_eq!(notes(&state).len(), 1);

        update(&mut state, 0.51, &InputState::new(), false);
        assert_eq!(count(&state, JudgeGrade::Miss), 2);
        assert!(is_cleared(&state));
    }

    #[test]
    fn test_hold_missed_start_counts_twice() {
        let mut state = session(vec![hold(0, 1.0, 1.0)]);
        update(&mut state, 1.5, &InputState::new(), false);
        assert_eq!(count(&state, JudgeGrade::Miss), 2);
        assert!(is_cleared(&state));
    }

    #[test]
    fn test_hold_released_early_counts_once() {
        let mut state = session(vec![hold(0, 1.0, 1.0)]);
        let mut input = pressed(Lane::D);
        update(&mut state, 1.0, &input, false);
        assert_eq!(count(&state, JudgeGrade::Perfect), 1);
        assert_eq!(lane_locks(&state)[0], LaneLock::Weak);

        input.end_tick();
        input.release(Lane::D);
        update(&mut state, 1.3, &input, false);
        assert_eq!(count(&state, JudgeGrade::Miss), 1);
        assert_eq!(lane_locks(&state)[0], LaneLock::Consumed);
        assert_eq!(state.combo, 0);
        assert!(is_cleared(&state));
    }

    #[test]
    fn test_weak_lock_lets_next_note_through() {
        // Hold head and a tap share lane and tick.
        let mut state = session(vec![hold(0, 1.0, 2.0), tap(0, 1.01)]);
        update(&mut state, 1.0, &pressed(Lane::D), false);
        assert_eq!(count(&state, JudgeGrade::Perfect), 2);
        assert_eq!(state.combo, 2);
    }

    #[test]
    fn test_full_hold_then_completion_consumes_lane() {
        let mut state = session(vec![hold(3, 1.0, 1.0)]);
        let mut input = pressed(Lane::K);
        update(&mut state, 1.0, &input, false);
        input.end_tick();
        update(&mut state, 1.5, &input, false);
        assert_eq!(state.combo, 1);
        update(&mut state, 2.0, &input, false);
        assert_eq!(state.combo, 2);
        assert_eq!(lane_locks(&state)[3], LaneLock::Consumed);
        assert_eq!(count(&state, JudgeGrade::Perfect), 2);
        assert!(is_cleared(&state));
    }

    #[test]
    fn test_auto_play_full_combo() {
        let notes = vec![
            tap(0, 1.0),
            hold(1, 1.5, 1.0),
            Note::new(NoteType::Stay, 2, 2.0, 1.0).unwrap(),
        ];
        let mut state = session(notes);
        let mut t = 0.0;
        while t < 4.0 {
            update(&mut state, t, &InputState::new(), true);
            t += 1.0 / 120.0;
        }
        assert!(is_cleared(&state));
        assert_eq!(count(&state, JudgeGrade::Perfect), 4);
        assert_eq!(state.max_combo, state.possible_combo);
        assert_eq!(count(&state, JudgeGrade::Miss), 0);
    }

    #[test]
    fn test_feedback_drains() {
        let mut state = session(vec![tap(0, 1.0)]);
        update(&mut state, 1.0, &pressed(Lane::D), false);
        let events = drain_feedback(&mut state);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].grade, JudgeGrade::Perfect);
        assert_eq!(events[0].lane, 0);
        assert!(drain_feedback(&mut state).is_empty());
        assert_eq!(state.last_judgment.map(|e| e.grade), Some(JudgeGrade::Perfect));
    }
}
