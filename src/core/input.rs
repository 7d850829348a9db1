use crate::config::{LANE_COUNT, LANE_KEYS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Lane {
    D = 0,
    F = 1,
    J = 2,
    K = 3,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::D, Lane::F, Lane::J, Lane::K];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Lane> {
        Self::ALL.get(index).copied()
    }

    pub fn key(self) -> char {
        LANE_KEYS[self.index()]
    }
}

#[inline(always)]
pub fn lane_from_key(key: char) -> Option<Lane> {
    match key.to_ascii_lowercase() {
        'd' => Some(Lane::D),
        'f' => Some(Lane::F),
        'j' => Some(Lane::J),
        'k' => Some(Lane::K),
        _ => None,
    }
}

/// What a single lane did during the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaneInput {
    /// Went down this tick.
    pub pressed: bool,
    /// Went up this tick.
    pub released: bool,
    /// Currently down.
    pub held: bool,
}

/// Per-lane key state fed to the session each tick.
///
/// Edges accumulate between ticks through [`InputState::press`] and
/// [`InputState::release`]; the frame loop calls [`InputState::end_tick`]
/// after the session has consumed them.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    lanes: [LaneInput; LANE_COUNT],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, lane: Lane) {
        let slot = &mut self.lanes[lane.index()];
        if !slot.held {
            slot.pressed = true;
        }
        slot.held = true;
    }

    pub fn release(&mut self, lane: Lane) {
        let slot = &mut self.lanes[lane.index()];
        if slot.held {
            slot.released = true;
        }
        slot.held = false;
    }

    pub fn handle_key(&mut self, key: char, is_pressed: bool) {
        if let Some(lane) = lane_from_key(key) {
            if is_pressed {
                self.press(lane);
            } else {
                self.release(lane);
            }
        }
    }

    /// Clears the edges, keeping the held levels.
    pub fn end_tick(&mut self) {
        for slot in &mut self.lanes {
            slot.pressed = false;
            slot.released = false;
        }
    }

    #[inline(always)]
    pub fn lane(&self, lane: usize) -> LaneInput {
        self.lanes.get(lane).copied().unwrap_or_default()
    }
}
