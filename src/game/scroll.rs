use crate::config::{DEFAULT_NOTE_SPEED, JUDGE_LINE_Y, PLAYFIELD_HEIGHT};
use crate::game::note::Note;
use crate::game::timing::TimingData;
use std::fmt;
use std::str::FromStr;

/// Player scroll multiplier, written as `1.5x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSpeed(f64);

impl Default for ScrollSpeed {
    fn default() -> Self {
        ScrollSpeed(1.0)
    }
}

impl ScrollSpeed {
    pub fn new(multiplier: f64) -> Option<Self> {
        (multiplier.is_finite() && multiplier > 0.0).then_some(ScrollSpeed(multiplier))
    }

    pub fn multiplier(self) -> f64 {
        self.0
    }

    /// Pixels per second of song time for a note with the given speed.
    pub fn pixels_per_second(self, game_speed: f64, note_speed: f64) -> f64 {
        DEFAULT_NOTE_SPEED * game_speed * self.0 * note_speed
    }

    /// Y of a point that reaches the judge line `diff` seconds from now.
    pub fn y_for_diff(self, diff: f64, game_speed: f64, note_speed: f64) -> f64 {
        JUDGE_LINE_Y - diff * self.pixels_per_second(game_speed, note_speed)
    }

    /// Head position of `note` at time `t`.
    pub fn note_y(self, note: &Note, t: f64, game_speed: f64) -> f64 {
        self.y_for_diff(note.time_diff(t), game_speed, note.speed)
    }

    /// Tail position; equals the head for non-hold notes.
    pub fn note_tail_y(self, note: &Note, t: f64, game_speed: f64) -> f64 {
        self.y_for_diff(note.end_time() - t, game_speed, note.speed)
    }
}

impl fmt::Display for ScrollSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.0 - self.0.round()).abs() < f64::EPSILON {
            write!(f, "{}x", self.0.round() as i64)
        } else {
            write!(f, "{:.2}x", self.0)
        }
    }
}

impl FromStr for ScrollSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Scroll speed value is empty".to_string());
        }
        let value_str = trimmed
            .strip_suffix('x')
            .or_else(|| trimmed.strip_suffix('X'))
            .unwrap_or(trimmed);
        let value: f64 = value_str
            .trim()
            .parse()
            .map_err(|_| format!("Scroll speed '{}' is not a valid number", trimmed))?;
        ScrollSpeed::new(value)
            .ok_or_else(|| format!("Scroll speed '{}' must be greater than zero", trimmed))
    }
}

/// Song times of the measure lines that are on screen at `t`.
pub fn visible_measure_lines(timing: &TimingData, t: f64, scroll: ScrollSpeed, game_speed: f64) -> Vec<f64> {
    let measure = timing.measure_duration();
    let pps = scroll.pixels_per_second(game_speed, 1.0);
    if !(measure > 0.0) || !(pps > 0.0) {
        return Vec::new();
    }

    // From the line just passed the judge line up to the top edge.
    let first = ((t - timing.offset_sec()) / measure).floor() as i64;
    let horizon = t + JUDGE_LINE_Y / pps;
    let mut lines = Vec::new();
    let mut i = first;
    loop {
        let line_time = timing.offset_sec() + i as f64 * measure;
        if line_time > horizon {
            break;
        }
        let y = scroll.y_for_diff(line_time - t, game_speed, 1.0);
        if (0.0..=PLAYFIELD_HEIGHT).contains(&y) {
            lines.push(line_time);
        }
        i += 1;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::note::NoteType;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("1.5x".parse::<ScrollSpeed>().unwrap(), ScrollSpeed(1.5));
        assert_eq!("2".parse::<ScrollSpeed>().unwrap(), ScrollSpeed(2.0));
        assert_eq!(" 3X ".parse::<ScrollSpeed>().unwrap(), ScrollSpeed(3.0));
        assert!("0x".parse::<ScrollSpeed>().is_err());
        assert!("fast".parse::<ScrollSpeed>().is_err());
        assert!("".parse::<ScrollSpeed>().is_err());
        assert_eq!(ScrollSpeed(2.0).to_string(), "2x");
        assert_eq!(ScrollSpeed(1.25).to_string(), "1.25x");
    }

    #[test]
    fn test_note_positions() {
        let scroll = ScrollSpeed::default();
        let note = Note::new_hold(NoteType::Hold, 0, 2.0, 1.0, 1.0).unwrap();
        assert_eq!(scroll.note_y(&note, 2.0, 1.0), JUDGE_LINE_Y);
        assert_eq!(scroll.note_y(&note, 1.0, 1.0), JUDGE_LINE_Y - DEFAULT_NOTE_SPEED);
        assert_eq!(scroll.note_tail_y(&note, 2.0, 1.0), JUDGE_LINE_Y - DEFAULT_NOTE_SPEED);

        let doubled = ScrollSpeed::new(2.0).unwrap();
        assert_eq!(doubled.note_y(&note, 1.0, 1.0), JUDGE_LINE_Y - 2.0 * DEFAULT_NOTE_SPEED);
    }

    #[test]
    fn test_measure_lines() {
        // 2 s per measure, 400 px/s: the judge line at 960 px sees 2.4 s ahead.
        let timing = TimingData::new(120.0, 0.0, false);
        let lines = visible_measure_lines(&timing, 1.0, ScrollSpeed::default(), 1.0);
        assert_eq!(lines, vec![2.0]);

        let lines = visible_measure_lines(&timing, 0.0, ScrollSpeed::default(), 1.0);
        assert_eq!(lines, vec![0.0, 2.0]);
    }
}
