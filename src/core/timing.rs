use crate::config::COUNT_IN_BEATS;
use crate::game::timing::seconds_per_beat;
use log::info;

/// What happened on one clock advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTick {
    /// Song time to feed the session.
    pub song_time: f64,
    /// Metronome clicks due since the previous advance.
    pub metronome_ticks: u32,
    /// The music should start playing now.
    pub start_music: bool,
}

/// Song clock for one play, count-in included.
///
/// Song time zero is the first count-in click's measure start; the music
/// begins after [`COUNT_IN_BEATS`] clicks, which lines up with a chart
/// loaded with its count-in offset. `game_speed` scales song time relative
/// to wall time.
#[derive(Debug, Clone)]
pub struct SongClock {
    click_interval: f64,
    game_speed: f64,
    count_in: bool,
    elapsed: f64,
    clicks_emitted: u32,
    music_started: bool,
}

impl SongClock {
    pub fn new(bpm: f64, game_speed: f64, count_in: bool) -> Self {
        Self {
            click_interval: seconds_per_beat(bpm) / game_speed,
            game_speed,
            count_in,
            elapsed: 0.0,
            clicks_emitted: 0,
            music_started: false,
        }
    }

    /// Wall seconds before the music starts.
    pub fn lead_in(&self) -> f64 {
        if self.count_in {
            self.click_interval * COUNT_IN_BEATS as f64
        } else {
            0.0
        }
    }

    pub fn song_time(&self) -> f64 {
        self.elapsed * self.game_speed
    }

    pub fn music_started(&self) -> bool {
        self.music_started
    }

    pub fn advance(&mut self, delta_wall: f64) -> ClockTick {
        self.elapsed += delta_wall.max(0.0);

        let mut metronome_ticks = 0;
        if self.count_in && self.clicks_emitted < COUNT_IN_BEATS {
            let due = ((self.elapsed / self.click_interval).floor() as u32).min(COUNT_IN_BEATS);
            metronome_ticks = due.saturating_sub(self.clicks_emitted);
            self.clicks_emitted = self.clicks_emitted.max(due);
        }

        let start_music = !self.music_started && self.elapsed >= self.lead_in();
        if start_music {
            self.music_started = true;
            info!("Count-in done at {:.3}s, starting music.", self.song_time());
        }

        ClockTick {
            song_time: self.song_time(),
            metronome_ticks,
            start_music,
        }
    }

    /// Re-anchors the clock on the audio device's playback position
    /// (seconds of audio played, at game speed) to stay in sync.
    pub fn sync_to_audio(&mut self, audio_position: f64) {
        if self.music_started {
            self.elapsed = self.lead_in() + audio_position / self.game_speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_in_clicks_then_music() {
        // 120 BPM: a click every 0.5 s, music at 2.0 s.
        let mut clock = SongClock::new(120.0, 1.0, true);
        let mut clicks = 0;
        let mut music_at = None;
        for step in 1..=300 {
            let tick = clock.advance(0.01);
            clicks += tick.metronome_ticks;
            if tick.start_music {
                assert!(music_at.is_none());
                music_at = Some(step as f64 * 0.01);
            }
        }
        assert_eq!(clicks, COUNT_IN_BEATS);
        let music_at = music_at.unwrap();
        assert!((music_at - 2.0).abs() < 0.011);
    }

    #[test]
    fn test_game_speed_scales_song_time() {
        let mut clock = SongClock::new(120.0, 2.0, true);
        assert!((clock.lead_in() - 1.0).abs() < 1e-9);
        let tick = clock.advance(1.0);
        assert!(tick.start_music);
        assert_eq!(tick.metronome_ticks, COUNT_IN_BEATS);
        // Song time at music start equals one measure, the chart's count-in offset.
        assert!((tick.song_time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_count_in() {
        let mut clock = SongClock::new(120.0, 1.0, false);
        let tick = clock.advance(0.0);
        assert!(tick.start_music);
        assert_eq!(tick.metronome_ticks, 0);
    }

    #[test]
    fn test_sync_to_audio() {
        let mut clock = SongClock::new(120.0, 1.0, true);
        clock.sync_to_audio(5.0);
        assert_eq!(clock.song_time(), 0.0);

        clock.advance(2.0);
        clock.sync_to_audio(0.25);
        assert!((clock.song_time() - 2.25).abs() < 1e-9);
    }
}
