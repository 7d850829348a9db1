use crate::game::judgment::TimingWindows;
use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

// Lanes
pub const LANE_COUNT: usize = 4;
pub const LANE_KEYS: [char; LANE_COUNT] = ['d', 'f', 'j', 'k'];

// Judgement windows (milliseconds)
pub const PERFECT_WINDOW_MS: f64 = 40.0;
pub const GREAT_WINDOW_MS: f64 = 60.0;
pub const NEAR_WINDOW_MS: f64 = 80.0;

// Count-in
pub const COUNT_IN_BEATS: u32 = 4;
pub const BEATS_PER_MEASURE: f64 = 4.0;

// Playfield reference layout (1920x1080)
pub const PLAYFIELD_HEIGHT: f64 = 1080.0;
pub const JUDGE_LINE_Y: f64 = PLAYFIELD_HEIGHT - 120.0;
pub const DEFAULT_NOTE_SPEED: f64 = 400.0; // Pixels per second at 1x

// Misc
pub const STATUS_LOG_INTERVAL: f64 = 1.0;
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub username: String,
    /// Multiplier applied to the song clock before it reaches the engine.
    pub game_speed: f64,
    /// Player scroll multiplier, only affects drawing.
    pub scroll: f64,
    pub count_in: bool,
    pub auto_play: bool,
    pub windows: TimingWindows,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            username: "Guest".to_string(),
            game_speed: 1.0,
            scroll: 1.0,
            count_in: true,
            auto_play: false,
            windows: TimingWindows::default(),
        }
    }
}

static CONFIG: Lazy<Mutex<GameConfig>> = Lazy::new(|| Mutex::new(GameConfig::default()));

fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Config file not found, creating defaults at '{}'.", path.display());
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let defaults = GameConfig::default();
    let mut conf = Ini::new_cs();
    conf.set("Profile", "Username", Some(defaults.username));
    conf.set("Game", "Speed", Some(defaults.game_speed.to_string()));
    conf.set("Game", "Scroll", Some(defaults.scroll.to_string()));
    conf.set("Game", "CountIn", Some("1".to_string()));
    conf.set("Game", "AutoPlay", Some("0".to_string()));
    conf.set("Judge", "PerfectMs", Some(PERFECT_WINDOW_MS.to_string()));
    conf.set("Judge", "GreatMs", Some(GREAT_WINDOW_MS.to_string()));
    conf.set("Judge", "NearMs", Some(NEAR_WINDOW_MS.to_string()));
    conf.write(path)
}

fn positive_or(conf: &Ini, section: &str, key: &str, default: f64) -> f64 {
    match conf.get(section, key).map(|v| v.trim().parse::<f64>()) {
        Some(Ok(v)) if v.is_finite() && v > 0.0 => v,
        Some(_) => {
            warn!("Invalid value for [{}] {}, using {}.", section, key, default);
            default
        }
        None => default,
    }
}

fn flag_or(conf: &Ini, section: &str, key: &str, default: bool) -> bool {
    conf.get(section, key)
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map_or(default, |v| v != 0)
}

/// Reads a config from an INI file without touching the global copy.
/// Unknown or malformed values fall back to their defaults.
pub fn read(path: &Path) -> Result<GameConfig, String> {
    let mut conf = Ini::new_cs();
    conf.load(path)?;

    let defaults = GameConfig::default();
    let windows = TimingWindows::new(
        positive_or(&conf, "Judge", "PerfectMs", PERFECT_WINDOW_MS),
        positive_or(&conf, "Judge", "GreatMs", GREAT_WINDOW_MS),
        positive_or(&conf, "Judge", "NearMs", NEAR_WINDOW_MS),
    )
    .unwrap_or_else(|e| {
        warn!("{}; using default judgement windows.", e);
        TimingWindows::default()
    });

    Ok(GameConfig {
        username: conf
            .get("Profile", "Username")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.username),
        game_speed: positive_or(&conf, "Game", "Speed", defaults.game_speed),
        scroll: positive_or(&conf, "Game", "Scroll", defaults.scroll),
        count_in: flag_or(&conf, "Game", "CountIn", defaults.count_in),
        auto_play: flag_or(&conf, "Game", "AutoPlay", defaults.auto_play),
        windows,
    })
}

/// Loads the config file into the global copy, creating it with defaults
/// when it does not exist yet.
pub fn load(path: &Path) {
    if !path.exists() {
        if let Err(e) = create_default_file(path) {
            warn!("Failed to create default config file: {}", e);
            return;
        }
    }

    match read(path) {
        Ok(loaded) => {
            info!(
                "Loaded config from '{}' (speed {}, windows {:?}).",
                path.display(),
                loaded.game_speed,
                loaded.windows
            );
            *CONFIG.lock().unwrap() = loaded;
        }
        Err(e) => warn!("Failed to load '{}', using defaults: {}", path.display(), e),
    }
}

/// Returns a copy of the currently loaded config.
pub fn get() -> GameConfig {
    CONFIG.lock().unwrap().clone()
}
