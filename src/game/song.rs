use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Chronos,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Chronos,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Chronos => "Chronos",
        }
    }

    pub fn chart_file(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy.json",
            Difficulty::Normal => "normal.json",
            Difficulty::Hard => "hard.json",
            Difficulty::Chronos => "chronos.json",
        }
    }
}

/// One entry of `songinfo.json`.
#[derive(Debug, Clone, Deserialize)]
struct SongEntry {
    name: String,
    title: String,
    artist: String,
    bpm: String,
    difficulties: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartInfo {
    pub difficulty: Difficulty,
    pub path: PathBuf,
    pub level: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    /// Display string; may be a range such as "120-180".
    pub display_bpm: String,
    pub jacket_path: PathBuf,
    pub music_path: PathBuf,
    pub charts: Vec<ChartInfo>,
}

impl SongInfo {
    fn from_entry(base_dir: &Path, entry: SongEntry) -> Result<Self, String> {
        if entry.difficulties.len() < Difficulty::ALL.len() {
            return Err(format!(
                "'{}' lists {} difficulty levels, expected {}",
                entry.title,
                entry.difficulties.len(),
                Difficulty::ALL.len()
            ));
        }

        let song_dir = base_dir.join(&entry.name);
        let charts = Difficulty::ALL
            .iter()
            .zip(entry.difficulties.iter())
            .map(|(difficulty, level)| ChartInfo {
                difficulty: *difficulty,
                path: song_dir.join(difficulty.chart_file()),
                level: *level,
            })
            .collect();

        Ok(SongInfo {
            title: entry.title,
            artist: entry.artist,
            display_bpm: entry.bpm,
            jacket_path: song_dir.join("jacket.png"),
            music_path: song_dir.join("song.wav"),
            charts,
        })
    }

    pub fn chart(&self, difficulty: Difficulty) -> Option<&ChartInfo> {
        self.charts.iter().find(|c| c.difficulty == difficulty)
    }
}

/// Parses a `songinfo.json` document. Broken entries are skipped with a
/// warning; a document that is not an array of objects is an error.
pub fn parse_song_list(json: &str, base_dir: &Path) -> Result<Vec<SongInfo>, String> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| format!("Could not parse song list: {}", e))?;

    let mut songs = Vec::with_capacity(entries.len());
    for (index, value) in entries.into_iter().enumerate() {
        let parsed = serde_json::from_value::<SongEntry>(value)
            .map_err(|e| e.to_string())
            .and_then(|entry| SongInfo::from_entry(base_dir, entry));
        match parsed {
            Ok(song) => songs.push(song),
            Err(e) => warn!("Skipping song #{}: {}", index, e),
        }
    }
    Ok(songs)
}

pub fn load_song_list(path: &Path, base_dir: &Path) -> Result<Vec<SongInfo>, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("Could not read file: {}", e))?;
    let songs = parse_song_list(&json, base_dir)?;
    info!("Loaded {} songs from '{}'.", songs.len(), path.display());
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"[
        {"name": "clockwork", "title": "Clockwork", "artist": "Someone", "bpm": "150",
         "difficulties": [2, 5, 8, 11.5]},
        {"name": "broken", "title": "Broken", "artist": "Nobody", "bpm": "90",
         "difficulties": [1]},
        {"title": "No Name"}
    ]"#;

    #[test]
    fn test_parse_song_list() {
        let songs = parse_song_list(LIST, Path::new("beatmap")).unwrap();
        assert_eq!(songs.len(), 1);

        let song = &songs[0];
        assert_eq!(song.title, "Clockwork");
        assert_eq!(song.music_path, Path::new("beatmap/clockwork/song.wav"));
        assert_eq!(song.jacket_path, Path::new("beatmap/clockwork/jacket.png"));

        let chronos = song.chart(Difficulty::Chronos).unwrap();
        assert_eq!(chronos.path, Path::new("beatmap/clockwork/chronos.json"));
        assert_eq!(chronos.level, 11.5);
        assert_eq!(Difficulty::Chronos.name(), "Chronos");
    }

    #[test]
    fn test_not_an_array() {
        assert!(parse_song_list(r#"{"name": "x"}"#, Path::new(".")).is_err());
    }
}
