use chronobeat::config;
use chronobeat::core::input::{InputState, Lane};
use chronobeat::core::timing::SongClock;
use chronobeat::game::beatmap::Beatmap;
use chronobeat::game::gameplay;
use chronobeat::game::note::{Note, NoteKind};
use chronobeat::game::scores::PlayResult;
use chronobeat::game::scroll::ScrollSpeed;
use clap::Parser;
use log::{error, info, LevelFilter};
use std::error::Error;
use std::path::PathBuf;

const TAP_RELEASE_AFTER: f64 = 0.05;
const STAY_PRESS_MARGIN: f64 = 0.1;

/// Plays a chart headlessly and prints the result.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Chart JSON file.
    chart: PathBuf,

    /// Song length in seconds; defaults to just past the last note.
    #[arg(long)]
    length: Option<f64>,

    /// Config file.
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Let the engine play every note perfectly.
    #[arg(long)]
    auto: bool,

    /// Timing error of the simulated player, in milliseconds (positive is late).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    player_offset_ms: f64,

    /// Frames per second of the simulated loop.
    #[arg(long, default_value_t = 240.0)]
    fps: f64,
}

/// Key presses a simulated player makes for a chart, sorted by time.
fn schedule_inputs(notes: &[Note], offset: f64) -> Vec<(f64, Lane, bool)> {
    let mut events = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let Some(lane) = Lane::from_index(note.lane) else { continue; };
        match note.kind {
            NoteKind::Tap => {
                events.push((note.timing + offset, lane, true));
                events.push((note.timing + offset + TAP_RELEASE_AFTER, lane, false));
            }
            NoteKind::Hold { .. } => {
                events.push((note.timing + offset, lane, true));
                events.push((note.end_time() + offset, lane, false));
            }
            NoteKind::Stay => {
                events.push((note.timing - STAY_PRESS_MARGIN, lane, true));
                events.push((note.timing + STAY_PRESS_MARGIN, lane, false));
            }
        }
    }
    events.sort_by(|a, b| a.0.total_cmp(&b.0));
    events
}

fn run(args: &Args) -> Result<PlayResult, Box<dyn Error>> {
    config::load(&args.config);
    let cfg = config::get();
    let auto_play = args.auto || cfg.auto_play;

    let mut beatmap = Beatmap::load(&args.chart, 0.0, cfg.count_in)?;
    let default_length = beatmap.last_note_time().max(0.0) + 1.0;
    beatmap.length = args.length.unwrap_or(default_length);

    let schedule = schedule_inputs(&beatmap.notes, args.player_offset_ms / 1000.0);
    let mut clock = SongClock::new(beatmap.bpm, cfg.game_speed, cfg.count_in);
    let mut state = gameplay::init(beatmap, cfg.windows);
    let mut input = InputState::new();
    let mut next_event = 0;
    let frame = 1.0 / args.fps.max(1.0);

    let scroll = ScrollSpeed::new(cfg.scroll).unwrap_or_default();
    info!(
        "Playing '{}' ({}), speed {}, scroll {}.",
        args.chart.display(),
        if auto_play { "auto" } else { "simulated player" },
        cfg.game_speed,
        scroll
    );

    loop {
        let tick = clock.advance(frame);
        if tick.start_music {
            info!("Music start at song time {:.3}s.", tick.song_time);
        }

        while let Some(&(at, lane, pressed)) = schedule.get(next_event) {
            if at > tick.song_time {
                break;
            }
            if pressed {
                input.press(lane);
            } else {
                input.release(lane);
            }
            next_event += 1;
        }

        gameplay::update(&mut state, tick.song_time, &input, auto_play);
        input.end_tick();

        for event in gameplay::drain_feedback(&mut state) {
            log::debug!("{} on lane {} at {:.3}s", event.grade, event.lane, event.time);
        }

        if gameplay::is_song_over(&state) || (gameplay::is_cleared(&state) && next_event >= schedule.len()) {
            break;
        }
    }

    Ok(PlayResult::from_state(&state))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("chronobeat::game::gameplay", LevelFilter::Warn)
        .filter_module("chronobeat::game::parsing", LevelFilter::Debug)
        .init();

    let args = Args::parse();
    info!("chronobeat starting...");

    let result = match run(&args) {
        Ok(result) => result,
        Err(e) => {
            error!("Play failed: {}", e);
            return Err(e);
        }
    };

    info!(
        "Score {:.2} ({}), max combo {}/{}.",
        result.score, result.rating, result.max_combo, result.possible_combo
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
