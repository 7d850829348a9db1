//! Timing and judgement engine for a four-lane falling-note rhythm game.
//!
//! A [`game::beatmap::Beatmap`] is loaded from chart JSON, handed to a
//! session with [`game::gameplay::init`], and ticked with the song clock
//! and lane input through [`game::gameplay::update`].

pub mod config;
pub mod core;
pub mod game;
