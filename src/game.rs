pub mod beatmap;
pub mod gameplay;
pub mod judgment;
pub mod note;
pub mod parsing;
pub mod scores;
pub mod scroll;
pub mod song;
pub mod timing;
