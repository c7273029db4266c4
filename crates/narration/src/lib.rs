//! Shortsmith Narration
//!
//! Turns script text into a narration track:
//! - **Synthesizers:** an external TTS command, or a silent placeholder track
//! - **WAV helpers:** duration measurement and silence generation (hound)
//! - **Subtitle Export:** SRT/VTT output from word timings or caption phrases

pub mod subtitles;
pub mod synthesizer;
pub mod wav;

pub use subtitles::*;
pub use synthesizer::*;
