//! Narration audio and word-level caption timing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shortsmith_common::error::{ShortsError, ShortsResult};

/// A synthesized narration waveform and its measured duration.
///
/// The duration is always positive and finite; it is the authoritative clock
/// for the whole video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationTrack {
    audio_path: PathBuf,
    duration_secs: f64,
}

impl NarrationTrack {
    pub fn new(audio_path: impl Into<PathBuf>, duration_secs: f64) -> ShortsResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(ShortsError::synthesis(format!(
                "Narration duration must be positive and finite, got {duration_secs}"
            )));
        }
        Ok(Self {
            audio_path: audio_path.into(),
            duration_secs,
        })
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

/// The time interval during which one script word is spoken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// Position of the word in the script.
    pub index: usize,
    pub word: String,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl WordTiming {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Half-open containment: `[start, end)`.
    pub fn is_active(&self, time_secs: f64) -> bool {
        time_secs >= self.start_secs && time_secs < self.end_secs
    }
}

/// Consecutive words shown on screen together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionPhrase {
    pub words: Vec<WordTiming>,
}

impl CaptionPhrase {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn start_secs(&self) -> f64 {
        self.words.first().map(|w| w.start_secs).unwrap_or(0.0)
    }

    pub fn end_secs(&self) -> f64 {
        self.words.last().map(|w| w.end_secs).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_rejects_invalid_durations() {
        assert!(NarrationTrack::new("a.wav", 0.0).is_err());
        assert!(NarrationTrack::new("a.wav", -1.0).is_err());
        assert!(NarrationTrack::new("a.wav", f64::NAN).is_err());
        assert!(NarrationTrack::new("a.wav", f64::INFINITY).is_err());

        let track = NarrationTrack::new("a.wav", 31.2).unwrap();
        assert_eq!(track.audio_path(), Path::new("a.wav"));
        assert!((track.duration_secs() - 31.2).abs() < 1e-12);
    }

    #[test]
    fn test_word_timing_half_open() {
        let timing = WordTiming {
            index: 0,
            word: "alien".to_string(),
            start_secs: 1.0,
            end_secs: 1.5,
        };
        assert!(timing.is_active(1.0));
        assert!(timing.is_active(1.49));
        assert!(!timing.is_active(1.5));
    }

    #[test]
    fn test_phrase_text_and_span() {
        let words = ["massive", "alien", "world"]
            .iter()
            .enumerate()
            .map(|(i, w)| WordTiming {
                index: i,
                word: w.to_string(),
                start_secs: i as f64,
                end_secs: i as f64 + 1.0,
            })
            .collect();
        let phrase = CaptionPhrase { words };
        assert_eq!(phrase.text(), "massive alien world");
        assert_eq!(phrase.start_secs(), 0.0);
        assert_eq!(phrase.end_secs(), 3.0);
    }
}
