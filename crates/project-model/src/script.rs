//! Narration scripts.

use serde::{Deserialize, Serialize};
use shortsmith_common::config::ScriptLength;

/// Inclusive word-count range a script should land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordBand {
    pub min: usize,
    pub max: usize,
}

impl WordBand {
    /// Roughly 30-35 seconds of narration.
    pub const SHORT: WordBand = WordBand { min: 80, max: 100 };

    /// Extended "context" narration.
    pub const CONTEXT: WordBand = WordBand { min: 180, max: 200 };

    pub fn for_length(length: ScriptLength) -> Self {
        match length {
            ScriptLength::Short => Self::SHORT,
            ScriptLength::Context => Self::CONTEXT,
        }
    }

    pub fn contains(&self, words: usize) -> bool {
        words >= self.min && words <= self.max
    }
}

/// Where a script's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptSource {
    Generated,
    UserProvided,
}

/// An immutable narration script.
///
/// The text is whitespace-normalized on construction; `words` is the text
/// split on whitespace, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    text: String,
    words: Vec<String>,
    band: WordBand,
    source: ScriptSource,
    words_per_minute: u32,
}

impl Script {
    pub fn new(
        text: &str,
        band: WordBand,
        source: ScriptSource,
        words_per_minute: u32,
    ) -> Self {
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        Self {
            text: words.join(" "),
            words,
            band,
            source,
            words_per_minute: words_per_minute.max(1),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn band(&self) -> WordBand {
        self.band
    }

    pub fn source(&self) -> ScriptSource {
        self.source
    }

    pub fn words_per_minute(&self) -> u32 {
        self.words_per_minute
    }

    /// Speaking time estimated from the words-per-minute rate.
    pub fn estimated_duration_secs(&self) -> f64 {
        self.word_count() as f64 / self.words_per_minute as f64 * 60.0
    }

    pub fn within_band(&self) -> bool {
        self.band.contains(self.word_count())
    }
}
