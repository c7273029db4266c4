//! Caption timing: word-level highlight intervals derived from the narration
//! duration, phrase grouping, and on-screen line layout.

use shortsmith_common::config::CaptionConfig;
use shortsmith_project_model::geometry::{Dimensions, Rect};
use shortsmith_project_model::narration::{CaptionPhrase, NarrationTrack, WordTiming};
use shortsmith_project_model::script::Script;
use shortsmith_project_model::timeline::{CaptionCue, Layer, Segment, SegmentContent};

/// How raw time is shared between words before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightPolicy {
    /// Proportional to the number of alphanumeric characters in the word.
    #[default]
    CharacterCount,
    /// Every word gets the same share.
    Uniform,
}

impl WeightPolicy {
    pub fn weight(self, word: &str) -> f64 {
        match self {
            WeightPolicy::CharacterCount => {
                word.chars().filter(|c| c.is_alphanumeric()).count().max(1) as f64
            }
            WeightPolicy::Uniform => 1.0,
        }
    }
}

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Lower bound for any single raw allocation, in seconds.
    pub min_word_secs: f64,
    pub policy: WeightPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_word_secs: 0.05,
            policy: WeightPolicy::default(),
        }
    }
}

impl From<&CaptionConfig> for SyncConfig {
    fn from(config: &CaptionConfig) -> Self {
        Self {
            min_word_secs: config.min_word_secs,
            policy: WeightPolicy::default(),
        }
    }
}

/// Maps script words onto the narration's time axis.
#[derive(Debug, Clone, Default)]
pub struct CaptionSynchronizer {
    config: SyncConfig,
}

impl CaptionSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn synchronize(&self, script: &Script, narration: &NarrationTrack) -> Vec<WordTiming> {
        self.synchronize_words(script.words(), narration.duration_secs())
    }

    /// Per-word allocations before normalization. Each is at least the floor.
    pub fn raw_allocations(&self, words: &[String], total_secs: f64) -> Vec<f64> {
        let weights: Vec<f64> = words.iter().map(|w| self.config.policy.weight(w)).collect();
        let weight_sum: f64 = weights.iter().sum();
        if weight_sum <= 0.0 {
            return vec![self.config.min_word_secs; words.len()];
        }
        weights
            .iter()
            .map(|w| (total_secs * w / weight_sum).max(self.config.min_word_secs))
            .collect()
    }

    /// Lay words end to end across `[0, total_secs]`.
    ///
    /// The raw allocations are scaled so they sum to `total_secs`; the last
    /// word always ends exactly at `total_secs`.
    pub fn synchronize_words(&self, words: &[String], total_secs: f64) -> Vec<WordTiming> {
        if words.is_empty() || !total_secs.is_finite() || total_secs <= 0.0 {
            return Vec::new();
        }

        let raw = self.raw_allocations(words, total_secs);
        let raw_sum: f64 = raw.iter().sum();
        let scale = total_secs / raw_sum;
        let last = words.len() - 1;

        let mut cursor = 0.0;
        let timings: Vec<WordTiming> = words
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(index, (word, allocation))| {
                let start = cursor;
                let end = if index == last {
                    total_secs
                } else {
                    (cursor + allocation * scale).clamp(start, total_secs)
                };
                cursor = end;
                WordTiming {
                    index,
                    word: word.clone(),
                    start_secs: start,
                    end_secs: end,
                }
            })
            .collect();

        tracing::debug!(
            words = timings.len(),
            total_secs,
            scale,
            "Word timings computed"
        );
        timings
    }
}

/// Group consecutive words into on-screen phrases.
///
/// A phrase closes when it would exceed `max_words` words or `max_chars`
/// characters (spaces included). A single word longer than `max_chars` forms
/// its own phrase.
pub fn group_phrases(
    timings: &[WordTiming],
    max_words: usize,
    max_chars: usize,
) -> Vec<CaptionPhrase> {
    let max_words = max_words.max(1);
    let mut phrases = Vec::new();
    let mut current: Vec<WordTiming> = Vec::new();
    let mut current_chars = 0usize;

    for timing in timings {
        let word_chars = timing.word.chars().count();
        let would_be = if current.is_empty() {
            word_chars
        } else {
            current_chars + 1 + word_chars
        };

        if !current.is_empty() && (current.len() >= max_words || would_be > max_chars) {
            phrases.push(CaptionPhrase {
                words: std::mem::take(&mut current),
            });
            current_chars = word_chars;
        } else {
            current_chars = would_be;
        }
        current.push(timing.clone());
    }

    if !current.is_empty() {
        phrases.push(CaptionPhrase { words: current });
    }
    phrases
}

/// Styling inputs for laying a phrase out as one line.
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    pub font_size: u32,
    /// Average glyph advance as a fraction of the font size.
    pub glyph_width_ratio: f64,
    /// Horizontal share of the band the line may occupy.
    pub max_line_ratio: f64,
    pub min_font_size: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 80,
            glyph_width_ratio: 0.56,
            max_line_ratio: 0.9,
            min_font_size: 24,
        }
    }
}

impl From<&CaptionConfig> for CaptionStyle {
    fn from(config: &CaptionConfig) -> Self {
        Self {
            font_size: config.font_size,
            glyph_width_ratio: config.glyph_width_ratio,
            ..Self::default()
        }
    }
}

/// Estimated pixel width of `chars` glyphs.
fn text_width(chars: usize, font_size: u32, ratio: f64) -> f64 {
    chars as f64 * font_size as f64 * ratio
}

/// Lay one phrase out as a single centered line inside `band`.
///
/// Returns one cue per word along with each word's estimated box. The font
/// shrinks (down to `min_font_size`) when the line would overflow the band.
pub fn layout_phrase(
    phrase: &CaptionPhrase,
    phrase_index: usize,
    band: Rect,
    style: &CaptionStyle,
) -> Vec<(CaptionCue, Rect)> {
    let line_chars = phrase.text().chars().count();
    let available = band.width as f64 * style.max_line_ratio;

    let mut font_size = style.font_size.max(1);
    let natural = text_width(line_chars, font_size, style.glyph_width_ratio);
    if natural > available && natural > 0.0 {
        let shrunk = (font_size as f64 * available / natural).floor() as u32;
        font_size = shrunk.max(style.min_font_size).min(font_size);
    }

    let line_width = text_width(line_chars, font_size, style.glyph_width_ratio);
    let left = band.x as f64 + ((band.width as f64 - line_width) / 2.0).max(0.0);
    let top = band.y + band.height.saturating_sub(font_size) / 2;
    let height = font_size.min(band.height);

    let mut chars_before = 0usize;
    phrase
        .words
        .iter()
        .map(|timing| {
            let word_chars = timing.word.chars().count();
            let x = (left + text_width(chars_before, font_size, style.glyph_width_ratio)).round()
                as u32;
            let width = text_width(word_chars, font_size, style.glyph_width_ratio).ceil() as u32;
            chars_before += word_chars + 1;

            let cue = CaptionCue {
                word: timing.word.clone(),
                word_index: timing.index,
                phrase_index,
                x,
                y: top,
                font_size,
                highlight_start_secs: timing.start_secs,
                highlight_end_secs: timing.end_secs,
            };
            let max_width = band.right().saturating_sub(x);
            (cue, Rect::new(x, top, width.min(max_width), height))
        })
        .collect()
}

/// Caption segments for `timings` inside `region`.
///
/// Words are grouped into phrases; every word of a phrase is on screen for
/// the phrase's whole span and highlighted during its own timing.
pub fn caption_segments(
    timings: &[WordTiming],
    region: Rect,
    max_words: usize,
    max_chars: usize,
    style: &CaptionStyle,
) -> Vec<Segment> {
    let phrases = group_phrases(timings, max_words, max_chars);
    let mut segments = Vec::with_capacity(timings.len());
    for (phrase_index, phrase) in phrases.iter().enumerate() {
        let (start, end) = (phrase.start_secs(), phrase.end_secs());
        for (cue, rect) in layout_phrase(phrase, phrase_index, region, style) {
            segments.push(Segment {
                layer: Layer::Caption,
                start_secs: start,
                end_secs: end,
                rect: Some(rect),
                content: SegmentContent::Caption(cue),
            });
        }
    }
    segments
}

/// Full-width strip across the middle of `frame`, two lines of text tall.
///
/// Used when burning captions into a finished video, which has no caption
/// band of its own.
pub fn centered_caption_region(frame: Dimensions, style: &CaptionStyle) -> Rect {
    let height = style.font_size.saturating_mul(2).clamp(1, frame.height.max(1));
    Rect::new(0, frame.height.saturating_sub(height) / 2, frame.width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn assert_contiguous(timings: &[WordTiming], total: f64) {
        let mut previous_end = 0.0;
        for t in timings {
            assert!(t.start_secs <= t.end_secs, "{t:?}");
            assert!(t.start_secs >= previous_end - 1e-9, "{t:?}");
            previous_end = t.end_secs;
        }
        assert_eq!(timings.last().map(|t| t.end_secs), Some(total));
    }

    #[test]
    fn test_alien_world_line_fills_duration() {
        let sync = CaptionSynchronizer::default();
        let words = words("Satisfactory drops you on a massive alien world");
        let timings = sync.synchronize_words(&words, 4.5);

        assert_eq!(timings.len(), words.len());
        for (i, t) in timings.iter().enumerate() {
            assert_eq!(t.index, i);
            assert_eq!(t.word, words[i]);
        }
        let total: f64 = timings.iter().map(WordTiming::duration_secs).sum();
        assert!((total - 4.5).abs() < 1e-9);
        assert_contiguous(&timings, 4.5);

        for raw in sync.raw_allocations(&words, 4.5) {
            assert!(raw >= 0.05);
        }
        // "Satisfactory" (12 chars) outlasts "a" (1 char).
        assert!(timings[0].duration_secs() > timings[4].duration_secs());
    }

    #[test]
    fn test_empty_script_yields_no_timings() {
        let sync = CaptionSynchronizer::default();
        assert!(sync.synchronize_words(&[], 10.0).is_empty());
    }

    #[test]
    fn test_floor_applies_to_short_words_in_tight_durations() {
        let sync = CaptionSynchronizer::default();
        let words = words("a extraordinarily b");
        let raw = sync.raw_allocations(&words, 0.3);
        // 0.3 * 1/17 ~= 0.0176 is lifted to the floor.
        assert!((raw[0] - 0.05).abs() < 1e-12);
        assert!((raw[2] - 0.05).abs() < 1e-12);

        let timings = sync.synchronize_words(&words, 0.3);
        let total: f64 = timings.iter().map(WordTiming::duration_secs).sum();
        assert!((total - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_policy_splits_evenly() {
        let sync = CaptionSynchronizer::new(SyncConfig {
            min_word_secs: 0.05,
            policy: WeightPolicy::Uniform,
        });
        let timings = sync.synchronize_words(&words("one two three four"), 2.0);
        for t in &timings {
            assert!((t.duration_secs() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_punctuation_only_token_gets_minimum_weight() {
        assert_eq!(WeightPolicy::CharacterCount.weight("--"), 1.0);
        assert_eq!(WeightPolicy::CharacterCount.weight("world!"), 5.0);
    }

    #[test]
    fn test_synchronization_is_deterministic() {
        let sync = CaptionSynchronizer::default();
        let words = words("Build sprawling factories across a hostile planet");
        assert_eq!(
            sync.synchronize_words(&words, 7.25),
            sync.synchronize_words(&words, 7.25)
        );
    }

    #[test]
    fn test_group_phrases_respects_word_and_char_limits() {
        let sync = CaptionSynchronizer::default();
        let text = "one two three four five six seven eight nine ten";
        let timings = sync.synchronize_words(&words(text), 5.0);
        let phrases = group_phrases(&timings, 8, 60);
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[0].words.len(), 8);
        assert_eq!(phrases[1].text(), "nine ten");

        let by_chars = group_phrases(&timings, 8, 13);
        for phrase in &by_chars {
            assert!(phrase.text().chars().count() <= 13);
        }
        let rejoined: Vec<String> = by_chars.iter().map(CaptionPhrase::text).collect();
        assert_eq!(rejoined.join(" "), text);
    }

    #[test]
    fn test_long_word_forms_its_own_phrase() {
        let sync = CaptionSynchronizer::default();
        let timings = sync.synchronize_words(&words("a supercalifragilistic b"), 3.0);
        let phrases = group_phrases(&timings, 8, 10);
        let texts: Vec<String> = phrases.iter().map(CaptionPhrase::text).collect();
        assert_eq!(texts, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_layout_phrase_centers_line_in_band() {
        let sync = CaptionSynchronizer::default();
        let timings = sync.synchronize_words(&words("massive alien world"), 1.5);
        let phrase = group_phrases(&timings, 8, 60).remove(0);
        let band = Rect::new(0, 720, 1080, 192);
        let cues = layout_phrase(&phrase, 0, band, &CaptionStyle::default());

        assert_eq!(cues.len(), 3);
        // 19 chars * 80 * 0.56 = 851.2 px line, fits in 972 px.
        assert_eq!(cues[0].0.font_size, 80);
        assert_eq!(cues[0].0.x, 114);
        assert_eq!(cues[0].0.y, 776);
        assert!(cues[0].0.x < cues[1].0.x && cues[1].0.x < cues[2].0.x);
        for (cue, rect) in &cues {
            assert!(band.contains_rect(rect), "{cue:?} {rect:?}");
        }
        assert_eq!(cues[2].0.highlight_end_secs, 1.5);
    }

    #[test]
    fn test_layout_phrase_shrinks_long_lines() {
        let sync = CaptionSynchronizer::default();
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let timings = sync.synchronize_words(&words(text), 4.0);
        let phrase = CaptionPhrase { words: timings };
        let band = Rect::new(0, 720, 1080, 192);
        let cues = layout_phrase(&phrase, 3, band, &CaptionStyle::default());

        let font = cues[0].0.font_size;
        assert!(font < 80);
        assert!(cues.iter().all(|(c, _)| c.phrase_index == 3 && c.font_size == font));
        for (_, rect) in &cues {
            assert!(band.contains_rect(rect));
        }
    }

    #[test]
    fn test_centered_region_sits_mid_frame() {
        let style = CaptionStyle::default();
        let region = centered_caption_region(Dimensions::new(1080, 1920), &style);
        assert_eq!(region, Rect::new(0, 880, 1080, 160));

        let landscape = centered_caption_region(Dimensions::new(1920, 1080), &style);
        assert_eq!(landscape.y + landscape.height / 2, 540);
        assert_eq!(landscape.width, 1920);
    }

    #[test]
    fn test_caption_segments_span_their_phrase() {
        let timings =
            CaptionSynchronizer::default().synchronize_words(&words("one two three four"), 4.0);
        let region = Rect::new(0, 880, 1080, 160);
        let segments = caption_segments(&timings, region, 2, 60, &CaptionStyle::default());

        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(|s| s.layer == Layer::Caption));
        assert_eq!(segments[0].start_secs, segments[1].start_secs);
        assert_eq!(segments[0].end_secs, timings[1].end_secs);
        assert_eq!(segments[2].start_secs, timings[2].start_secs);
        assert_eq!(segments[3].end_secs, 4.0);
        for segment in &segments {
            assert!(region.contains_rect(&segment.rect.unwrap()));
        }
    }

    proptest! {
        #[test]
        fn prop_timings_cover_duration_in_order(
            lens in proptest::collection::vec(1usize..15, 1..120),
            total in 0.5f64..400.0,
        ) {
            let words: Vec<String> = lens.iter().map(|n| "x".repeat(*n)).collect();
            let timings = CaptionSynchronizer::default().synchronize_words(&words, total);
            prop_assert_eq!(timings.len(), words.len());

            let mut previous_end = 0.0;
            for t in &timings {
                prop_assert!(t.start_secs <= t.end_secs);
                prop_assert!(t.start_secs >= previous_end - 1e-9);
                prop_assert!(t.end_secs <= total);
                previous_end = t.end_secs;
            }
            let sum: f64 = timings.iter().map(WordTiming::duration_secs).sum();
            prop_assert!((sum - total).abs() < 1e-6);
        }
    }
}
