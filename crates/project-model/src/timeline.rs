//! The composed timeline consumed by renderers.
//!
//! A timeline is a flat list of segments. Each segment binds one source to a
//! canvas rectangle and a half-open time interval `[start, end)`. Layers
//! determine stacking order; within a layer, segments do not overlap in time
//! (caption cues excepted, which share their phrase's span).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, Rect};
use crate::layout::{Placement, VideoMode};

/// Stacking layer, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Background,
    Image,
    Video,
    Caption,
    /// Audio-only; not drawn.
    Audio,
}

/// Slow zoom/pan across a still image's display window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KenBurns {
    pub zoom_from: f64,
    pub zoom_to: f64,
    /// Normalized focus point `(x, y)` at the start of the window.
    pub focus_from: (f64, f64),
    /// Normalized focus point at the end of the window.
    pub focus_to: (f64, f64),
}

impl KenBurns {
    /// No motion at all.
    pub const STILL: KenBurns = KenBurns {
        zoom_from: 1.0,
        zoom_to: 1.0,
        focus_from: (0.5, 0.5),
        focus_to: (0.5, 0.5),
    };

    /// Zoom factor at `progress` in `[0, 1]` through the window.
    pub fn zoom_at(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        self.zoom_from + (self.zoom_to - self.zoom_from) * t
    }

    /// Focus point at `progress` in `[0, 1]` through the window.
    pub fn focus_at(&self, progress: f64) -> (f64, f64) {
        let t = progress.clamp(0.0, 1.0);
        (
            self.focus_from.0 + (self.focus_to.0 - self.focus_from.0) * t,
            self.focus_from.1 + (self.focus_to.1 - self.focus_from.1) * t,
        )
    }
}

/// One word of an on-screen caption phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    pub word: String,
    /// Position of the word in the script.
    pub word_index: usize,
    /// Phrase the word belongs to.
    pub phrase_index: usize,
    /// Canvas position of the word's top-left corner.
    pub x: u32,
    pub y: u32,
    pub font_size: u32,
    /// Interval during which the word is drawn highlighted.
    pub highlight_start_secs: f64,
    pub highlight_end_secs: f64,
}

impl CaptionCue {
    pub fn is_highlighted(&self, time_secs: f64) -> bool {
        time_secs >= self.highlight_start_secs && time_secs < self.highlight_end_secs
    }
}

/// What a segment shows or plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentContent {
    /// Solid color fill.
    Fill { color: String },
    /// Still image with Ken Burns motion.
    Image {
        path: PathBuf,
        placement: Placement,
        motion: KenBurns,
    },
    /// A slice of the gameplay clip, `[source_start, source_end)` in source time.
    Video {
        path: PathBuf,
        placement: Placement,
        source_start_secs: f64,
        source_end_secs: f64,
        /// Zero for the first pass through the clip, then 1, 2, ...
        loop_index: u32,
    },
    /// One caption word.
    Caption(CaptionCue),
    /// The narration audio.
    Narration { path: PathBuf },
}

/// A source bound to a rectangle and a time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub layer: Layer,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Canvas region; `None` for audio.
    pub rect: Option<Rect>,
    pub content: SegmentContent,
}

impl Segment {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    pub fn is_active(&self, time_secs: f64) -> bool {
        time_secs >= self.start_secs && time_secs < self.end_secs
    }
}

/// The merged description of a finished video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub canvas: Dimensions,
    pub fps: u32,
    pub mode: VideoMode,
    /// Total duration; equals the narration duration.
    pub duration_secs: f64,
    pub segments: Vec<Segment>,
}

impl Timeline {
    pub fn segments_on(&self, layer: Layer) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.layer == layer)
    }

    /// Segments visible or audible at `time_secs`, bottom layer first.
    pub fn active_at(&self, time_secs: f64) -> Vec<&Segment> {
        let mut active: Vec<&Segment> = self
            .segments
            .iter()
            .filter(|s| s.is_active(time_secs))
            .collect();
        active.sort_by_key(|s| s.layer);
        active
    }

    /// Summed segment length on one layer.
    pub fn layer_coverage_secs(&self, layer: Layer) -> f64 {
        self.segments_on(layer).map(Segment::duration_secs).sum()
    }

    /// Latest segment end.
    pub fn end_secs(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end_secs)
            .fold(0.0, f64::max)
    }

    /// Total frames at the timeline's frame rate.
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * self.fps.max(1) as f64).ceil() as u64
    }
}
