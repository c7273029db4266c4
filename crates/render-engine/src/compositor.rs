//! Frame compositor: what the timeline shows at a given frame.
//!
//! Backends draw the timeline in one pass; this module resolves it frame by
//! frame so a timeline can be checked before spending minutes encoding it.

use std::path::PathBuf;

use serde::Serialize;
use shortsmith_project_model::timeline::{Layer, SegmentContent, Timeline};

/// A single frame's composition.
#[derive(Debug, Clone, Serialize)]
pub struct FrameComposition {
    pub frame_index: u64,
    pub time_secs: f64,
    pub image: Option<ImageFrame>,
    pub video: Option<VideoFrame>,
    /// Word highlighted at this instant, if captions are present.
    pub highlighted_word: Option<String>,
    /// Number of caption words on screen.
    pub caption_words: usize,
}

/// Slideshow state for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct ImageFrame {
    pub path: PathBuf,
    pub zoom: f64,
    pub focus: (f64, f64),
}

/// Gameplay state for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct VideoFrame {
    pub path: PathBuf,
    /// Position inside the source clip.
    pub source_time_secs: f64,
    pub loop_index: u32,
}

/// Resolve the timeline at `time_secs`.
pub fn compose_frame(timeline: &Timeline, frame_index: u64, time_secs: f64) -> FrameComposition {
    let mut composition = FrameComposition {
        frame_index,
        time_secs,
        image: None,
        video: None,
        highlighted_word: None,
        caption_words: 0,
    };

    for segment in timeline.active_at(time_secs) {
        let progress = if segment.duration_secs() > 0.0 {
            (time_secs - segment.start_secs) / segment.duration_secs()
        } else {
            0.0
        };

        match (&segment.layer, &segment.content) {
            (Layer::Image, SegmentContent::Image { path, motion, .. }) => {
                composition.image = Some(ImageFrame {
                    path: path.clone(),
                    zoom: motion.zoom_at(progress),
                    focus: motion.focus_at(progress),
                });
            }
            (
                Layer::Video,
                SegmentContent::Video {
                    path,
                    source_start_secs,
                    loop_index,
                    ..
                },
            ) => {
                composition.video = Some(VideoFrame {
                    path: path.clone(),
                    source_time_secs: source_start_secs + (time_secs - segment.start_secs),
                    loop_index: *loop_index,
                });
            }
            (Layer::Caption, SegmentContent::Caption(cue)) => {
                composition.caption_words += 1;
                if cue.is_highlighted(time_secs) {
                    composition.highlighted_word = Some(cue.word.clone());
                }
            }
            _ => {}
        }
    }

    composition
}

/// Compose every `stride`-th frame of the timeline.
pub fn compute_compositions(timeline: &Timeline, stride: u64) -> Vec<FrameComposition> {
    let fps = timeline.fps.max(1) as f64;
    let stride = stride.max(1);
    let total_frames = timeline.total_frames();

    (0..total_frames)
        .step_by(stride as usize)
        .map(|frame| compose_frame(timeline, frame, frame as f64 / fps))
        .filter(|c| c.time_secs < timeline.duration_secs)
        .collect()
}

/// Frames whose bands would render empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageReport {
    pub sampled_frames: usize,
    pub frames_without_image: usize,
    pub frames_without_video: usize,
    /// Frames with captions on screen but no highlighted word.
    pub frames_without_highlight: usize,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.frames_without_image == 0
            && self.frames_without_video == 0
            && self.frames_without_highlight == 0
    }
}

/// Sample the timeline and count gaps in each band.
pub fn check_coverage(timeline: &Timeline, stride: u64) -> CoverageReport {
    let compositions = compute_compositions(timeline, stride);
    let mut report = CoverageReport {
        sampled_frames: compositions.len(),
        ..CoverageReport::default()
    };

    for comp in &compositions {
        if comp.image.is_none() {
            report.frames_without_image += 1;
        }
        if comp.video.is_none() {
            report.frames_without_video += 1;
        }
        if comp.caption_words > 0 && comp.highlighted_word.is_none() {
            report.frames_without_highlight += 1;
        }
    }

    report
}
