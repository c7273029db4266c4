//! Backend that writes the timeline as JSON instead of encoding it.
//!
//! Handy for inspecting a composition and for machines without ffmpeg.

use std::path::{Path, PathBuf};

use shortsmith_common::error::ShortsResult;
use shortsmith_project_model::timeline::Timeline;

use crate::backend::{write_atomically, ProgressCallback, RenderBackend, RenderProgress, RenderStage};

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineJsonBackend;

impl TimelineJsonBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for TimelineJsonBackend {
    fn render(
        &mut self,
        timeline: &Timeline,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> ShortsResult<PathBuf> {
        let json = serde_json::to_string_pretty(timeline)?;
        let path = write_atomically(output, |temp| {
            std::fs::write(temp, json.as_bytes())?;
            Ok(())
        })?;

        if let Some(cb) = &progress {
            let total_frames = timeline.total_frames();
            cb(RenderProgress {
                progress: 1.0,
                frames_rendered: total_frames,
                total_frames,
                eta_secs: 0.0,
                stage: RenderStage::Complete,
            });
        }
        tracing::info!(
            output = %path.display(),
            segments = timeline.segments.len(),
            "Wrote timeline JSON"
        );
        Ok(path)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "timeline-json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use shortsmith_project_model::geometry::Dimensions;
    use shortsmith_project_model::layout::VideoMode;

    #[test]
    fn test_writes_parseable_timeline() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("game.timeline.json");
        let timeline = Timeline {
            canvas: Dimensions::VERTICAL_HD,
            fps: 30,
            mode: VideoMode::NoCropBands,
            duration_secs: 12.5,
            segments: Vec::new(),
        };

        let stages = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stages);
        let callback: ProgressCallback = Box::new(move |p: RenderProgress| {
            seen.lock().unwrap().push(p.stage);
        });

        let path = TimelineJsonBackend::new()
            .render(&timeline, &output, Some(callback))
            .unwrap();
        let parsed: Timeline =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, timeline);
        assert_eq!(*stages.lock().unwrap(), vec![RenderStage::Complete]);
    }
}
