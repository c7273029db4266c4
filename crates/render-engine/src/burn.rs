//! Burning word-highlight captions into an existing video.
//!
//! The source keeps its picture and audio; only the `drawtext` pairs are
//! added on top, then the result is re-encoded.

use std::path::{Path, PathBuf};

use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::geometry::Dimensions;
use shortsmith_project_model::timeline::{Segment, SegmentContent};

use crate::backend::{ProgressCallback, RenderBackend, RenderSettings};
use crate::export::{codec_args, drawtext_pair, FfmpegBackend, FfmpegPlan};

/// A finished video and the caption segments to draw over it.
#[derive(Debug, Clone)]
pub struct CaptionBurn {
    pub source: PathBuf,
    pub frame: Dimensions,
    pub fps: u32,
    pub duration_secs: f64,
    /// Segments on the caption layer; anything else is ignored.
    pub captions: Vec<Segment>,
}

impl CaptionBurn {
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs.max(0.0) * self.fps.max(1) as f64).round() as u64
    }
}

/// Backends that can caption an existing video.
pub trait CaptionBurner: Send {
    /// Write a captioned copy of `job.source` to `output` and return the
    /// final path. On failure no file is left at `output`.
    fn burn(
        &mut self,
        job: &CaptionBurn,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> ShortsResult<PathBuf>;

    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// ffmpeg arguments and filter graph for a caption burn.
pub fn build_burn_plan(
    job: &CaptionBurn,
    settings: &RenderSettings,
    output: &Path,
    graph_path: &Path,
) -> ShortsResult<FfmpegPlan> {
    if job.duration_secs <= 0.0 || !job.duration_secs.is_finite() {
        return Err(ShortsError::render("Source video has no duration"));
    }
    if job.frame.is_degenerate() {
        return Err(ShortsError::render("Source video has no picture"));
    }

    let draws: Vec<String> = job
        .captions
        .iter()
        .filter_map(|segment| match &segment.content {
            SegmentContent::Caption(cue) => Some((segment, cue)),
            _ => None,
        })
        .flat_map(|(segment, cue)| drawtext_pair(segment, cue, settings))
        .collect();
    if draws.is_empty() {
        return Err(ShortsError::render("No captions to draw"));
    }

    let fps = job.fps.max(1);
    let filter_graph = format!("[0:v]{},format=yuv420p[vout]", draws.join(","));

    let mut args = vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        job.source.display().to_string(),
        "-filter_complex_script".to_string(),
        graph_path.display().to_string(),
        "-map".to_string(),
        "[vout]".to_string(),
        // Keep the source's audio when it has any.
        "-map".to_string(),
        "0:a?".to_string(),
    ];
    args.extend(codec_args(settings, true));
    args.extend([
        "-r".to_string(),
        fps.to_string(),
        "-t".to_string(),
        format!("{:.3}", job.duration_secs),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-nostats".to_string(),
        output.display().to_string(),
    ]);

    Ok(FfmpegPlan {
        args,
        filter_graph,
        input_count: 1,
        total_frames: job.total_frames(),
        expected_duration_secs: job.duration_secs,
    })
}

impl CaptionBurner for FfmpegBackend {
    fn burn(
        &mut self,
        job: &CaptionBurn,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> ShortsResult<PathBuf> {
        if !job.source.exists() {
            return Err(ShortsError::FileNotFound {
                path: job.source.clone(),
            });
        }
        if job.source == output {
            return Err(ShortsError::render(
                "Captioned output would overwrite its source",
            ));
        }

        let final_path = self.execute(output, job.total_frames(), progress, |temp, graph| {
            build_burn_plan(job, self.settings(), temp, graph)
        })?;
        tracing::info!(
            source = %job.source.display(),
            output = %final_path.display(),
            "Captions burned in"
        );
        Ok(final_path)
    }

    fn is_available(&self) -> bool {
        RenderBackend::is_available(self)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortsmith_project_model::geometry::Rect;
    use shortsmith_project_model::timeline::{CaptionCue, Layer};

    fn cue_segment(word: &str, index: usize, start: f64, end: f64) -> Segment {
        Segment {
            layer: Layer::Caption,
            start_secs: 0.0,
            end_secs: 2.0,
            rect: Some(Rect::new(300, 920, 200, 80)),
            content: SegmentContent::Caption(CaptionCue {
                word: word.to_string(),
                word_index: index,
                phrase_index: 0,
                x: 300 + 220 * index as u32,
                y: 920,
                font_size: 80,
                highlight_start_secs: start,
                highlight_end_secs: end,
            }),
        }
    }

    fn job() -> CaptionBurn {
        CaptionBurn {
            source: PathBuf::from("/videos/satisfactory.mp4"),
            frame: Dimensions::new(1080, 1920),
            fps: 30,
            duration_secs: 2.0,
            captions: vec![cue_segment("Build", 0, 0.0, 0.8), cue_segment("faster", 1, 0.8, 2.0)],
        }
    }

    fn plan(job: &CaptionBurn) -> ShortsResult<FfmpegPlan> {
        build_burn_plan(
            job,
            &RenderSettings::default(),
            Path::new("/videos/.satisfactory_with_captions.partial.mp4"),
            Path::new("/videos/.satisfactory_with_captions.partial.filtergraph.txt"),
        )
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_burn_plan_args_keep_source_audio() {
        let plan = plan(&job()).unwrap();
        assert_eq!(plan.input_count, 1);
        assert_eq!(plan.args.iter().filter(|a| *a == "-i").count(), 1);
        assert!(has_pair(&plan.args, "-i", "/videos/satisfactory.mp4"));
        assert!(has_pair(
            &plan.args,
            "-filter_complex_script",
            "/videos/.satisfactory_with_captions.partial.filtergraph.txt"
        ));
        assert!(has_pair(&plan.args, "-map", "[vout]"));
        assert!(has_pair(&plan.args, "-map", "0:a?"));
        assert!(has_pair(&plan.args, "-c:v", "libx264"));
        assert!(has_pair(&plan.args, "-c:a", "aac"));
        assert!(has_pair(&plan.args, "-t", "2.000"));
        assert!(!plan.args.iter().any(|a| a == "-an"));
        assert_eq!(
            plan.args.last().map(String::as_str),
            Some("/videos/.satisfactory_with_captions.partial.mp4")
        );
        assert_eq!(plan.total_frames, 60);
    }

    #[test]
    fn test_burn_graph_draws_each_word_twice() {
        let graph = plan(&job()).unwrap().filter_graph;
        assert!(graph.starts_with("[0:v]drawtext=text='Build'"));
        assert!(graph.ends_with(",format=yuv420p[vout]"));
        assert_eq!(graph.matches("drawtext=").count(), 4);
        assert!(graph.contains("x=520:y=920"));
        assert!(graph.contains("enable='gte(t,0.800)*lt(t,2.000)'"));
        assert!(!graph.contains("overlay"));
    }

    #[test]
    fn test_burn_plan_rejects_empty_jobs() {
        let mut no_captions = job();
        no_captions.captions.clear();
        assert!(matches!(plan(&no_captions), Err(ShortsError::Render { .. })));

        let mut no_duration = job();
        no_duration.duration_secs = 0.0;
        assert!(matches!(plan(&no_duration), Err(ShortsError::Render { .. })));
    }

    #[test]
    fn test_burn_requires_existing_source() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("captioned.mp4");
        let mut backend = FfmpegBackend::new(RenderSettings::default());
        let err = backend.burn(&job(), &output, None).unwrap_err();
        assert!(matches!(err, ShortsError::FileNotFound { .. }));
        assert!(!output.exists());
    }
}
