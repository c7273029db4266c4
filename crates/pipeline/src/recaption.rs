//! Captioning a video that already exists.
//!
//! ```text
//! probe ─► script ─► word timings ─► caption region ─► burn
//! ```
//!
//! The video's own length stands in for the narration duration, so timings
//! are spread over the whole clip.

use std::path::{Path, PathBuf};

use shortsmith_common::config::AppConfig;
use shortsmith_common::error::{ShortsError, Stage};
use shortsmith_processing_core::captions::{
    caption_segments, centered_caption_region, CaptionStyle, CaptionSynchronizer, SyncConfig,
};
use shortsmith_project_model::narration::{NarrationTrack, WordTiming};
use shortsmith_project_model::script::{Script, ScriptSource, WordBand};
use shortsmith_render_engine::backend::ProgressCallback;
use shortsmith_render_engine::burn::{CaptionBurn, CaptionBurner};

use crate::assets::MediaProbe;
use crate::error::{AtStage, PipelineError, PipelineResult};
use crate::runner::{read_script_file, ScriptInput};

/// What to caption and where to put the result.
#[derive(Debug, Clone)]
pub struct CaptionVideoRequest {
    pub video: PathBuf,
    pub script: ScriptInput,
    /// Defaults to `<stem>_with_captions.<ext>` next to the video.
    pub output: Option<PathBuf>,
}

impl CaptionVideoRequest {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| captioned_path(&self.video))
    }
}

/// Result of a caption burn.
#[derive(Debug, Clone)]
pub struct CaptionedVideo {
    pub output: PathBuf,
    pub script: Script,
    pub timings: Vec<WordTiming>,
    pub duration_secs: f64,
}

/// `clips/run.mov` becomes `clips/run_with_captions.mov`.
pub fn captioned_path(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let ext = video
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    video.with_file_name(format!("{stem}_with_captions.{ext}"))
}

/// Burn word-highlight captions for `request.script` into `request.video`.
pub fn caption_video(
    config: &AppConfig,
    request: &CaptionVideoRequest,
    probe: &dyn MediaProbe,
    burner: &mut dyn CaptionBurner,
    progress: Option<ProgressCallback>,
) -> PipelineResult<CaptionedVideo> {
    if !request.video.is_file() {
        return Err(PipelineError::new(
            Stage::Assets,
            ShortsError::FileNotFound {
                path: request.video.clone(),
            },
        ));
    }
    let (frame, duration_secs) = probe.video_info(&request.video).at(Stage::Assets)?;
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(PipelineError::new(
            Stage::Assets,
            ShortsError::insufficient_assets(format!(
                "{} has no playable length",
                request.video.display()
            )),
        ));
    }
    tracing::info!(
        video = %request.video.display(),
        width = frame.width,
        height = frame.height,
        duration_secs,
        "Captioning existing video"
    );

    let text = match &request.script {
        ScriptInput::Text(text) => text.clone(),
        ScriptInput::File(path) => read_script_file(path).at(Stage::Script)?,
        ScriptInput::Generate { .. } => {
            return Err(PipelineError::new(
                Stage::Script,
                ShortsError::unsupported("Captioning a video needs its script text"),
            ))
        }
    };
    let script = Script::new(
        &text,
        WordBand::SHORT,
        ScriptSource::UserProvided,
        config.tts.words_per_minute,
    );
    if script.is_empty() {
        return Err(PipelineError::new(
            Stage::Script,
            ShortsError::synthesis("Script has no words to caption"),
        ));
    }

    let track = NarrationTrack::new(&request.video, duration_secs).at(Stage::Captions)?;
    let timings =
        CaptionSynchronizer::new(SyncConfig::from(&config.captions)).synchronize(&script, &track);

    let style = CaptionStyle::from(&config.captions);
    let region = centered_caption_region(frame, &style);
    let captions = caption_segments(
        &timings,
        region,
        config.captions.max_words_per_phrase,
        config.captions.max_chars_per_phrase,
        &style,
    );
    tracing::info!(words = timings.len(), cues = captions.len(), "Caption cues laid out");

    let job = CaptionBurn {
        source: request.video.clone(),
        frame,
        fps: config.video.fps,
        duration_secs,
        captions,
    };
    let output = burner
        .burn(&job, &request.output_path(), progress)
        .at(Stage::Render)?;

    Ok(CaptionedVideo {
        output,
        script,
        timings,
        duration_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captioned_path_keeps_container() {
        assert_eq!(
            captioned_path(Path::new("out/satisfactory.mp4")),
            PathBuf::from("out/satisfactory_with_captions.mp4")
        );
        assert_eq!(
            captioned_path(Path::new("clips/run.mov")),
            PathBuf::from("clips/run_with_captions.mov")
        );
        assert_eq!(
            captioned_path(Path::new("raw")),
            PathBuf::from("raw_with_captions.mp4")
        );
    }
}
