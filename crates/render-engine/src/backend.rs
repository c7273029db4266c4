//! Render backend trait, progress reporting, and atomic output.

use std::path::{Path, PathBuf};

use shortsmith_common::config::AppConfig;
use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::timeline::Timeline;

/// Progress callback for rendering.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Render progress report.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: RenderStage,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
}

/// Trait for render backends (ffmpeg, timeline dump, test fakes).
pub trait RenderBackend: Send {
    /// Render `timeline` to `output` and return the final path.
    ///
    /// On failure no file is left at `output`.
    fn render(
        &mut self,
        timeline: &Timeline,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> ShortsResult<PathBuf>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Encoder and caption styling settings.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u32,
    pub audio_bitrate_kbps: u32,
    pub font_color: String,
    pub highlight_color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub font_file: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RenderSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            video_codec: config.video.video_codec.clone(),
            audio_codec: config.video.audio_codec.clone(),
            preset: config.video.preset.clone(),
            crf: config.video.crf,
            audio_bitrate_kbps: config.video.audio_bitrate_kbps,
            font_color: config.captions.font_color.clone(),
            highlight_color: config.captions.highlight_color.clone(),
            stroke_color: config.captions.stroke_color.clone(),
            stroke_width: config.captions.stroke_width,
            font_file: config.captions.font_file.clone(),
        }
    }
}

/// Sibling path used while a render is in progress.
///
/// Keeps the extension so encoders can infer the container:
/// `out/game.mp4` becomes `out/.game.partial.mp4`.
pub fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    let name = match output.extension() {
        Some(ext) => format!(".{stem}.partial.{}", ext.to_string_lossy()),
        None => format!(".{stem}.partial"),
    };
    output.with_file_name(name)
}

/// Run `write` against a temporary sibling of `output`, then rename it into
/// place. The temporary file is removed if `write` or the rename fails.
pub fn write_atomically<F>(output: &Path, write: F) -> ShortsResult<PathBuf>
where
    F: FnOnce(&Path) -> ShortsResult<()>,
{
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp = partial_path(output);
    let result = write(&temp).and_then(|()| {
        std::fs::rename(&temp, output).map_err(|e| {
            ShortsError::render(format!(
                "Failed to move {} into place at {}: {e}",
                temp.display(),
                output.display()
            ))
        })
    });

    match result {
        Ok(()) => Ok(output.to_path_buf()),
        Err(err) => {
            if temp.exists() {
                if let Err(e) = std::fs::remove_file(&temp) {
                    tracing::warn!(error = %e, path = %temp.display(), "Failed to remove partial output");
                }
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path_keeps_extension() {
        assert_eq!(
            partial_path(Path::new("/out/satisfactory_no_crop_bands.mp4")),
            PathBuf::from("/out/.satisfactory_no_crop_bands.partial.mp4")
        );
        assert_eq!(
            partial_path(Path::new("timeline")),
            PathBuf::from(".timeline.partial")
        );
    }

    #[test]
    fn test_write_atomically_renames_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("videos").join("game.mp4");
        let path = write_atomically(&output, |temp| {
            std::fs::write(temp, b"frames")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(path, output);
        assert_eq!(std::fs::read(&output).unwrap(), b"frames");
        assert!(!partial_path(&output).exists());
    }

    #[test]
    fn test_write_atomically_leaves_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("game.mp4");
        let err = write_atomically(&output, |temp| {
            std::fs::write(temp, b"half a video")?;
            Err(ShortsError::render("encoder crashed"))
        })
        .unwrap_err();
        assert!(matches!(err, ShortsError::Render { .. }));
        assert!(!output.exists());
        assert!(!partial_path(&output).exists());
    }
}
