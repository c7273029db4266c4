//! Media probing via `ffprobe`.

use std::path::Path;
use std::process::Command;

use shortsmith_common::error::{ShortsError, ShortsResult};
pub use shortsmith_common::process::command_exists;
use shortsmith_project_model::geometry::Dimensions;

fn run_ffprobe(path: &Path, entries: &str) -> ShortsResult<String> {
    if !path.exists() {
        return Err(ShortsError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            entries,
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| ShortsError::asset_unavailable(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(ShortsError::asset_unavailable(format!(
            "ffprobe could not read {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `key=value` lines as printed by `ffprobe -of default=noprint_wrappers=1`.
pub fn parse_probe_output(raw: &str) -> ProbeInfo {
    let mut info = ProbeInfo::default();
    for line in raw.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "width" => info.width = value.parse().ok(),
            "height" => info.height = value.parse().ok(),
            // Stream duration wins over the container's when both are printed.
            "duration" => {
                if info.duration_secs.is_none() {
                    info.duration_secs = value.parse().ok().filter(|d: &f64| d.is_finite());
                }
            }
            _ => {}
        }
    }
    info
}

/// Fields read from ffprobe.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProbeInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_secs: Option<f64>,
}

impl ProbeInfo {
    pub fn dimensions(&self) -> Option<Dimensions> {
        Some(Dimensions::new(self.width?, self.height?))
    }
}

/// Pixel size of an image or the first video stream.
pub fn probe_dimensions(path: &Path) -> ShortsResult<Dimensions> {
    let raw = run_ffprobe(path, "stream=width,height")?;
    parse_probe_output(&raw).dimensions().ok_or_else(|| {
        ShortsError::asset_unavailable(format!("No video stream found in {}", path.display()))
    })
}

/// Pixel size and duration of a video.
pub fn probe_video(path: &Path) -> ShortsResult<(Dimensions, f64)> {
    let raw = run_ffprobe(path, "stream=width,height,duration:format=duration")?;
    let info = parse_probe_output(&raw);
    let dimensions = info.dimensions().ok_or_else(|| {
        ShortsError::asset_unavailable(format!("No video stream found in {}", path.display()))
    })?;
    let duration = info.duration_secs.ok_or_else(|| {
        ShortsError::asset_unavailable(format!("Unknown duration for {}", path.display()))
    })?;
    Ok((dimensions, duration))
}
