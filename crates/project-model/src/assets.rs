//! Source media handed to the pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::Dimensions;

/// A still image for the slideshow band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub dimensions: Dimensions,
}

/// The gameplay clip for the video band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub path: PathBuf,
    pub dimensions: Dimensions,
    /// Length of the source clip in seconds.
    pub duration_secs: f64,
}

/// Ordered images plus one gameplay video. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetSet {
    pub images: Vec<ImageAsset>,
    pub video: Option<VideoAsset>,
}

impl AssetSet {
    pub fn new(images: Vec<ImageAsset>, video: Option<VideoAsset>) -> Self {
        Self { images, video }
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}

/// Short display label for an asset path (file name, or the whole path).
pub fn asset_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
