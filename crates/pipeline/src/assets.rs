//! Asset providers.
//!
//! Providers hand the pipeline an [`AssetSet`] that is already on disk. Nothing
//! here downloads anything.

use std::path::{Path, PathBuf};

use shortsmith_common::config::AssetDefaults;
use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::assets::{asset_label, AssetSet, ImageAsset, VideoAsset};
use shortsmith_project_model::geometry::Dimensions;
use shortsmith_render_engine::probe::{probe_dimensions, probe_video};

/// Source of the images and gameplay clip for one run.
pub trait AssetProvider {
    fn provide(&self) -> ShortsResult<AssetSet>;
}

/// A prepared set is its own provider.
impl AssetProvider for AssetSet {
    fn provide(&self) -> ShortsResult<AssetSet> {
        Ok(self.clone())
    }
}

/// Reads pixel sizes and durations of media files.
pub trait MediaProbe {
    fn image_dimensions(&self, path: &Path) -> ShortsResult<Dimensions>;
    fn video_info(&self, path: &Path) -> ShortsResult<(Dimensions, f64)>;
}

/// Probes with the system `ffprobe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeProbe;

impl MediaProbe for FfprobeProbe {
    fn image_dimensions(&self, path: &Path) -> ShortsResult<Dimensions> {
        probe_dimensions(path)
    }

    fn video_info(&self, path: &Path) -> ShortsResult<(Dimensions, f64)> {
        probe_video(path)
    }
}

/// Images from a directory plus one video file.
pub struct DirectoryAssetProvider<P: MediaProbe = FfprobeProbe> {
    images_dir: PathBuf,
    video: PathBuf,
    rules: AssetDefaults,
    probe: P,
}

impl DirectoryAssetProvider<FfprobeProbe> {
    pub fn new(images_dir: impl Into<PathBuf>, video: impl Into<PathBuf>, rules: AssetDefaults) -> Self {
        Self::with_probe(images_dir, video, rules, FfprobeProbe)
    }
}

impl<P: MediaProbe> DirectoryAssetProvider<P> {
    pub fn with_probe(
        images_dir: impl Into<PathBuf>,
        video: impl Into<PathBuf>,
        rules: AssetDefaults,
        probe: P,
    ) -> Self {
        Self {
            images_dir: images_dir.into(),
            video: video.into(),
            rules,
            probe,
        }
    }

    fn load_images(&self) -> ShortsResult<Vec<ImageAsset>> {
        let mut images = Vec::new();
        for path in select_images(&self.images_dir, &self.rules)? {
            match self.probe.image_dimensions(&path) {
                Ok(dimensions) => images.push(ImageAsset { path, dimensions }),
                Err(e) => {
                    tracing::warn!(image = %asset_label(&path), error = %e, "Skipping unreadable image");
                }
            }
        }
        Ok(images)
    }

    fn load_video(&self) -> ShortsResult<VideoAsset> {
        if !self.video.is_file() {
            return Err(ShortsError::asset_unavailable(format!(
                "Gameplay video not found: {}",
                self.video.display()
            )));
        }
        let (dimensions, duration_secs) = self.probe.video_info(&self.video).map_err(|e| {
            ShortsError::asset_unavailable(format!(
                "Cannot read gameplay video {}: {e}",
                self.video.display()
            ))
        })?;
        Ok(VideoAsset {
            path: self.video.clone(),
            dimensions,
            duration_secs,
        })
    }
}

impl<P: MediaProbe> AssetProvider for DirectoryAssetProvider<P> {
    fn provide(&self) -> ShortsResult<AssetSet> {
        let images = self.load_images()?;
        if images.len() < self.rules.min_images {
            return Err(ShortsError::asset_unavailable(format!(
                "Found {} usable images in {}, need at least {}",
                images.len(),
                self.images_dir.display(),
                self.rules.min_images
            )));
        }
        let video = self.load_video()?;

        tracing::info!(
            images = images.len(),
            video = %asset_label(&video.path),
            video_secs = video.duration_secs,
            "Assets loaded"
        );
        Ok(AssetSet::new(images, Some(video)))
    }
}

/// Image files in `dir` worth showing, largest first.
///
/// Extensions are matched case-insensitively. Files under `min_file_size`
/// bytes are treated as thumbnails and skipped. Ties on size sort by name.
pub fn select_images(dir: &Path, rules: &AssetDefaults) -> ShortsResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ShortsError::asset_unavailable(format!("Cannot read images directory {}: {e}", dir.display()))
    })?;

    let mut candidates: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let wanted = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                rules
                    .image_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false);
        if !wanted {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        if metadata.len() < rules.min_file_size {
            tracing::debug!(image = %asset_label(&path), bytes = metadata.len(), "Skipping small image");
            continue;
        }
        candidates.push((metadata.len(), path));
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    candidates.truncate(rules.max_images);
    Ok(candidates.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe;

    impl MediaProbe for FixedProbe {
        fn image_dimensions(&self, path: &Path) -> ShortsResult<Dimensions> {
            if path.to_string_lossy().contains("corrupt") {
                return Err(ShortsError::asset_unavailable("bad header"));
            }
            Ok(Dimensions::new(1920, 1080))
        }

        fn video_info(&self, _path: &Path) -> ShortsResult<(Dimensions, f64)> {
            Ok((Dimensions::new(1280, 720), 42.0))
        }
    }

    fn write_file(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    #[test]
    fn test_select_images_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.jpg", 40_000);
        write_file(dir.path(), "a.PNG", 40_000);
        write_file(dir.path(), "huge.webp", 90_000);
        write_file(dir.path(), "thumb.jpg", 5_000);
        write_file(dir.path(), "notes.txt", 90_000);
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let names: Vec<String> = select_images(dir.path(), &AssetDefaults::default())
            .unwrap()
            .iter()
            .map(|p| asset_label(p))
            .collect();
        assert_eq!(names, vec!["huge.webp", "a.PNG", "b.jpg"]);
    }

    #[test]
    fn test_select_images_caps_count() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_file(dir.path(), &format!("shot_{i}.jpg"), 30_000 + i * 10);
        }
        let rules = AssetDefaults {
            max_images: 3,
            ..AssetDefaults::default()
        };
        let picked = select_images(dir.path(), &rules).unwrap();
        assert_eq!(picked.len(), 3);
        assert_eq!(asset_label(&picked[0]), "shot_4.jpg");
    }

    #[test]
    fn test_provider_skips_unreadable_images() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "good.jpg", 40_000);
        write_file(dir.path(), "corrupt.jpg", 50_000);
        let video = write_file(dir.path(), "trailer.mp4", 10);

        let provider =
            DirectoryAssetProvider::with_probe(dir.path(), &video, AssetDefaults::default(), FixedProbe);
        let set = provider.provide().unwrap();
        assert_eq!(set.image_count(), 1);
        assert_eq!(set.video.as_ref().map(|v| v.duration_secs), Some(42.0));
    }

    #[test]
    fn test_provider_requires_video_and_images() {
        let dir = tempfile::tempdir().unwrap();
        let missing_video = dir.path().join("missing.mp4");
        write_file(dir.path(), "good.jpg", 40_000);

        let err = DirectoryAssetProvider::with_probe(
            dir.path(),
            &missing_video,
            AssetDefaults::default(),
            FixedProbe,
        )
        .provide()
        .unwrap_err();
        assert!(matches!(err, ShortsError::AssetUnavailable { .. }));

        let empty = tempfile::tempdir().unwrap();
        let video = write_file(empty.path(), "trailer.mp4", 10);
        let err = DirectoryAssetProvider::with_probe(
            empty.path(),
            &video,
            AssetDefaults::default(),
            FixedProbe,
        )
        .provide()
        .unwrap_err();
        assert!(matches!(err, ShortsError::AssetUnavailable { .. }));
    }
}
