//! Timeline composer: merges images, gameplay video, narration and captions
//! into one layered timeline whose length is the narration's.

use shortsmith_common::config::AppConfig;
use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::assets::{asset_label, AssetSet, ImageAsset};
use shortsmith_project_model::geometry::Rect;
use shortsmith_project_model::layout::{FitStrategy, LayoutPlan};
use shortsmith_project_model::narration::{NarrationTrack, WordTiming};
use shortsmith_project_model::timeline::{KenBurns, Layer, Segment, SegmentContent, Timeline};

use crate::captions::{caption_segments, CaptionStyle};
use crate::layout::place;

/// Composer settings.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    pub fps: u32,
    /// Shortest time any single image may be shown.
    pub min_image_secs: f64,
    /// Zoom added over each image's window (0.08 = 1.0 -> 1.08).
    pub ken_burns_zoom: f64,
    pub background_color: String,
    pub max_words_per_phrase: usize,
    pub max_chars_per_phrase: usize,
    pub caption_style: CaptionStyle,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            min_image_secs: 2.0,
            ken_burns_zoom: 0.08,
            background_color: "black".to_string(),
            max_words_per_phrase: 8,
            max_chars_per_phrase: 60,
            caption_style: CaptionStyle::default(),
        }
    }
}

impl From<&AppConfig> for TimelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fps: config.video.fps,
            min_image_secs: config.timeline.min_image_secs,
            ken_burns_zoom: config.timeline.ken_burns_zoom,
            max_words_per_phrase: config.captions.max_words_per_phrase,
            max_chars_per_phrase: config.captions.max_chars_per_phrase,
            caption_style: CaptionStyle::from(&config.captions),
            ..Self::default()
        }
    }
}

/// One pass through the gameplay clip, mapped onto the output timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoSlice {
    pub start_secs: f64,
    pub end_secs: f64,
    pub source_start_secs: f64,
    pub source_end_secs: f64,
    pub loop_index: u32,
}

/// Display windows for `count` images over `total_secs`.
///
/// Images share the duration evenly. When that would give each less than
/// `min_secs`, only the first `floor(total / min)` images (at least one) are
/// kept.
pub fn image_windows(count: usize, total_secs: f64, min_secs: f64) -> Vec<(f64, f64)> {
    if count == 0 || total_secs <= 0.0 {
        return Vec::new();
    }
    let kept = if min_secs > 0.0 && total_secs / (count as f64) < min_secs {
        ((total_secs / min_secs).floor() as usize).clamp(1, count)
    } else {
        count
    };

    let per_image = total_secs / kept as f64;
    (0..kept)
        .map(|i| {
            let start = per_image * i as f64;
            let end = if i + 1 == kept {
                total_secs
            } else {
                per_image * (i + 1) as f64
            };
            (start, end)
        })
        .collect()
}

/// Shortest clip accepted, and the least an offset must leave of it. Every
/// loop is a separate render input, so this also caps the loop count at one
/// per second of narration.
pub const MIN_PLAYABLE_SECS: f64 = 1.0;

/// Slices of the gameplay clip that fill `total_secs`.
///
/// Playback starts at `start_offset` and restarts from the same offset each
/// time the clip runs out. An offset outside the clip, or one leaving less
/// than a second of it, falls back to 0. Clips shorter than
/// [`MIN_PLAYABLE_SECS`] are rejected.
pub fn video_slices(
    source_secs: f64,
    start_offset: f64,
    total_secs: f64,
) -> ShortsResult<Vec<VideoSlice>> {
    if !source_secs.is_finite() || source_secs < MIN_PLAYABLE_SECS {
        return Err(ShortsError::insufficient_assets(format!(
            "gameplay video is too short to loop ({source_secs}s, need {MIN_PLAYABLE_SECS}s)"
        )));
    }
    let offset = if start_offset.is_finite()
        && start_offset >= 0.0
        && start_offset < source_secs - MIN_PLAYABLE_SECS
    {
        start_offset
    } else {
        if start_offset != 0.0 {
            tracing::warn!(
                start_offset,
                source_secs,
                "Video start offset outside clip, playing from the beginning"
            );
        }
        0.0
    };
    let playable = source_secs - offset;

    let mut slices = Vec::new();
    let mut cursor = 0.0;
    let mut loop_index = 0u32;
    while total_secs - cursor > 1e-9 {
        let len = playable.min(total_secs - cursor);
        let end = if cursor + len >= total_secs - 1e-9 {
            total_secs
        } else {
            cursor + len
        };
        slices.push(VideoSlice {
            start_secs: cursor,
            end_secs: end,
            source_start_secs: offset,
            source_end_secs: offset + (end - cursor),
            loop_index,
        });
        cursor = end;
        loop_index += 1;
    }
    Ok(slices)
}

/// Ken Burns motion for the `index`-th image: a slow zoom in while panning,
/// left-to-right on even images and right-to-left on odd ones.
pub fn ken_burns_for(index: usize, zoom: f64) -> KenBurns {
    let (from_x, to_x) = if index % 2 == 0 { (0.45, 0.55) } else { (0.55, 0.45) };
    KenBurns {
        zoom_from: 1.0,
        zoom_to: 1.0 + zoom.max(0.0),
        focus_from: (from_x, 0.5),
        focus_to: (to_x, 0.5),
    }
}

/// Builds timelines.
#[derive(Debug, Clone, Default)]
pub struct TimelineComposer {
    config: TimelineConfig,
}

impl TimelineComposer {
    pub fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Compose the timeline.
    ///
    /// Fails with `InsufficientAssets` when there are no images or no video,
    /// and with `InvalidAssetDimensions` when an asset cannot be placed.
    pub fn compose(
        &self,
        assets: &AssetSet,
        plan: &LayoutPlan,
        narration: &NarrationTrack,
        timings: &[WordTiming],
        video_start_secs: f64,
    ) -> ShortsResult<Timeline> {
        if assets.images.is_empty() {
            return Err(ShortsError::insufficient_assets("no images to show"));
        }
        let video = assets
            .video
            .as_ref()
            .ok_or_else(|| ShortsError::insufficient_assets("no gameplay video"))?;

        let image_band = plan
            .image_band()
            .ok_or_else(|| ShortsError::config("layout plan has no image band"))?;
        let video_band = plan
            .video_band()
            .ok_or_else(|| ShortsError::config("layout plan has no video band"))?;

        let total = narration.duration_secs();
        let strategy = plan.mode.fit_strategy();
        let mut segments = Vec::new();

        segments.push(Segment {
            layer: Layer::Background,
            start_secs: 0.0,
            end_secs: total,
            rect: Some(Rect::full(plan.canvas)),
            content: SegmentContent::Fill {
                color: self.config.background_color.clone(),
            },
        });

        let windows = image_windows(assets.images.len(), total, self.config.min_image_secs);
        if windows.len() < assets.images.len() {
            tracing::info!(
                kept = windows.len(),
                dropped = assets.images.len() - windows.len(),
                min_image_secs = self.config.min_image_secs,
                "Dropping images to keep the minimum display time"
            );
        }
        for (index, (image, (start, end))) in assets.images.iter().zip(windows).enumerate() {
            segments.push(self.image_segment(index, image, image_band, strategy, start, end)?);
        }

        let video_placement = place(
            video.dimensions,
            video_band,
            strategy,
            &asset_label(&video.path),
        )?;
        for slice in video_slices(video.duration_secs, video_start_secs, total)? {
            segments.push(Segment {
                layer: Layer::Video,
                start_secs: slice.start_secs,
                end_secs: slice.end_secs,
                rect: Some(video_band),
                content: SegmentContent::Video {
                    path: video.path.clone(),
                    placement: video_placement,
                    source_start_secs: slice.source_start_secs,
                    source_end_secs: slice.source_end_secs,
                    loop_index: slice.loop_index,
                },
            });
        }

        if let Some(caption_band) = plan.caption_band() {
            segments.extend(caption_segments(
                timings,
                caption_band,
                self.config.max_words_per_phrase,
                self.config.max_chars_per_phrase,
                &self.config.caption_style,
            ));
        }

        segments.push(Segment {
            layer: Layer::Audio,
            start_secs: 0.0,
            end_secs: total,
            rect: None,
            content: SegmentContent::Narration {
                path: narration.audio_path().to_path_buf(),
            },
        });

        segments.sort_by(|a, b| {
            a.layer
                .cmp(&b.layer)
                .then(a.start_secs.total_cmp(&b.start_secs))
        });

        tracing::info!(
            mode = %plan.mode,
            duration_secs = total,
            segments = segments.len(),
            "Timeline composed"
        );

        Ok(Timeline {
            canvas: plan.canvas,
            fps: self.config.fps,
            mode: plan.mode,
            duration_secs: total,
            segments,
        })
    }

    fn image_segment(
        &self,
        index: usize,
        image: &ImageAsset,
        band: Rect,
        strategy: FitStrategy,
        start: f64,
        end: f64,
    ) -> ShortsResult<Segment> {
        let placement = place(image.dimensions, band, strategy, &asset_label(&image.path))?;
        Ok(Segment {
            layer: Layer::Image,
            start_secs: start,
            end_secs: end,
            rect: Some(band),
            content: SegmentContent::Image {
                path: image.path.clone(),
                placement,
                motion: ken_burns_for(index, self.config.ken_burns_zoom),
            },
        })
    }
}
