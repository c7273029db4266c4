//! Layout engine: canvas banding and content placement.
//!
//! Bands are stacked top to bottom and always span the full canvas width:
//!
//! ```text
//! ┌──────────────┐  margin      7.5%
//! │   images     │  image band  40%   (captions mode: lower quarter is captions)
//! ├──────────────┤  separator   1.25%
//! │   gameplay   │  video band  43.75%
//! └──────────────┘  margin      remainder
//! ```
//!
//! The bottom margin absorbs rounding, so the bands always partition the
//! canvas exactly.

use shortsmith_common::error::{ShortsError, ShortsResult};
use shortsmith_project_model::geometry::{Dimensions, Rect};
use shortsmith_project_model::layout::{
    Band, BandRole, FitStrategy, LayoutPlan, Placement, VideoMode,
};

/// Band proportions, as fractions of canvas height.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub top_margin_ratio: f64,
    pub image_ratio: f64,
    pub separator_ratio: f64,
    pub video_ratio: f64,
    /// Share of the image band given to captions in captions mode.
    pub caption_share: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            top_margin_ratio: 0.075,
            image_ratio: 0.40,
            separator_ratio: 0.0125,
            video_ratio: 0.4375,
            caption_share: 0.25,
        }
    }
}

/// Computes layout plans for a fixed canvas.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    canvas: Dimensions,
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(canvas: Dimensions, config: LayoutConfig) -> Self {
        Self { canvas, config }
    }

    /// Engine for the 1080x1920 vertical canvas with default proportions.
    pub fn vertical() -> Self {
        Self::new(Dimensions::VERTICAL_HD, LayoutConfig::default())
    }

    pub fn canvas(&self) -> Dimensions {
        self.canvas
    }

    /// Compute the band layout for a mode.
    pub fn plan(&self, mode: VideoMode) -> LayoutPlan {
        let height = self.canvas.height;
        let px = |ratio: f64| ((height as f64 * ratio).round() as u32).min(height);

        let full = Rect::full(self.canvas);
        let (top_margin, rest) = full.split_top(px(self.config.top_margin_ratio));
        let (image_area, rest) = rest.split_top(px(self.config.image_ratio));
        let (separator, rest) = rest.split_top(px(self.config.separator_ratio));
        let (video, bottom_margin) = rest.split_top(px(self.config.video_ratio));

        let mut bands = vec![Band {
            role: BandRole::Margin,
            rect: top_margin,
        }];

        if mode.has_caption_band() {
            let caption_height =
                (image_area.height as f64 * self.config.caption_share).round() as u32;
            let (image, caption) =
                image_area.split_top(image_area.height.saturating_sub(caption_height));
            bands.push(Band {
                role: BandRole::ImageBand,
                rect: image,
            });
            bands.push(Band {
                role: BandRole::CaptionBand,
                rect: caption,
            });
        } else {
            bands.push(Band {
                role: BandRole::ImageBand,
                rect: image_area,
            });
        }

        bands.push(Band {
            role: BandRole::Separator,
            rect: separator,
        });
        bands.push(Band {
            role: BandRole::VideoBand,
            rect: video,
        });
        bands.push(Band {
            role: BandRole::Margin,
            rect: bottom_margin,
        });

        // Zero-height bands (possible only with unusual ratios) carry no area.
        bands.retain(|b| b.rect.area() > 0);

        tracing::debug!(mode = %mode, bands = bands.len(), "Layout plan computed");

        LayoutPlan {
            canvas: self.canvas,
            mode,
            bands,
        }
    }
}

/// Fit a source of the given size into a band.
///
/// `label` names the asset in errors. Zero-sized sources or bands are rejected
/// with `InvalidAssetDimensions`. When the aspect ratios match exactly the
/// source is only resized.
pub fn place(
    source: Dimensions,
    band: Rect,
    strategy: FitStrategy,
    label: &str,
) -> ShortsResult<Placement> {
    if source.is_degenerate() {
        return Err(ShortsError::invalid_dimensions(
            label,
            source.width,
            source.height,
        ));
    }
    if band.size().is_degenerate() {
        return Err(ShortsError::invalid_dimensions(
            format!("{label} (target band)"),
            band.width,
            band.height,
        ));
    }

    let (sw, sh) = (source.width as u64, source.height as u64);
    let (bw, bh) = (band.width as u64, band.height as u64);

    if source.same_aspect(&band.size()) {
        return Ok(Placement {
            strategy,
            source,
            band,
            scaled: band.size(),
            crop: None,
            offset_x: 0,
            offset_y: 0,
        });
    }

    // Source is relatively wider than the band.
    let wider = sw * bh > bw * sh;

    match strategy {
        FitStrategy::Cover => {
            let scaled = if wider {
                Dimensions::new(scale_round(sw, bh, sh).max(bw) as u32, band.height)
            } else {
                Dimensions::new(band.width, scale_round(sh, bw, sw).max(bh) as u32)
            };
            let crop = Rect::new(
                (scaled.width - band.width) / 2,
                (scaled.height - band.height) / 2,
                band.width,
                band.height,
            );
            Ok(Placement {
                strategy,
                source,
                band,
                scaled,
                crop: Some(crop),
                offset_x: 0,
                offset_y: 0,
            })
        }
        FitStrategy::Contain => {
            let scaled = if wider {
                Dimensions::new(band.width, scale_round(sh, bw, sw).clamp(1, bh) as u32)
            } else {
                Dimensions::new(scale_round(sw, bh, sh).clamp(1, bw) as u32, band.height)
            };
            Ok(Placement {
                strategy,
                source,
                band,
                scaled,
                crop: None,
                offset_x: (band.width - scaled.width) / 2,
                offset_y: (band.height - scaled.height) / 2,
            })
        }
    }
}

/// `round(value * num / den)` in integer arithmetic.
fn scale_round(value: u64, num: u64, den: u64) -> u64 {
    (value * num + den / 2) / den
}
