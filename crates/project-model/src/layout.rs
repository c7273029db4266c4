//! Canvas layout: bands, modes, and content placement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, Rect};

/// Video creation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoMode {
    /// Cover-and-crop content into the image and video bands.
    #[default]
    Standard,
    /// Contain content inside its band and fill the rest with black.
    /// Used for UI-dense games (4X strategy) where cropping loses information.
    NoCropBands,
    /// Standard banding plus a caption band for word-highlighted captions.
    BeautifulCaptions,
}

impl VideoMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoMode::Standard => "standard",
            VideoMode::NoCropBands => "no_crop_bands",
            VideoMode::BeautifulCaptions => "beautiful_captions",
        }
    }

    /// How sources are fitted into their band.
    pub fn fit_strategy(self) -> FitStrategy {
        match self {
            VideoMode::Standard | VideoMode::BeautifulCaptions => FitStrategy::Cover,
            VideoMode::NoCropBands => FitStrategy::Contain,
        }
    }

    pub fn has_caption_band(self) -> bool {
        matches!(self, VideoMode::BeautifulCaptions)
    }

    /// Output file name suffix (none for standard).
    pub fn file_suffix(self) -> Option<&'static str> {
        match self {
            VideoMode::Standard => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(VideoMode::Standard),
            "4x" | "no_crop" | "no_crop_bands" | "4x_black_bands" => Ok(VideoMode::NoCropBands),
            "beautiful_captions" | "captions" => Ok(VideoMode::BeautifulCaptions),
            other => Err(format!(
                "Unknown mode: {other}. Use: standard, 4x, beautiful_captions"
            )),
        }
    }
}

/// Scaling policy for fitting a source into a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// Scale to cover the band, crop the excess symmetrically.
    Cover,
    /// Scale to fit inside the band, pad the rest with black.
    Contain,
}

/// Role of a canvas band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandRole {
    Margin,
    ImageBand,
    Separator,
    VideoBand,
    CaptionBand,
}

/// A tagged canvas region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub role: BandRole,
    pub rect: Rect,
}

/// The full set of bands for one mode.
///
/// Bands are listed top to bottom and partition the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub canvas: Dimensions,
    pub mode: VideoMode,
    pub bands: Vec<Band>,
}

impl LayoutPlan {
    /// First band with the given role.
    pub fn band(&self, role: BandRole) -> Option<&Band> {
        self.bands.iter().find(|b| b.role == role)
    }

    pub fn image_band(&self) -> Option<Rect> {
        self.band(BandRole::ImageBand).map(|b| b.rect)
    }

    pub fn video_band(&self) -> Option<Rect> {
        self.band(BandRole::VideoBand).map(|b| b.rect)
    }

    pub fn caption_band(&self) -> Option<Rect> {
        self.band(BandRole::CaptionBand).map(|b| b.rect)
    }

    /// Sum of all band areas.
    pub fn total_area(&self) -> u64 {
        self.bands.iter().map(|b| b.rect.area()).sum()
    }

    /// Whether any two bands share a pixel.
    pub fn has_overlap(&self) -> bool {
        self.bands.iter().enumerate().any(|(i, a)| {
            self.bands[i + 1..]
                .iter()
                .any(|b| a.rect.intersects(&b.rect))
        })
    }

    /// Bands stay inside the canvas, never overlap, and cover it exactly.
    pub fn is_partition(&self) -> bool {
        let canvas = Rect::full(self.canvas);
        self.bands.iter().all(|b| canvas.contains_rect(&b.rect))
            && !self.has_overlap()
            && self.total_area() == self.canvas.area()
    }
}

/// How one source is scaled and positioned inside a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub strategy: FitStrategy,
    pub source: Dimensions,
    pub band: Rect,
    /// Source size after scaling.
    pub scaled: Dimensions,
    /// Window kept from the scaled source (cover only), in scaled coordinates.
    pub crop: Option<Rect>,
    /// Offset of the scaled source inside the band (contain only).
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Placement {
    /// Plain resize, no crop and no padding.
    pub fn is_pass_through(&self) -> bool {
        self.crop.is_none() && self.scaled == self.band.size()
    }

    /// Whether part of the band is left black.
    pub fn is_letterboxed(&self) -> bool {
        self.crop.is_none() && self.scaled != self.band.size()
    }

    /// Canvas rectangle actually showing source pixels.
    pub fn content_rect(&self) -> Rect {
        match self.crop {
            Some(_) => self.band,
            None => Rect::new(
                self.band.x + self.offset_x,
                self.band.y + self.offset_y,
                self.scaled.width,
                self.scaled.height,
            ),
        }
    }
}
