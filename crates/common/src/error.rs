//! Error types shared across Shortsmith crates.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for Shortsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum ShortsError {
    #[error("Script has {words} words, below the {min}-word minimum")]
    ScriptTooShort { words: usize, min: usize },

    #[error("Script has {words} words, above the {max}-word maximum")]
    ScriptTooLong { words: usize, max: usize },

    #[error("Invalid asset dimensions for {asset}: {width}x{height}")]
    InvalidAssetDimensions {
        asset: String,
        width: u32,
        height: u32,
    },

    #[error("Insufficient assets: {message}")]
    InsufficientAssets { message: String },

    #[error("Asset unavailable: {message}")]
    AssetUnavailable { message: String },

    #[error("Synthesis error: {message}")]
    Synthesis { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ShortsError.
pub type ShortsResult<T> = Result<T, ShortsError>;

impl ShortsError {
    pub fn insufficient_assets(msg: impl Into<String>) -> Self {
        Self::InsufficientAssets {
            message: msg.into(),
        }
    }

    pub fn asset_unavailable(msg: impl Into<String>) -> Self {
        Self::AssetUnavailable {
            message: msg.into(),
        }
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    pub fn invalid_dimensions(asset: impl Into<String>, width: u32, height: u32) -> Self {
        Self::InvalidAssetDimensions {
            asset: asset.into(),
            width,
            height,
        }
    }

    /// Whether this error only warrants a warning.
    ///
    /// Word-count violations never abort a run; the duration estimate adapts.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ShortsError::ScriptTooShort { .. } | ShortsError::ScriptTooLong { .. }
        )
    }
}

/// Named pipeline step, used to tag fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Assets,
    Script,
    Narration,
    Captions,
    Layout,
    Timeline,
    Render,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Assets => "assets",
            Stage::Script => "script",
            Stage::Narration => "narration",
            Stage::Captions => "captions",
            Stage::Layout => "layout",
            Stage::Timeline => "timeline",
            Stage::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_errors_are_warnings() {
        assert!(ShortsError::ScriptTooShort { words: 10, min: 80 }.is_warning());
        assert!(ShortsError::ScriptTooLong { words: 300, max: 100 }.is_warning());
        assert!(!ShortsError::insufficient_assets("no images").is_warning());
        assert!(!ShortsError::render("codec").is_warning());
    }

    #[test]
    fn test_error_messages() {
        let err = ShortsError::invalid_dimensions("cover.jpg", 0, 720);
        assert_eq!(
            err.to_string(),
            "Invalid asset dimensions for cover.jpg: 0x720"
        );
        assert_eq!(Stage::Timeline.to_string(), "timeline");
    }
}
