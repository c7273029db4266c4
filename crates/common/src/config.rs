//! Application configuration.
//!
//! Every section is `#[serde(default)]`, so a partial `config.json` merges
//! with the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where finished videos are written.
    pub output_dir: PathBuf,

    /// Scratch directory for narration audio and intermediate files.
    pub temp_dir: PathBuf,

    /// Output encoding parameters.
    pub video: VideoDefaults,

    /// Narration synthesis parameters.
    pub tts: TtsConfig,

    /// Caption styling and timing parameters.
    pub captions: CaptionConfig,

    /// Local asset selection rules.
    pub assets: AssetDefaults,

    /// Script generation parameters.
    pub script: ScriptDefaults,

    /// Timeline composition parameters.
    pub timeline: TimelineDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Output encoding parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoDefaults {
    pub width: u32,
    pub height: u32,
    pub fps: u32,

    /// ffmpeg video encoder name.
    pub video_codec: String,

    /// ffmpeg audio encoder name.
    pub audio_codec: String,

    /// x264 preset.
    pub preset: String,

    /// Constant rate factor (lower = better quality).
    pub crf: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,
}

/// Narration synthesis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// External TTS program. Reads the script on stdin and writes a WAV.
    pub command: String,

    /// Arguments for the TTS program. `{output}` is replaced with the WAV path,
    /// `{exaggeration}`, `{cfg_weight}` and `{temperature}` with voice values.
    pub args: Vec<String>,

    /// Speaking rate used for duration estimates.
    pub words_per_minute: u32,

    pub exaggeration: f64,
    pub cfg_weight: f64,
    pub temperature: f64,
}

/// Caption styling and timing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub font_size: u32,
    pub font_color: String,
    pub highlight_color: String,
    pub stroke_color: String,
    pub stroke_width: u32,

    /// Optional TTF/OTF file handed to the renderer.
    pub font_file: Option<PathBuf>,

    /// Maximum words shown together on screen.
    pub max_words_per_phrase: usize,

    /// Maximum characters shown together on screen.
    pub max_chars_per_phrase: usize,

    /// Floor for a word's raw allocation before normalization (seconds).
    pub min_word_secs: f64,

    /// Estimated glyph advance as a fraction of the font size.
    pub glyph_width_ratio: f64,
}

/// Local asset selection rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetDefaults {
    pub max_images: usize,
    pub min_images: usize,

    /// Images smaller than this (bytes) are skipped as thumbnails.
    pub min_file_size: u64,

    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

/// Script generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptDefaults {
    pub length: ScriptLength,

    /// Maximum number of features woven into a generated script.
    pub max_features: usize,
}

/// Target script length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLength {
    /// 80-100 words, roughly 30 seconds of narration.
    #[default]
    Short,
    /// 180-200 words for the extended context format.
    Context,
}

/// Timeline composition parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    /// Minimum time each slideshow image stays on screen (seconds).
    pub min_image_secs: f64,

    /// Extra zoom reached at the end of an image's window (0.08 = 108%).
    pub ken_burns_zoom: f64,

    /// Default gameplay start offset (seconds).
    pub video_start_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shortsmith=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: data_dir().join("output"),
            temp_dir: std::env::temp_dir().join("shortsmith"),
            video: VideoDefaults::default(),
            tts: TtsConfig::default(),
            captions: CaptionConfig::default(),
            assets: AssetDefaults::default(),
            script: ScriptDefaults::default(),
            timeline: TimelineDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for VideoDefaults {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "faster".to_string(),
            crf: 23,
            audio_bitrate_kbps: 192,
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            command: "piper".to_string(),
            args: vec![
                "--model".to_string(),
                "en_US-lessac-medium".to_string(),
                "--output_file".to_string(),
                "{output}".to_string(),
            ],
            words_per_minute: 180,
            exaggeration: 0.3,
            cfg_weight: 0.5,
            temperature: 0.85,
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font_size: 80,
            font_color: "#FFFFFF".to_string(),
            highlight_color: "#FFD700".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 3,
            font_file: None,
            max_words_per_phrase: 8,
            max_chars_per_phrase: 60,
            min_word_secs: 0.05,
            glyph_width_ratio: 0.56,
        }
    }
}

impl Default for AssetDefaults {
    fn default() -> Self {
        Self {
            max_images: 12,
            min_images: 1,
            min_file_size: 30_000,
            image_extensions: ["jpg", "jpeg", "png", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            video_extensions: ["mp4", "mov", "mkv", "avi", "webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for ScriptDefaults {
    fn default() -> Self {
        Self {
            length: ScriptLength::Short,
            max_features: 4,
        }
    }
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            min_image_secs: 2.0,
            ken_burns_zoom: 0.08,
            video_start_secs: 10.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("shortsmith").join("config.json")
}

fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("shortsmith")
}
