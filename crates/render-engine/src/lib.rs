//! Shortsmith Render Engine
//!
//! Turns a composed [`Timeline`](shortsmith_project_model::timeline::Timeline)
//! into a finished vertical video.
//!
//! # Pipeline Architecture
//!
//! ```text
//! color background ─────────┐
//!                           ├── Overlay (image band)
//! images + Ken Burns ───────┘         │
//!                                     ├── Overlay (video band)
//! gameplay slices ────────────────────┘         │
//!                                               ├── drawtext (captions)
//! caption cues ─────────────────────────────────┘         │
//!                                                         ▼
//! narration.wav ───────────────────────────────► Encode (H.264 + AAC)
//!                                                         │
//!                                                         ▼
//!                                                    output.mp4
//! ```
//!
//! [`burn`] draws the same caption cues over a finished video instead.
//!
//! Backends write to a hidden sibling file and rename it into place, so a
//! failed render never leaves a partial video behind.

pub mod backend;
pub mod burn;
pub mod compositor;
pub mod export;
pub mod json;
pub mod probe;

pub use backend::{ProgressCallback, RenderBackend, RenderProgress, RenderSettings, RenderStage};
pub use burn::{CaptionBurn, CaptionBurner};
pub use export::FfmpegBackend;
pub use json::TimelineJsonBackend;
