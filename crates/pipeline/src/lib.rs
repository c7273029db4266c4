//! Shortsmith Pipeline
//!
//! Orchestrates one video-generation run:
//!
//! ```text
//! assets ─► script ─► narration ─► captions ─► layout ─► timeline ─► render
//! ```
//!
//! The narration synthesizer and render backend are injected trait objects.
//! Each run appends exactly one [`RunRecord`](shortsmith_project_model::history::RunRecord)
//! to a caller-owned ledger; fatal errors carry the stage that raised them.
//!
//! [`recaption`] burns the same word-highlight captions into a video that
//! already exists.

pub mod assets;
pub mod error;
pub mod recaption;
pub mod runner;

pub use assets::{AssetProvider, DirectoryAssetProvider, FfprobeProbe, MediaProbe};
pub use error::{AtStage, PipelineError, PipelineResult};
pub use recaption::{caption_video, captioned_path, CaptionVideoRequest, CaptionedVideo};
pub use runner::{output_file_name, Pipeline, RunOutcome, RunRequest, ScriptInput};
