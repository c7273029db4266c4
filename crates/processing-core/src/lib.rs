//! Shortsmith Processing Core
//!
//! The assembly pipeline's decision-making:
//! - **Script Composer:** narration text within a target word band
//! - **Layout Engine:** canvas bands and cover/contain placement per mode
//! - **Caption Synchronizer:** word highlight intervals from the narration duration
//! - **Timeline Composer:** images, looping gameplay, captions and audio on one clock
//!
//! This crate is pure computation: no I/O, no subprocesses.
//! All inputs are data; all outputs are data.

pub mod captions;
pub mod layout;
pub mod script;
pub mod timeline;

pub use captions::{CaptionSynchronizer, WeightPolicy};
pub use layout::LayoutEngine;
pub use script::ScriptComposer;
pub use timeline::TimelineComposer;
