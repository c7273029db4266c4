//! Shortsmith Project Model
//!
//! Defines the data contracts shared by every stage of video assembly:
//! - **Script:** narration text, words, and target word-count band
//! - **Narration:** measured audio track, per-word timings, caption phrases
//! - **Layout:** canvas bands per mode and content placement
//! - **Assets:** slideshow images and the gameplay clip
//! - **Timeline:** layered, timed segments handed to a renderer
//! - **History:** append-only record of runs
//!
//! All geometry is in integer pixels on the 1080x1920 vertical canvas.

pub mod assets;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod narration;
pub mod script;
pub mod timeline;

pub use assets::*;
pub use geometry::*;
pub use history::*;
pub use layout::*;
pub use narration::*;
pub use script::*;
pub use timeline::*;
