//! Stage-tagged pipeline errors.

use shortsmith_common::error::{ShortsError, Stage};

/// A fatal error and the stage that raised it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: ShortsError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: ShortsError) -> Self {
        Self { stage, source }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Tag a library result with the stage it belongs to.
pub trait AtStage<T> {
    fn at(self, stage: Stage) -> PipelineResult<T>;
}

impl<T, E: Into<ShortsError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> PipelineResult<T> {
        self.map_err(|e| PipelineError::new(stage, e.into()))
    }
}
