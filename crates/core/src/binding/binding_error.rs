use std::path::PathBuf;

use thiserror::Error;

use crate::detection::domain::face_engine::EngineError;
use crate::shared::image_view::ImageError;

/// Failures surfaced by [`crate::binding::DetectionBinding`].
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("failed to initialize face model from {path}: {source}")]
    InitializationFailure {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
    #[error("face model is not initialized")]
    NotInitialized,
    #[error("no face model to release")]
    TeardownFailure,
    #[error("invalid image: {0}")]
    InvalidImage(#[from] ImageError),
    #[error("detection failed: {0}")]
    Engine(#[source] EngineError),
    #[error("engine lock poisoned by a panicking caller")]
    Poisoned,
}
