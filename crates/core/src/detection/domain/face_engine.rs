use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::engine_config::ConfigError;
use crate::shared::face_box::FaceBox;
use crate::shared::image_view::ImageView;

/// Underlying cause reported by an engine implementation.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no usable model at {path}: {source}")]
    ModelNotFound {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load model {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// A loaded detection model: the engine handle the binding gates access to.
///
/// Implementations keep inference state (sessions, scratch buffers), hence
/// `&mut self`. The image is only borrowed for the call.
pub trait FaceEngine: Send {
    fn detect(&mut self, image: &ImageView<'_>) -> Result<Vec<FaceBox>, EngineError>;
}

/// Creates engines from a model path.
pub trait EngineLoader: Send + Sync {
    fn load(&self, model_path: &Path) -> Result<Box<dyn FaceEngine>, EngineError>;
}
