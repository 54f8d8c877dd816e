use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::binding::binding_error::BindingError;
use crate::detection::domain::face_engine::{EngineLoader, FaceEngine};
use crate::shared::face_box::FaceBox;
use crate::shared::image_view::ImageView;

/// Call surface between a caller and a face detection engine.
///
/// Holds at most one engine handle behind a mutex, so initialize, detect and
/// uninitialize may be called from any thread; calls are serialized.
///
/// Lifecycle: uninitialized -> initialized -> uninitialized. Initializing
/// while a handle is live replaces it, but only once the new model has
/// loaded; a failed re-initialize keeps the previous handle.
pub struct DetectionBinding {
    loader: Box<dyn EngineLoader>,
    engine: Mutex<Option<Box<dyn FaceEngine>>>,
}

impl DetectionBinding {
    pub fn new(loader: Box<dyn EngineLoader>) -> Self {
        Self {
            loader,
            engine: Mutex::new(None),
        }
    }

    /// Load the model at `model_path` (a model file or a directory holding one).
    pub fn load_model(&self, model_path: &Path) -> Result<(), BindingError> {
        // Load outside the lock so detection on the old handle keeps running.
        let engine = self
            .loader
            .load(model_path)
            .map_err(|source| BindingError::InitializationFailure {
                path: model_path.to_path_buf(),
                source,
            })?;

        let mut slot = self.lock()?;
        if slot.replace(engine).is_some() {
            log::info!("Replaced face model with {}", model_path.display());
        } else {
            log::info!("Initialized face model from {}", model_path.display());
        }
        Ok(())
    }

    pub fn detect_faces(&self, image: &ImageView<'_>) -> Result<Vec<FaceBox>, BindingError> {
        let mut slot = self.lock()?;
        let engine = slot.as_mut().ok_or(BindingError::NotInitialized)?;
        engine.detect(image).map_err(BindingError::Engine)
    }

    pub fn unload_model(&self) -> Result<(), BindingError> {
        let engine = self.lock()?.take().ok_or(BindingError::TeardownFailure)?;
        drop(engine);
        log::info!("Released face model");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Returns `false` when the model path is invalid or the model cannot be loaded.
    pub fn initialize(&self, model_path: impl AsRef<Path>) -> bool {
        match self.load_model(model_path.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Flat `[left, top, right, bottom, ...]` boxes, empty when no face is
    /// found. `None` when the image is invalid, no model is loaded or the
    /// engine fails.
    pub fn detect(
        &self,
        image: &[u8],
        width: i32,
        height: i32,
        channels: i32,
    ) -> Option<Vec<i32>> {
        let result = ImageView::from_raw_parts(image, width, height, channels)
            .map_err(BindingError::from)
            .and_then(|view| self.detect_faces(&view));
        match result {
            Ok(faces) => Some(FaceBox::encode(&faces)),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    /// Returns `false` when no model is loaded.
    pub fn uninitialize(&self) -> bool {
        match self.unload_model() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Box<dyn FaceEngine>>>, BindingError> {
        self.engine.lock().map_err(|_| BindingError::Poisoned)
    }
}
