use once_cell::sync::Lazy;

use crate::binding::detection_binding::DetectionBinding;
use crate::detection::infrastructure::onnx_ultraface_engine::OnnxUltrafaceLoader;

/// Process-wide binding, created on first access and backed by the
/// Ultra-Light ONNX engine. It starts uninitialized.
static INSTANCE: Lazy<DetectionBinding> =
    Lazy::new(|| DetectionBinding::new(Box::new(OnnxUltrafaceLoader::new())));

/// The shared [`DetectionBinding`]. Every call returns the same instance.
///
/// Callers that want their own handle (tests, embedders with several models)
/// should build a [`DetectionBinding`] directly instead.
pub fn instance() -> &'static DetectionBinding {
    &INSTANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_is_shared() {
        assert!(std::ptr::eq(instance(), instance()));
    }

    #[test]
    fn test_instance_is_shared_across_threads() {
        let here = instance() as *const DetectionBinding as usize;
        let there = std::thread::spawn(|| instance() as *const DetectionBinding as usize)
            .join()
            .unwrap();
        assert_eq!(here, there);
    }

    #[test]
    fn test_instance_rejects_missing_model() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(!instance().initialize(tmp.path().join("missing")));
        assert!(instance().detect(&[0u8; 16], 2, 2, 4).is_none());
    }
}
