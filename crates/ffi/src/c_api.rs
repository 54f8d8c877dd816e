use std::ffi::{c_char, CStr};
use std::path::Path;
use std::ptr;

use facedetect_core::binding::{self, BindingError};
use facedetect_core::shared::face_box::FaceBox;

use crate::{detect_on_instance, init_logging};

pub const FACEDETECT_OK: i32 = 0;
pub const FACEDETECT_ERR_NOT_INITIALIZED: i32 = -1;
pub const FACEDETECT_ERR_INVALID_IMAGE: i32 = -2;
pub const FACEDETECT_ERR_ENGINE: i32 = -3;
pub const FACEDETECT_ERR_INVALID_ARGUMENT: i32 = -4;

/// Flat `[left, top, right, bottom, ...]` boxes owned by the caller.
///
/// Release with [`facedetect_result_free`]. An empty result has `len == 0`.
#[repr(C)]
#[derive(Debug)]
pub struct FaceDetectResult {
    pub data: *mut i32,
    pub len: usize,
}

impl FaceDetectResult {
    pub const fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
        }
    }

    fn from_vec(values: Vec<i32>) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        let boxed = values.into_boxed_slice();
        let len = boxed.len();
        Self {
            data: Box::into_raw(boxed) as *mut i32,
            len,
        }
    }
}

fn status_code(err: &BindingError) -> i32 {
    match err {
        BindingError::NotInitialized => FACEDETECT_ERR_NOT_INITIALIZED,
        BindingError::InvalidImage(_) => FACEDETECT_ERR_INVALID_IMAGE,
        _ => FACEDETECT_ERR_ENGINE,
    }
}

/// Load a face model from a model file or a directory containing one.
///
/// # Safety
///
/// `model_path` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn facedetect_model_init(model_path: *const c_char) -> bool {
    init_logging();
    if model_path.is_null() {
        log::warn!("facedetect_model_init called with a null path");
        return false;
    }
    match CStr::from_ptr(model_path).to_str() {
        Ok(path) => binding::instance().initialize(Path::new(path)),
        Err(e) => {
            log::warn!("model path is not valid UTF-8: {e}");
            false
        }
    }
}

/// Detect faces in a `width` x `height` image with `channels` bytes per pixel.
///
/// Returns [`FACEDETECT_OK`] and fills `out`, or a negative status and
/// leaves `out` empty.
///
/// # Safety
///
/// `data` must point to `len` readable bytes and `out` to a writable
/// [`FaceDetectResult`]. The buffer is not retained after the call.
#[no_mangle]
pub unsafe extern "C" fn facedetect_detect(
    data: *const u8,
    len: usize,
    width: i32,
    height: i32,
    channels: i32,
    out: *mut FaceDetectResult,
) -> i32 {
    if out.is_null() {
        return FACEDETECT_ERR_INVALID_ARGUMENT;
    }
    *out = FaceDetectResult::empty();
    if data.is_null() {
        return FACEDETECT_ERR_INVALID_ARGUMENT;
    }

    let image = std::slice::from_raw_parts(data, len);
    match detect_on_instance(image, width, height, channels) {
        Ok(faces) => {
            *out = FaceDetectResult::from_vec(FaceBox::encode(&faces));
            FACEDETECT_OK
        }
        Err(e) => {
            log::warn!("{e}");
            status_code(&e)
        }
    }
}

/// Release a result filled by [`facedetect_detect`] and reset it to empty.
///
/// # Safety
///
/// `result` must be null or point to a result produced by
/// [`facedetect_detect`] that has not been freed since.
#[no_mangle]
pub unsafe extern "C" fn facedetect_result_free(result: *mut FaceDetectResult) {
    let Some(result) = result.as_mut() else {
        return;
    };
    if !result.data.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            result.data,
            result.len,
        )));
    }
    *result = FaceDetectResult::empty();
}

/// Release the loaded face model. Returns `false` if none was loaded.
#[no_mangle]
pub extern "C" fn facedetect_model_uninit() -> bool {
    binding::instance().uninitialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facedetect_core::shared::image_view::ImageError;

    #[test]
    fn test_result_roundtrip_through_free() {
        let mut result = FaceDetectResult::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(result.len, 4);
        let values = unsafe { std::slice::from_raw_parts(result.data, result.len) };
        assert_eq!(values, &[1, 2, 3, 4]);

        unsafe { facedetect_result_free(&mut result) };
        assert!(result.data.is_null());
        assert_eq!(result.len, 0);
    }

    #[test]
    fn test_empty_vec_gives_null_result() {
        let result = FaceDetectResult::from_vec(Vec::new());
        assert!(result.data.is_null());
        assert_eq!(result.len, 0);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_code(&BindingError::NotInitialized),
            FACEDETECT_ERR_NOT_INITIALIZED
        );
        assert_eq!(
            status_code(&BindingError::InvalidImage(ImageError::UnsupportedChannels(2))),
            FACEDETECT_ERR_INVALID_IMAGE
        );
        assert_eq!(status_code(&BindingError::Poisoned), FACEDETECT_ERR_ENGINE);
    }
}
