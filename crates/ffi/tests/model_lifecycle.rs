//! Full lifecycle through the C exports. Runs only when `FACEDETECT_MODEL`
//! points at an Ultra-Light model file or directory.

use std::ffi::CString;

use facedetect::c_api::{
    facedetect_detect, facedetect_model_init, facedetect_model_uninit, facedetect_result_free,
    FaceDetectResult, FACEDETECT_ERR_INVALID_IMAGE, FACEDETECT_ERR_NOT_INITIALIZED, FACEDETECT_OK,
};

#[test]
fn test_init_detect_uninit() {
    let Ok(model) = std::env::var("FACEDETECT_MODEL") else {
        return;
    };
    let path = CString::new(model).unwrap();
    assert!(unsafe { facedetect_model_init(path.as_ptr()) });

    let pixels = vec![128u8; 320 * 240 * 3];
    let mut out = FaceDetectResult::empty();
    let status =
        unsafe { facedetect_detect(pixels.as_ptr(), pixels.len(), 320, 240, 3, &mut out) };
    assert_eq!(status, FACEDETECT_OK);
    assert_eq!(out.len % 4, 0);
    assert_eq!(out.len, 0);
    unsafe { facedetect_result_free(&mut out) };

    let status = unsafe { facedetect_detect(pixels.as_ptr(), 10, 320, 240, 3, &mut out) };
    assert_eq!(status, FACEDETECT_ERR_INVALID_IMAGE);

    assert!(facedetect_model_uninit());
    assert!(!facedetect_model_uninit());

    let status =
        unsafe { facedetect_detect(pixels.as_ptr(), pixels.len(), 320, 240, 3, &mut out) };
    assert_eq!(status, FACEDETECT_ERR_NOT_INITIALIZED);
}
