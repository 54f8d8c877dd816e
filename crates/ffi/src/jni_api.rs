//! Entry points of `com.android.example.cameraxbasic.fragments.FaceSDKNative`.
//!
//! `FaceDetect` answers in the count-prefixed layout the Android callers
//! index into: `[count, l0, t0, r0, b0, ...]`, `[0]` when no face is found,
//! and `null` on failure.

use std::ptr;

use jni::objects::{JByteArray, JObject, JString};
use jni::sys::{jboolean, jint, jintArray, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use facedetect_core::binding;
use facedetect_core::shared::face_box::FaceBox;

use crate::{detect_on_instance, init_logging};

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn Java_com_android_example_cameraxbasic_fragments_FaceSDKNative_FaceDetectionModelInit<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    model_path: JString<'local>,
) -> jboolean {
    init_logging();
    let path: String = match env.get_string(&model_path) {
        Ok(path) => path.into(),
        Err(e) => {
            log::warn!("could not read model path: {e}");
            return JNI_FALSE;
        }
    };
    to_jboolean(binding::instance().initialize(path))
}

#[no_mangle]
pub extern "system" fn Java_com_android_example_cameraxbasic_fragments_FaceSDKNative_FaceDetect<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    image: JByteArray<'local>,
    width: jint,
    height: jint,
    channels: jint,
) -> jintArray {
    let bytes = match env.convert_byte_array(&image) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("could not read image buffer: {e}");
            return ptr::null_mut();
        }
    };
    match detect_on_instance(&bytes, width, height, channels) {
        Ok(faces) => new_int_array(&mut env, &FaceBox::encode_count_prefixed(&faces)),
        Err(e) => {
            log::warn!("{e}");
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_android_example_cameraxbasic_fragments_FaceSDKNative_FaceDetectionModelUnInit<
    'local,
>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jboolean {
    to_jboolean(binding::instance().uninitialize())
}

fn new_int_array(env: &mut JNIEnv<'_>, values: &[i32]) -> jintArray {
    let array = match env.new_int_array(values.len() as jint) {
        Ok(array) => array,
        Err(e) => {
            log::warn!("could not allocate result array: {e}");
            return ptr::null_mut();
        }
    };
    if let Err(e) = env.set_int_array_region(&array, 0, values) {
        log::warn!("could not fill result array: {e}");
        return ptr::null_mut();
    }
    array.into_raw()
}
