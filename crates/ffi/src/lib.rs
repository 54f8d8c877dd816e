//! Native entry points of the `facedetect` library.
//!
//! Every export drives the process-wide binding from
//! [`facedetect_core::binding::instance`]. Image buffers are borrowed for
//! the duration of a call; detection results are handed to the caller.

pub mod c_api;
#[cfg(feature = "jni")]
pub mod jni_api;

use facedetect_core::binding::{self, BindingError};
use facedetect_core::shared::face_box::FaceBox;
use facedetect_core::shared::image_view::ImageView;

/// Hosts that never installed a logger still get `RUST_LOG` output.
fn init_logging() {
    let _ = env_logger::try_init();
}

fn detect_on_instance(
    image: &[u8],
    width: i32,
    height: i32,
    channels: i32,
) -> Result<Vec<FaceBox>, BindingError> {
    let view = ImageView::from_raw_parts(image, width, height, channels)?;
    binding::instance().detect_faces(&view)
}
