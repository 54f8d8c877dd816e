pub mod constants;
pub mod engine_config;
pub mod face_box;
pub mod image_view;
