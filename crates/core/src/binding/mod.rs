pub mod binding_error;
pub mod detection_binding;
pub mod global;

pub use binding_error::BindingError;
pub use detection_binding::DetectionBinding;
pub use global::instance;
