//! Face detection behind a three-call binding: initialize a model, detect
//! faces in raw image buffers, uninitialize.
//!
//! [`binding::instance`] is the process-wide entry point used by the native
//! exports; [`binding::DetectionBinding::new`] builds an independent binding
//! around any [`detection::domain::face_engine::EngineLoader`].

pub mod binding;
pub mod detection;
pub mod shared;
