pub mod model_resolver;
pub mod onnx_session;
pub mod onnx_ultraface_engine;
pub mod ultraface_decoder;
