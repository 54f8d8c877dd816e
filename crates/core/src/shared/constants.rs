pub const DEFAULT_MODEL_NAME: &str = "version-RFB-320.onnx";
pub const DEFAULT_MODEL_URL: &str =
    "https://github.com/Linzaer/Ultra-Light-Fast-Generic-Face-Detector-1MB/raw/master/models/onnx/version-RFB-320.onnx";

/// Model file names tried, in order, when a model directory is given.
pub const MODEL_CANDIDATES: &[&str] = &[
    "version-RFB-320.onnx",
    "version-slim-320.onnx",
    "RFB-320.onnx",
    "slim-320.onnx",
];

pub const MODEL_EXTENSION: &str = "onnx";

/// Engine settings read from next to the model file when present.
pub const CONFIG_SIDECAR_NAME: &str = "facedetect.json";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
