//! Ultra-Light face detector (RFB-320 / slim-320 family) on ONNX Runtime.

use std::path::Path;

use ndarray::ArrayViewD;

use crate::detection::domain::face_engine::{EngineError, EngineLoader, FaceEngine};
use crate::detection::infrastructure::model_resolver::locate_model;
use crate::detection::infrastructure::onnx_session::open_session;
use crate::detection::infrastructure::ultraface_decoder::{self, Prior};
use crate::shared::engine_config::{BoxFormat, EngineConfig};
use crate::shared::face_box::FaceBox;
use crate::shared::image_view::ImageView;

const MEAN: f32 = 127.0;
const NORM: f32 = 1.0 / 128.0;

/// One loaded model: an ONNX Runtime session plus its decoding settings.
pub struct OnnxUltrafaceEngine {
    session: ort::session::Session,
    config: EngineConfig,
    priors: Vec<Prior>,
}

impl OnnxUltrafaceEngine {
    pub fn new(model_file: &Path, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let session = open_session(model_file).map_err(|e| EngineError::Load {
            path: model_file.to_path_buf(),
            source: Box::new(e),
        })?;
        let priors = match config.box_format {
            BoxFormat::PriorOffsets => {
                ultraface_decoder::generate_priors(config.input_width, config.input_height)
            }
            BoxFormat::Corner => Vec::new(),
        };
        Ok(Self {
            session,
            config,
            priors,
        })
    }
}

impl FaceEngine for OnnxUltrafaceEngine {
    fn detect(&mut self, image: &ImageView<'_>) -> Result<Vec<FaceBox>, EngineError> {
        let config = &self.config;
        let priors = &self.priors;

        // 1. Preprocess: resample to the model input, normalize, NCHW
        let input_tensor = preprocess(image, config.input_width, config.input_height);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)
            .map_err(|e| EngineError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        let tensors = (0..outputs.len().min(2))
            .map(|i| {
                outputs[i]
                    .try_extract_array::<f32>()
                    .map_err(|e| EngineError::Output(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (scores, boxes) = split_outputs(tensors)?;
        let score_data = scores
            .as_slice()
            .ok_or_else(|| EngineError::Output("scores are not contiguous".into()))?;
        let box_data = boxes
            .as_slice()
            .ok_or_else(|| EngineError::Output("boxes are not contiguous".into()))?;

        // 3. Decode, threshold, NMS
        let candidates = ultraface_decoder::decode(
            score_data,
            box_data,
            priors,
            config.box_format,
            config.score_threshold,
        );
        let kept = ultraface_decoder::hard_nms(candidates, config.iou_threshold, config.top_k);

        // 4. Scale back to the caller's image
        let faces: Vec<FaceBox> = kept
            .iter()
            .map(|c| c.to_face_box(image.width(), image.height()))
            .collect();
        log::debug!(
            "Detected {} face(s) in {}x{} image",
            faces.len(),
            image.width(),
            image.height()
        );
        Ok(faces)
    }
}

/// Builds [`OnnxUltrafaceEngine`]s from a model file or model directory.
///
/// Without an explicit config, settings come from the `facedetect.json`
/// sidecar next to the model, or the RFB-320 defaults.
#[derive(Default)]
pub struct OnnxUltrafaceLoader {
    config: Option<EngineConfig>,
}

impl OnnxUltrafaceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl EngineLoader for OnnxUltrafaceLoader {
    fn load(&self, model_path: &Path) -> Result<Box<dyn FaceEngine>, EngineError> {
        let model_file = locate_model(model_path).map_err(|e| EngineError::ModelNotFound {
            path: model_path.to_path_buf(),
            source: Box::new(e),
        })?;
        let config = match &self.config {
            Some(config) => config.clone(),
            None => EngineConfig::for_model(&model_file)?,
        };
        let engine = OnnxUltrafaceEngine::new(&model_file, config)?;
        log::info!("Loaded face model {}", model_file.display());
        Ok(Box::new(engine))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resample to `width` x `height` RGB and normalize to `(v - 127) / 128`, NCHW.
///
/// Gray input is replicated across the three planes; alpha is dropped.
fn preprocess(image: &ImageView<'_>, width: u32, height: u32) -> ndarray::Array4<f32> {
    let src = image.as_ndarray();
    let src_h = image.height() as usize;
    let src_w = image.width() as usize;
    let gray = image.channels() == 1;
    let w = width as usize;
    let h = height as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, h, w));

    for y in 0..h {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / h as f64) as usize).min(src_h - 1);
        for x in 0..w {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / w as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                let src_c = if gray { 0 } else { c };
                tensor[[0, c, y, x]] = (src[[src_y, src_x, src_c]] as f32 - MEAN) * NORM;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Output routing
// ---------------------------------------------------------------------------

/// Ultra-Light exports two tensors, scores `[1, N, 2]` (background, face) and
/// boxes `[1, N, 4]`. Exports disagree on their order, so they are told apart
/// by the last dimension.
fn split_outputs<'a>(
    tensors: Vec<ArrayViewD<'a, f32>>,
) -> Result<(ArrayViewD<'a, f32>, ArrayViewD<'a, f32>), EngineError> {
    let count = tensors.len();
    let mut iter = tensors.into_iter();
    let (Some(first), Some(second)) = (iter.next(), iter.next()) else {
        return Err(EngineError::Output(format!("expected 2 outputs, got {count}")));
    };
    let (scores, boxes) = if first.shape().last() == Some(&2) {
        (first, second)
    } else {
        (second, first)
    };
    if scores.shape().last() != Some(&2) || boxes.shape().last() != Some(&4) {
        return Err(EngineError::Output(format!(
            "scores {:?} / boxes {:?} have unexpected shapes",
            scores.shape(),
            boxes.shape()
        )));
    }
    Ok((scores, boxes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
