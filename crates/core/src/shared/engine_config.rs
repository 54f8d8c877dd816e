use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::CONFIG_SIDECAR_NAME;

pub const DEFAULT_INPUT_WIDTH: u32 = 320;
pub const DEFAULT_INPUT_HEIGHT: u32 = 240;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the model's box output is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxFormat {
    /// Normalized `x1, y1, x2, y2` (the ONNX export with decoding baked in).
    Corner,
    /// Raw regression offsets, decoded against generated priors.
    PriorOffsets,
}

/// Tunables for the Ultra-Light detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub input_width: u32,
    pub input_height: u32,
    pub score_threshold: f32,
    pub iou_threshold: f32,
    /// Keep at most this many faces after NMS; negative keeps all.
    pub top_k: i32,
    pub box_format: BoxFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            top_k: -1,
            box_format: BoxFormat::Corner,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the sidecar next to `model_file`, or defaults when there is none.
    pub fn for_model(model_file: &Path) -> Result<Self, ConfigError> {
        let sidecar = model_file
            .parent()
            .map(|dir| dir.join(CONFIG_SIDECAR_NAME));
        match sidecar {
            Some(path) if path.is_file() => {
                log::debug!("Reading engine config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "input size must be non-zero, got {}x{}",
                self.input_width, self.input_height
            )));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::Invalid(format!(
                "score_threshold must be between 0.0 and 1.0, got {}",
                self.score_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::Invalid(format!(
                "iou_threshold must be between 0.0 and 1.0, got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_rfb_320() {
        let config = EngineConfig::default();
        assert_eq!(config.input_width, 320);
        assert_eq!(config.input_height, 240);
        assert_relative_eq!(config.score_threshold, 0.7);
        assert_relative_eq!(config.iou_threshold, 0.3);
        assert_eq!(config.top_k, -1);
        assert_eq!(config.box_format, BoxFormat::Corner);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.json");
        fs::write(&path, r#"{"score_threshold": 0.5, "box_format": "prior_offsets"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_relative_eq!(config.score_threshold, 0.5);
        assert_eq!(config.box_format, BoxFormat::PriorOffsets);
        assert_eq!(config.input_width, 320);
    }

    #[test]
    fn test_for_model_reads_sidecar() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("version-RFB-640.onnx");
        fs::write(&model, b"model").unwrap();
        fs::write(
            tmp.path().join(CONFIG_SIDECAR_NAME),
            r#"{"input_width": 640, "input_height": 480}"#,
        )
        .unwrap();

        let config = EngineConfig::for_model(&model).unwrap();
        assert_eq!(config.input_width, 640);
        assert_eq!(config.input_height, 480);
    }

    #[test]
    fn test_for_model_without_sidecar_is_default() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("model.onnx");
        assert_eq!(EngineConfig::for_model(&model).unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            EngineConfig::load(&tmp.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_out_of_range_threshold_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.json");
        fs::write(&path, r#"{"iou_threshold": 1.5}"#).unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
