//! JSON configuration for a calibration run.
//!
//! Every field has a default, so `{}` (or no config file at all) describes
//! the stock run: camera 0 at 640x480, a 9x6 inner-corner board, ten
//! accepted views, and `calibration_matrix.yaml` as output.

use crate::board::{BoardError, BoardSpec};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("target_detections must be >= 1")]
    InvalidTarget,
    #[error("camera resolution must be positive (got {width}x{height})")]
    InvalidResolution { width: i32, height: i32 },
    #[error("alpha must be in [0, 1] (got {0})")]
    InvalidAlpha(f64),
    #[error("refine.win_size must be >= 1 (got {0})")]
    InvalidWindow(i32),
    #[error("refine needs max_iterations >= 1 and epsilon > 0")]
    InvalidCriteria,
    #[error("preview.delay_ms must be >= 1 (got {0}); 0 would wait for a key press")]
    InvalidDelay(i32),
    #[error("max_frames ({max_frames}) is below target_detections ({target})")]
    MaxFramesBelowTarget { max_frames: usize, target: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device_index: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
        }
    }
}

/// Sub-pixel corner refinement settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    /// Half side of the search window; the window is `2 * win_size + 1` wide.
    pub win_size: i32,
    /// Half side of the dead zone in the window middle, `-1` for none.
    pub zero_zone: i32,
    pub max_iterations: i32,
    pub epsilon: f64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            win_size: 11,
            zero_zone: -1,
            max_iterations: 26,
            epsilon: 0.001,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub enabled: bool,
    pub delay_ms: i32,
    pub window_name: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 500,
            window_name: "img".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub camera: CameraConfig,
    pub board: BoardSpec,
    /// Number of accepted views to collect before solving.
    pub target_detections: usize,
    /// Give up after this many frames. `None` keeps reading forever.
    pub max_frames: Option<usize>,
    pub refine: RefineConfig,
    pub preview: PreviewConfig,
    /// Free scaling for the optimal new camera matrix: 0 crops to valid
    /// pixels only, 1 keeps every source pixel.
    pub alpha: f64,
    pub output_path: PathBuf,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            board: BoardSpec::default(),
            target_detections: 10,
            max_frames: None,
            refine: RefineConfig::default(),
            preview: PreviewConfig::default(),
            alpha: 1.0,
            output_path: PathBuf::from("calibration_matrix.yaml"),
        }
    }
}

impl CalibrationConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        if self.target_detections == 0 {
            return Err(ConfigError::InvalidTarget);
        }
        if self.camera.width <= 0 || self.camera.height <= 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.camera.width,
                height: self.camera.height,
            });
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if self.refine.win_size < 1 {
            return Err(ConfigError::InvalidWindow(self.refine.win_size));
        }
        if self.refine.max_iterations < 1
            || !self.refine.epsilon.is_finite()
            || self.refine.epsilon <= 0.0
        {
            return Err(ConfigError::InvalidCriteria);
        }
        if self.preview.enabled && self.preview.delay_ms < 1 {
            return Err(ConfigError::InvalidDelay(self.preview.delay_ms));
        }
        if let Some(max_frames) = self.max_frames {
            if max_frames < self.target_detections {
                return Err(ConfigError::MaxFramesBelowTarget {
                    max_frames,
                    target: self.target_detections,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_stock_run() {
        let cfg: CalibrationConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, CalibrationConfig::default());
        assert_eq!(cfg.camera.device_index, 0);
        assert_eq!((cfg.camera.width, cfg.camera.height), (640, 480));
        assert_eq!(cfg.board.corner_count(), 54);
        assert_eq!(cfg.target_detections, 10);
        assert_eq!(cfg.refine.win_size, 11);
        assert_eq!(cfg.refine.max_iterations, 26);
        assert_eq!(cfg.preview.delay_ms, 500);
        assert_eq!(cfg.alpha, 1.0);
        assert_eq!(cfg.output_path, PathBuf::from("calibration_matrix.yaml"));
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: CalibrationConfig = serde_json::from_str(
            r#"{
                "board": { "inner_cols": 7, "inner_rows": 5, "square_size": 0.03 },
                "camera": { "device_index": 2 },
                "max_frames": 200,
                "preview": { "enabled": false }
            }"#,
        )
        .expect("parse");

        assert_eq!(cfg.board.corner_count(), 35);
        assert_eq!(cfg.camera.device_index, 2);
        assert_eq!(cfg.camera.width, 640);
        assert_eq!(cfg.max_frames, Some(200));
        assert!(!cfg.preview.enabled);
        assert_eq!(cfg.preview.window_name, "img");
        cfg.validate().expect("valid");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = CalibrationConfig {
            target_detections: 0,
            ..CalibrationConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidTarget));

        cfg.target_detections = 10;
        cfg.max_frames = Some(5);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MaxFramesBelowTarget {
                max_frames: 5,
                target: 10
            })
        );

        cfg.max_frames = None;
        cfg.alpha = 1.5;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidAlpha(1.5)));

        cfg.alpha = 1.0;
        cfg.camera.height = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidResolution { .. })
        ));

        cfg.camera.height = 480;
        cfg.board.inner_rows = 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::Board(_))));
    }

    #[test]
    fn validation_rejects_bad_refinement() {
        let mut cfg = CalibrationConfig::default();
        cfg.refine.win_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidWindow(0)));

        cfg.refine.win_size = 11;
        cfg.refine.max_iterations = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidCriteria));

        cfg.refine.max_iterations = 26;
        cfg.refine.epsilon = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidCriteria));

        cfg.refine.epsilon = f64::NAN;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidCriteria));

        cfg.refine.epsilon = 0.001;
        cfg.validate().expect("restored");
    }

    #[test]
    fn preview_delay_must_be_positive_when_shown() {
        let mut cfg = CalibrationConfig::default();
        cfg.preview.delay_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidDelay(0)));

        cfg.preview.delay_ms = -5;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidDelay(-5)));

        cfg.preview.enabled = false;
        cfg.validate().expect("delay unused without a preview");
    }
}
