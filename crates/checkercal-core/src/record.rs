//! Persisted calibration result.
//!
//! The YAML layout is fixed: three keys in alphabetical order,
//!
//! ```yaml
//! dist_coeff:            # 1 x N, N in {4, 5, 8, 12, 14}
//! - - -0.46
//!   - ...
//! optimal_camera_matrix: # 3 x 3
//! - - 681.9
//!   - 0.0
//!   - 279.4
//! - ...
//! roi:                   # [x, y, width, height]
//! - 7
//! - 13
//! - 623
//! - 453
//! ```

use crate::roi::Roi;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Distortion vector lengths accepted by the OpenCV camera models.
pub const VALID_DISTORTION_LENGTHS: [usize; 5] = [4, 5, 8, 12, 14];

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("camera matrix has non-finite entries")]
    NonFiniteMatrix,
    #[error("camera matrix last row must be [0, 0, 1], got {0:?}")]
    InvalidLastRow([f64; 3]),
    #[error("distortion must be a single row, got {0} rows")]
    DistortionRows(usize),
    #[error("unsupported number of distortion coefficients: {0}")]
    DistortionLength(usize),
    #[error("distortion has non-finite entries")]
    NonFiniteDistortion,
    #[error("roi has negative extent: {0:?}")]
    NegativeRoi([i32; 4]),
}

/// Optimal camera matrix, distortion coefficients and valid ROI.
///
/// Field order is the on-disk key order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub dist_coeff: Vec<Vec<f64>>,
    pub optimal_camera_matrix: [[f64; 3]; 3],
    pub roi: [i32; 4],
}

impl CalibrationRecord {
    pub fn from_parts(camera_matrix: &Matrix3<f64>, dist_coeffs: &[f64], roi: Roi) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = camera_matrix[(r, c)];
            }
        }
        Self {
            dist_coeff: vec![dist_coeffs.to_vec()],
            optimal_camera_matrix: rows,
            roi: roi.to_array(),
        }
    }

    pub fn camera_matrix(&self) -> Matrix3<f64> {
        let m = &self.optimal_camera_matrix;
        Matrix3::new(
            m[0][0], m[0][1], m[0][2], //
            m[1][0], m[1][1], m[1][2], //
            m[2][0], m[2][1], m[2][2],
        )
    }

    /// Distortion coefficients as a flat slice (the single stored row).
    pub fn distortion(&self) -> &[f64] {
        self.dist_coeff.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roi_rect(&self) -> Roi {
        Roi::from_array(self.roi)
    }

    /// Check the shapes a consumer of the file relies on.
    pub fn validate(&self) -> Result<(), RecordError> {
        let m = &self.optimal_camera_matrix;
        if m.iter().flatten().any(|v| !v.is_finite()) {
            return Err(RecordError::NonFiniteMatrix);
        }
        if m[2] != [0.0, 0.0, 1.0] {
            return Err(RecordError::InvalidLastRow(m[2]));
        }

        if self.dist_coeff.len() != 1 {
            return Err(RecordError::DistortionRows(self.dist_coeff.len()));
        }
        let dist = self.distortion();
        if !VALID_DISTORTION_LENGTHS.contains(&dist.len()) {
            return Err(RecordError::DistortionLength(dist.len()));
        }
        if dist.iter().any(|v| !v.is_finite()) {
            return Err(RecordError::NonFiniteDistortion);
        }

        if self.roi[2] < 0 || self.roi[3] < 0 {
            return Err(RecordError::NegativeRoi(self.roi));
        }
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String, RecordError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, RecordError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Write this record to disk as YAML.
    pub fn write_yaml(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    /// Load and validate a record from YAML on disk.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let raw = fs::read_to_string(path)?;
        let record = Self::from_yaml_str(&raw)?;
        record.validate()?;
        Ok(record)
    }
}
