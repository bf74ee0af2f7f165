//! Checkerboard geometry.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Static checkerboard specification.
///
/// `inner_cols`/`inner_rows` are **inner corner counts** (not square counts),
/// matching the pattern size handed to the corner finder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub inner_cols: u32,
    pub inner_rows: u32,
    /// Side of one square in world units. `1.0` yields a unit grid.
    #[serde(default = "default_square_size")]
    pub square_size: f32,
}

fn default_square_size() -> f32 {
    1.0
}

impl Default for BoardSpec {
    fn default() -> Self {
        Self {
            inner_cols: 9,
            inner_rows: 6,
            square_size: default_square_size(),
        }
    }
}

/// Board specification validation errors.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BoardError {
    #[error("inner_cols and inner_rows must be >= 2 (got {cols}x{rows})")]
    InvalidSize { cols: u32, rows: u32 },
    #[error("square_size must be finite and > 0 (got {0})")]
    InvalidSquareSize(f32),
}

impl BoardSpec {
    pub fn new(inner_cols: u32, inner_rows: u32, square_size: f32) -> Result<Self, BoardError> {
        let spec = Self {
            inner_cols,
            inner_rows,
            square_size,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.inner_cols < 2 || self.inner_rows < 2 {
            return Err(BoardError::InvalidSize {
                cols: self.inner_cols,
                rows: self.inner_rows,
            });
        }
        if !self.square_size.is_finite() || self.square_size <= 0.0 {
            return Err(BoardError::InvalidSquareSize(self.square_size));
        }
        Ok(())
    }

    /// Number of inner corners a complete detection yields.
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.inner_cols as usize * self.inner_rows as usize
    }

    /// Planar board points (z = 0), row-major: index `row * inner_cols + col`.
    ///
    /// The ordering is the one the corner finder reports for an unrotated
    /// board, so the list pairs 1:1 with a detection.
    pub fn object_points(&self) -> Vec<Point3<f32>> {
        let mut points = Vec::with_capacity(self.corner_count());
        for row in 0..self.inner_rows {
            for col in 0..self.inner_cols {
                points.push(Point3::new(
                    col as f32 * self.square_size,
                    row as f32 * self.square_size,
                    0.0,
                ));
            }
        }
        points
    }
}
