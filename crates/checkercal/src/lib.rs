//! One-shot checkerboard camera calibration.
//!
//! This crate provides:
//! - re-exports of `checkercal-core` (board, correspondences, record, config),
//! - (feature `opencv`) the OpenCV-backed camera, corner detector, preview
//!   window and calibration solve,
//! - (feature `opencv`) [`run_calibration`], the end-to-end run: capture
//!   until enough boards are seen, solve, write `calibration_matrix.yaml`,
//! - (feature `opencv`) [`run_undistort_preview`], a live check of a written
//!   calibration file,
//! - (feature `cli`) the `checkercal` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use checkercal::{run_calibration, CalibrationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CalibrationConfig::default();
//! let outcome = run_calibration(&cfg)?;
//! println!("rms = {:.3}px, roi = {:?}", outcome.rms, outcome.record.roi);
//! # Ok(())
//! # }
//! ```
//!
//! Corner finding, sub-pixel refinement and the calibration solver are
//! OpenCV's; this crate only sequences the calls.

pub use checkercal_core as core;
pub use checkercal_core::{
    BoardSpec, CalibrationConfig, CalibrationRecord, CameraConfig, CaptureStats, Correspondences,
    PreviewConfig, RefineConfig, Roi,
};

#[cfg(feature = "opencv")]
pub mod camera;
#[cfg(feature = "opencv")]
pub mod convert;
#[cfg(feature = "opencv")]
pub mod detect;
#[cfg(feature = "opencv")]
mod error;
#[cfg(feature = "opencv")]
pub mod preview;
#[cfg(feature = "opencv")]
mod run;
#[cfg(feature = "opencv")]
pub mod solve;
#[cfg(feature = "opencv")]
pub mod undistort;

#[cfg(feature = "opencv")]
pub use error::CalibrateError;
#[cfg(feature = "opencv")]
pub use run::{run_calibration, CalibrationOutcome};
#[cfg(feature = "opencv")]
pub use undistort::run_undistort_preview;
