//! Core types for one-shot checkerboard camera calibration.
//!
//! This crate is intentionally free of any image or vision library. It
//! owns the parts of the calibration run that are plain data and control
//! flow:
//! - the board geometry and its 3D object points,
//! - the accumulated 3D/2D correspondences,
//! - the bounded capture loop, written against [`FrameSource`] and
//!   [`PatternDetector`],
//! - the run configuration and the persisted [`CalibrationRecord`].
//!
//! The OpenCV-backed pieces (camera, detector, solver) live in the
//! `checkercal` crate.

mod board;
mod config;
mod correspondences;
mod logger;
mod record;
mod roi;
mod session;

pub use board::{BoardError, BoardSpec};
pub use config::{
    CalibrationConfig, CameraConfig, ConfigError, ConfigIoError, PreviewConfig, RefineConfig,
};
pub use correspondences::{CorrespondenceError, Correspondences, View};
pub use record::{CalibrationRecord, RecordError, VALID_DISTORTION_LENGTHS};
pub use roi::Roi;
pub use session::{
    collect_views, CapturePlan, CaptureStats, FrameSource, PatternDetector, SessionError,
    NOT_FOUND_LEVEL,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
