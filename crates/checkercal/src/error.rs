use checkercal_core::{ConfigError, RecordError, SessionError};

/// Errors produced by an OpenCV-backed calibration run.
#[derive(thiserror::Error, Debug)]
pub enum CalibrateError {
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),

    #[error("camera {index} could not be opened")]
    CameraUnavailable { index: i32 },

    #[error("camera returned an empty frame")]
    EmptyFrame,

    #[error("calibration needs at least one accepted view")]
    NotEnoughViews,

    #[error("expected a 3x3 CV_64F matrix, got {rows}x{cols} of type {typ}")]
    MatrixShape { rows: i32, cols: i32, typ: i32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Record(#[from] RecordError),
}
