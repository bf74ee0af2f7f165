use crate::{
    camera::Camera, detect::ChessboardDetector, preview::Preview, solve, CalibrateError,
};
use checkercal_core::{collect_views, CalibrationConfig, CalibrationRecord, CapturePlan, CaptureStats};
use opencv::core::Size;

/// Everything a calibration run produced besides the file on disk.
#[derive(Clone, Debug)]
pub struct CalibrationOutcome {
    pub record: CalibrationRecord,
    pub stats: CaptureStats,
    /// RMS reprojection error of the solve, in pixels.
    pub rms: f64,
}

/// Capture, solve and write the calibration file described by `cfg`.
///
/// Frames where the board is not visible are skipped. The camera is
/// released before the record is written to `cfg.output_path`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip(cfg), fields(device = cfg.camera.device_index))
)]
pub fn run_calibration(cfg: &CalibrationConfig) -> Result<CalibrationOutcome, CalibrateError> {
    cfg.validate()?;

    let mut camera = Camera::open(&cfg.camera)?;
    let mut detector = ChessboardDetector::new(&cfg.board, &cfg.refine)?;
    let mut preview = Preview::new(&cfg.preview, &cfg.board);
    let plan = CapturePlan {
        target: cfg.target_detections,
        max_frames: cfg.max_frames,
    };

    log::info!(
        "collecting {} views of a {}x{} board",
        plan.target,
        cfg.board.inner_cols,
        cfg.board.inner_rows
    );
    let collected = collect_views(
        &mut camera,
        &mut detector,
        &cfg.board,
        plan,
        |frame, corners, accepted| preview.show(frame, corners, accepted),
    );
    let closed = preview.close();
    let (views, stats) = collected?;
    closed?;

    let image_size = detector
        .image_size()
        .ok_or(CalibrateError::NotEnoughViews)?;
    let intrinsics = solve::calibrate(views, image_size)?;
    log::info!(
        "solved over {} views, rms reprojection error {:.4} px",
        stats.accepted,
        intrinsics.rms
    );

    let requested = Size::new(cfg.camera.width, cfg.camera.height);
    if requested != image_size {
        log::warn!(
            "frames were {}x{} but the optimal matrix is computed for the requested {}x{}",
            image_size.width,
            image_size.height,
            requested.width,
            requested.height
        );
    }
    let (optimal, roi) = solve::optimal_camera_matrix(&intrinsics, requested, cfg.alpha)?;

    camera.release()?;

    let record = CalibrationRecord::from_parts(&optimal, &intrinsics.dist_coeffs, roi);
    record.write_yaml(&cfg.output_path)?;
    log::info!("wrote {}", cfg.output_path.display());

    Ok(CalibrationOutcome {
        record,
        stats,
        rms: intrinsics.rms,
    })
}
