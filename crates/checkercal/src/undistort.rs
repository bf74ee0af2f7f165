//! Live undistortion preview for a written calibration file.

use crate::{camera::Camera, convert::matrix3_to_mat, CalibrateError};
use checkercal_core::{CalibrationRecord, CameraConfig, FrameSource, Roi};
use opencv::{
    calib3d,
    core::{self, Mat, Rect, Scalar, Size, Vector, CV_32FC1},
    highgui, imgproc,
    prelude::*,
};

const ORIGINAL_WINDOW: &str = "Original Frame";
const CALIBRATED_WINDOW: &str = "Calib Frame";
const ESC: i32 = 27;

/// Precomputed undistort-rectify maps for one frame size.
pub struct UndistortMaps {
    map1: Mat,
    map2: Mat,
    size: Size,
}

impl UndistortMaps {
    /// Maps for `record`, using its optimal matrix as both the source and
    /// the target camera matrix.
    pub fn new(record: &CalibrationRecord, size: Size) -> Result<Self, CalibrateError> {
        let camera_matrix = matrix3_to_mat(&record.camera_matrix())?;
        let dist_coeffs = Vector::<f64>::from_slice(record.distortion());
        let mut map1 = Mat::default();
        let mut map2 = Mat::default();
        calib3d::init_undistort_rectify_map(
            &camera_matrix,
            &dist_coeffs,
            &Mat::default(),
            &camera_matrix,
            size,
            CV_32FC1,
            &mut map1,
            &mut map2,
        )?;
        Ok(Self { map1, map2, size })
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn apply(&self, frame: &Mat) -> Result<Mat, CalibrateError> {
        let mut out = Mat::default();
        imgproc::remap(
            frame,
            &mut out,
            &self.map1,
            &self.map2,
            imgproc::INTER_LINEAR,
            core::BORDER_CONSTANT,
            Scalar::default(),
        )?;
        Ok(out)
    }
}

/// Copy the `roi` part of `frame`, clamped to the frame bounds.
///
/// An ROI that misses the frame entirely yields a full copy.
pub fn crop_to_roi(frame: &Mat, roi: Roi) -> Result<Mat, CalibrateError> {
    let size = frame.size()?;
    let clamped = roi.clamp_to(size.width, size.height);
    let mut out = Mat::default();
    if clamped.is_empty() {
        frame.copy_to(&mut out)?;
        return Ok(out);
    }
    let rect = Rect::new(clamped.x, clamped.y, clamped.width, clamped.height);
    Mat::roi(frame, rect)?.copy_to(&mut out)?;
    Ok(out)
}

/// Show raw and undistorted+cropped camera frames side by side until Esc.
pub fn run_undistort_preview(
    record: &CalibrationRecord,
    camera_cfg: &CameraConfig,
) -> Result<(), CalibrateError> {
    let mut camera = Camera::open(camera_cfg)?;
    let first = camera.grab()?;
    let maps = UndistortMaps::new(record, first.size()?)?;
    let roi = record.roi_rect();
    if roi.clamp_to(maps.size().width, maps.size().height) != roi {
        log::warn!(
            "roi {:?} exceeds the {}x{} frame, clamping",
            roi.to_array(),
            maps.size().width,
            maps.size().height
        );
    }
    log::info!("press Esc to quit");

    loop {
        let frame = camera.grab()?;
        let calibrated = crop_to_roi(&maps.apply(&frame)?, roi)?;

        highgui::imshow(ORIGINAL_WINDOW, &frame)?;
        highgui::imshow(CALIBRATED_WINDOW, &calibrated)?;
        if highgui::wait_key(30)? == ESC {
            break;
        }
    }

    highgui::destroy_all_windows()?;
    camera.release()
}
