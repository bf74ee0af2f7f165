//! Live camera frame source.

use crate::CalibrateError;
use checkercal_core::{CameraConfig, FrameSource};
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture},
};

/// An opened capture device. The device is released on drop if
/// [`Camera::release`] was not called.
pub struct Camera {
    capture: VideoCapture,
    index: i32,
    released: bool,
}

impl Camera {
    /// Open device `cfg.device_index` and request `cfg.width x cfg.height`.
    pub fn open(cfg: &CameraConfig) -> Result<Self, CalibrateError> {
        let mut capture = VideoCapture::new(cfg.device_index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(CalibrateError::CameraUnavailable {
                index: cfg.device_index,
            });
        }

        let accepted = request_resolution(cfg, |prop, value| capture.set(prop, value))?;
        if !accepted {
            log::warn!(
                "camera {} ignored the {}x{} resolution request",
                cfg.device_index,
                cfg.width,
                cfg.height
            );
        }

        let camera = Self {
            capture,
            index: cfg.device_index,
            released: false,
        };
        let size = camera.reported_size()?;
        log::info!(
            "opened camera {} at {}x{}",
            camera.index,
            size.width,
            size.height
        );
        Ok(camera)
    }

    /// Frame size as reported by the driver.
    pub fn reported_size(&self) -> Result<Size, CalibrateError> {
        let width = self.capture.get(videoio::CAP_PROP_FRAME_WIDTH)?;
        let height = self.capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?;
        Ok(Size::new(width as i32, height as i32))
    }

    pub fn release(mut self) -> Result<(), CalibrateError> {
        self.released = true;
        self.capture.release()?;
        log::debug!("released camera {}", self.index);
        Ok(())
    }
}

/// Send both the width and the height request, even when the first one is
/// refused. Returns whether the backend accepted both.
fn request_resolution<F>(cfg: &CameraConfig, mut set: F) -> Result<bool, CalibrateError>
where
    F: FnMut(i32, f64) -> opencv::Result<bool>,
{
    let width_ok = set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(cfg.width))?;
    let height_ok = set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(cfg.height))?;
    Ok(width_ok && height_ok)
}

impl FrameSource for Camera {
    type Frame = Mat;
    type Error = CalibrateError;

    fn grab(&mut self) -> Result<Mat, CalibrateError> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.size()?.width < 1 {
            return Err(CalibrateError::EmptyFrame);
        }
        Ok(frame)
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.capture.release() {
            log::warn!("failed to release camera {}: {err}", self.index);
        }
    }
}
