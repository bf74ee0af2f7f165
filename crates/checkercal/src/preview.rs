//! Debug window showing each accepted detection.

use crate::{convert::to_cv_points2, detect::pattern_size, CalibrateError};
use checkercal_core::{BoardSpec, PreviewConfig};
use nalgebra::Point2;
use opencv::{
    calib3d,
    core::{Mat, Size},
    highgui,
};

pub struct Preview {
    cfg: PreviewConfig,
    pattern: Size,
    shown: usize,
}

impl Preview {
    pub fn new(cfg: &PreviewConfig, board: &BoardSpec) -> Self {
        Self {
            cfg: cfg.clone(),
            pattern: pattern_size(board),
            shown: 0,
        }
    }

    /// Draw `corners` onto `frame`, show it and block for the configured delay.
    ///
    /// No-op when the preview is disabled.
    pub fn show(
        &mut self,
        frame: &mut Mat,
        corners: &[Point2<f32>],
        accepted: usize,
    ) -> Result<(), CalibrateError> {
        if !self.cfg.enabled {
            return Ok(());
        }
        let cv_corners = to_cv_points2(corners);
        calib3d::draw_chessboard_corners(frame, self.pattern, &cv_corners, true)?;
        highgui::imshow(&self.cfg.window_name, &*frame)?;
        highgui::wait_key(self.cfg.delay_ms)?;
        self.shown += 1;
        log::debug!("previewed view {accepted}");
        Ok(())
    }

    /// Close the windows opened by [`Preview::show`].
    pub fn close(&mut self) -> Result<(), CalibrateError> {
        if self.shown > 0 {
            highgui::destroy_all_windows()?;
            self.shown = 0;
        }
        Ok(())
    }
}
