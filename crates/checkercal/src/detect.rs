//! Checkerboard corner finding with sub-pixel refinement.

use crate::{convert::from_cv_points2, CalibrateError};
use checkercal_core::{BoardSpec, PatternDetector, RefineConfig};
use nalgebra::Point2;
use opencv::{
    calib3d,
    core::{Mat, Point2f, Size, TermCriteria, TermCriteria_Type, Vector},
    imgproc,
    prelude::*,
};

/// Finds the inner corners of a checkerboard in BGR or gray frames.
pub struct ChessboardDetector {
    pattern: Size,
    win_size: Size,
    zero_zone: Size,
    criteria: TermCriteria,
    gray: Mat,
    image_size: Option<Size>,
}

impl ChessboardDetector {
    pub fn new(board: &BoardSpec, refine: &RefineConfig) -> Result<Self, CalibrateError> {
        let criteria = TermCriteria::new(
            TermCriteria_Type::COUNT as i32 + TermCriteria_Type::EPS as i32,
            refine.max_iterations,
            refine.epsilon,
        )?;
        Ok(Self {
            pattern: pattern_size(board),
            win_size: Size::new(refine.win_size, refine.win_size),
            zero_zone: Size::new(refine.zero_zone, refine.zero_zone),
            criteria,
            gray: Mat::default(),
            image_size: None,
        })
    }

    #[inline]
    pub fn pattern_size(&self) -> Size {
        self.pattern
    }

    /// Size of the last gray frame searched, if any.
    #[inline]
    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    /// Find and refine the corners in `frame`; `None` if the board is not visible.
    pub fn find(&mut self, frame: &Mat) -> Result<Option<Vector<Point2f>>, CalibrateError> {
        if frame.channels() == 1 {
            frame.copy_to(&mut self.gray)?;
        } else {
            imgproc::cvt_color(frame, &mut self.gray, imgproc::COLOR_BGR2GRAY, 0)?;
        }
        self.image_size = Some(self.gray.size()?);

        let mut corners = Vector::<Point2f>::new();
        let found = calib3d::find_chessboard_corners(
            &self.gray,
            self.pattern,
            &mut corners,
            calib3d::CALIB_CB_ADAPTIVE_THRESH | calib3d::CALIB_CB_NORMALIZE_IMAGE,
        )?;
        if !found {
            return Ok(None);
        }

        imgproc::corner_sub_pix(
            &self.gray,
            &mut corners,
            self.win_size,
            self.zero_zone,
            self.criteria,
        )?;
        Ok(Some(corners))
    }
}

impl PatternDetector<Mat> for ChessboardDetector {
    type Error = CalibrateError;

    fn detect(&mut self, frame: &Mat) -> Result<Option<Vec<Point2<f32>>>, CalibrateError> {
        Ok(self.find(frame)?.map(|corners| from_cv_points2(&corners)))
    }
}

/// Pattern size as the corner finder expects it: (columns, rows) of inner corners.
pub fn pattern_size(board: &BoardSpec) -> Size {
    Size::new(board.inner_cols as i32, board.inner_rows as i32)
}
