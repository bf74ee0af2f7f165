//! Accumulated 3D board / 2D image correspondences.

use nalgebra::{Point2, Point3};

/// One accepted detection: board points paired positionally with image points.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub object_points: Vec<Point3<f32>>,
    pub image_points: Vec<Point2<f32>>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CorrespondenceError {
    #[error("view has {object} object points but {image} image points")]
    LengthMismatch { object: usize, image: usize },
    #[error("view has no points")]
    EmptyView,
}

/// Ordered views collected over a capture run.
///
/// Every stored view has equal-length, non-empty point lists.
#[derive(Clone, Debug, Default)]
pub struct Correspondences {
    views: Vec<View>,
}

impl Correspondences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            views: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, view: View) -> Result<(), CorrespondenceError> {
        let object = view.object_points.len();
        let image = view.image_points.len();
        if object != image {
            return Err(CorrespondenceError::LengthMismatch { object, image });
        }
        if object == 0 {
            return Err(CorrespondenceError::EmptyView);
        }
        self.views.push(view);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn total_points(&self) -> usize {
        self.views.iter().map(|v| v.image_points.len()).sum()
    }

    pub fn into_views(self) -> Vec<View> {
        self.views
    }
}
