//! Conversions between `nalgebra` types and OpenCV containers.

use crate::CalibrateError;
use nalgebra::{Matrix3, Point2, Point3};
use opencv::{
    core::{Mat, Point2f, Point3f, Vector, CV_64F},
    prelude::*,
};

pub fn to_cv_points2(points: &[Point2<f32>]) -> Vector<Point2f> {
    points.iter().map(|p| Point2f::new(p.x, p.y)).collect()
}

pub fn from_cv_points2(points: &Vector<Point2f>) -> Vec<Point2<f32>> {
    points.iter().map(|p| Point2::new(p.x, p.y)).collect()
}

pub fn to_cv_points3(points: &[Point3<f32>]) -> Vector<Point3f> {
    points.iter().map(|p| Point3f::new(p.x, p.y, p.z)).collect()
}

pub fn matrix3_to_mat(m: &Matrix3<f64>) -> Result<Mat, CalibrateError> {
    let rows = [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ];
    Ok(Mat::from_slice_2d(&rows[..])?)
}

/// Read a 3x3 double matrix, as returned by the calib3d routines.
pub fn mat_to_matrix3(mat: &Mat) -> Result<Matrix3<f64>, CalibrateError> {
    if mat.rows() != 3 || mat.cols() != 3 || mat.typ() != CV_64F {
        return Err(CalibrateError::MatrixShape {
            rows: mat.rows(),
            cols: mat.cols(),
            typ: mat.typ(),
        });
    }
    let mut out = Matrix3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            out[(r, c)] = *mat.at_2d::<f64>(r as i32, c as i32)?;
        }
    }
    Ok(out)
}
