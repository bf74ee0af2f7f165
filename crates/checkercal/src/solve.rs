//! Calibration solve and optimal new camera matrix.

use crate::{
    convert::{mat_to_matrix3, matrix3_to_mat, to_cv_points2, to_cv_points3},
    CalibrateError,
};
use checkercal_core::{Correspondences, Roi};
use nalgebra::Matrix3;
use opencv::{
    calib3d,
    core::{Mat, Point2f, Point3f, Rect, Size, TermCriteria, TermCriteria_Type, Vector},
};

/// Result of the calibration solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Intrinsics {
    pub camera_matrix: Matrix3<f64>,
    pub dist_coeffs: Vec<f64>,
    /// RMS reprojection error in pixels.
    pub rms: f64,
}

/// Run the calibration solve over all accepted views.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip(views), fields(views = views.len()))
)]
pub fn calibrate(views: Correspondences, image_size: Size) -> Result<Intrinsics, CalibrateError> {
    if views.is_empty() {
        return Err(CalibrateError::NotEnoughViews);
    }

    let mut object_points = Vector::<Vector<Point3f>>::new();
    let mut image_points = Vector::<Vector<Point2f>>::new();
    for view in views.into_views() {
        object_points.push(to_cv_points3(&view.object_points));
        image_points.push(to_cv_points2(&view.image_points));
    }

    let mut camera_matrix = Mat::default();
    let mut dist_coeffs = Vector::<f64>::new();
    let mut rvecs = Vector::<Mat>::new();
    let mut tvecs = Vector::<Mat>::new();

    let rms = calib3d::calibrate_camera(
        &object_points,
        &image_points,
        image_size,
        &mut camera_matrix,
        &mut dist_coeffs,
        &mut rvecs,
        &mut tvecs,
        0,
        // calib3d's own default criteria.
        TermCriteria::new(
            TermCriteria_Type::COUNT as i32 + TermCriteria_Type::EPS as i32,
            30,
            f64::EPSILON,
        )?,
    )?;

    Ok(Intrinsics {
        camera_matrix: mat_to_matrix3(&camera_matrix)?,
        dist_coeffs: dist_coeffs.to_vec(),
        rms,
    })
}

/// Refine the camera matrix for undistortion at `image_size` with free
/// scaling `alpha`, returning it with the valid-pixel ROI.
pub fn optimal_camera_matrix(
    intrinsics: &Intrinsics,
    image_size: Size,
    alpha: f64,
) -> Result<(Matrix3<f64>, Roi), CalibrateError> {
    let camera_matrix = matrix3_to_mat(&intrinsics.camera_matrix)?;
    let dist_coeffs = Vector::<f64>::from_slice(&intrinsics.dist_coeffs);
    let mut roi = Rect::default();

    let optimal = calib3d::get_optimal_new_camera_matrix(
        &camera_matrix,
        &dist_coeffs,
        image_size,
        alpha,
        image_size,
        Some(&mut roi),
        false,
    )?;

    Ok((
        mat_to_matrix3(&optimal)?,
        Roi::new(roi.x, roi.y, roi.width, roi.height),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use checkercal_core::{BoardSpec, View};
    use nalgebra::{Point2, Rotation3, Vector3};

    fn ground_truth() -> Matrix3<f64> {
        Matrix3::new(
            600.0, 0.0, 320.0, //
            0.0, 600.0, 240.0, //
            0.0, 0.0, 1.0,
        )
    }

    /// Pinhole projection of the board seen from a few tilted poses.
    fn synthetic_views() -> Correspondences {
        let k = ground_truth();
        let board = BoardSpec::default();
        let object = board.object_points();
        let poses = [
            (0.0, 0.0, 0.0, Vector3::new(-4.0, -2.5, 20.0)),
            (0.35, 0.0, 0.05, Vector3::new(-4.0, -2.0, 22.0)),
            (-0.3, 0.2, 0.0, Vector3::new(-3.5, -3.0, 19.0)),
            (0.0, -0.4, -0.1, Vector3::new(-4.5, -2.5, 21.0)),
            (0.25, 0.3, 0.2, Vector3::new(-4.0, -2.0, 18.0)),
        ];

        let mut views = Correspondences::new();
        for (roll, pitch, yaw, t) in poses {
            let r = Rotation3::from_euler_angles(roll, pitch, yaw);
            let image = object
                .iter()
                .map(|p| {
                    let x = r * Vector3::new(p.x as f64, p.y as f64, p.z as f64) + t;
                    let u = k[(0, 0)] * x.x / x.z + k[(0, 2)];
                    let v = k[(1, 1)] * x.y / x.z + k[(1, 2)];
                    Point2::new(u as f32, v as f32)
                })
                .collect();
            views
                .push(View {
                    object_points: object.clone(),
                    image_points: image,
                })
                .expect("view");
        }
        views
    }

    #[test]
    fn recovers_focal_length_and_principal_point() {
        let intr = calibrate(synthetic_views(), Size::new(640, 480)).expect("calibrate");
        let k = intr.camera_matrix;
        assert_relative_eq!(k[(0, 0)], 600.0, epsilon = 1.0);
        assert_relative_eq!(k[(1, 1)], 600.0, epsilon = 1.0);
        assert_relative_eq!(k[(0, 2)], 320.0, epsilon = 1.0);
        assert_relative_eq!(k[(1, 2)], 240.0, epsilon = 1.0);
        assert_eq!(intr.dist_coeffs.len(), 5);
        assert!(intr.rms < 0.05, "rms = {}", intr.rms);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            calibrate(Correspondences::new(), Size::new(640, 480)),
            Err(CalibrateError::NotEnoughViews)
        ));
    }

    #[test]
    fn distortion_free_camera_keeps_its_matrix() {
        let intr = Intrinsics {
            camera_matrix: ground_truth(),
            dist_coeffs: vec![0.0; 5],
            rms: 0.0,
        };
        let (k, roi) = optimal_camera_matrix(&intr, Size::new(640, 480), 1.0).expect("optimal");
        assert_relative_eq!(k[(0, 0)], 600.0, epsilon = 2.0);
        assert_relative_eq!(k[(0, 2)], 320.0, epsilon = 2.0);
        assert_eq!(k[(2, 2)], 1.0);
        assert_eq!(roi.clamp_to(640, 480), roi);
        assert!(roi.width > 600 && roi.height > 440, "roi = {roi:?}");
    }
}
