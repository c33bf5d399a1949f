//! Kannala-Brandt fisheye camera model.
//!
//! The equidistant fisheye model with a four-term odd polynomial in the
//! incidence angle θ, as used by the `KannalaBrandt` intrinsics type of rig
//! configurations. It adheres to the [`CameraModel`] trait defined in the
//! parent `camera` module.
//!
//! # References
//!
//! Kannala, J., Brandt, S. (2006). A Generic Camera Model and Calibration
//! Method for Conventional, Wide-Angle, and Fish-Eye Lenses.

use crate::camera::{validation, CameraModel, CameraModelError, Intrinsics, Resolution};
use log::info;
use nalgebra::{DVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Kannala-Brandt fisheye projection with coefficients k1..k4.
///
/// The distorted angle is `θ_d = θ (1 + k1 θ² + k2 θ⁴ + k3 θ⁶ + k4 θ⁸)`
/// where θ is the angle between the incoming ray and the optical axis.
///
/// # Examples
///
/// ```rust
/// use nalgebra::DVector;
/// use calib_tools::camera::kannala_brandt::KannalaBrandtModel;
/// use calib_tools::camera::Resolution;
///
/// // Parameters: fx, fy, cx, cy, k1, k2, k3, k4
/// let params = DVector::from_vec(vec![
///     460.0, 460.0, 320.0, 240.0, -0.01, 0.05, -0.08, 0.04,
/// ]);
/// let mut model = KannalaBrandtModel::new(&params).unwrap();
/// model.resolution = Resolution { width: 640, height: 480 };
/// assert_eq!(model.distortion[3], 0.04);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KannalaBrandtModel {
    /// Camera intrinsic parameters: `fx`, `fy`, `cx`, `cy`.
    pub intrinsics: Intrinsics,
    /// Image resolution as width and height in pixels.
    pub resolution: Resolution,
    /// Distortion coefficients `[k1, k2, k3, k4]`.
    pub distortion: [f64; 4],
}

impl KannalaBrandtModel {
    /// Creates a new [`KannalaBrandtModel`] from a parameter vector
    /// `[fx, fy, cx, cy, k1, k2, k3, k4]`.
    ///
    /// The image resolution is initialized to 0x0 and should be set
    /// explicitly, typically from the rig configuration's `image_size`.
    pub fn new(parameters: &DVector<f64>) -> Result<Self, CameraModelError> {
        if parameters.len() != 8 {
            return Err(CameraModelError::InvalidParams(format!(
                "Expected 8 parameters (fx, fy, cx, cy, k1, k2, k3, k4), got {}",
                parameters.len()
            )));
        }

        let model = KannalaBrandtModel {
            intrinsics: Intrinsics {
                fx: parameters[0],
                fy: parameters[1],
                cx: parameters[2],
                cy: parameters[3],
            },
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            distortion: [parameters[4], parameters[5], parameters[6], parameters[7]],
        };

        info!("new Kannala-Brandt model is: {model:?}");
        Ok(model)
    }
}

impl CameraModel for KannalaBrandtModel {
    fn project(&self, point_3d: &Vector3<f64>) -> Result<Vector2<f64>, CameraModelError> {
        let x = point_3d.x;
        let y = point_3d.y;
        let z = point_3d.z;

        let r = (x * x + y * y).sqrt();
        if r < f64::EPSILON.sqrt() && z.abs() < f64::EPSILON.sqrt() {
            return Err(CameraModelError::PointAtCameraCenter);
        }

        let [k1, k2, k3, k4] = self.distortion;

        let theta = r.atan2(z);
        let theta2 = theta * theta;
        let theta4 = theta2 * theta2;
        let theta6 = theta4 * theta2;
        let theta8 = theta4 * theta4;
        let theta_d = theta * (1.0 + k1 * theta2 + k2 * theta4 + k3 * theta6 + k4 * theta8);

        // On-axis rays project straight to the principal point.
        let scale = if r > f64::EPSILON.sqrt() {
            theta_d / r
        } else {
            1.0 / z
        };

        Ok(Vector2::new(
            self.intrinsics.fx * x * scale + self.intrinsics.cx,
            self.intrinsics.fy * y * scale + self.intrinsics.cy,
        ))
    }

    fn validate_params(&self) -> Result<(), CameraModelError> {
        validation::validate_intrinsics(&self.intrinsics)?;
        if self.distortion.iter().any(|k| !k.is_finite()) {
            return Err(CameraModelError::InvalidParams(
                "Distortion coefficients must be finite".to_string(),
            ));
        }
        Ok(())
    }

    fn get_resolution(&self) -> Resolution {
        self.resolution.clone()
    }

    fn get_intrinsics(&self) -> Intrinsics {
        self.intrinsics.clone()
    }

    fn get_distortion(&self) -> Vec<f64> {
        self.distortion.to_vec()
    }

    fn get_model_name(&self) -> &'static str {
        "kannala_brandt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> KannalaBrandtModel {
        let params = DVector::from_vec(vec![
            460.0, 460.0, 320.0, 240.0, -0.01, 0.05, -0.08, 0.04,
        ]);
        let mut model = KannalaBrandtModel::new(&params).unwrap();
        model.resolution = Resolution {
            width: 640,
            height: 480,
        };
        model
    }

    #[test]
    fn test_optical_axis_projects_to_principal_point() {
        let model = sample_model();
        let projected = model.project(&Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!((projected.x - 320.0).abs() < 1e-9);
        assert!((projected.y - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_coefficients_is_equidistant() {
        // With k1..k4 = 0 the model reduces to u = fx * θ * x / r + cx.
        let params = DVector::from_vec(vec![460.0, 460.0, 320.0, 240.0, 0.0, 0.0, 0.0, 0.0]);
        let model = KannalaBrandtModel::new(&params).unwrap();
        let projected = model.project(&Vector3::new(1.0, 0.0, 1.0)).unwrap();
        let expected_u = 460.0 * std::f64::consts::FRAC_PI_4 + 320.0;
        assert!((projected.x - expected_u).abs() < 1e-9);
        assert!((projected.y - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_angle_ray_stays_finite() {
        // Rays beyond 90° are representable in a fisheye model.
        let model = sample_model();
        let projected = model.project(&Vector3::new(2.0, 0.0, -0.5)).unwrap();
        assert!(projected.x.is_finite() && projected.y.is_finite());
    }

    #[test]
    fn test_point_at_camera_center_is_rejected() {
        let model = sample_model();
        assert!(model.project(&Vector3::new(0.0, 0.0, 0.0)).is_err());
    }
}
