//! Pinhole camera model with radial-tangential distortion.
//!
//! This is the standard "plumb bob" model: perspective division followed by
//! two radial terms (k1, k2) and two tangential terms (p1, p2). It adheres
//! to the [`CameraModel`] trait defined in the parent `camera` module and
//! matches the `PinholeRadTan` intrinsics type of rig configurations.

use crate::camera::{validation, CameraModel, CameraModelError, Intrinsics, Resolution};
use log::info;
use nalgebra::{DVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Pinhole projection with radial-tangential distortion.
///
/// # Fields
///
/// * `intrinsics`: [`Intrinsics`] - focal lengths (fx, fy) and principal point (cx, cy).
/// * `resolution`: [`Resolution`] - image width and height in pixels.
/// * `distortion`: `[k1, k2, p1, p2]` - two radial and two tangential
///   coefficients, the four the rectification pipeline consumes.
///
/// # Examples
///
/// ```rust
/// use nalgebra::DVector;
/// use calib_tools::camera::rad_tan::RadTanModel;
/// use calib_tools::camera::Resolution;
///
/// // Parameters: fx, fy, cx, cy, k1, k2, p1, p2
/// let params = DVector::from_vec(vec![
///     460.0, 460.0, 320.0, 240.0, -0.28, 0.07, 0.0002, 0.00002,
/// ]);
/// let mut model = RadTanModel::new(&params).unwrap();
/// model.resolution = Resolution { width: 640, height: 480 };
/// assert_eq!(model.intrinsics.fx, 460.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadTanModel {
    /// Camera intrinsic parameters: `fx`, `fy`, `cx`, `cy`.
    pub intrinsics: Intrinsics,
    /// Image resolution as width and height in pixels.
    pub resolution: Resolution,
    /// Distortion coefficients `[k1, k2, p1, p2]`.
    pub distortion: [f64; 4],
}

impl RadTanModel {
    /// Creates a new [`RadTanModel`] from a parameter vector
    /// `[fx, fy, cx, cy, k1, k2, p1, p2]`.
    ///
    /// The image resolution is initialized to 0x0 and should be set
    /// explicitly, typically from the rig configuration's `image_size`.
    pub fn new(parameters: &DVector<f64>) -> Result<Self, CameraModelError> {
        if parameters.len() != 8 {
            return Err(CameraModelError::InvalidParams(format!(
                "Expected 8 parameters (fx, fy, cx, cy, k1, k2, p1, p2), got {}",
                parameters.len()
            )));
        }

        let model = RadTanModel {
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

        info!("new RadTan model is: {model:?}");
        Ok(model)
    }
}

impl CameraModel for RadTanModel {
    fn project(&self, point_3d: &Vector3<f64>) -> Result<Vector2<f64>, CameraModelError> {
        let z = point_3d.z;
        if z.abs() < f64::EPSILON.sqrt() {
            return Err(CameraModelError::PointAtCameraCenter);
        }

        let x_prime = point_3d.x / z;
        let y_prime = point_3d.y / z;

        let [k1, k2, p1, p2] = self.distortion;

        let r2 = x_prime * x_prime + y_prime * y_prime;
        let r4 = r2 * r2;
        let xy = x_prime * y_prime;

        let radial = 1.0 + k1 * r2 + k2 * r4;
        let dx = 2.0 * p1 * xy + p2 * (r2 + 2.0 * x_prime * x_prime);
        let dy = p1 * (r2 + 2.0 * y_prime * y_prime) + 2.0 * p2 * xy;

        let x_distorted = radial * x_prime + dx;
        let y_distorted = radial * y_prime + dy;

        Ok(Vector2::new(
            self.intrinsics.fx * x_distorted + self.intrinsics.cx,
            self.intrinsics.fy * y_distorted + self.intrinsics.cy,
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
        "rad_tan"
    }
}
