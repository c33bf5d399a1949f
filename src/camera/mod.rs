//! Camera models for the rectification pipeline.
//!
//! It provides a unified interface for projecting 3D points in the camera
//! frame to 2D pixel coordinates, together with the camera intrinsic
//! parameters, image resolution, and error handling for camera operations.
//!
//! Two models are supported, matching the two intrinsics types a rig
//! configuration may carry:
//! - `rad_tan`: pinhole projection with radial-tangential distortion;
//! - `kannala_brandt`: the Kannala-Brandt equidistant fisheye model.
//!
//! It also contains a `validation` submodule for common parameter
//! validation logic.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

// Camera model modules
pub mod kannala_brandt;
pub mod rad_tan;

// Re-export camera models
pub use kannala_brandt::KannalaBrandtModel;
pub use rad_tan::RadTanModel;

/// Represents the intrinsic parameters of a camera.
///
/// These parameters define the internal geometry of the camera,
/// including focal length and principal point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intrinsics {
    /// The focal length along the x-axis, in pixels.
    pub fx: f64,
    /// The focal length along the y-axis, in pixels.
    pub fy: f64,
    /// The x-coordinate of the principal point (optical center), in pixels.
    pub cx: f64,
    /// The y-coordinate of the principal point (optical center), in pixels.
    pub cy: f64,
}

impl Intrinsics {
    /// Returns the 3×3 calibration matrix `K`.
    pub fn matrix(&self) -> nalgebra::Matrix3<f64> {
        nalgebra::Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }
}

/// Represents the resolution of a camera image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// The width of the image in pixels.
    pub width: u32,
    /// The height of the image in pixels.
    pub height: u32,
}

/// Defines the possible errors that can occur during camera model operations.
#[derive(thiserror::Error, Debug)]
pub enum CameraModelError {
    /// A 3D point is too close to the camera center (z-coordinate near
    /// zero), making projection numerically unstable or undefined.
    #[error("z is close to zero, point is at camera center")]
    PointAtCameraCenter,
    /// A focal length parameter (fx or fy) is not positive.
    #[error("Focal length must be positive")]
    FocalLengthMustBePositive,
    /// A principal point coordinate (cx or cy) is not a finite number.
    #[error("Principal point must be finite")]
    PrincipalPointMustBeFinite,
    /// One or more camera parameters are invalid.
    #[error("Invalid camera parameters: {0}")]
    InvalidParams(String),
    /// A numerical instability or issue during calculations.
    #[error("NumericalError: {0}")]
    NumericalError(String),
}

/// Defines the core functionality and interface for the camera models.
///
/// Projection here is unbounded: a point may project outside the image
/// area, and the caller decides what to do with such coordinates. The
/// rectification map builder relies on this to mark out-of-image source
/// pixels rather than lose them.
pub trait CameraModel {
    /// Projects a 3D point from the camera's coordinate system to 2D pixel
    /// coordinates, applying the model's distortion.
    ///
    /// # Arguments
    /// * `point_3d` - The 3D point (X, Y, Z) in camera coordinates.
    ///
    /// # Returns
    /// The projected 2D point (u, v) in pixel coordinates, or
    /// [`CameraModelError::PointAtCameraCenter`] when the point is too
    /// close to the optical center for a stable projection.
    fn project(&self, point_3d: &Vector3<f64>) -> Result<Vector2<f64>, CameraModelError>;

    /// Validates the current camera parameters.
    fn validate_params(&self) -> Result<(), CameraModelError>;

    /// Returns the resolution of the camera.
    fn get_resolution(&self) -> Resolution;

    /// Returns the intrinsic parameters of the camera.
    fn get_intrinsics(&self) -> Intrinsics;

    /// Returns the distortion coefficients of the camera.
    ///
    /// The meaning and number of coefficients depend on the model:
    /// `[k1, k2, p1, p2]` for rad_tan, `[k1, k2, k3, k4]` for
    /// kannala_brandt.
    fn get_distortion(&self) -> Vec<f64>;

    /// Returns the name of the camera model.
    fn get_model_name(&self) -> &'static str;
}

/// Provides common validation functions for camera parameters.
pub mod validation {
    use super::*;

    /// Validates the intrinsic camera parameters.
    ///
    /// Checks that the focal lengths (fx, fy) are positive and that the
    /// principal point coordinates (cx, cy) are finite numbers.
    pub fn validate_intrinsics(intrinsics: &Intrinsics) -> Result<(), CameraModelError> {
        if intrinsics.fx <= 0.0 || intrinsics.fy <= 0.0 {
            return Err(CameraModelError::FocalLengthMustBePositive);
        }
        if !intrinsics.cx.is_finite() || !intrinsics.cy.is_finite() {
            return Err(CameraModelError::PrincipalPointMustBeFinite);
        }
        Ok(())
    }
}
