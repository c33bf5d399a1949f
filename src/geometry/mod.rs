//! Rigid-body transforms for camera extrinsics.
//!
//! A camera's extrinsics are a rigid transform from some reference frame
//! into the camera frame: `x_cam = R * x_ref + t`. This module provides the
//! [`Pose`] type holding that transform together with the small algebra the
//! rectification pipeline needs: construction from an axis-angle rotation,
//! inversion, and composition.

use nalgebra::{Matrix3, Rotation3, Vector3};

/// A rigid transform composed of a 3×3 rotation and a translation.
///
/// The rotation is expected to be orthonormal with determinant +1; inputs
/// are trusted and never re-orthonormalized across compositions.
///
/// # Examples
///
/// ```rust
/// use calib_tools::geometry::Pose;
/// use nalgebra::Vector3;
///
/// let p0 = Pose::identity();
/// let p1 = Pose::from_axis_angle(
///     &Vector3::zeros(),
///     &Vector3::new(1.0, 0.0, 0.0),
/// );
/// let relative = &p1 * &p0.inverse();
/// assert_eq!(relative.translation, Vector3::new(1.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Orthonormal rotation matrix.
    pub rotation: Matrix3<f64>,
    /// Translation vector.
    pub translation: Vector3<f64>,
}

impl Pose {
    /// Creates a pose from an explicit rotation matrix and translation.
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Pose {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Pose {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a pose from an axis-angle (Rodrigues) rotation vector and a
    /// translation, the form camera extrinsics are stored in on disk.
    ///
    /// The rotation vector's direction is the rotation axis and its norm is
    /// the rotation angle in radians.
    pub fn from_axis_angle(axis_angle: &Vector3<f64>, translation: &Vector3<f64>) -> Self {
        Pose {
            rotation: *Rotation3::from_scaled_axis(*axis_angle).matrix(),
            translation: *translation,
        }
    }

    /// Returns the inverse transform: `(Rᵀ, −Rᵀ t)`.
    pub fn inverse(&self) -> Self {
        let r_t = self.rotation.transpose();
        Pose {
            rotation: r_t,
            translation: -(r_t * self.translation),
        }
    }

    /// Applies the transform to a point.
    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }
}

/// Composition: `(a * b)` applies `b` first, then `a`.
impl std::ops::Mul<&Pose> for &Pose {
    type Output = Pose;

    fn mul(self, rhs: &Pose) -> Pose {
        Pose {
            rotation: self.rotation * rhs.rotation,
            translation: self.rotation * rhs.translation + self.translation,
        }
    }
}
