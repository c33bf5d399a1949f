//! Stereo rectification.
//!
//! Computes, for a pair of calibrated cameras and their relative pose, the
//! rectification rotations `r1`/`r2` and projections `p1`/`p2` that bring
//! corresponding image rows into alignment, plus the disparity-to-depth
//! matrix `q`. The per-pixel remap tables that apply these transforms live
//! in the [`remap`] submodule.
//!
//! The construction places the rectified x-axis along the baseline and
//! keeps both cameras at the averaged focal length and principal point.

mod remap;

pub use remap::{crop, hconcat, init_rectify_map, remap, Interpolation, RectifyMap, Roi};

use nalgebra::{Matrix3, Matrix3x4, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::camera::{CameraModelError, Intrinsics};
use crate::geometry::Pose;

/// Errors raised by the rectification routines.
#[derive(thiserror::Error, Debug)]
pub enum RectifyError {
    /// The two cameras are (numerically) in the same place; no epipolar
    /// geometry exists to rectify.
    #[error("Stereo rectification requires a non-zero baseline")]
    ZeroBaseline,
    /// A parameter outside the routine's domain.
    #[error("Invalid rectification parameters: {0}")]
    InvalidParams(String),
    /// Error from the underlying camera model.
    #[error("Camera model error: {0}")]
    CameraModel(#[from] CameraModelError),
    /// Failure during file input/output operations.
    #[error("IO Error: {0}")]
    IOError(String),
    /// Failure serializing rectification parameters.
    #[error("Failed to write YAML: {0}")]
    YamlError(String),
}

impl From<std::io::Error> for RectifyError {
    fn from(err: std::io::Error) -> Self {
        RectifyError::IOError(err.to_string())
    }
}

/// Rectification transforms for a stereo pair.
#[derive(Debug, Clone)]
pub struct StereoRectification {
    /// Rectifying rotation for camera 0.
    pub r1: Matrix3<f64>,
    /// Rectifying rotation for camera 1.
    pub r2: Matrix3<f64>,
    /// Projection matrix for camera 0 in the rectified frame.
    pub p1: Matrix3x4<f64>,
    /// Projection matrix for camera 1 in the rectified frame.
    pub p2: Matrix3x4<f64>,
    /// Disparity-to-depth mapping matrix.
    pub q: Matrix4<f64>,
}

/// Computes stereo rectification transforms.
///
/// `relative` is the pose of camera 1 with respect to camera 0, i.e. the
/// transform taking camera-0 coordinates to camera-1 coordinates
/// (`pose1 ∘ pose0⁻¹`).
///
/// The rectified frame is anchored at camera 0: its x-axis points along
/// the baseline, so that after applying `r1`/`r2` both image planes are
/// coplanar and row-aligned. Both projections share averaged focal lengths
/// and principal point; `p2` carries the baseline term `tx = −fx·B`.
///
/// # Errors
///
/// Returns [`RectifyError::ZeroBaseline`] when the cameras coincide.
pub fn stereo_rectify(
    intrinsics0: &Intrinsics,
    intrinsics1: &Intrinsics,
    relative: &Pose,
) -> Result<StereoRectification, RectifyError> {
    // Camera-1 center expressed in the camera-0 frame.
    let center1 = -(relative.rotation.transpose() * relative.translation);
    let baseline = center1.norm();
    if baseline <= 1e-12 {
        return Err(RectifyError::ZeroBaseline);
    }

    let ex = center1 / baseline;
    let helper = if ex[2].abs() < 0.9 {
        Vector3::<f64>::new(0.0, 0.0, 1.0)
    } else {
        Vector3::<f64>::new(0.0, 1.0, 0.0)
    };
    let ey = helper.cross(&ex).normalize();
    let ez = ex.cross(&ey).normalize();
    let basis = Matrix3::from_columns(&[ex, ey, ez]);
    let r_rect = basis.transpose();

    let r1 = r_rect;
    let r2 = r_rect * relative.rotation.transpose();

    let fx = 0.5 * (intrinsics0.fx + intrinsics1.fx);
    let fy = 0.5 * (intrinsics0.fy + intrinsics1.fy);
    let cx = 0.5 * (intrinsics0.cx + intrinsics1.cx);
    let cy = 0.5 * (intrinsics0.cy + intrinsics1.cy);
    let tx = -fx * baseline;

    let p1 = Matrix3x4::new(
        fx, 0.0, cx, 0.0, //
        0.0, fy, cy, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    );
    let p2 = Matrix3x4::new(
        fx, 0.0, cx, tx, //
        0.0, fy, cy, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    );

    // Reprojecting (x, y, disparity, 1) through q must give depth
    // Z/W = fx·B/d, so the disparity row carries -fx/tx = 1/B.
    let mut q = Matrix4::<f64>::zeros();
    q[(0, 0)] = 1.0;
    q[(0, 3)] = -cx;
    q[(1, 1)] = 1.0;
    q[(1, 3)] = -cy;
    q[(2, 3)] = fx;
    q[(3, 2)] = -fx / tx;

    Ok(StereoRectification { r1, r2, p1, p2, q })
}

/// Serializable form of [`StereoRectification`] for YAML export.
///
/// Matrices are stored row-major as nested sequences, the layout other
/// calibration tooling reads back without a linear-algebra dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectificationParams {
    /// 3×3 rectification rotation for camera 0.
    pub r1: Vec<Vec<f64>>,
    /// 3×3 rectification rotation for camera 1.
    pub r2: Vec<Vec<f64>>,
    /// 3×4 projection matrix for camera 0.
    pub p1: Vec<Vec<f64>>,
    /// 3×4 projection matrix for camera 1.
    pub p2: Vec<Vec<f64>>,
    /// 4×4 disparity-to-depth mapping matrix.
    pub q: Vec<Vec<f64>>,
}

fn matrix_rows<const R: usize, const C: usize>(
    matrix: &nalgebra::SMatrix<f64, R, C>,
) -> Vec<Vec<f64>> {
    (0..R)
        .map(|i| (0..C).map(|j| matrix[(i, j)]).collect())
        .collect()
}

impl From<&StereoRectification> for RectificationParams {
    fn from(rectification: &StereoRectification) -> Self {
        RectificationParams {
            r1: matrix_rows(&rectification.r1),
            r2: matrix_rows(&rectification.r2),
            p1: matrix_rows(&rectification.p1),
            p2: matrix_rows(&rectification.p2),
            q: matrix_rows(&rectification.q),
        }
    }
}

impl StereoRectification {
    /// Writes the rectification parameters to a YAML file.
    pub fn save_to_yaml(&self, path: &str) -> Result<(), RectifyError> {
        let params = RectificationParams::from(self);
        let yaml = serde_yaml::to_string(&params)
            .map_err(|e| RectifyError::YamlError(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
