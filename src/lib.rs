//! Camera Calibration Tools
//!
//! This crate bundles the small utilities that surround a stereo camera
//! calibration workflow:
//! - printable calibration targets: ChArUco boards and circle/checkerboard
//!   grids with embedded fiducial markers (see [`target`]);
//! - stereo rectification of image pairs from a two-sensor rig
//!   configuration (see [`rectify`] and [`config`]).
//!
//! There is no solver and no marker detection here; the crate renders
//! targets and applies standard stereo geometry. The supported camera
//! models are the pinhole/radial-tangential model ([`camera::RadTanModel`])
//! and the Kannala-Brandt fisheye model ([`camera::KannalaBrandtModel`]).

pub mod camera;
pub mod config;
pub mod geometry;
pub mod rectify;
pub mod target;

// Re-export commonly used types
pub use camera::{
    CameraModel, CameraModelError, Intrinsics, KannalaBrandtModel, RadTanModel, Resolution,
};
pub use config::{CameraKind, ConfigError, SensorCalibration, StereoRig};
pub use geometry::Pose;
pub use rectify::{Interpolation, RectifyError, RectifyMap, Roi, StereoRectification};
pub use target::{PageFormat, TargetError};
