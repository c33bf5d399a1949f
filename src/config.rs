//! Rig configuration loading.
//!
//! Reads a camcalib-style YAML file describing a set of named sensors, each
//! with intrinsic parameters (`intrinsics.type` + `intrinsics.parameters`)
//! and extrinsic parameters (`extrinsics.axis_angle` +
//! `extrinsics.translation`), and builds the camera models and poses for
//! the first two sensors.
//!
//! Exactly two intrinsics types are supported, `PinholeRadTan` and
//! `KannalaBrandt`; the stereo rectification routines can handle nothing
//! else, so a rig mixing the two (or naming any other type) is rejected
//! outright.

use nalgebra::{DVector, Vector3};
use yaml_rust::{Yaml, YamlLoader};

use crate::camera::{CameraModel, CameraModelError, KannalaBrandtModel, RadTanModel, Resolution};
use crate::geometry::Pose;

/// The distortion family shared by both sensors of a rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    /// Pinhole projection with radial-tangential coefficients k1, k2, p1, p2.
    PinholeRadTan,
    /// Kannala-Brandt fisheye with coefficients k1..k4.
    KannalaBrandt,
}

impl CameraKind {
    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "PinholeRadTan" => Some(CameraKind::PinholeRadTan),
            "KannalaBrandt" => Some(CameraKind::KannalaBrandt),
            _ => None,
        }
    }

    /// The parameter keys holding this family's distortion coefficients,
    /// in the order the camera models expect them.
    fn distortion_keys(&self) -> [&'static str; 4] {
        match self {
            CameraKind::PinholeRadTan => ["k1", "k2", "p1", "p2"],
            CameraKind::KannalaBrandt => ["k1", "k2", "k3", "k4"],
        }
    }
}

/// One sensor's calibration: its camera model and its pose in the rig
/// reference frame.
pub struct SensorCalibration {
    /// Sensor name, also the name of its image subfolder.
    pub name: String,
    /// The sensor's camera model.
    pub model: Box<dyn CameraModel>,
    /// The sensor's extrinsics as a rigid transform.
    pub pose: Pose,
}

/// A two-sensor rig loaded from a configuration file.
pub struct StereoRig {
    /// The distortion family both sensors share.
    pub kind: CameraKind,
    /// The two sensors, ordered lexicographically by name.
    pub sensors: [SensorCalibration; 2],
}

/// Errors raised while loading a rig configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Failure during file input/output operations.
    #[error("IO Error: {0}")]
    IOError(String),
    /// Failure during YAML parsing.
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    /// A required node is missing or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    InvalidParams(String),
    /// An intrinsics type other than the two supported ones.
    #[error("Unsupported intrinsics type: {0}")]
    UnsupportedModel(String),
    /// The two sensors do not share one distortion family. Fatal: the
    /// rectification routines cannot handle mixed models.
    #[error("Camera models must match, got {0} and {1}")]
    ModelMismatch(String, String),
    /// Fewer than two sensors in the configuration.
    #[error("Configuration must name at least two sensors, got {0}")]
    NotEnoughSensors(usize),
    /// Camera parameters rejected by the model itself.
    #[error("Camera model error: {0}")]
    CameraModel(#[from] CameraModelError),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IOError(err.to_string())
    }
}

impl From<yaml_rust::ScanError> for ConfigError {
    fn from(err: yaml_rust::ScanError) -> Self {
        ConfigError::YamlError(err.to_string())
    }
}

/// Reads a numeric scalar, accepting both YAML floats and integers.
fn as_number(node: &Yaml) -> Option<f64> {
    node.as_f64().or_else(|| node.as_i64().map(|v| v as f64))
}

fn require_number(node: &Yaml, context: &str) -> Result<f64, ConfigError> {
    as_number(node)
        .ok_or_else(|| ConfigError::InvalidParams(format!("'{context}' is missing or not a number")))
}

fn require_vector3(node: &Yaml, context: &str) -> Result<Vector3<f64>, ConfigError> {
    let values = node
        .as_vec()
        .ok_or_else(|| ConfigError::InvalidParams(format!("'{context}' is not a sequence")))?;
    if values.len() != 3 {
        return Err(ConfigError::InvalidParams(format!(
            "'{context}' must have 3 elements, got {}",
            values.len()
        )));
    }
    Ok(Vector3::new(
        require_number(&values[0], context)?,
        require_number(&values[1], context)?,
        require_number(&values[2], context)?,
    ))
}

fn parse_resolution(parameters: &Yaml, sensor: &str) -> Result<Resolution, ConfigError> {
    let context = format!("sensors.{sensor}.intrinsics.parameters.image_size");
    let values = parameters["image_size"]
        .as_vec()
        .ok_or_else(|| ConfigError::InvalidParams(format!("'{context}' is not a sequence")))?;
    if values.len() != 2 {
        return Err(ConfigError::InvalidParams(format!(
            "'{context}' must be [width, height], got {} elements",
            values.len()
        )));
    }
    Ok(Resolution {
        width: require_number(&values[0], &context)? as u32,
        height: require_number(&values[1], &context)? as u32,
    })
}

fn parse_sensor(name: &str, node: &Yaml) -> Result<(CameraKind, SensorCalibration), ConfigError> {
    let intrinsics = &node["intrinsics"];
    if intrinsics.is_badvalue() {
        return Err(ConfigError::InvalidParams(format!(
            "Missing 'intrinsics' node for sensor '{name}'"
        )));
    }

    let type_name = intrinsics["type"].as_str().ok_or_else(|| {
        ConfigError::InvalidParams(format!("Missing 'intrinsics.type' for sensor '{name}'"))
    })?;
    let kind = CameraKind::from_type_name(type_name)
        .ok_or_else(|| ConfigError::UnsupportedModel(type_name.to_string()))?;

    let parameters = &intrinsics["parameters"];
    if parameters.is_badvalue() {
        return Err(ConfigError::InvalidParams(format!(
            "Missing 'intrinsics.parameters' for sensor '{name}'"
        )));
    }

    let mut values = Vec::with_capacity(8);
    for key in ["fx", "fy", "cx", "cy"] {
        values.push(require_number(
            &parameters[key],
            &format!("sensors.{name}.intrinsics.parameters.{key}"),
        )?);
    }
    for key in kind.distortion_keys() {
        values.push(require_number(
            &parameters[key],
            &format!("sensors.{name}.intrinsics.parameters.{key}"),
        )?);
    }
    let resolution = parse_resolution(parameters, name)?;

    let model: Box<dyn CameraModel> = match kind {
        CameraKind::PinholeRadTan => {
            let mut model = RadTanModel::new(&DVector::from_vec(values))?;
            model.resolution = resolution;
            Box::new(model)
        }
        CameraKind::KannalaBrandt => {
            let mut model = KannalaBrandtModel::new(&DVector::from_vec(values))?;
            model.resolution = resolution;
            Box::new(model)
        }
    };
    model.validate_params()?;

    let extrinsics = &node["extrinsics"];
    if extrinsics.is_badvalue() {
        return Err(ConfigError::InvalidParams(format!(
            "Missing 'extrinsics' node for sensor '{name}'"
        )));
    }
    let axis_angle = require_vector3(
        &extrinsics["axis_angle"],
        &format!("sensors.{name}.extrinsics.axis_angle"),
    )?;
    let translation = require_vector3(
        &extrinsics["translation"],
        &format!("sensors.{name}.extrinsics.translation"),
    )?;

    Ok((
        kind,
        SensorCalibration {
            name: name.to_string(),
            model,
            pose: Pose::from_axis_angle(&axis_angle, &translation),
        },
    ))
}

/// Loads the first two sensors of a rig configuration file.
///
/// Sensors are ordered lexicographically by name. Both must carry the same
/// intrinsics type; a mismatch is unrecoverable and fails the load.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, the YAML does not
/// parse, required nodes are missing or malformed, an intrinsics type is
/// unsupported, or the two sensors' types differ.
pub fn load_stereo_rig(path: &str) -> Result<StereoRig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let docs = YamlLoader::load_from_str(&contents)?;

    if docs.is_empty() {
        return Err(ConfigError::InvalidParams(
            "Empty YAML document".to_string(),
        ));
    }

    let doc = &docs[0];
    let sensors = doc["sensors"].as_hash().ok_or_else(|| {
        ConfigError::InvalidParams("Missing 'sensors' mapping in configuration".to_string())
    })?;

    let mut names: Vec<&str> = sensors
        .keys()
        .filter_map(|key| key.as_str())
        .collect();
    names.sort_unstable();
    if names.len() < 2 {
        return Err(ConfigError::NotEnoughSensors(names.len()));
    }

    let (kind0, sensor0) = parse_sensor(names[0], &doc["sensors"][names[0]])?;
    let (kind1, sensor1) = parse_sensor(names[1], &doc["sensors"][names[1]])?;

    if kind0 != kind1 {
        return Err(ConfigError::ModelMismatch(
            sensor0.model.get_model_name().to_string(),
            sensor1.model.get_model_name().to_string(),
        ));
    }

    log::info!(
        "loaded rig '{}' / '{}' ({:?})",
        sensor0.name,
        sensor1.name,
        kind0
    );

    Ok(StereoRig {
        kind: kind0,
        sensors: [sensor0, sensor1],
    })
}
