//! Integration tests for rig configuration loading

use calib_tools::config::{load_stereo_rig, CameraKind, ConfigError};
use std::fs;
use std::path::PathBuf;

fn write_temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write temp config");
    path
}

#[test]
fn test_load_pinhole_rig_sample() {
    let rig = load_stereo_rig("samples/stereo_pinhole.yaml").expect("Failed to load rig");

    assert_eq!(rig.kind, CameraKind::PinholeRadTan);
    // Sensors come back in lexicographic order.
    assert_eq!(rig.sensors[0].name, "cam_left");
    assert_eq!(rig.sensors[1].name, "cam_right");

    let intrinsics = rig.sensors[0].model.get_intrinsics();
    assert_eq!(intrinsics.fx, 458.654);
    let resolution = rig.sensors[0].model.get_resolution();
    assert_eq!((resolution.width, resolution.height), (752, 480));

    // cam_left is the rig reference.
    assert!(rig.sensors[0].pose.translation.norm() < 1e-12);
    assert!(rig.sensors[1].pose.translation.x < 0.0);
}

#[test]
fn test_load_fisheye_rig_sample() {
    let rig = load_stereo_rig("samples/stereo_kannala_brandt.yaml").expect("Failed to load rig");
    assert_eq!(rig.kind, CameraKind::KannalaBrandt);
    assert_eq!(rig.sensors[0].model.get_model_name(), "kannala_brandt");
    assert_eq!(rig.sensors[0].model.get_distortion().len(), 4);
}

#[test]
fn test_mixed_models_are_rejected() {
    let path = write_temp_config(
        "rig_mixed_models.yaml",
        r#"
sensors:
  a:
    intrinsics:
      type: PinholeRadTan
      parameters:
        fx: 400.0
        fy: 400.0
        cx: 320.0
        cy: 240.0
        k1: 0.0
        k2: 0.0
        p1: 0.0
        p2: 0.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [0.0, 0.0, 0.0]
  b:
    intrinsics:
      type: KannalaBrandt
      parameters:
        fx: 400.0
        fy: 400.0
        cx: 320.0
        cy: 240.0
        k1: 0.0
        k2: 0.0
        k3: 0.0
        k4: 0.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [-0.1, 0.0, 0.0]
"#,
    );

    let result = load_stereo_rig(path.to_str().expect("temp path"));
    assert!(matches!(result, Err(ConfigError::ModelMismatch(_, _))));
    fs::remove_file(path).ok();
}

#[test]
fn test_missing_parameter_is_reported_with_its_path() {
    let path = write_temp_config(
        "rig_missing_fy.yaml",
        r#"
sensors:
  a:
    intrinsics:
      type: PinholeRadTan
      parameters:
        fx: 400.0
        cx: 320.0
        cy: 240.0
        k1: 0.0
        k2: 0.0
        p1: 0.0
        p2: 0.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [0.0, 0.0, 0.0]
  b:
    intrinsics:
      type: PinholeRadTan
      parameters:
        fx: 400.0
        fy: 400.0
        cx: 320.0
        cy: 240.0
        k1: 0.0
        k2: 0.0
        p1: 0.0
        p2: 0.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [-0.1, 0.0, 0.0]
"#,
    );

    let error = load_stereo_rig(path.to_str().expect("temp path"))
        .err()
        .expect("load must fail");
    assert!(error.to_string().contains("sensors.a.intrinsics.parameters.fy"));
    fs::remove_file(path).ok();
}

#[test]
fn test_single_sensor_is_rejected() {
    let path = write_temp_config(
        "rig_single_sensor.yaml",
        r#"
sensors:
  only:
    intrinsics:
      type: PinholeRadTan
      parameters:
        fx: 400.0
        fy: 400.0
        cx: 320.0
        cy: 240.0
        k1: 0.0
        k2: 0.0
        p1: 0.0
        p2: 0.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [0.0, 0.0, 0.0]
"#,
    );

    let result = load_stereo_rig(path.to_str().expect("temp path"));
    assert!(matches!(result, Err(ConfigError::NotEnoughSensors(1))));
    fs::remove_file(path).ok();
}

#[test]
fn test_unsupported_model_is_rejected() {
    let path = write_temp_config(
        "rig_unsupported_model.yaml",
        r#"
sensors:
  a:
    intrinsics:
      type: DoubleSphere
      parameters:
        fx: 400.0
        fy: 400.0
        cx: 320.0
        cy: 240.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [0.0, 0.0, 0.0]
  b:
    intrinsics:
      type: DoubleSphere
      parameters:
        fx: 400.0
        fy: 400.0
        cx: 320.0
        cy: 240.0
        image_size: [640, 480]
    extrinsics:
      axis_angle: [0.0, 0.0, 0.0]
      translation: [-0.1, 0.0, 0.0]
"#,
    );

    let result = load_stereo_rig(path.to_str().expect("temp path"));
    assert!(matches!(result, Err(ConfigError::UnsupportedModel(_))));
    fs::remove_file(path).ok();
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = load_stereo_rig("samples/does_not_exist.yaml");
    assert!(matches!(result, Err(ConfigError::IOError(_))));
}
