//! Integration tests for the stereo rectification pipeline

use calib_tools::config::load_stereo_rig;
use calib_tools::rectify::{init_rectify_map, remap, stereo_rectify, Interpolation};
use calib_tools::{CameraModel, RadTanModel, Resolution};
use image::{Rgb, RgbImage};
use nalgebra::{DVector, Matrix3, Matrix3x4, Vector3};
use std::fs;

fn undistorted_camera(width: u32, height: u32) -> RadTanModel {
    let params = DVector::from_vec(vec![
        300.0,
        300.0,
        width as f64 / 2.0,
        height as f64 / 2.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ]);
    let mut model = RadTanModel::new(&params).expect("Failed to build model");
    model.resolution = Resolution { width, height };
    model
}

#[test]
fn test_identity_geometry_yields_identity_map() {
    // A distortion-free camera rectified with its own intrinsics and no
    // rotation must sample each pixel from itself.
    let model = undistorted_camera(64, 48);
    let p = Matrix3x4::new(
        300.0, 0.0, 32.0, 0.0, //
        0.0, 300.0, 24.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    );
    let map = init_rectify_map(&model, &Matrix3::identity(), &p).expect("Failed to build map");

    for y in 0..48u32 {
        for x in 0..64u32 {
            let idx = (y * 64 + x) as usize;
            assert!((map.map_x[idx] - x as f32).abs() < 1e-3);
            assert!((map.map_y[idx] - y as f32).abs() < 1e-3);
        }
    }
    assert_eq!(map.valid_roi().width, 64);
    assert_eq!(map.valid_roi().height, 48);
}

#[test]
fn test_rectified_rows_align_for_translated_pair() {
    // Two identical cameras offset along x: rectification must leave the
    // images row-aligned, so the remap of a horizontal-stripe image keeps
    // every stripe on its row.
    let model0 = undistorted_camera(64, 48);
    let model1 = undistorted_camera(64, 48);
    let relative = calib_tools::Pose::new(Matrix3::identity(), Vector3::new(-0.1, 0.0, 0.0));

    let rect = stereo_rectify(
        &model0.get_intrinsics(),
        &model1.get_intrinsics(),
        &relative,
    )
    .expect("Failed to rectify");

    let map0 = init_rectify_map(&model0, &rect.r1, &rect.p1).expect("Failed to build map");
    let map1 = init_rectify_map(&model1, &rect.r2, &rect.p2).expect("Failed to build map");

    let stripes = RgbImage::from_fn(64, 48, |_, y| Rgb([(y * 5 % 256) as u8, 0, 0]));
    let out0 = remap(&stripes, &map0, Interpolation::Nearest);
    let out1 = remap(&stripes, &map1, Interpolation::Nearest);

    for y in 0..48u32 {
        for x in 0..64u32 {
            assert_eq!(out0.get_pixel(x, y), stripes.get_pixel(x, y));
            assert_eq!(out1.get_pixel(x, y), stripes.get_pixel(x, y));
        }
    }
}

#[test]
fn test_pipeline_from_sample_rig() {
    let rig = load_stereo_rig("samples/stereo_pinhole.yaml").expect("Failed to load rig");
    let [sensor0, sensor1] = &rig.sensors;

    let relative = &sensor1.pose * &sensor0.pose.inverse();
    let rect = stereo_rectify(
        &sensor0.model.get_intrinsics(),
        &sensor1.model.get_intrinsics(),
        &relative,
    )
    .expect("Failed to rectify");

    // The rig's baseline is about 11 cm; the averaged fx scales it into p2.
    let fx = rect.p1[(0, 0)];
    assert!((rect.p2[(0, 3)].abs() / fx - 0.11).abs() < 0.01);

    let map0 =
        init_rectify_map(sensor0.model.as_ref(), &rect.r1, &rect.p1).expect("Failed to build map");
    let map1 =
        init_rectify_map(sensor1.model.as_ref(), &rect.r2, &rect.p2).expect("Failed to build map");

    assert_eq!(map0.width, 752);
    assert_eq!(map0.height, 480);

    // Distortion pulls the map borders inward but most of the image
    // stays usable.
    for map in [&map0, &map1] {
        let roi = map.valid_roi();
        assert!(roi.width > 752 / 2);
        assert!(roi.height > 480 / 2);
    }
}

#[test]
fn test_rectification_params_yaml_export() {
    let model = undistorted_camera(64, 48);
    let relative = calib_tools::Pose::new(Matrix3::identity(), Vector3::new(-0.1, 0.0, 0.0));
    let rect = stereo_rectify(&model.get_intrinsics(), &model.get_intrinsics(), &relative)
        .expect("Failed to rectify");

    let path = std::env::temp_dir().join("rectification_params.yaml");
    rect.save_to_yaml(path.to_str().expect("temp path"))
        .expect("Failed to save params");

    let contents = fs::read_to_string(&path).expect("Failed to read params");
    for key in ["r1:", "r2:", "p1:", "p2:", "q:"] {
        assert!(contents.contains(key), "missing {key} in export");
    }
    fs::remove_file(path).ok();
}
