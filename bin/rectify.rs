//! Stereo Rectification Tool
//!
//! Rectifies image pairs from a two-sensor rig and shows them side by
//! side. Images are read from `<data>/<sensor_name>/` for each of the two
//! sensors named in the rig configuration, paired by sorted filename.
//!
//! Usage:
//!   cargo run --bin rectify -- -c rig.yaml -d ./recordings

use std::path::{Path, PathBuf};

use calib_tools::config::load_stereo_rig;
use calib_tools::rectify::{
    crop, hconcat, init_rectify_map, remap, stereo_rectify, Interpolation, Roi,
};
use clap::Parser;
use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

#[derive(Parser)]
#[command(author, version, about = "Rectify stereo image pairs from a rig configuration")]
struct Cli {
    /// Rig configuration YAML file
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Directory holding one image subfolder per sensor
    #[arg(short = 'd', long)]
    data: PathBuf,

    /// Write the rectification parameters to this YAML file
    #[arg(long)]
    save_params: Option<PathBuf>,
}

fn sorted_images(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn show_pair(title: &str, image: &RgbImage) -> Result<(), Box<dyn std::error::Error>> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let buffer: Vec<u32> = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        })
        .collect();

    let mut window = Window::new(title, width, height, WindowOptions::default())?;
    // Blocks until the window is closed or a key advances to the next pair.
    while window.is_open() && !window.is_key_down(Key::Escape) && !window.is_key_down(Key::Space) {
        window.update_with_buffer(&buffer, width, height)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    println!("🎯 Stereo Rectification Tool");
    println!("============================");

    if !cli.data.is_dir() {
        return Err(format!("Data directory not found: {:?}", cli.data).into());
    }

    let rig = load_stereo_rig(
        cli.config
            .to_str()
            .ok_or("Configuration path is not valid UTF-8")?,
    )?;
    let [sensor0, sensor1] = &rig.sensors;
    println!("✓ Loaded rig: '{}' / '{}'", sensor0.name, sensor1.name);

    // Pose of sensor 1 relative to sensor 0.
    let relative = &sensor1.pose * &sensor0.pose.inverse();
    let rect = stereo_rectify(
        &sensor0.model.get_intrinsics(),
        &sensor1.model.get_intrinsics(),
        &relative,
    )?;
    println!("✓ Computed rectification transforms");

    if let Some(path) = &cli.save_params {
        rect.save_to_yaml(path.to_str().ok_or("Output path is not valid UTF-8")?)?;
        println!("✓ Saved rectification parameters to: {path:?}");
    }

    let map0 = init_rectify_map(sensor0.model.as_ref(), &rect.r1, &rect.p1)?;
    let map1 = init_rectify_map(sensor1.model.as_ref(), &rect.r2, &rect.p2)?;
    let roi0 = map0.valid_roi();
    let roi1 = map1.valid_roi();
    println!("✓ Built remap tables (valid columns: {} / {})", roi0.width, roi1.width);

    let images0 = sorted_images(&cli.data.join(&sensor0.name))?;
    let images1 = sorted_images(&cli.data.join(&sensor1.name))?;
    let pairs = images0.len().min(images1.len());
    if pairs == 0 {
        return Err("No image pairs found in the data directory".into());
    }
    println!("⏳ Rectifying {pairs} image pairs (space or escape advances)...");

    for (path0, path1) in images0.iter().zip(images1.iter()) {
        let frame0 = image::open(path0)?.to_rgb8();
        let frame1 = image::open(path1)?.to_rgb8();

        let rectified0 = remap(&frame0, &map0, Interpolation::Lanczos4);
        let rectified1 = remap(&frame1, &map1, Interpolation::Lanczos4);

        // Drop the invalid side columns; keep full height so the pair
        // stays row-aligned.
        let cropped0 = crop(
            &rectified0,
            &Roi {
                x: roi0.x,
                y: 0,
                width: roi0.width,
                height: rectified0.height(),
            },
        );
        let cropped1 = crop(
            &rectified1,
            &Roi {
                x: roi1.x,
                y: 0,
                width: roi1.width,
                height: rectified1.height(),
            },
        );

        let pair = hconcat(&cropped0, &cropped1)?;
        let title = format!(
            "rectified: {} | {}",
            path0.file_name().and_then(|n| n.to_str()).unwrap_or("?"),
            path1.file_name().and_then(|n| n.to_str()).unwrap_or("?"),
        );
        show_pair(&title, &pair)?;
    }

    println!("✅ Done!");
    Ok(())
}
