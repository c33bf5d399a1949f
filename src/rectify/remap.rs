//! Remap tables and image resampling for rectification.
//!
//! [`init_rectify_map`] builds the per-pixel inverse maps: each rectified
//! pixel is carried through the inverted new projection, the inverted
//! rectifying rotation, and the (distorting) camera model, yielding the
//! source coordinates to sample. [`remap`] then resamples an image through
//! such a map with the selected interpolation.

use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, Matrix3x4, Vector3};

use crate::camera::CameraModel;

use super::RectifyError;

/// Interpolation used when resampling through a remap table.
#[derive(Debug, Clone, Copy)]
pub enum Interpolation {
    Nearest,
    Bilinear,
    /// Lanczos-windowed sinc over an 8×8 support (a = 4). The high-quality
    /// choice for rectified display output.
    Lanczos4,
}

/// Per-pixel source coordinates for one camera.
///
/// `map_x[y * width + x]` / `map_y[..]` hold the source pixel to sample
/// for rectified pixel `(x, y)`; entries are NaN where the rectified ray
/// cannot be projected into the source camera.
///
/// Invariant: maps are built at the camera model's resolution, so `width`
/// and `height` are both the rectified output size and the source image
/// size. Validity checks rely on this.
#[derive(Debug, Clone)]
pub struct RectifyMap {
    /// Width of the rectified image (same as the source image).
    pub width: u32,
    /// Height of the rectified image (same as the source image).
    pub height: u32,
    /// Source x-coordinate per rectified pixel.
    pub map_x: Vec<f32>,
    /// Source y-coordinate per rectified pixel.
    pub map_y: Vec<f32>,
}

/// A rectangular region of valid pixels in a rectified image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Builds the remap table applying rectification `r` and projection `p`
/// for the given camera.
///
/// Only the left 3×3 block of `p` is used as the new camera matrix; the
/// fourth column (the baseline term of the second camera) does not affect
/// per-pixel sampling.
///
/// # Errors
///
/// Fails when the camera model carries a zero resolution or when the new
/// camera matrix is not invertible.
pub fn init_rectify_map(
    model: &dyn CameraModel,
    r: &Matrix3<f64>,
    p: &Matrix3x4<f64>,
) -> Result<RectifyMap, RectifyError> {
    let resolution = model.get_resolution();
    if resolution.width == 0 || resolution.height == 0 {
        return Err(RectifyError::InvalidParams(
            "camera model has zero resolution".to_string(),
        ));
    }

    let k_new: Matrix3<f64> = p.fixed_view::<3, 3>(0, 0).into();
    let k_new_inv = k_new.try_inverse().ok_or_else(|| {
        RectifyError::InvalidParams("new camera matrix is not invertible".to_string())
    })?;
    let r_inv = r.transpose();

    let (width, height) = (resolution.width, resolution.height);
    let size = (width as usize) * (height as usize);
    let mut map_x = vec![f32::NAN; size];
    let mut map_y = vec![f32::NAN; size];

    for y in 0..height {
        for x in 0..width {
            let dst = Vector3::new(x as f64, y as f64, 1.0);
            let rectified_ray = k_new_inv * dst;
            let source_ray = r_inv * rectified_ray;

            if let Ok(source_pixel) = model.project(&source_ray) {
                let idx = (y * width + x) as usize;
                map_x[idx] = source_pixel.x as f32;
                map_y[idx] = source_pixel.y as f32;
            }
        }
    }

    Ok(RectifyMap {
        width,
        height,
        map_x,
        map_y,
    })
}

/// Resamples `src` through the remap table.
///
/// Pixels whose source coordinates are undefined or fall outside the
/// source image come out black (constant border).
pub fn remap(src: &RgbImage, map: &RectifyMap, interpolation: Interpolation) -> RgbImage {
    let mut dst = RgbImage::new(map.width, map.height);

    for y in 0..map.height {
        for x in 0..map.width {
            let idx = (y * map.width + x) as usize;
            let src_x = map.map_x[idx];
            let src_y = map.map_y[idx];
            if !src_x.is_finite() || !src_y.is_finite() {
                continue;
            }

            if let Some(color) = sample_pixel(src, src_x as f64, src_y as f64, interpolation) {
                dst.put_pixel(x, y, color);
            }
        }
    }

    dst
}

fn sample_pixel(image: &RgbImage, x: f64, y: f64, method: Interpolation) -> Option<Rgb<u8>> {
    let (width, height) = image.dimensions();

    match method {
        Interpolation::Nearest => {
            let u = x.round() as i64;
            let v = y.round() as i64;
            if u >= 0 && u < width as i64 && v >= 0 && v < height as i64 {
                Some(*image.get_pixel(u as u32, v as u32))
            } else {
                None
            }
        }
        Interpolation::Bilinear => {
            let x0 = x.floor();
            let y0 = y.floor();
            let x1 = x0 + 1.0;
            let y1 = y0 + 1.0;

            if x0 < 0.0 || x1 >= width as f64 || y0 < 0.0 || y1 >= height as f64 {
                return None;
            }

            let p00 = image.get_pixel(x0 as u32, y0 as u32);
            let p10 = image.get_pixel(x1 as u32, y0 as u32);
            let p01 = image.get_pixel(x0 as u32, y1 as u32);
            let p11 = image.get_pixel(x1 as u32, y1 as u32);

            let wx = x - x0;
            let wy = y - y0;

            let mut result = Rgb([0u8; 3]);
            for c in 0..3 {
                let val = p00[c] as f64 * (1.0 - wx) * (1.0 - wy)
                    + p10[c] as f64 * wx * (1.0 - wy)
                    + p01[c] as f64 * (1.0 - wx) * wy
                    + p11[c] as f64 * wx * wy;
                result[c] = val.round().clamp(0.0, 255.0) as u8;
            }
            Some(result)
        }
        Interpolation::Lanczos4 => {
            if x < -4.0 || x >= width as f64 + 4.0 || y < -4.0 || y >= height as f64 + 4.0 {
                return None;
            }
            Some(lanczos4_sample(image, x, y))
        }
    }
}

/// Normalized sinc: sin(πt) / (πt).
fn sinc(t: f64) -> f64 {
    if t.abs() < 1e-12 {
        1.0
    } else {
        let pt = std::f64::consts::PI * t;
        pt.sin() / pt
    }
}

fn lanczos4_weight(t: f64) -> f64 {
    if t.abs() >= 4.0 {
        0.0
    } else {
        sinc(t) * sinc(t / 4.0)
    }
}

fn lanczos4_sample(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    let x_floor = x.floor() as i64;
    let y_floor = y.floor() as i64;

    let mut acc = [0.0f64; 3];
    let mut weight_sum = 0.0f64;

    for dy in -3i64..=4 {
        let sy = y_floor + dy;
        let wy = lanczos4_weight(y - sy as f64);
        if wy == 0.0 {
            continue;
        }
        for dx in -3i64..=4 {
            let sx = x_floor + dx;
            let wx = lanczos4_weight(x - sx as f64);
            if wx == 0.0 {
                continue;
            }
            let w = wx * wy;
            weight_sum += w;

            // Samples outside the image contribute the constant border (0).
            if sx >= 0 && sx < width as i64 && sy >= 0 && sy < height as i64 {
                let pixel = image.get_pixel(sx as u32, sy as u32);
                for c in 0..3 {
                    acc[c] += w * pixel[c] as f64;
                }
            }
        }
    }

    let mut result = Rgb([0u8; 3]);
    if weight_sum.abs() > 1e-12 {
        for c in 0..3 {
            result[c] = (acc[c] / weight_sum).round().clamp(0.0, 255.0) as u8;
        }
    }
    result
}

fn longest_true_run(flags: &[bool]) -> (u32, u32) {
    let mut best_start = 0usize;
    let mut best_len = 0usize;
    let mut run_start = 0usize;
    let mut run_len = 0usize;

    for (i, &flag) in flags.iter().enumerate() {
        if flag {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            if run_len > best_len {
                best_start = run_start;
                best_len = run_len;
            }
        } else {
            run_len = 0;
        }
    }

    (best_start as u32, best_len as u32)
}

impl RectifyMap {
    // Source bounds equal the map bounds (maps are built at the camera
    // resolution).
    fn is_valid(&self, x: u32, y: u32) -> bool {
        let idx = (y * self.width + x) as usize;
        let sx = self.map_x[idx];
        let sy = self.map_y[idx];
        sx.is_finite()
            && sy.is_finite()
            && sx >= 0.0
            && sx <= (self.width - 1) as f32
            && sy >= 0.0
            && sy <= (self.height - 1) as f32
    }

    /// Computes the valid-pixel region of interest of this map: the
    /// largest contiguous block of fully-valid columns and fully-valid
    /// rows, where a pixel is valid when its source coordinates land
    /// inside the source image.
    pub fn valid_roi(&self) -> Roi {
        let column_valid: Vec<bool> = (0..self.width)
            .map(|x| (0..self.height).all(|y| self.is_valid(x, y)))
            .collect();
        let row_valid: Vec<bool> = (0..self.height)
            .map(|y| (0..self.width).all(|x| self.is_valid(x, y)))
            .collect();

        let (x, width) = longest_true_run(&column_valid);
        let (y, height) = longest_true_run(&row_valid);
        Roi {
            x,
            y,
            width,
            height,
        }
    }
}

/// Crops an image to a region of interest.
pub fn crop(image: &RgbImage, roi: &Roi) -> RgbImage {
    image::imageops::crop_imm(image, roi.x, roi.y, roi.width, roi.height).to_image()
}

/// Concatenates two images side by side.
///
/// # Errors
///
/// Fails when the heights differ.
pub fn hconcat(left: &RgbImage, right: &RgbImage) -> Result<RgbImage, RectifyError> {
    if left.height() != right.height() {
        return Err(RectifyError::InvalidParams(format!(
            "hconcat requires equal heights, got {} and {}",
            left.height(),
            right.height()
        )));
    }

    let mut out = RgbImage::new(left.width() + right.width(), left.height());
    image::imageops::replace(&mut out, left, 0, 0);
    image::imageops::replace(&mut out, right, left.width() as i64, 0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn identity_map(width: u32, height: u32) -> RectifyMap {
        let mut map_x = Vec::with_capacity((width * height) as usize);
        let mut map_y = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                map_x.push(x as f32);
                map_y.push(y as f32);
            }
        }
        RectifyMap {
            width,
            height,
            map_x,
            map_y,
        }
    }

    #[test]
    fn test_identity_remap_preserves_pixels() {
        let src = gradient_image(32, 24);
        let map = identity_map(32, 24);

        for interpolation in [
            Interpolation::Nearest,
            Interpolation::Bilinear,
            Interpolation::Lanczos4,
        ] {
            let dst = remap(&src, &map, interpolation);
            // The Lanczos kernel is an exact delta at integer offsets, so
            // all three methods must reproduce interior pixels.
            for y in 4..20 {
                for x in 4..28 {
                    assert_eq!(src.get_pixel(x, y), dst.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn test_identity_map_roi_is_full_image() {
        let map = identity_map(16, 12);
        assert_eq!(
            map.valid_roi(),
            Roi {
                x: 0,
                y: 0,
                width: 16,
                height: 12
            }
        );
    }

    #[test]
    fn test_out_of_bounds_columns_shrink_roi() {
        let mut map = identity_map(16, 12);
        // Shift the two leftmost columns off the image.
        for y in 0..12u32 {
            for x in 0..2u32 {
                map.map_x[(y * 16 + x) as usize] = -5.0;
            }
        }
        let roi = map.valid_roi();
        assert_eq!(roi.x, 2);
        assert_eq!(roi.width, 14);
        assert_eq!(roi.height, 12);
    }

    #[test]
    fn test_nan_entries_are_invalid_and_render_black() {
        let mut map = identity_map(8, 8);
        map.map_x[0] = f32::NAN;
        let src = gradient_image(8, 8);
        let dst = remap(&src, &map, Interpolation::Nearest);
        assert_eq!(dst.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert!(map.valid_roi().width < 8 || map.valid_roi().height < 8);
    }

    #[test]
    fn test_hconcat_dimensions() {
        let left = gradient_image(10, 6);
        let right = gradient_image(14, 6);
        let joined = hconcat(&left, &right).unwrap();
        assert_eq!(joined.dimensions(), (24, 6));
        assert_eq!(joined.get_pixel(0, 0), left.get_pixel(0, 0));
        assert_eq!(joined.get_pixel(10, 0), right.get_pixel(0, 0));

        let short = gradient_image(4, 5);
        assert!(hconcat(&left, &short).is_err());
    }

    #[test]
    fn test_crop_matches_roi() {
        let src = gradient_image(20, 10);
        let roi = Roi {
            x: 3,
            y: 2,
            width: 9,
            height: 6,
        };
        let cropped = crop(&src, &roi);
        assert_eq!(cropped.dimensions(), (9, 6));
        assert_eq!(cropped.get_pixel(0, 0), src.get_pixel(3, 2));
    }
}
