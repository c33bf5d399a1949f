//! ChArUco board generation.
//!
//! A ChArUco board is a checkerboard whose white squares each carry an
//! ArUco marker, giving every inner corner an identity that survives
//! partial occlusion. The board is rendered at print resolution and must
//! fit the requested page format.

use image::{GrayImage, Luma};
use log::info;

use crate::target::aruco::{Dictionary, DictionarySpec};
use crate::target::{PageFormat, TargetError};

/// Render resolution in pixels per inch.
pub const BOARD_DPI: f64 = 72.0;

const CM_PER_INCH: f64 = 2.54;

/// Geometry of a ChArUco board.
#[derive(Debug, Clone)]
pub struct CharucoBoardConfig {
    /// Squares along the board's width.
    pub columns: u32,
    /// Squares along the board's height.
    pub rows: u32,
    /// Side length of one checker square, in metres.
    pub square_size: f64,
    /// Side length of one embedded marker, in metres. Must be smaller
    /// than `square_size`.
    pub marker_size: f64,
    /// Page the board must fit on.
    pub page_format: PageFormat,
    /// Marker family the white squares draw from.
    pub dictionary: DictionarySpec,
}

impl CharucoBoardConfig {
    /// The board's render size in (fractional) pixels at [`BOARD_DPI`].
    pub fn board_pixel_size(&self) -> (f64, f64) {
        let px_per_metre = BOARD_DPI * 100.0 / CM_PER_INCH;
        (
            self.columns as f64 * self.square_size * px_per_metre,
            self.rows as f64 * self.square_size * px_per_metre,
        )
    }

    /// The page's size in pixels at [`BOARD_DPI`].
    pub fn page_pixel_size(&self) -> (f64, f64) {
        let (w, h) = self.page_format.size_points();
        (w * BOARD_DPI / 72.0, h * BOARD_DPI / 72.0)
    }

    /// Output filename stem encoding the board geometry, with decimal
    /// points replaced by commas so the sizes survive as one filename
    /// component.
    pub fn output_stem(&self) -> String {
        format!(
            "charuco_{}_{}x{}_ms={}_ss{}_dict{}",
            self.page_format.name(),
            self.columns,
            self.rows,
            self.marker_size,
            self.square_size,
            self.dictionary.name,
        )
        .replace('.', ",")
    }
}

fn fill_rect(image: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
    for y in y0..y1.min(image.height()) {
        for x in x0..x1.min(image.width()) {
            image.put_pixel(x, y, Luma([value]));
        }
    }
}

/// Renders a ChArUco board to a grayscale image.
///
/// The top-left square is black; markers fill the white squares in
/// row-major order starting from id 0, centered and scaled by the
/// `marker_size / square_size` ratio.
///
/// # Errors
///
/// Returns [`TargetError::BoardTooLarge`] if the board does not fit the
/// page, and [`TargetError::MarkerIdOutOfRange`] if the board has more
/// white squares than the dictionary has markers.
pub fn generate_board(config: &CharucoBoardConfig) -> Result<GrayImage, TargetError> {
    let (board_width, board_height) = config.board_pixel_size();
    let (page_width, page_height) = config.page_pixel_size();
    if board_width >= page_width || board_height >= page_height {
        return Err(TargetError::BoardTooLarge {
            board_width,
            board_height,
            page_width,
            page_height,
        });
    }
    if config.marker_size >= config.square_size {
        return Err(TargetError::InvalidParams(format!(
            "Marker size {} must be smaller than square size {}",
            config.marker_size, config.square_size
        )));
    }

    let width = board_width.round() as u32;
    let height = board_height.round() as u32;
    let mut image = GrayImage::from_pixel(width, height, Luma([255u8]));

    let dictionary = Dictionary::predefined(config.dictionary);
    let square_w = board_width / config.columns as f64;
    let square_h = board_height / config.rows as f64;
    let marker_px = square_w.min(square_h) * config.marker_size / config.square_size;

    let mut marker_id = 0usize;
    for sy in 0..config.rows {
        for sx in 0..config.columns {
            let x0 = (sx as f64 * square_w).round() as u32;
            let y0 = (sy as f64 * square_h).round() as u32;
            let x1 = ((sx + 1) as f64 * square_w).round() as u32;
            let y1 = ((sy + 1) as f64 * square_h).round() as u32;

            if (sx + sy) % 2 == 0 {
                fill_rect(&mut image, x0, y0, x1, y1, 0);
                continue;
            }

            let bitmap = dictionary.marker_bitmap(marker_id, 1)?;
            marker_id += 1;

            let origin_x = sx as f64 * square_w + (square_w - marker_px) / 2.0;
            let origin_y = sy as f64 * square_h + (square_h - marker_px) / 2.0;
            let cell = marker_px / bitmap.side() as f64;
            for row in 0..bitmap.side() {
                for col in 0..bitmap.side() {
                    if !bitmap.is_black(row, col) {
                        continue;
                    }
                    let cx0 = (origin_x + col as f64 * cell).round() as u32;
                    let cy0 = (origin_y + row as f64 * cell).round() as u32;
                    let cx1 = (origin_x + (col + 1) as f64 * cell).round() as u32;
                    let cy1 = (origin_y + (row + 1) as f64 * cell).round() as u32;
                    fill_rect(&mut image, cx0, cy0, cx1, cy1, 0);
                }
            }
        }
    }

    info!(
        "rendered {}x{} ChArUco board: {}x{} px, {} markers",
        config.columns, config.rows, width, height, marker_id
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::builtins;

    fn sample_config() -> CharucoBoardConfig {
        CharucoBoardConfig {
            columns: 5,
            rows: 7,
            square_size: 0.035,
            marker_size: 0.0275,
            page_format: PageFormat::A4,
            dictionary: builtins::DICT_6X6_1000,
        }
    }

    #[test]
    fn test_board_dimensions() {
        let config = sample_config();
        let image = generate_board(&config).unwrap();
        // 5 * 0.035 m = 17.5 cm = 6.889... inches = 496 px at 72 dpi.
        assert_eq!(image.width(), 496);
        assert_eq!(image.height(), 694);
    }

    #[test]
    fn test_board_too_large_for_page() {
        let mut config = sample_config();
        config.square_size = 0.06;
        config.marker_size = 0.045;
        // 5 * 6 cm = 30 cm wide does not fit 21 cm of A4.
        assert!(matches!(
            generate_board(&config),
            Err(TargetError::BoardTooLarge { .. })
        ));
    }

    #[test]
    fn test_marker_not_smaller_than_square_is_rejected() {
        let mut config = sample_config();
        config.marker_size = config.square_size;
        assert!(matches!(
            generate_board(&config),
            Err(TargetError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_top_left_square_is_black_and_neighbor_carries_marker() {
        let config = sample_config();
        let image = generate_board(&config).unwrap();
        let square = image.width() as f64 / 5.0;

        // Center of square (0, 0): black checker.
        let c = (square / 2.0) as u32;
        assert_eq!(image.get_pixel(c, c).0[0], 0);

        // Square (1, 0) is white and holds a marker whose border cells are
        // black; probe just inside the marker's top-left border cell.
        let marker = square * 0.0275 / 0.035;
        let origin = square + (square - marker) / 2.0;
        let cell = marker / 8.0;
        let bx = (origin + cell / 2.0) as u32;
        let by = ((square - marker) / 2.0 + cell / 2.0) as u32;
        assert_eq!(image.get_pixel(bx, by).0[0], 0);

        // The white margin between checker edge and marker stays white.
        let mx = (square + (square - marker) / 4.0) as u32;
        let my = ((square - marker) / 4.0) as u32;
        assert_eq!(image.get_pixel(mx, my).0[0], 255);
    }

    #[test]
    fn test_output_stem_uses_commas() {
        let config = sample_config();
        assert_eq!(
            config.output_stem(),
            "charuco_A4_5x7_ms=0,0275_ss0,035_dict6x6"
        );
    }
}
