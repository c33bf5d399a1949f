//! Printable calibration targets.
//!
//! Two generators live here: ChArUco boards rendered to raster images
//! ([`charuco`]) and circle/checkerboard grid patterns serialized as SVG
//! ([`pattern`]), both drawing their fiducial markers from the dictionaries
//! in [`aruco`].

pub mod aruco;
pub mod charuco;
pub mod pattern;

pub use aruco::{builtins, Dictionary, DictionarySpec, MarkerBitmap};
pub use charuco::{generate_board, CharucoBoardConfig};
pub use pattern::{Drawing, PatternConfig, PatternKind, Shape, Units};

/// Errors raised while generating calibration targets.
#[derive(thiserror::Error, Debug)]
pub enum TargetError {
    /// A marker id beyond the dictionary's size.
    #[error("Marker id {id} out of range for dictionary with {count} markers")]
    MarkerIdOutOfRange { id: usize, count: usize },
    /// The board's physical size does not fit the requested page. Raised
    /// before anything is rendered.
    #[error("Board does not fit the page: {board_width}x{board_height} px on {page_width}x{page_height} px")]
    BoardTooLarge {
        board_width: f64,
        board_height: f64,
        page_width: f64,
        page_height: f64,
    },
    /// A pattern geometry the generator cannot lay out.
    #[error("Invalid pattern parameters: {0}")]
    InvalidParams(String),
}

/// ISO 216 page formats supported by the board generator.
///
/// Dimensions follow the print-industry point sizes (1 pt = 1/72 inch)
/// that page-layout libraries use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
}

impl PageFormat {
    /// Physical size in millimetres.
    pub fn size_mm(&self) -> (f64, f64) {
        match self {
            PageFormat::A0 => (841.0, 1189.0),
            PageFormat::A1 => (594.0, 841.0),
            PageFormat::A2 => (420.0, 594.0),
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
        }
    }

    /// Physical size in points (1/72 inch).
    pub fn size_points(&self) -> (f64, f64) {
        let (w, h) = self.size_mm();
        (w * 72.0 / 25.4, h * 72.0 / 25.4)
    }

    /// The format's name, as used in output filenames.
    pub fn name(&self) -> &'static str {
        match self {
            PageFormat::A0 => "A0",
            PageFormat::A1 => "A1",
            PageFormat::A2 => "A2",
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_point_size() {
        let (w, h) = PageFormat::A4.size_points();
        // 210 x 297 mm at 72 pt/inch.
        assert!((w - 595.27).abs() < 0.1);
        assert!((h - 841.89).abs() < 0.1);
    }

    #[test]
    fn test_formats_halve() {
        // Each A(n+1) short side is the A(n) long side halved (rounded down).
        let (a3_w, a3_h) = PageFormat::A3.size_mm();
        let (a4_w, a4_h) = PageFormat::A4.size_mm();
        assert_eq!(a4_h, a3_w);
        assert!((a3_h / 2.0 - a4_w).abs() <= 0.5);
    }
}
