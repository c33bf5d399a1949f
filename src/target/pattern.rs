//! Calibration grid patterns rendered as SVG.
//!
//! Three layouts are supported: symmetric circle grids, staggered
//! (asymmetric) circle grids, and plain checkerboards. The circle grids
//! can carry ArUco markers in the gaps between dots, which lets detection
//! recover the grid pose without seeing the whole pattern.

use crate::target::aruco::{builtins, Dictionary, DictionarySpec};
use crate::target::TargetError;

/// Grid layout variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Symmetric circle grid.
    Circles,
    /// Asymmetric circle grid with every other row offset by half a pitch.
    StaggeredCircles,
    /// Plain checkerboard.
    Checkerboard,
}

/// The unit label written into the SVG's width/height attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Mm,
    Inches,
    Px,
    M,
}

impl Units {
    /// The suffix appended to SVG dimension attributes.
    pub fn suffix(&self) -> &'static str {
        match self {
            Units::Mm => "mm",
            Units::Inches => "inches",
            Units::Px => "px",
            Units::M => "m",
        }
    }
}

/// Full description of a grid pattern to generate.
#[derive(Debug, Clone)]
pub struct PatternConfig {
    pub kind: PatternKind,
    /// Grid columns.
    pub columns: u32,
    /// Grid rows.
    pub rows: u32,
    /// Grid pitch (circle spacing, or checker square side).
    pub square_size: f64,
    /// Circle radius as a fraction of the pitch: `r = square_size / radius_rate`.
    pub radius_rate: f64,
    /// Unit of all lengths.
    pub units: Units,
    /// Page width the pattern is centered on.
    pub page_width: f64,
    /// Page height the pattern is centered on.
    pub page_height: f64,
    /// Whether to embed ArUco markers between the circles. On by default;
    /// the circle grids always carry markers unless explicitly disabled.
    /// Ignored for checkerboards.
    pub embed_markers: bool,
    /// Marker family used when `embed_markers` is set.
    pub dictionary: DictionarySpec,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            kind: PatternKind::Circles,
            columns: 8,
            rows: 11,
            square_size: 20.0,
            radius_rate: 5.0,
            units: Units::Mm,
            page_width: 210.0,
            page_height: 297.0,
            embed_markers: true,
            dictionary: builtins::DICT_6X6_1000,
        }
    }
}

/// A drawable primitive, all filled black.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

/// A finished pattern: page size plus the black shapes on it.
#[derive(Debug, Clone)]
pub struct Drawing {
    pub width: f64,
    pub height: f64,
    pub units: Units,
    pub shapes: Vec<Shape>,
}

impl PatternConfig {
    /// Lays out the pattern's shapes on the page.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::MarkerIdOutOfRange`] when marker embedding
    /// needs more markers than the dictionary holds.
    pub fn build(&self) -> Result<Drawing, TargetError> {
        let mut shapes = Vec::new();
        match self.kind {
            PatternKind::Circles => self.build_circles(&mut shapes)?,
            PatternKind::StaggeredCircles => self.build_staggered(&mut shapes)?,
            PatternKind::Checkerboard => self.build_checkerboard(&mut shapes),
        }
        Ok(Drawing {
            width: self.page_width,
            height: self.page_height,
            units: self.units,
            shapes,
        })
    }

    fn build_circles(&self, shapes: &mut Vec<Shape>) -> Result<(), TargetError> {
        let spacing = self.square_size;
        let r = spacing / self.radius_rate;
        let pattern_width = (self.columns - 1) as f64 * spacing + 2.0 * r;
        let pattern_height = (self.rows - 1) as f64 * spacing + 2.0 * r;
        let x_spacing = (self.page_width - pattern_width) / 2.0;
        let y_spacing = (self.page_height - pattern_height) / 2.0;

        for x in 0..self.columns {
            for y in 0..self.rows {
                shapes.push(Shape::Circle {
                    cx: x as f64 * spacing + x_spacing + r,
                    cy: y as f64 * spacing + y_spacing + r,
                    r,
                });
            }
        }

        if !self.embed_markers {
            return Ok(());
        }

        // One marker per inner cell, sized to clear the circles around it.
        let dictionary = Dictionary::predefined(self.dictionary);
        let inset = 2.0 * spacing / self.radius_rate;
        let side = spacing - inset;
        let mut marker_x = x_spacing + inset;
        for column in 0..self.columns - 1 {
            let mut marker_y = y_spacing + inset;
            for row in 0..self.rows - 1 {
                let id = (column + row * (self.columns - 1)) as usize;
                append_marker(shapes, &dictionary, id, side, marker_x, marker_y)?;
                marker_y += spacing;
            }
            marker_x += spacing;
        }
        Ok(())
    }

    fn build_staggered(&self, shapes: &mut Vec<Shape>) -> Result<(), TargetError> {
        let spacing = self.square_size;
        let r = spacing / self.radius_rate;
        let pattern_width = (self.columns - 1) as f64 * 2.0 * spacing + spacing + 2.0 * r;
        let pattern_height = (self.rows - 1) as f64 * spacing + 2.0 * r;
        let x_spacing = (self.page_width - pattern_width) / 2.0;
        let y_spacing = (self.page_height - pattern_height) / 2.0;

        for x in 0..self.columns {
            for y in 0..self.rows {
                shapes.push(Shape::Circle {
                    cx: 2.0 * x as f64 * spacing + (y % 2) as f64 * spacing + x_spacing + r,
                    cy: y as f64 * spacing + y_spacing + r,
                    r,
                });
            }
        }

        if !self.embed_markers {
            return Ok(());
        }

        // Markers sit in the dot-free pockets of the staggered lattice,
        // one marker per two rows.
        let dictionary = Dictionary::predefined(self.dictionary);
        let mut marker_x = x_spacing + 2.0 * spacing - spacing / 2.0 + r;
        for column in 0..self.columns - 1 {
            let mut marker_y = y_spacing + 0.5 * spacing + r;
            for row in 0..self.rows - 1 {
                let id = (column + row * (self.columns - 1)) as usize;
                append_marker(shapes, &dictionary, id, spacing, marker_x, marker_y)?;
                marker_y += 2.0 * spacing;
                if marker_y + spacing > y_spacing + pattern_height {
                    break;
                }
            }
            marker_x += 2.0 * spacing;
        }
        Ok(())
    }

    fn build_checkerboard(&self, shapes: &mut Vec<Shape>) {
        let spacing = self.square_size;
        let x_spacing = (self.page_width - self.columns as f64 * spacing) / 2.0;
        let y_spacing = (self.page_height - self.rows as f64 * spacing) / 2.0;

        for x in 0..self.columns {
            for y in 0..self.rows {
                if x % 2 == y % 2 {
                    shapes.push(Shape::Rect {
                        x: x as f64 * spacing + x_spacing,
                        y: y as f64 * spacing + y_spacing,
                        width: spacing,
                        height: spacing,
                    });
                }
            }
        }
    }
}

fn append_marker(
    shapes: &mut Vec<Shape>,
    dictionary: &Dictionary,
    id: usize,
    size: f64,
    x: f64,
    y: f64,
) -> Result<(), TargetError> {
    let bitmap = dictionary.marker_bitmap(id, 1)?;
    let cell = size / bitmap.side() as f64;
    for row in 0..bitmap.side() {
        for col in 0..bitmap.side() {
            if bitmap.is_black(row, col) {
                shapes.push(Shape::Rect {
                    x: x + col as f64 * cell,
                    y: y + row as f64 * cell,
                    width: cell,
                    height: cell,
                });
            }
        }
    }
    Ok(())
}

impl Drawing {
    /// Serializes the drawing as an SVG document with a white background.
    pub fn to_svg(&self) -> String {
        let suffix = self.units.suffix();
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}{suffix}\" height=\"{h}{suffix}\" viewBox=\"0 0 {w} {h}\">\n",
            w = self.width,
            h = self.height,
        ));
        svg.push_str(&format!(
            "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
            self.width, self.height
        ));
        for shape in &self.shapes {
            match shape {
                Shape::Circle { cx, cy, r } => {
                    svg.push_str(&format!(
                        "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"black\" stroke=\"none\"/>\n"
                    ));
                }
                Shape::Rect { x, y, width, height } => {
                    svg.push_str(&format!(
                        "  <rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" fill=\"black\" stroke=\"none\"/>\n"
                    ));
                }
            }
        }
        svg.push_str("</svg>\n");
        svg
    }
}
