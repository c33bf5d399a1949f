//! ArUco marker dictionaries.
//!
//! A dictionary is a fixed set of square binary codes, one per marker id.
//! The builtin families mirror the common predefined dictionaries (4x4 to
//! 7x7 bit grids, 1000 markers each); codes are drawn deterministically
//! from a per-family seed so the same id always renders the same marker.

use std::collections::HashSet;

use crate::target::TargetError;

/// A marker family: grid size, marker count and the seed its codes are
/// drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionarySpec {
    /// Family name, as used in output filenames.
    pub name: &'static str,
    /// Bits per marker side, excluding the border.
    pub side_bits: usize,
    /// Number of markers in the family.
    pub marker_count: usize,
    /// Seed for the family's code sequence.
    pub seed: u64,
}

/// The predefined marker families.
pub mod builtins {
    use super::DictionarySpec;

    pub const DICT_4X4_1000: DictionarySpec = DictionarySpec {
        name: "4x4",
        side_bits: 4,
        marker_count: 1000,
        seed: 0x4c69_7a61_7264_0404,
    };

    pub const DICT_5X5_1000: DictionarySpec = DictionarySpec {
        name: "5x5",
        side_bits: 5,
        marker_count: 1000,
        seed: 0x4c69_7a61_7264_0505,
    };

    pub const DICT_6X6_1000: DictionarySpec = DictionarySpec {
        name: "6x6",
        side_bits: 6,
        marker_count: 1000,
        seed: 0x4c69_7a61_7264_0606,
    };

    pub const DICT_7X7_1000: DictionarySpec = DictionarySpec {
        name: "7x7",
        side_bits: 7,
        marker_count: 1000,
        seed: 0x4c69_7a61_7264_0707,
    };
}

/// Parses a family name such as `4x4` or `DICT_6X6_1000`.
pub fn dictionary_by_name(name: &str) -> Option<DictionarySpec> {
    match name {
        "4x4" | "DICT_4X4_1000" => Some(builtins::DICT_4X4_1000),
        "5x5" | "DICT_5X5_1000" => Some(builtins::DICT_5X5_1000),
        "6x6" | "DICT_6X6_1000" => Some(builtins::DICT_6X6_1000),
        "7x7" | "DICT_7X7_1000" => Some(builtins::DICT_7X7_1000),
        _ => None,
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A generated marker family: the spec plus the code of every marker.
#[derive(Debug, Clone)]
pub struct Dictionary {
    /// The family this dictionary was generated from.
    pub spec: DictionarySpec,
    codes: Vec<u64>,
}

impl Dictionary {
    /// Generates the full code table for a marker family.
    ///
    /// Codes are unique within the family and exclude the all-black and
    /// all-white grids, which would be indistinguishable from plain
    /// squares.
    pub fn predefined(spec: DictionarySpec) -> Self {
        let bits = spec.side_bits * spec.side_bits;
        debug_assert!(bits <= 64);
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };

        let mut state = spec.seed;
        let mut seen = HashSet::with_capacity(spec.marker_count);
        let mut codes = Vec::with_capacity(spec.marker_count);
        while codes.len() < spec.marker_count {
            let code = splitmix64(&mut state) & mask;
            if code == 0 || code == mask || !seen.insert(code) {
                continue;
            }
            codes.push(code);
        }

        Dictionary { spec, codes }
    }

    /// Number of markers in the dictionary.
    pub fn marker_count(&self) -> usize {
        self.codes.len()
    }

    /// The raw code of marker `id`, row-major with the top-left cell in
    /// the most significant bit.
    pub fn code(&self, id: usize) -> Result<u64, TargetError> {
        self.codes
            .get(id)
            .copied()
            .ok_or(TargetError::MarkerIdOutOfRange {
                id,
                count: self.codes.len(),
            })
    }

    /// Renders marker `id` as a cell grid including `border_bits` black
    /// border cells on every side.
    pub fn marker_bitmap(&self, id: usize, border_bits: usize) -> Result<MarkerBitmap, TargetError> {
        let code = self.code(id)?;
        let inner = self.spec.side_bits;
        let side = inner + 2 * border_bits;

        // All cells start black; only the set code bits turn white.
        let mut cells = vec![false; side * side];
        for row in 0..inner {
            for col in 0..inner {
                let bit = inner * inner - 1 - (row * inner + col);
                if (code >> bit) & 1 == 1 {
                    cells[(row + border_bits) * side + (col + border_bits)] = true;
                }
            }
        }

        Ok(MarkerBitmap { side, cells })
    }
}

/// A rendered marker: a square grid of black and white cells.
#[derive(Debug, Clone)]
pub struct MarkerBitmap {
    side: usize,
    cells: Vec<bool>,
}

impl MarkerBitmap {
    /// Cells per side, border included.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Whether the cell at `(row, col)` is black.
    pub fn is_black(&self, row: usize, col: usize) -> bool {
        !self.cells[row * self.side + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = Dictionary::predefined(builtins::DICT_6X6_1000);
        let b = Dictionary::predefined(builtins::DICT_6X6_1000);
        for id in [0, 1, 499, 999] {
            assert_eq!(a.code(id).unwrap(), b.code(id).unwrap());
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let dict = Dictionary::predefined(builtins::DICT_4X4_1000);
        let mut seen = HashSet::new();
        for id in 0..dict.marker_count() {
            assert!(seen.insert(dict.code(id).unwrap()));
        }
    }

    #[test]
    fn test_out_of_range_id_is_rejected() {
        let dict = Dictionary::predefined(builtins::DICT_5X5_1000);
        assert!(matches!(
            dict.code(1000),
            Err(TargetError::MarkerIdOutOfRange { id: 1000, count: 1000 })
        ));
    }

    #[test]
    fn test_bitmap_has_black_border() {
        let dict = Dictionary::predefined(builtins::DICT_6X6_1000);
        let bitmap = dict.marker_bitmap(42, 1).unwrap();
        assert_eq!(bitmap.side(), 8);
        for i in 0..8 {
            assert!(bitmap.is_black(0, i));
            assert!(bitmap.is_black(7, i));
            assert!(bitmap.is_black(i, 0));
            assert!(bitmap.is_black(i, 7));
        }
    }

    #[test]
    fn test_bitmap_interior_matches_code() {
        let dict = Dictionary::predefined(builtins::DICT_4X4_1000);
        let code = dict.code(7).unwrap();
        let bitmap = dict.marker_bitmap(7, 1).unwrap();
        for row in 0..4 {
            for col in 0..4 {
                let bit = 15 - (row * 4 + col);
                let white = (code >> bit) & 1 == 1;
                assert_eq!(!bitmap.is_black(row + 1, col + 1), white);
            }
        }
    }

    #[test]
    fn test_dictionary_by_name_accepts_both_spellings() {
        assert_eq!(
            dictionary_by_name("6x6"),
            Some(builtins::DICT_6X6_1000)
        );
        assert_eq!(
            dictionary_by_name("DICT_4X4_1000"),
            Some(builtins::DICT_4X4_1000)
        );
        assert!(dictionary_by_name("3x3").is_none());
    }
}
