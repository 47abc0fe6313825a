use std::collections::BTreeMap;
use std::fmt;

use euclid::{Box2D, Length, Scale};

use crate::report::ExtractionReport;

/// Raw font design units, as stored in the font's tables.
#[derive(Debug, Clone, Copy)]
pub struct FontUnits;
/// Fractions of the font's em size.
#[derive(Debug, Clone, Copy)]
pub struct Em;

pub type CodePoint = u32;
pub type InkBounds = Box2D<f64, FontUnits>;
pub type EmScale = Scale<f64, FontUnits, Em>;

/// Which part of the character map gets extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coverage {
    /// Every code point the font's character map declares.
    #[default]
    Complete,
    /// Printable ASCII only (32 to 126 inclusive).
    Ascii,
}

impl Coverage {
    pub const ASCII_RANGE: std::ops::RangeInclusive<CodePoint> = 32..=126;

    pub fn contains(&self, code_point: CodePoint) -> bool {
        match self {
            Coverage::Complete => true,
            Coverage::Ascii => Self::ASCII_RANGE.contains(&code_point),
        }
    }
}

/// Box metrics of a single character, all in ems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterMetrics {
    pub depth: f64,
    pub height: f64,
    pub italic: f64,
    pub skew: f64,
    pub width: f64,
}

impl CharacterMetrics {
    /// Build a record from em lengths, clamping negative values to zero.
    /// Italic correction and skew are not derived from the font.
    pub fn new(depth: Length<f64, Em>, height: Length<f64, Em>, width: Length<f64, Em>) -> Self {
        CharacterMetrics {
            depth: depth.get().max(0.0),
            height: height.get().max(0.0),
            italic: 0.0,
            skew: 0.0,
            width: width.get().max(0.0),
        }
    }
}

impl fmt::Display for CharacterMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(d: {:.3}, h: {:.3}, i: {:.1}, s: {:.1}, w: {:.3})",
            self.depth, self.height, self.italic, self.skew, self.width
        )
    }
}

/// Output of a metrics extraction run.
///
/// Holds the per-character records ordered by code point, along with the
/// names used when writing them out.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub(crate) key: String,
    pub(crate) display_name: String,
    pub(crate) coverage: Coverage,
    pub(crate) chars: BTreeMap<CodePoint, CharacterMetrics>,
    pub(crate) report: ExtractionReport,
}

impl FontMetrics {
    /// Key of the generated table entry, normally the font's file stem.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human readable font name, taken from the `name` table when present.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    pub fn chars(&self) -> &BTreeMap<CodePoint, CharacterMetrics> {
        &self.chars
    }

    pub fn into_chars(self) -> BTreeMap<CodePoint, CharacterMetrics> {
        self.chars
    }

    pub fn get(&self, code_point: CodePoint) -> Option<&CharacterMetrics> {
        self.chars.get(&code_point)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Replace the key used for the generated table entry.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}
