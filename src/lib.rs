//! Font metrics extraction library
//!
//! This library reads TrueType and OpenType fonts and derives per-character
//! box metrics (height, depth, width, italic correction and skew) in ems,
//! formatted as Dart literals for a math typesetting engine.

mod error;
mod extract;
mod fonts;
mod output;
mod report;
mod types;

// Re-export error type
pub use error::MetricsError;

// Re-export extraction API
pub use extract::{MetricsExtractor, MetricsExtractorBuilder, from_bytes, from_path, from_reader};

// Re-export font access
pub use fonts::{FontFile, FontInfo, FontSource};

// Re-export formatting and reporting
pub use output::{format_dart, output_file_name};
pub use report::{
    ExtractionReport, SAMPLE_CODE_POINTS, WidthStats, code_point_ranges, format_ranges, samples,
};

// Re-export public types
pub use types::{
    CharacterMetrics, CodePoint, Coverage, Em, EmScale, FontMetrics, FontUnits, InkBounds,
};

pub use ttf_parser::GlyphId;
