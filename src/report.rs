use std::fmt;
use std::ops::RangeInclusive;

use crate::types::{CharacterMetrics, CodePoint, FontMetrics};

/// Counters collected while extracting a font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Code points inside the requested coverage.
    pub considered: usize,
    pub emitted: usize,
    /// Code points dropped for lack of an advance width.
    pub skipped: usize,
    /// Emitted records whose height and depth came from the font-wide defaults.
    pub defaulted: usize,
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} characters ({} skipped, {} using font defaults)",
            self.emitted, self.skipped, self.defaulted
        )
    }
}

/// Characters shown after a run to eyeball the results.
pub const SAMPLE_CODE_POINTS: [CodePoint; 10] = [32, 65, 66, 67, 97, 98, 99, 48, 49, 50];

pub fn samples(metrics: &FontMetrics) -> Vec<(CodePoint, CharacterMetrics)> {
    SAMPLE_CODE_POINTS
        .iter()
        .filter_map(|&cp| metrics.get(cp).map(|m| (cp, *m)))
        .collect()
}

/// Collapse the extracted code points into contiguous runs.
pub fn code_point_ranges(metrics: &FontMetrics) -> Vec<RangeInclusive<CodePoint>> {
    let mut ranges: Vec<RangeInclusive<CodePoint>> = Vec::new();
    for &cp in metrics.chars().keys() {
        match ranges.last_mut() {
            Some(last) if last.end().checked_add(1) == Some(cp) => {
                *last = *last.start()..=cp;
            }
            _ => ranges.push(cp..=cp),
        }
    }
    ranges
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl WidthStats {
    pub fn of(metrics: &FontMetrics) -> Option<WidthStats> {
        let widths = metrics.chars().values().map(|m| m.width);
        let count = metrics.len();
        if count == 0 {
            return None;
        }
        let (min, max, sum) = widths.fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), w| (min.min(w), max.max(w), sum + w),
        );
        Some(WidthStats {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

impl fmt::Display for WidthStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width min {:.5}, max {:.5}, mean {:.5}",
            self.min, self.max, self.mean
        )
    }
}

/// Render code point runs the way Unicode charts do, e.g. `U+0020-U+007E`.
pub fn format_ranges(ranges: &[RangeInclusive<CodePoint>]) -> String {
    ranges
        .iter()
        .map(|r| {
            if r.start() == r.end() {
                format!("U+{:04X}", r.start())
            } else {
                format!("U+{:04X}-U+{:04X}", r.start(), r.end())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
