use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use euclid::{Length, Scale};
use tracing::{debug, info, warn};

use crate::error::MetricsError;
use crate::fonts::{FontFile, FontSource};
use crate::report::ExtractionReport;
use crate::types::{CharacterMetrics, CodePoint, Coverage, Em, EmScale, FontMetrics, FontUnits};

/// Key used when the font did not come from a named file.
const UNNAMED_FONT: &str = "font";

fn units(value: impl Into<f64>) -> Length<f64, FontUnits> {
    Length::new(value.into())
}

fn extract_chars<F: FontSource + ?Sized>(
    font: &F,
    coverage: Coverage,
) -> Result<(BTreeMap<CodePoint, CharacterMetrics>, ExtractionReport), MetricsError> {
    let units_per_em = font.units_per_em();
    if units_per_em == 0 {
        return Err(MetricsError::MissingTable("head"));
    }
    let scale: EmScale = Scale::new(1.0 / units_per_em as f64);

    let default_height: Length<f64, Em> = units(font.ascender()) * scale;
    let default_depth: Length<f64, Em> =
        Length::new((-(units(font.descender()) * scale).get()).max(0.0));
    debug!(
        "Font-wide metrics: height={:.5}, depth={:.5}",
        default_height.get(),
        default_depth.get()
    );

    let mut chars = BTreeMap::new();
    let mut report = ExtractionReport::default();

    for (code_point, glyph) in font.character_map() {
        if !coverage.contains(code_point) {
            continue;
        }
        report.considered += 1;

        let Some(advance) = font.advance_width(glyph) else {
            debug!(
                "U+{:04X} -> glyph {}: no advance width, skipping",
                code_point, glyph.0
            );
            report.skipped += 1;
            continue;
        };
        let width = units(advance) * scale;

        let (height, depth) = match font.ink_bounds(glyph) {
            Some(bounds) => {
                let max_y = units(bounds.max.y);
                let min_y = units(bounds.min.y);
                let height = if max_y.get() > 0.0 {
                    max_y * scale
                } else {
                    default_height
                };
                let depth = if min_y.get() < 0.0 {
                    Length::new(-(min_y * scale).get())
                } else {
                    Length::new(0.0)
                };
                (height, depth)
            }
            None => {
                debug!(
                    "U+{:04X} -> glyph {}: no outline bounds, using font defaults",
                    code_point, glyph.0
                );
                report.defaulted += 1;
                (default_height, default_depth)
            }
        };

        let metrics = CharacterMetrics::new(depth, height, width);
        debug!("U+{:04X} -> glyph {}: {}", code_point, glyph.0, metrics);
        chars.insert(code_point, metrics);
    }

    report.emitted = chars.len();
    if chars.is_empty() {
        warn!("No usable characters among {} considered", report.considered);
        return Err(MetricsError::NoGlyphs);
    }

    Ok((chars, report))
}

/// Builder for configuring metrics extraction options.
///
/// # Examples
///
/// ```no_run
/// use glyph_metrics::{Coverage, MetricsExtractor};
///
/// let metrics = MetricsExtractor::builder()
///     .coverage(Coverage::Ascii)
///     .build()
///     .from_path("Roboto-Regular.ttf")?;
/// # Ok::<(), glyph_metrics::MetricsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsExtractorBuilder {
    coverage: Coverage,
    face_index: u32,
}

impl MetricsExtractorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict or widen the set of extracted code points.
    pub fn coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Select a face inside a font collection.
    pub fn face_index(mut self, index: u32) -> Self {
        self.face_index = index;
        self
    }

    /// Build the extractor configuration.
    pub fn build(self) -> MetricsExtractor {
        MetricsExtractor {
            coverage: self.coverage,
            face_index: self.face_index,
        }
    }
}

/// Per-glyph metrics extractor with configuration options.
///
/// # Examples
///
/// ```no_run
/// use glyph_metrics::MetricsExtractor;
///
/// let metrics = MetricsExtractor::default().from_path("KaTeX_Main-Regular.ttf")?;
/// for (code_point, m) in metrics.chars() {
///     println!("{}: width {}", code_point, m.width);
/// }
///
/// // Dart literal for the typesetting engine
/// println!("{}", metrics.to_dart()?);
/// # Ok::<(), glyph_metrics::MetricsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsExtractor {
    coverage: Coverage,
    face_index: u32,
}

impl MetricsExtractor {
    /// Create a builder for configuring extraction options.
    pub fn builder() -> MetricsExtractorBuilder {
        MetricsExtractorBuilder::new()
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    /// Extract metrics from a font file at the given path.
    ///
    /// The file stem becomes the key of the generated table.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<FontMetrics, MetricsError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let key = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNNAMED_FONT.to_owned());
        info!("Extracting metrics from {}", path.display());
        self.extract_from_data(&data, key)
    }

    /// Extract metrics from a font in memory.
    pub fn from_bytes(self, bytes: &[u8]) -> Result<FontMetrics, MetricsError> {
        self.extract_from_data(bytes, UNNAMED_FONT.to_owned())
    }

    /// Extract metrics from a font reader.
    pub fn from_reader<R: Read>(self, mut reader: R) -> Result<FontMetrics, MetricsError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.from_bytes(&bytes)
    }

    /// Extract metrics from any font source.
    pub fn extract<F: FontSource + ?Sized>(
        &self,
        font: &F,
        key: impl Into<String>,
    ) -> Result<FontMetrics, MetricsError> {
        let key = key.into();
        let (chars, report) = extract_chars(font, self.coverage)?;
        info!("Generated metrics for {}", report);

        Ok(FontMetrics {
            display_name: font.family_name().unwrap_or_else(|| key.clone()),
            key,
            coverage: self.coverage,
            chars,
            report,
        })
    }

    fn extract_from_data(self, data: &[u8], key: String) -> Result<FontMetrics, MetricsError> {
        let font = FontFile::parse(data, self.face_index)?;
        debug!("Font structure:\n{}", font.info());
        self.extract(&font, key)
    }
}

/// Extract metrics from a font file at the given path using default settings.
///
/// This is a convenience function equivalent to `MetricsExtractor::default().from_path(path)`.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<FontMetrics, MetricsError> {
    MetricsExtractor::default().from_path(path)
}

/// Extract metrics from a font in memory using default settings.
///
/// This is a convenience function equivalent to `MetricsExtractor::default().from_bytes(bytes)`.
pub fn from_bytes(bytes: &[u8]) -> Result<FontMetrics, MetricsError> {
    MetricsExtractor::default().from_bytes(bytes)
}

/// Extract metrics from a font reader using default settings.
///
/// This is a convenience function equivalent to `MetricsExtractor::default().from_reader(reader)`.
pub fn from_reader<R: Read>(reader: R) -> Result<FontMetrics, MetricsError> {
    MetricsExtractor::default().from_reader(reader)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use euclid::{Box2D, Point2D};
    use ttf_parser::GlyphId;

    use super::*;
    use crate::types::InkBounds;

    /// In-memory font with hand-picked tables.
    #[derive(Default)]
    pub(crate) struct TestFont {
        pub(crate) units_per_em: u16,
        pub(crate) ascender: i16,
        pub(crate) descender: i16,
        pub(crate) cmap: Vec<(CodePoint, GlyphId)>,
        pub(crate) advances: HashMap<u16, u16>,
        pub(crate) bounds: HashMap<u16, InkBounds>,
    }

    impl TestFont {
        pub(crate) fn new(units_per_em: u16, ascender: i16, descender: i16) -> Self {
            TestFont {
                units_per_em,
                ascender,
                descender,
                ..Default::default()
            }
        }

        pub(crate) fn glyph(
            mut self,
            code_point: CodePoint,
            gid: u16,
            advance: Option<u16>,
            bounds: Option<(f64, f64, f64, f64)>,
        ) -> Self {
            self.cmap.push((code_point, GlyphId(gid)));
            self.cmap.sort_by_key(|&(cp, _)| cp);
            if let Some(advance) = advance {
                self.advances.insert(gid, advance);
            }
            if let Some((x_min, y_min, x_max, y_max)) = bounds {
                self.bounds.insert(
                    gid,
                    Box2D::new(Point2D::new(x_min, y_min), Point2D::new(x_max, y_max)),
                );
            }
            self
        }
    }

    impl FontSource for TestFont {
        fn units_per_em(&self) -> u16 {
            self.units_per_em
        }

        fn ascender(&self) -> i16 {
            self.ascender
        }

        fn descender(&self) -> i16 {
            self.descender
        }

        fn character_map(&self) -> Vec<(CodePoint, GlyphId)> {
            self.cmap.clone()
        }

        fn advance_width(&self, glyph: GlyphId) -> Option<u16> {
            self.advances.get(&glyph.0).copied()
        }

        fn ink_bounds(&self, glyph: GlyphId) -> Option<InkBounds> {
            self.bounds.get(&glyph.0).copied()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn extract(font: &TestFont, coverage: Coverage) -> FontMetrics {
        MetricsExtractor::builder()
            .coverage(coverage)
            .build()
            .extract(font, "Test-Regular")
            .unwrap()
    }

    #[test]
    fn width_is_advance_over_units_per_em() {
        let font = TestFont::new(1000, 800, -200).glyph(65, 1, Some(500), None);
        let metrics = extract(&font, Coverage::Complete);
        assert!(approx(metrics.get(65).unwrap().width, 0.5));
    }

    #[test]
    fn height_and_depth_from_ink_bounds() {
        let font = TestFont::new(1000, 800, -250).glyph(
            103,
            1,
            Some(600),
            Some((0.0, -200.0, 300.0, 700.0)),
        );
        let m = *extract(&font, Coverage::Complete).get(103).unwrap();
        assert!(approx(m.height, 0.7));
        assert!(approx(m.depth, 0.2));
        assert!(approx(m.width, 0.6));
        assert_eq!(m.italic, 0.0);
        assert_eq!(m.skew, 0.0);
    }

    #[test]
    fn glyph_above_baseline_has_zero_depth() {
        let font =
            TestFont::new(1000, 800, -250).glyph(65, 1, Some(600), Some((10.0, 0.0, 590.0, 700.0)));
        let m = *extract(&font, Coverage::Complete).get(65).unwrap();
        assert_eq!(m.depth, 0.0);
        assert!(approx(m.height, 0.7));
    }

    #[test]
    fn missing_bounds_fall_back_to_font_defaults() {
        let font = TestFont::new(2048, 1900, -500).glyph(32, 3, Some(512), None);
        let metrics = extract(&font, Coverage::Complete);
        let m = metrics.get(32).unwrap();
        assert!(approx(m.height, 1900.0 / 2048.0));
        assert!(approx(m.depth, 500.0 / 2048.0));
        assert!(approx(m.width, 0.25));
        assert_eq!(metrics.report().defaulted, 1);
    }

    #[test]
    fn positive_descender_gives_zero_default_depth() {
        let font = TestFont::new(1000, 900, 100).glyph(32, 3, Some(250), None);
        let m = *extract(&font, Coverage::Complete).get(32).unwrap();
        assert_eq!(m.depth, 0.0);
    }

    #[test]
    fn glyph_entirely_below_baseline_uses_default_height() {
        let font = TestFont::new(1000, 750, -250).glyph(
            0x2C,
            5,
            Some(250),
            Some((50.0, -150.0, 150.0, -10.0)),
        );
        let m = *extract(&font, Coverage::Complete).get(0x2C).unwrap();
        assert!(approx(m.height, 0.75));
        assert!(approx(m.depth, 0.15));
    }

    #[test]
    fn code_points_without_advance_are_dropped() {
        let font = TestFont::new(1000, 800, -200)
            .glyph(65, 1, Some(600), None)
            .glyph(66, 2, None, None);
        let metrics = extract(&font, Coverage::Complete);
        assert!(metrics.get(65).is_some());
        assert!(metrics.get(66).is_none());
        assert_eq!(metrics.report().skipped, 1);
        assert_eq!(metrics.report().emitted, 1);
    }

    #[test]
    fn complete_coverage_keeps_non_ascii() {
        let font = TestFont::new(1000, 800, -200)
            .glyph(32, 1, Some(250), None)
            .glyph(65, 2, Some(600), None)
            .glyph(9731, 3, Some(900), None);

        let complete = extract(&font, Coverage::Complete);
        assert_eq!(
            complete.chars().keys().copied().collect::<Vec<_>>(),
            vec![32, 65, 9731]
        );

        let ascii = extract(&font, Coverage::Ascii);
        assert_eq!(
            ascii.chars().keys().copied().collect::<Vec<_>>(),
            vec![32, 65]
        );
    }

    #[test]
    fn all_fields_are_non_negative() {
        let font = TestFont::new(1000, -10, 300)
            .glyph(33, 1, Some(0), Some((0.0, 100.0, 10.0, -20.0)))
            .glyph(34, 2, Some(400), Some((0.0, -50.0, 10.0, 0.0)))
            .glyph(35, 3, Some(400), None);
        for m in extract(&font, Coverage::Complete).chars().values() {
            assert!(m.depth >= 0.0);
            assert!(m.height >= 0.0);
            assert!(m.width >= 0.0);
            assert_eq!(m.italic, 0.0);
            assert_eq!(m.skew, 0.0);
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let font = TestFont::new(1000, 800, -200)
            .glyph(65, 1, Some(600), Some((0.0, 0.0, 600.0, 700.0)))
            .glyph(103, 2, Some(500), Some((0.0, -210.0, 480.0, 520.0)));
        let first = extract(&font, Coverage::Complete).into_chars();
        let second = extract(&font, Coverage::Complete).into_chars();
        assert_eq!(first, second);
    }

    #[test]
    fn font_without_usable_glyphs_is_fatal() {
        let font = TestFont::new(1000, 800, -200).glyph(9731, 1, Some(900), None);
        let result = MetricsExtractor::builder()
            .coverage(Coverage::Ascii)
            .build()
            .extract(&font, "Empty");
        assert!(matches!(result, Err(MetricsError::NoGlyphs)));
    }

    #[test]
    fn display_name_falls_back_to_key() {
        let font = TestFont::new(1000, 800, -200).glyph(65, 1, Some(600), None);
        let metrics = extract(&font, Coverage::Complete);
        assert_eq!(metrics.key(), "Test-Regular");
        assert_eq!(metrics.display_name(), "Test-Regular");
    }
}
