use std::collections::BTreeMap;
use std::fmt;

use euclid::{Box2D, Point2D};
use kurbo::{BezPath, Point, Shape};
use tracing::debug;
use ttf_parser::{Face, GlyphId, OutlineBuilder, PlatformId, cmap, name_id};

use crate::error::MetricsError;
use crate::types::{CodePoint, InkBounds};

/// Unicode character map subtables in order of preference.
const CMAP_PREFERENCE: &[(PlatformId, u16)] = &[
    (PlatformId::Windows, 10),
    (PlatformId::Unicode, 6),
    (PlatformId::Unicode, 4),
    (PlatformId::Windows, 1),
    (PlatformId::Unicode, 3),
    (PlatformId::Unicode, 2),
    (PlatformId::Unicode, 1),
    (PlatformId::Unicode, 0),
];

/// Everything the extractor needs to know about a font.
///
/// All values are in font design units; glyph lookups that cannot be
/// answered return `None` and are treated as per-glyph fallbacks by the
/// caller.
pub trait FontSource {
    fn units_per_em(&self) -> u16;
    fn ascender(&self) -> i16;
    fn descender(&self) -> i16;
    /// Code point to glyph mappings of the best Unicode character map,
    /// in ascending code point order.
    fn character_map(&self) -> Vec<(CodePoint, GlyphId)>;
    fn advance_width(&self, glyph: GlyphId) -> Option<u16>;
    fn ink_bounds(&self, glyph: GlyphId) -> Option<InkBounds>;

    fn family_name(&self) -> Option<String> {
        None
    }
}

/// A parsed font file with the tables required for metrics extraction.
pub struct FontFile<'a> {
    face: Face<'a>,
    cmap: cmap::Subtable<'a>,
}

impl<'a> FontFile<'a> {
    pub fn parse(data: &'a [u8], index: u32) -> Result<FontFile<'a>, MetricsError> {
        let face = Face::parse(data, index)?;
        if face.tables().hmtx.is_none() {
            return Err(MetricsError::MissingTable("hmtx"));
        }
        let cmap = best_cmap(&face).ok_or(MetricsError::MissingTable("cmap"))?;
        debug!(
            "Using cmap subtable platform={:?} encoding={}",
            cmap.platform_id, cmap.encoding_id
        );
        Ok(FontFile { face, cmap })
    }

    pub fn face(&self) -> &Face<'a> {
        &self.face
    }

    pub fn info(&self) -> FontInfo {
        FontInfo::inspect(self)
    }
}

fn best_cmap<'a>(face: &Face<'a>) -> Option<cmap::Subtable<'a>> {
    let table = face.tables().cmap?;
    CMAP_PREFERENCE.iter().find_map(|&(platform, encoding)| {
        table
            .subtables
            .into_iter()
            .find(|s| s.platform_id == platform && s.encoding_id == encoding)
    })
}

impl FontSource for FontFile<'_> {
    fn units_per_em(&self) -> u16 {
        self.face.units_per_em()
    }

    fn ascender(&self) -> i16 {
        self.face.tables().hhea.ascender
    }

    fn descender(&self) -> i16 {
        self.face.tables().hhea.descender
    }

    fn character_map(&self) -> Vec<(CodePoint, GlyphId)> {
        let mut map = BTreeMap::new();
        self.cmap.codepoints(|code_point| {
            if let Some(gid) = self.cmap.glyph_index(code_point) {
                // Mapping to .notdef means the code point is not covered.
                if gid.0 != 0 {
                    map.insert(code_point, gid);
                }
            }
        });
        map.into_iter().collect()
    }

    fn advance_width(&self, glyph: GlyphId) -> Option<u16> {
        // hmtx repeats its last advance for trailing glyphs, so ids past
        // the end of the font have to be rejected here.
        if glyph.0 >= self.face.number_of_glyphs() {
            return None;
        }
        self.face.glyph_hor_advance(glyph)
    }

    fn ink_bounds(&self, glyph: GlyphId) -> Option<InkBounds> {
        let mut pen = InkBoundsPen::new();
        self.face.outline_glyph(glyph, &mut pen)?;
        pen.finish()
    }

    fn family_name(&self) -> Option<String> {
        [name_id::TYPOGRAPHIC_FAMILY, name_id::FAMILY, name_id::FULL_NAME]
            .iter()
            .find_map(|&id| {
                self.face
                    .names()
                    .into_iter()
                    .filter(|name| name.name_id == id && name.is_unicode())
                    .find_map(|name| name.to_string())
            })
            .filter(|name| !name.trim().is_empty())
    }
}

/// Outline pen measuring the tight ink bounds of a glyph.
///
/// The outline is collected into a `BezPath`, whose bounding box covers
/// curve extrema rather than control points.
pub(crate) struct InkBoundsPen {
    path: BezPath,
}

impl InkBoundsPen {
    pub(crate) fn new() -> InkBoundsPen {
        InkBoundsPen {
            path: BezPath::new(),
        }
    }

    pub(crate) fn finish(self) -> Option<InkBounds> {
        self.path.segments().next()?;
        let rect = self.path.bounding_box();
        Some(Box2D::new(
            Point2D::new(rect.x0, rect.y0),
            Point2D::new(rect.x1, rect.y1),
        ))
    }
}

fn point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

impl OutlineBuilder for InkBoundsPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(point(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.path.quad_to(point(x1, y1), point(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path
            .curve_to(point(x1, y1), point(x2, y2), point(x, y));
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Summary of a font's structure, used for diagnostics.
#[derive(Debug, Clone)]
pub struct FontInfo {
    pub units_per_em: u16,
    pub number_of_glyphs: u16,
    pub ascender: i16,
    pub descender: i16,
    pub has_hmtx: bool,
    /// (platform, encoding, format) of every cmap subtable.
    pub cmap_subtables: Vec<(PlatformId, u16, u16)>,
    /// First entries of the character map that will be used.
    pub sample_entries: Vec<(CodePoint, GlyphId)>,
}

impl FontInfo {
    const SAMPLE_ENTRIES: usize = 5;

    pub fn inspect(font: &FontFile<'_>) -> FontInfo {
        let face = font.face();
        let cmap_subtables = face
            .tables()
            .cmap
            .iter()
            .flat_map(|table| table.subtables)
            .map(|s| (s.platform_id, s.encoding_id, format_number(&s.format)))
            .collect();

        let mut sample_entries = font.character_map();
        sample_entries.truncate(Self::SAMPLE_ENTRIES);

        FontInfo {
            units_per_em: face.units_per_em(),
            number_of_glyphs: face.number_of_glyphs(),
            ascender: face.tables().hhea.ascender,
            descender: face.tables().hhea.descender,
            has_hmtx: face.tables().hmtx.is_some(),
            cmap_subtables,
            sample_entries,
        }
    }
}

fn format_number(format: &cmap::Format<'_>) -> u16 {
    match format {
        cmap::Format::ByteEncodingTable(_) => 0,
        cmap::Format::HighByteMappingThroughTable(_) => 2,
        cmap::Format::SegmentMappingToDeltaValues(_) => 4,
        cmap::Format::TrimmedTableMapping(_) => 6,
        cmap::Format::MixedCoverage => 8,
        cmap::Format::TrimmedArray(_) => 10,
        cmap::Format::SegmentedCoverage(_) => 12,
        cmap::Format::ManyToOneRangeMappings(_) => 13,
        cmap::Format::UnicodeVariationSequences(_) => 14,
    }
}

impl fmt::Display for FontInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Units per EM: {}", self.units_per_em)?;
        writeln!(f, "Glyphs: {}", self.number_of_glyphs)?;
        writeln!(
            f,
            "Ascender: {}, descender: {}",
            self.ascender, self.descender
        )?;
        writeln!(f, "hmtx present: {}", self.has_hmtx)?;
        for (platform, encoding, format) in &self.cmap_subtables {
            writeln!(
                f,
                "cmap subtable: platform={:?} encoding={} format={}",
                platform, encoding, format
            )?;
        }
        let samples = self
            .sample_entries
            .iter()
            .map(|(cp, gid)| format!("U+{:04X} -> {}", cp, gid.0))
            .collect::<Vec<_>>();
        write!(f, "Sample cmap entries: [{}]", samples.join(", "))
    }
}
