//! Test fonts assembled with `write-fonts`.
//!
//! Every glyph is either empty or an axis-aligned rectangle. Glyph 0 is
//! always an empty .notdef.

#![allow(dead_code)]

use kurbo::{BezPath, Rect, Shape};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::{Cmap, PlatformId},
        glyf::{GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
    },
    types::{FWord, GlyphId, UfWord},
};

pub struct Glyph {
    pub advance: u16,
    pub rect: Option<(i16, i16, i16, i16)>,
}

impl Glyph {
    fn outline(&self) -> BezPath {
        match self.rect {
            Some((x_min, y_min, x_max, y_max)) => Rect::new(
                x_min as f64,
                y_min as f64,
                x_max as f64,
                y_max as f64,
            )
            .into_path(0.1),
            None => BezPath::new(),
        }
    }
}

pub struct TestFontBuilder {
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    glyphs: Vec<Glyph>,
    cmap: Vec<(char, GlyphId)>,
    symbol_cmap: bool,
    hmtx: bool,
}

impl TestFontBuilder {
    pub fn new(units_per_em: u16, ascender: i16, descender: i16) -> Self {
        TestFontBuilder {
            units_per_em,
            ascender,
            descender,
            glyphs: vec![Glyph {
                advance: units_per_em / 2,
                rect: None,
            }],
            cmap: Vec::new(),
            symbol_cmap: false,
            hmtx: true,
        }
    }

    /// Add a glyph mapped from `code_point` under the next free glyph id.
    pub fn glyph(
        mut self,
        code_point: u32,
        advance: u16,
        rect: Option<(i16, i16, i16, i16)>,
    ) -> Self {
        self.glyphs.push(Glyph { advance, rect });
        let gid = GlyphId::new((self.glyphs.len() - 1) as u32);
        self.cmap.push((char::from_u32(code_point).unwrap(), gid));
        self
    }

    /// Map `code_point` to a glyph id the font does not contain.
    pub fn dangling(mut self, code_point: u32, gid: u32) -> Self {
        self.cmap
            .push((char::from_u32(code_point).unwrap(), GlyphId::new(gid)));
        self
    }

    /// Only write a Windows Symbol (3,0) character map.
    pub fn symbol_cmap(mut self) -> Self {
        self.symbol_cmap = true;
        self
    }

    pub fn without_hmtx(mut self) -> Self {
        self.hmtx = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16;

        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &self.glyphs {
            let simple = SimpleGlyph::from_bezpath(&glyph.outline()).unwrap();
            glyf_builder.add_glyph(&simple).unwrap();
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let head = Head {
            units_per_em: self.units_per_em,
            y_min: self.descender,
            x_max: self.units_per_em as i16,
            y_max: self.ascender,
            index_to_loc_format: loca_format as i16,
            ..Default::default()
        };
        let hhea = Hhea {
            ascender: FWord::new(self.ascender),
            descender: FWord::new(self.descender),
            advance_width_max: UfWord::new(
                self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0),
            ),
            number_of_h_metrics: num_glyphs,
            ..Default::default()
        };
        let hmtx = Hmtx {
            h_metrics: self
                .glyphs
                .iter()
                .map(|g| LongMetric {
                    advance: g.advance,
                    side_bearing: g.rect.map_or(0, |r| r.0),
                })
                .collect(),
            left_side_bearings: vec![],
        };
        let maxp = Maxp {
            num_glyphs,
            ..Default::default()
        };

        let mut cmap = Cmap::from_mappings(self.cmap).unwrap();
        if self.symbol_cmap {
            cmap.encoding_records
                .retain(|record| record.platform_id == PlatformId::Windows);
            for record in &mut cmap.encoding_records {
                record.encoding_id = 0;
            }
        }

        let mut builder = FontBuilder::new();
        builder.add_table(&cmap).unwrap();
        builder.add_table(&glyf).unwrap();
        builder.add_table(&head).unwrap();
        builder.add_table(&hhea).unwrap();
        builder.add_table(&loca).unwrap();
        builder.add_table(&maxp).unwrap();
        if self.hmtx {
            builder.add_table(&hmtx).unwrap();
        }
        builder.build()
    }
}
