//! Basic shaping: one grapheme after another, with pair kerning.

use crate::font::{Font, GlyphMetrics};
use crate::path::{Point, Rect};
use crate::GlyphId;

/// A run of positioned glyphs.
///
/// The glyph arrays are parallel. The grapheme arrays are parallel to the input
/// graphemes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedRun {
    /// Every glyph of the run, the base glyph of each grapheme first.
    pub glyphs: Vec<GlyphId>,
    /// The origin of each glyph relative to the start of the run.
    pub glyph_positions: Vec<Point>,
    /// The bounding box of each glyph, moved to its position.
    pub glyph_rectangles: Vec<Rect>,
    /// The total advance of each grapheme, kerning included.
    pub advances: Vec<f32>,
    /// How many glyphs each grapheme produced.
    pub glyph_count_per_grapheme: Vec<u8>,
}

impl ShapedRun {
    /// The total advance of the run.
    pub fn width(&self) -> f32 {
        self.advances.iter().sum()
    }
}

impl Font {
    /// Turn a sequence of graphemes into positioned glyphs.
    ///
    /// Graphemes the font cannot display get the missing glyph. Language and
    /// script are accepted for callers that track them; only the `kern` table is
    /// applied.
    pub fn shape_run<S: AsRef<str>>(&self, language: &str, script: &str, run: &[S]) -> ShapedRun {
        log::trace!("shaping {} graphemes ({language}, {script})", run.len());

        let mut shaped = ShapedRun {
            advances: Vec::with_capacity(run.len()),
            glyph_count_per_grapheme: Vec::with_capacity(run.len()),
            ..ShapedRun::default()
        };

        // Offsets into `glyphs` of each grapheme's base glyph.
        let mut bases = Vec::with_capacity(run.len());
        let mut rectangles = Vec::with_capacity(run.len());
        let mut offsets = Vec::with_capacity(run.len());

        for grapheme in run {
            let mut glyphs = self.find_glyphs(grapheme.as_ref());
            if glyphs.is_empty() {
                glyphs.push(GlyphId::NOTDEF);
            }
            glyphs.truncate(usize::from(u8::MAX));

            bases.push(shaped.glyphs.len());
            let mut advance = 0.0;
            for glyph in &glyphs {
                let metrics = self.shaping_metrics(*glyph);
                offsets.push(advance);
                rectangles.push(metrics.bounding_rectangle);
                advance += metrics.advance;
            }

            shaped.glyph_count_per_grapheme.push(glyphs.len() as u8);
            shaped.advances.push(advance);
            shaped.glyphs.extend(glyphs);
        }

        for (i, pair) in bases.windows(2).enumerate() {
            let kern = self.kerning(shaped.glyphs[pair[0]], shaped.glyphs[pair[1]]);
            shaped.advances[i] += kern.x;
        }

        shaped.glyph_positions.reserve(shaped.glyphs.len());
        shaped.glyph_rectangles.reserve(shaped.glyphs.len());
        let mut pen = 0.0;
        let mut glyph = 0;
        for (advance, &count) in shaped.advances.iter().zip(&shaped.glyph_count_per_grapheme) {
            for _ in 0..count {
                let position = Point::new(pen + offsets[glyph], 0.0);
                shaped.glyph_positions.push(position);
                shaped.glyph_rectangles.push(rectangles[glyph].translate(position));
                glyph += 1;
            }
            pen += advance;
        }

        shaped
    }

    fn shaping_metrics(&self, glyph: GlyphId) -> GlyphMetrics {
        self.get_metrics(glyph).unwrap_or_else(|err| {
            log::warn!("no metrics for {glyph:?} in {:?}: {err}", self.family_name());
            GlyphMetrics::default()
        })
    }
}
