use crate::stream::{read_at, FWord, Readable, UFWord};
use crate::{Error, GlyphId, Result};

/// Advance widths and left side bearings.
///
/// Glyphs at or past `number_of_h_metrics` share the advance of the last full
/// record and only store a side bearing.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Hmtx<'a> {
    data: &'a [u8],
    number_of_h_metrics: u16,
    num_glyphs: u16,
    em_scale: f32,
}

impl<'a> Hmtx<'a> {
    pub fn new(data: &'a [u8], number_of_h_metrics: u16, num_glyphs: u16, em_scale: f32) -> Result<Self> {
        if number_of_h_metrics == 0 {
            return Err(Error::InvalidRange);
        }
        if data.len() < usize::from(number_of_h_metrics) * 4 {
            return Err(Error::TruncatedInput);
        }
        Ok(Self { data, number_of_h_metrics, num_glyphs, em_scale })
    }

    /// The scaled `(advance, left side bearing)` of a glyph.
    pub fn get(&self, glyph: GlyphId) -> Result<(f32, f32)> {
        if glyph.0 >= self.num_glyphs {
            return Err(Error::OutOfRange);
        }

        let index = usize::from(glyph.0);
        let n = usize::from(self.number_of_h_metrics);
        let (advance, lsb) = if index < n {
            (read_at::<UFWord>(self.data, 4 * index)?, read_at::<FWord>(self.data, 4 * index + 2)?)
        } else {
            let advance = read_at::<UFWord>(self.data, 4 * (n - 1))?;
            // Some fonts leave out the trailing side bearings.
            let lsb = FWord::read_at(self.data, 4 * n + 2 * (index - n)).unwrap_or_default();
            (advance, lsb)
        };

        Ok((advance.scale(self.em_scale), lsb.scale(self.em_scale)))
    }
}
