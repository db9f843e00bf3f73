//! The `loca` table locates each glyph's outline inside `glyf`.

use crate::stream::{read_at, Readable};
use crate::{Error, GlyphId, Result};
use std::ops::Range;

/// Offsets into `glyf`, one per glyph plus a final end offset.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Loca<'a> {
    data: &'a [u8],
    long: bool,
    num_glyphs: u16,
}

impl<'a> Loca<'a> {
    pub fn new(data: &'a [u8], long: bool, num_glyphs: u16) -> Self {
        Self { data, long, num_glyphs }
    }

    fn offset(&self, index: usize) -> Result<usize> {
        if self.long {
            read_at::<u32>(self.data, index * u32::SIZE).map(|offset| offset as usize)
        } else {
            read_at::<u16>(self.data, index * u16::SIZE).map(|half| 2 * usize::from(half))
        }
    }

    /// The byte range of a glyph inside `glyf`. Empty glyphs have empty ranges.
    pub fn glyph_range(&self, glyph: GlyphId) -> Result<Range<usize>> {
        if glyph.0 >= self.num_glyphs {
            return Err(Error::OutOfRange);
        }

        let index = usize::from(glyph.0);
        let first = self.offset(index)?;
        let last = self.offset(index + 1)?;
        if first > last {
            return Err(Error::OutOfRange);
        }

        Ok(first..last)
    }

    /// The outline bytes of a glyph.
    pub fn glyph_data<'g>(&self, glyf: &'g [u8], glyph: GlyphId) -> Result<&'g [u8]> {
        glyf.get(self.glyph_range(glyph)?).ok_or(Error::TruncatedInput)
    }
}
