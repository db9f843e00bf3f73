//! The legacy `kern` table.
//!
//! Two container versions exist: the OpenType one with 16-bit headers and the
//! Apple one with 32-bit headers and a different coverage layout. Only format 0
//! sub-tables (sorted glyph pairs) are applied.

use crate::path::Point;
use crate::stream::{read_at, FWord, LazyArray, Readable};
use crate::{Error, GlyphId, Result, Tag};

const V0_HEADER_SIZE: usize = 6;
const V1_HEADER_SIZE: usize = 8;
const FORMAT0_HEADER_SIZE: usize = 8;

/// How a sub-table's values combine with the ones before it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Coverage {
    vertical: bool,
    minimum: bool,
    overwrite: bool,
}

impl Coverage {
    /// Decode an OpenType coverage word. Cross-stream and non-pair sub-tables make
    /// the whole table unusable.
    fn from_v0(coverage: u16) -> Result<Self> {
        let cross_stream = coverage & 0x0004 != 0;
        let format = coverage >> 8;
        if cross_stream || format != 0 {
            return Err(Error::KernDisabled);
        }
        Ok(Self {
            vertical: coverage & 0x0001 == 0,
            minimum: coverage & 0x0002 != 0,
            overwrite: coverage & 0x0008 != 0,
        })
    }

    /// Decode an Apple coverage word. Sub-tables that cannot be applied are
    /// skipped.
    fn from_v1(coverage: u16) -> Option<Self> {
        let cross_stream = coverage & 0x4000 != 0;
        let variation = coverage & 0x2000 != 0;
        let format = coverage & 0x00FF;
        if cross_stream || variation || format != 0 {
            return None;
        }
        Some(Self { vertical: coverage & 0x8000 != 0, minimum: false, overwrite: false })
    }

    fn apply(self, kern: &mut Point, value: f32) {
        let axis = if self.vertical { &mut kern.y } else { &mut kern.x };
        *axis = if self.overwrite {
            value
        } else if self.minimum {
            axis.min(value)
        } else {
            *axis + value
        };
    }
}

/// A view of the `kern` table.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Kern<'a> {
    data: &'a [u8],
    em_scale: f32,
}

impl<'a> Kern<'a> {
    pub fn new(data: &'a [u8], em_scale: f32) -> Self {
        Self { data, em_scale }
    }

    /// The combined adjustment of all sub-tables for a glyph pair, in em units.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Result<Point> {
        let data = self.data;
        let v1 = read_at::<u16>(data, 0)? != 0;
        let (num_tables, mut offset) = if v1 {
            if read_at::<u32>(data, 0)? != 0x0001_0000 {
                return Err(Error::BadVersion(Tag::KERN));
            }
            (read_at::<u32>(data, 4)?, 8)
        } else {
            (u32::from(read_at::<u16>(data, 2)?), 4)
        };

        let key = ((u32::from(left.0) << 16) | u32::from(right.0)).to_be_bytes();
        let mut kern = Point::default();

        for _ in 0..num_tables {
            // The v0 length is only 16 bits wide and wrong in some fonts, so the
            // walk ends quietly once a sub-table leaves the table.
            let (length, coverage, header_size) = if v1 {
                let (Some(length), Some(coverage)) =
                    (u32::read_at(data, offset), u16::read_at(data, offset + 4))
                else {
                    break;
                };
                (length as usize, Coverage::from_v1(coverage), V1_HEADER_SIZE)
            } else {
                let (Some(length), Some(coverage)) =
                    (u16::read_at(data, offset + 2), u16::read_at(data, offset + 4))
                else {
                    break;
                };
                (usize::from(length), Some(Coverage::from_v0(coverage)?), V0_HEADER_SIZE)
            };

            if let Some(coverage) = coverage {
                let payload = data.get(offset + header_size..).ok_or(Error::TruncatedInput)?;
                if let Some(value) = format0_lookup(payload, &key)? {
                    coverage.apply(&mut kern, value.scale(self.em_scale));
                }
            }

            if length < header_size {
                break;
            }
            offset += length;
        }

        Ok(kern)
    }
}

/// Look up a packed `left << 16 | right` key in a format 0 pair array.
///
/// The array is bounded by `nPairs` and by the bytes that are actually there.
fn format0_lookup(payload: &[u8], key: &[u8; 4]) -> Result<Option<FWord>> {
    let num_pairs = usize::from(read_at::<u16>(payload, 0)?);
    let pairs = payload.get(FORMAT0_HEADER_SIZE..).ok_or(Error::TruncatedInput)?;
    let len = (num_pairs * 6).min(pairs.len());
    let pairs = LazyArray::<[u8; 6]>::new(&pairs[..len]);

    Ok(pairs
        .binary_search_be(key)
        .and_then(|index| pairs.get(index))
        .map(|pair| FWord(i16::from_be_bytes([pair[4], pair[5]]))))
}
