use crate::char_map::CharacterMap;
use crate::stream::{Readable, Reader};
use crate::{Error, GlyphId, Result};

const MAX_CODE_POINT: u32 = 0x10_FFFF;

#[derive(Debug, Copy, Clone)]
struct SequentialMapGroup {
    start_char_code: u32,
    end_char_code: u32,
    start_glyph_id: u32,
}

impl Readable<'_> for SequentialMapGroup {
    const SIZE: usize = 12;

    fn read(r: &mut Reader) -> Option<Self> {
        Some(SequentialMapGroup {
            start_char_code: r.read::<u32>()?,
            end_char_code: r.read::<u32>()?,
            start_glyph_id: r.read::<u32>()?,
        })
    }
}

/// Decode a format 12 (segmented coverage) sub-table.
pub(crate) fn parse(data: &[u8], map: &mut CharacterMap) -> Result<()> {
    let mut r = Reader::new(data);
    // format + reserved + length + language
    r.skip_bytes(12).ok_or(Error::TruncatedInput)?;
    let num_groups = r.read::<u32>().ok_or(Error::TruncatedInput)?;
    let groups = r
        .read_array::<SequentialMapGroup>(num_groups as usize)
        .ok_or(Error::TruncatedInput)?;

    let mut next_code = 0;
    for group in groups {
        let SequentialMapGroup { start_char_code: start, end_char_code: end, start_glyph_id } =
            group;
        if start > end || start < next_code || end > MAX_CODE_POINT {
            return Err(Error::InvalidRange);
        }

        let count = end - start + 1;
        let last_glyph = u64::from(start_glyph_id) + u64::from(count) - 1;
        if last_glyph >= 0xFFFF {
            return Err(Error::InvalidRange);
        }

        map.insert(start, count, GlyphId(start_glyph_id as u16));
        next_code = end + 1;
    }

    Ok(())
}
