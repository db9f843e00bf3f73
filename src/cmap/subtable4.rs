use crate::char_map::CharacterMap;
use crate::stream::{Readable, Reader};
use crate::{Error, GlyphId, Result};

/// Decode a format 4 (segment mapping to delta values) sub-table.
pub(crate) fn parse(data: &[u8], map: &mut CharacterMap) -> Result<()> {
    let mut r = Reader::new(data);
    r.skip_bytes(6).ok_or(Error::TruncatedInput)?; // format + length + language
    let seg_count_x2 = r.read::<u16>().ok_or(Error::TruncatedInput)?;
    if seg_count_x2 % 2 != 0 {
        return Err(Error::InvalidRange);
    }

    let seg_count = usize::from(seg_count_x2 / 2);
    r.skip_bytes(6).ok_or(Error::TruncatedInput)?; // search range + entry selector + range shift
    let end_codes = r.read_array::<u16>(seg_count).ok_or(Error::TruncatedInput)?;
    r.skip::<u16>().ok_or(Error::TruncatedInput)?; // reserved pad
    let start_codes = r.read_array::<u16>(seg_count).ok_or(Error::TruncatedInput)?;
    let id_deltas = r.read_array::<i16>(seg_count).ok_or(Error::TruncatedInput)?;
    let id_range_offsets_start = r.offset();
    let id_range_offsets = r.read_array::<u16>(seg_count).ok_or(Error::TruncatedInput)?;

    let segments = start_codes.into_iter().zip(end_codes).zip(id_deltas).zip(id_range_offsets);
    for (i, (((start, end), delta), id_range_offset)) in segments.enumerate() {
        if start == 0xFFFF && end == 0xFFFF {
            continue;
        }
        if start > end {
            return Err(Error::InvalidRange);
        }

        let delta = delta as u16;
        match id_range_offset {
            0 => {
                let first = start.wrapping_add(delta);
                let count = u32::from(end - start) + 1;
                if u32::from(first) + count > 0xFFFF {
                    return Err(Error::InvalidRange);
                }
                map.insert(u32::from(start), count, GlyphId(first));
            }
            // Some malformed fonts store 0xFFFF here.
            0xFFFF => continue,
            _ => {
                // The offset is relative to the segment's own `idRangeOffset` slot.
                let base = id_range_offsets_start + 2 * i + usize::from(id_range_offset);
                for code_point in start..=end {
                    let offset = base + 2 * usize::from(code_point - start);
                    let Some(glyph) = u16::read_at(data, offset) else {
                        continue;
                    };
                    if glyph == 0 {
                        continue;
                    }
                    let glyph = glyph.wrapping_add(delta);
                    if glyph == 0xFFFF {
                        return Err(Error::InvalidRange);
                    }
                    map.insert(u32::from(code_point), 1, GlyphId(glyph));
                }
            }
        }
    }

    Ok(())
}
