use crate::char_map::CharacterMap;
use crate::stream::{read_array_at, read_at};
use crate::{Error, GlyphId, Result};

/// Decode a format 6 (trimmed table mapping) sub-table.
pub(crate) fn parse(data: &[u8], map: &mut CharacterMap) -> Result<()> {
    let first_code = read_at::<u16>(data, 6)?;
    let entry_count = read_at::<u16>(data, 8)?;
    let glyphs = read_array_at::<u16>(data, 10, usize::from(entry_count))?;
    if u32::from(first_code) + u32::from(entry_count) > 0x10000 {
        return Err(Error::InvalidRange);
    }

    for (code_point, glyph) in (u32::from(first_code)..).zip(glyphs) {
        match glyph {
            0 => {}
            0xFFFF => return Err(Error::InvalidRange),
            _ => map.insert(code_point, 1, GlyphId(glyph)),
        }
    }

    Ok(())
}
