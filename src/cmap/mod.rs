//! The `cmap` table: picks a Unicode encoding and decodes it into a
//! [`CharacterMap`].

use crate::char_map::CharacterMap;
use crate::stream::{read_at, Readable, Reader};
use crate::{Error, Result};

mod subtable12;
mod subtable4;
mod subtable6;

/// Accepted `(platform, encoding)` pairs, most preferred first.
pub(crate) const CMAP_PRIORITY: [(u16, u16); 7] =
    [(0, 4), (0, 3), (0, 2), (0, 1), (3, 10), (3, 1), (3, 0)];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub subtable_offset: u32,
}

impl Readable<'_> for EncodingRecord {
    const SIZE: usize = 8;

    fn read(r: &mut Reader) -> Option<Self> {
        Some(EncodingRecord {
            platform_id: r.read::<u16>()?,
            encoding_id: r.read::<u16>()?,
            subtable_offset: r.read::<u32>()?,
        })
    }
}

/// Decode the most preferred Unicode sub-table that parses.
///
/// Candidates that fail are logged and skipped. Returns the finalized map and the
/// encoding it came from.
pub(crate) fn parse(data: &[u8]) -> Result<(CharacterMap, EncodingRecord)> {
    let mut r = Reader::new(data);
    r.skip::<u16>().ok_or(Error::TruncatedInput)?; // version
    let num_tables = r.read::<u16>().ok_or(Error::TruncatedInput)?;
    let records = r
        .read_array::<EncodingRecord>(usize::from(num_tables))
        .ok_or(Error::TruncatedInput)?;

    for (platform_id, encoding_id) in CMAP_PRIORITY {
        let Some(record) = records
            .into_iter()
            .find(|rec| rec.platform_id == platform_id && rec.encoding_id == encoding_id)
        else {
            continue;
        };

        match parse_subtable(data, record.subtable_offset as usize) {
            Ok(map) => return Ok((map, record)),
            Err(err) => log::warn!(
                "skipping cmap sub-table ({platform_id}, {encoding_id}): {err}"
            ),
        }
    }

    Err(Error::BadEncoding)
}

fn parse_subtable(data: &[u8], offset: usize) -> Result<CharacterMap> {
    let subtable = data.get(offset..).ok_or(Error::TruncatedInput)?;
    let mut map = CharacterMap::new();
    match read_at::<u16>(subtable, 0)? {
        4 => subtable4::parse(subtable, &mut map)?,
        6 => subtable6::parse(subtable, &mut map)?,
        12 => subtable12::parse(subtable, &mut map)?,
        _ => return Err(Error::BadEncoding),
    }
    map.finalize();
    Ok(map)
}
