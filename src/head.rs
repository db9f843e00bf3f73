//! The `head` table holds the design grid size and the `loca` format.

use crate::stream::{read_at, Reader};
use crate::{Error, Result, Tag};

const MAGIC: u32 = 0x5F0F_3CF5;

/// Font-wide values from the `head` table.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct HeadInfo {
    pub units_per_em: u16,
    /// `1 / units_per_em`.
    pub em_scale: f32,
    /// Whether `loca` stores 32-bit byte offsets instead of 16-bit word offsets.
    pub loca_is_offset32: bool,
}

pub(crate) fn parse(data: &[u8]) -> Result<HeadInfo> {
    let mut r = Reader::new(data);
    let major = r.read::<u16>().ok_or(Error::TruncatedInput)?;
    let minor = r.read::<u16>().ok_or(Error::TruncatedInput)?;
    if (major, minor) != (1, 0) {
        return Err(Error::BadVersion(Tag::HEAD));
    }

    if read_at::<u32>(data, 12)? != MAGIC {
        return Err(Error::BadMagic);
    }

    let units_per_em = read_at::<u16>(data, 18)?;
    if units_per_em == 0 {
        return Err(Error::InvalidRange);
    }

    let loca_is_offset32 = match read_at::<i16>(data, 50)? {
        0 => false,
        1 => true,
        _ => return Err(Error::InvalidRange),
    };

    Ok(HeadInfo { units_per_em, em_scale: 1.0 / f32::from(units_per_em), loca_is_offset32 })
}
