use crate::stream::Reader;
use crate::{Error, Result, Tag};

/// Returns the number of glyphs in the font.
pub(crate) fn parse(data: &[u8]) -> Result<u16> {
    let mut r = Reader::new(data);
    let version = r.read::<u32>().ok_or(Error::TruncatedInput)?;
    if version != 0x0000_5000 && version != 0x0001_0000 {
        return Err(Error::BadVersion(Tag::MAXP));
    }
    r.read::<u16>().ok_or(Error::TruncatedInput)
}
