//! The table directory at the start of every sfnt container.

use crate::stream::{Readable, Reader};
use crate::{Error, Result, Tag};
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Scaler type used by Apple for TrueType fonts.
const SCALER_TRUE: u32 = u32::from_be_bytes(*b"true");
/// Scaler type used by OpenType fonts with TrueType outlines.
const SCALER_OPENTYPE: u32 = 0x0001_0000;

/// Locates a table in the font file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TableRecord {
    /// The table's tag.
    pub tag: Tag,
    /// The checksum as stored; it is not verified.
    pub checksum: u32,
    /// Offset from the start of the file.
    pub offset: u32,
    /// Length in bytes.
    pub length: u32,
}

impl TableRecord {
    /// The byte range of the table inside the file.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

impl Readable<'_> for TableRecord {
    const SIZE: usize = 16;

    fn read(r: &mut Reader) -> Option<Self> {
        Some(TableRecord {
            tag: r.read::<Tag>()?,
            checksum: r.read::<u32>()?,
            offset: r.read::<u32>()?,
            length: r.read::<u32>()?,
        })
    }
}

/// Maps each table tag to its location in the font file.
///
/// Every record has been checked to lie inside the data the directory was parsed
/// from.
#[derive(Debug, Clone, Default)]
pub struct FontDirectory {
    records: FxHashMap<Tag, TableRecord>,
}

impl FontDirectory {
    /// Parse the directory of a font file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let scaler = r.read::<u32>().ok_or(Error::TruncatedInput)?;
        if scaler != SCALER_TRUE && scaler != SCALER_OPENTYPE {
            return Err(Error::BadScaler);
        }

        let count = r.read::<u16>().ok_or(Error::TruncatedInput)?;
        // search range + entry selector + range shift
        r.skip_bytes(6).ok_or(Error::TruncatedInput)?;

        let entries = r.read_array::<TableRecord>(usize::from(count)).ok_or(Error::TruncatedInput)?;
        let mut records = FxHashMap::default();
        records.reserve(entries.len());

        for record in entries {
            let range = record.range();
            if range.end > data.len() {
                return Err(Error::TruncatedInput);
            }
            records.insert(record.tag, record);
        }

        Ok(Self { records })
    }

    /// The record for a table.
    pub fn record(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.get(&tag)
    }

    /// Whether the font contains a table.
    pub fn contains(&self, tag: Tag) -> bool {
        self.records.contains_key(&tag)
    }

    /// The byte range of a table, empty when the table is missing.
    pub fn range(&self, tag: Tag) -> Range<usize> {
        self.record(tag).map(TableRecord::range).unwrap_or(0..0)
    }

    /// The bytes of a table, empty when the table is missing.
    ///
    /// `data` must be the data the directory was parsed from.
    pub fn search<'a>(&self, data: &'a [u8], tag: Tag) -> &'a [u8] {
        data.get(self.range(tag)).unwrap_or_default()
    }

    /// The bytes of a table that must be present.
    pub fn expect<'a>(&self, data: &'a [u8], tag: Tag) -> Result<&'a [u8]> {
        let record = self.record(tag).ok_or(Error::MissingTable(tag))?;
        data.get(record.range()).ok_or(Error::TruncatedInput)
    }

    /// All tables in the directory, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &TableRecord> {
        self.records.values()
    }
}
