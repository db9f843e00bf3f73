//! The `name` table: family and sub-family strings.

use crate::stream::{Readable, Reader};
use crate::{Error, Result};

const FAMILY: u16 = 1;
const SUB_FAMILY: u16 = 2;
const TYPOGRAPHIC_FAMILY: u16 = 16;
const TYPOGRAPHIC_SUB_FAMILY: u16 = 17;

const WINDOWS_ENGLISH_US: u16 = 0x0409;
const MAC_ENGLISH: u16 = 0;

#[derive(Clone, Copy, Debug)]
struct NameRecord {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    name_id: u16,
    length: u16,
    string_offset: u16,
}

impl Readable<'_> for NameRecord {
    const SIZE: usize = u16::SIZE * 6;

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        Some(Self {
            platform_id: r.read::<u16>()?,
            encoding_id: r.read::<u16>()?,
            language_id: r.read::<u16>()?,
            name_id: r.read::<u16>()?,
            length: r.read::<u16>()?,
            string_offset: r.read::<u16>()?,
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Encoding {
    Utf16Be,
    MacRoman,
}

impl NameRecord {
    fn encoding(&self) -> Option<Encoding> {
        match (self.platform_id, self.encoding_id) {
            (0, _) | (3, 1) | (3, 10) => Some(Encoding::Utf16Be),
            (1, 0) => Some(Encoding::MacRoman),
            _ => None,
        }
    }

    /// Higher is better; `None` for strings that cannot be decoded.
    fn score(&self) -> Option<u8> {
        let english = match self.platform_id {
            0 => true,
            1 => self.language_id == MAC_ENGLISH,
            _ => self.language_id == WINDOWS_ENGLISH_US,
        };
        let unicode = match self.encoding()? {
            Encoding::Utf16Be => 2,
            Encoding::MacRoman => 0,
        };
        Some(unicode + u8::from(english))
    }
}

/// The names a font is known by.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct Names {
    pub family: Option<String>,
    pub sub_family: Option<String>,
}

/// Read the family and sub-family names.
///
/// Typographic names are preferred over the legacy ones. Among several records
/// for the same name, Unicode encodings and English come first.
pub(crate) fn parse(data: &[u8]) -> Result<Names> {
    let mut r = Reader::new(data);
    r.skip::<u16>().ok_or(Error::TruncatedInput)?; // format
    let count = r.read::<u16>().ok_or(Error::TruncatedInput)?;
    let storage_offset = r.read::<u16>().ok_or(Error::TruncatedInput)?;
    let records = r
        .read_array::<NameRecord>(usize::from(count))
        .ok_or(Error::TruncatedInput)?;
    let storage = data.get(usize::from(storage_offset)..).ok_or(Error::TruncatedInput)?;

    let find = |name_id: u16| {
        records
            .into_iter()
            .filter(|record| record.name_id == name_id)
            .filter_map(|record| Some((record.score()?, record)))
            .filter_map(|(score, record)| Some((score, decode(storage, &record)?)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name)
    };

    Ok(Names {
        family: find(TYPOGRAPHIC_FAMILY).or_else(|| find(FAMILY)),
        sub_family: find(TYPOGRAPHIC_SUB_FAMILY).or_else(|| find(SUB_FAMILY)),
    })
}

fn decode(storage: &[u8], record: &NameRecord) -> Option<String> {
    let start = usize::from(record.string_offset);
    let bytes = storage.get(start..start + usize::from(record.length))?;
    match record.encoding()? {
        Encoding::Utf16Be => {
            let units = bytes.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            Some(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)).collect())
        }
        Encoding::MacRoman => Some(bytes.iter().map(|&b| mac_roman(b)).collect()),
    }
}

fn mac_roman(byte: u8) -> char {
    if byte < 0x80 {
        return char::from(byte);
    }
    char::from_u32(u32::from(MAC_ROMAN_HIGH[usize::from(byte - 0x80)]))
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Code points of the Mac Roman bytes `0x80..=0xFF`.
#[rustfmt::skip]
static MAC_ROMAN_HIGH: [u16; 128] = [
    196, 197, 199, 201, 209, 214, 220, 225, 224, 226, 228, 227, 229, 231, 233,
    232, 234, 235, 237, 236, 238, 239, 241, 243, 242, 244, 246, 245, 250, 249,
    251, 252, 8224, 176, 162, 163, 167, 8226, 182, 223, 174, 169, 8482, 180,
    168, 8800, 198, 216, 8734, 177, 8804, 8805, 165, 181, 8706, 8721, 8719,
    960, 8747, 170, 186, 937, 230, 248, 191, 161, 172, 8730, 402, 8776, 8710,
    171, 187, 8230, 160, 192, 195, 213, 338, 339, 8211, 8212, 8220, 8221, 8216,
    8217, 247, 9674, 255, 376, 8260, 8364, 8249, 8250, 64257, 64258, 8225, 183,
    8218, 8222, 8240, 194, 202, 193, 203, 200, 205, 206, 207, 204, 211, 212,
    63743, 210, 218, 219, 217, 305, 710, 732, 175, 728, 729, 730, 184, 733,
    731, 711,
];
