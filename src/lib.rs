/*!
Reads TrueType fonts for text rendering.

The crate parses the tables a renderer needs (`cmap`, `glyf`, `head`, `hhea`,
`hmtx`, `kern`, `loca`, `maxp`, `name`, `OS/2`). It builds a compact
character-to-glyph map and decodes simple and composite outlines into quadratic
bezier paths. It resolves glyph metrics with kerning and shapes runs of graphemes
into positioned glyphs.

# Example
```no_run
# fn main() -> Result<(), Box<dyn std::error::Error>> {
let data = std::fs::read("fonts/NotoSans-Regular.ttf")?;
let font = fontcore::open(data)?;

let glyph = font.find_glyph('A' as u32);
let path = font.get_path(glyph)?;
let run = font.shape_run("en", "Latn", &["H", "e", "l", "l", "o"]);
println!("{} points, run width {}", path.points.len(), run.advances.iter().sum::<f32>());
# Ok(())
# }
```

Every offset and length read from the file is checked. A malformed font fails to
load with an [`Error`]. A font that loads but has broken glyphs still works: the
broken glyphs come back as empty paths or zero metrics, and a warning is logged.
*/

#![deny(unsafe_code)]
#![deny(missing_docs)]

mod char_map;
mod cmap;
mod description;
mod font;
mod glyf;
mod head;
mod hhea;
mod hmtx;
mod kern;
mod loca;
mod maxp;
mod name;
mod os2;
mod path;
mod sfnt;
mod shape;
#[allow(missing_docs)]
pub mod stream;
#[cfg(test)]
mod testing;

pub use char_map::CharacterMap;
pub use description::{FeatureFlags, FontIdentity, Style, Weight};
pub use font::{Font, FontMetrics, FontSource, GlyphMetrics};
pub use glyf::{Component, Placement};
pub use path::{BezierPoint, GraphicPath, Matrix2, Point, PointKind, Rect};
pub use sfnt::{FontDirectory, TableRecord};
pub use shape::ShapedRun;

use crate::stream::{Readable, Reader};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Parse a font from its raw bytes and keep the bytes for the font's lifetime.
pub fn open(data: impl Into<Arc<[u8]>>) -> Result<Font> {
    Font::from_bytes(data)
}

/// A 4-byte OpenType tag.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag(pub [u8; 4]);

#[allow(missing_docs)]
impl Tag {
    pub const CMAP: Self = Self(*b"cmap");
    pub const GLYF: Self = Self(*b"glyf");
    pub const GSUB: Self = Self(*b"GSUB");
    pub const HEAD: Self = Self(*b"head");
    pub const HHEA: Self = Self(*b"hhea");
    pub const HMTX: Self = Self(*b"hmtx");
    pub const KERN: Self = Self(*b"kern");
    pub const LOCA: Self = Self(*b"loca");
    pub const MAXP: Self = Self(*b"maxp");
    pub const NAME: Self = Self(*b"name");
    pub const OS2: Self = Self(*b"OS/2");
}

impl Tag {
    /// The tag as a big-endian number.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl Readable<'_> for Tag {
    const SIZE: usize = 4;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<[u8; 4]>().map(Self)
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(std::str::from_utf8(&self.0).unwrap_or("..."))
    }
}

/// Identifies a glyph inside one font.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GlyphId(pub u16);

impl GlyphId {
    /// The glyph drawn for characters the font cannot display.
    pub const NOTDEF: Self = Self(0);
    /// Returned by character lookups that found nothing. Never a real glyph.
    pub const NOT_FOUND: Self = Self(0xFFFF);

    /// Whether a character lookup produced a glyph.
    #[inline]
    pub fn is_found(self) -> bool {
        self != Self::NOT_FOUND
    }
}

impl Debug for GlyphId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if *self == Self::NOT_FOUND {
            f.pad("GlyphId(not found)")
        } else {
            write!(f, "GlyphId({})", self.0)
        }
    }
}

impl Readable<'_> for GlyphId {
    const SIZE: usize = 2;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<u16>().map(Self)
    }
}

/// The result type for everything.
pub type Result<T> = std::result::Result<T, Error>;

/// Parsing failed because the font is malformed or unsupported.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// A read or sub-slice went past the end of the data.
    TruncatedInput,
    /// The container is neither `0x00010000` nor `true`.
    BadScaler,
    /// A required table is absent.
    MissingTable(Tag),
    /// A table header carries a version this crate does not understand.
    BadVersion(Tag),
    /// The `head` table magic number is wrong.
    BadMagic,
    /// No usable Unicode `cmap` sub-table exists.
    BadEncoding,
    /// Records of a sub-table are out of order or out of bounds.
    InvalidRange,
    /// Outline data in `glyf` is malformed.
    InvalidGlyph,
    /// Composite glyphs nest deeper than the allowed depth.
    RecursiveGlyph,
    /// A glyph id is not below the glyph count.
    OutOfRange,
    /// The `kern` table failed to parse and is ignored from now on.
    KernDisabled,
    /// The font bytes were released and could not be loaded again.
    Unmapped,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::TruncatedInput => f.pad("unexpected end of data"),
            Self::BadScaler => f.pad("unsupported font container"),
            Self::MissingTable(tag) => write!(f, "missing {tag} table"),
            Self::BadVersion(tag) => write!(f, "unsupported {tag} table version"),
            Self::BadMagic => f.pad("invalid head table magic"),
            Self::BadEncoding => f.pad("no supported unicode character map"),
            Self::InvalidRange => f.pad("invalid range in table"),
            Self::InvalidGlyph => f.pad("invalid glyph data"),
            Self::RecursiveGlyph => f.pad("composite glyph nests too deep"),
            Self::OutOfRange => f.pad("glyph id out of range"),
            Self::KernDisabled => f.pad("kern table disabled"),
            Self::Unmapped => f.pad("font data is not available"),
        }
    }
}

impl std::error::Error for Error {}
