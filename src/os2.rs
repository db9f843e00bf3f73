//! The `OS/2` table: weight, width, style classification and x/cap heights.

use crate::description::{Style, Weight};
use crate::stream::{read_at, FWord};
use crate::{Error, Result, Tag};

const ITALIC: u16 = 1 << 0;
const OBLIQUE: u16 = 1 << 9;

/// PANOSE family kind for Latin text faces. The other PANOSE bytes are only
/// meaningful for this kind.
const PANOSE_LATIN_TEXT: u8 = 2;
const PANOSE_MONOSPACED: u8 = 9;

/// What `OS/2` says about the font. `None` where the table gives no answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Os2Info {
    pub weight: Option<Weight>,
    pub style: Style,
    pub condensed: Option<bool>,
    pub serif: Option<bool>,
    pub monospace: Option<bool>,
    /// In em units; only when the table stores a positive value.
    pub x_height: Option<f32>,
    pub cap_height: Option<f32>,
}

pub(crate) fn parse(data: &[u8], em_scale: f32) -> Result<Os2Info> {
    let version = read_at::<u16>(data, 0)?;
    if version > 5 {
        return Err(Error::BadVersion(Tag::OS2));
    }

    let mut info = Os2Info::default();

    let weight_class = read_at::<u16>(data, 4)?;
    if (1..=1000).contains(&weight_class) {
        info.weight = Some(Weight::from_class(weight_class));
    }

    info.condensed = match read_at::<u16>(data, 6)? {
        1..=4 => Some(true),
        5..=9 => Some(false),
        _ => None,
    };

    let panose = read_at::<[u8; 10]>(data, 32)?;
    if panose[0] == PANOSE_LATIN_TEXT {
        info.serif = match panose[1] {
            2..=10 | 14..=15 => Some(true),
            11..=13 => Some(false),
            _ => None,
        };
        info.monospace = match panose[3] {
            2..=8 => Some(false),
            PANOSE_MONOSPACED => Some(true),
            _ => None,
        };
    }

    let selection = read_at::<u16>(data, 62)?;
    info.style = if selection & ITALIC != 0 {
        Style::Italic
    } else if selection & OBLIQUE != 0 {
        Style::Oblique
    } else {
        Style::Normal
    };

    if version >= 2 {
        let positive = |value: FWord| (value.0 > 0).then(|| value.scale(em_scale));
        info.x_height = positive(read_at::<FWord>(data, 86)?);
        info.cap_height = positive(read_at::<FWord>(data, 88)?);
    }

    Ok(info)
}
