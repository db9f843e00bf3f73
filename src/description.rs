//! What a font looks like: its names, weight, style and features.

use crate::name::Names;
use crate::os2::Os2Info;
use std::fmt::{self, Display, Formatter};

/// The thickness of a font's strokes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[allow(missing_docs)]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Regular,
    Medium,
    Bold,
    ExtraBold,
    Black,
    ExtraBlack,
}

impl Weight {
    /// Map an `OS/2` weight class (1 to 1000) to the nearest named weight.
    pub fn from_class(class: u16) -> Self {
        match class {
            0..=150 => Self::Thin,
            151..=250 => Self::ExtraLight,
            251..=350 => Self::Light,
            351..=450 => Self::Regular,
            451..=550 => Self::Medium,
            551..=750 => Self::Bold,
            751..=850 => Self::ExtraBold,
            851..=925 => Self::Black,
            _ => Self::ExtraBlack,
        }
    }
}

impl Display for Weight {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(match self {
            Self::Thin => "thin",
            Self::ExtraLight => "extra-light",
            Self::Light => "light",
            Self::Regular => "regular",
            Self::Medium => "medium",
            Self::Bold => "bold",
            Self::ExtraBold => "extra-bold",
            Self::Black => "black",
            Self::ExtraBlack => "extra-black",
        })
    }
}

/// The slant of a font.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum Style {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl Display for Style {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        })
    }
}

/// Layout tables present in the font.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FeatureFlags {
    /// A `kern` table exists.
    pub kern: bool,
    /// A `GSUB` table exists. Its lookups are not applied.
    pub gsub: bool,
}

impl Display for FeatureFlags {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let names: Vec<_> = [(self.kern, "kern"), (self.gsub, "GSUB")]
            .into_iter()
            .filter_map(|(present, name)| present.then_some(name))
            .collect();
        f.pad(&names.join(","))
    }
}

/// The identity of a font, for picking it out of a collection of fonts.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FontIdentity {
    /// The family name, like `Noto Sans`.
    pub family_name: String,
    /// The sub-family name, like `Bold Italic`.
    pub sub_family_name: String,
    #[allow(missing_docs)]
    pub weight: Weight,
    #[allow(missing_docs)]
    pub style: Style,
    /// Narrower than the normal width.
    pub condensed: bool,
    /// Every glyph has the same advance.
    pub monospace: bool,
    /// Strokes end in serifs.
    pub serif: bool,
    /// Layout tables present in the font.
    pub features: FeatureFlags,
}

impl FontIdentity {
    /// Combine the `name` and `OS/2` tables.
    ///
    /// The `OS/2` classification is applied first. Keywords in the lower-cased
    /// `family sub_family` string then override it, since the names are more
    /// reliable in practice.
    pub(crate) fn new(names: Names, os2: Option<&Os2Info>, features: FeatureFlags) -> Self {
        let mut identity = Self {
            family_name: names.family.unwrap_or_default(),
            sub_family_name: names.sub_family.unwrap_or_default(),
            features,
            ..Self::default()
        };

        if let Some(os2) = os2 {
            identity.weight = os2.weight.unwrap_or_default();
            identity.style = os2.style;
            identity.condensed = os2.condensed.unwrap_or_default();
            identity.serif = os2.serif.unwrap_or_default();
            identity.monospace = os2.monospace.unwrap_or_default();
        }

        identity.apply_name_keywords();
        identity
    }

    fn apply_name_keywords(&mut self) {
        let name = format!("{} {}", self.family_name, self.sub_family_name).to_lowercase();
        let has = |keyword: &str| name.contains(keyword);
        let has_spelling = |word: &str| {
            [" ", "-", ""].iter().any(|sep| name.contains(&format!("extra{sep}{word}")))
        };

        if has("italic") {
            self.style = Style::Italic;
        } else if has("oblique") {
            self.style = Style::Oblique;
        }

        if has("condensed") {
            self.condensed = true;
        }

        if has("mono") || has("console") || has("code") {
            self.monospace = true;
        }

        if has("sans") {
            self.serif = false;
        } else if has("serif") {
            self.serif = true;
        }

        let weight = if has("regular") || has("medium") {
            Some(Weight::Regular)
        } else if has_spelling("light") {
            Some(Weight::ExtraLight)
        } else if has_spelling("black") {
            Some(Weight::ExtraBlack)
        } else if has_spelling("bold") {
            Some(Weight::ExtraBold)
        } else if has("thin") {
            Some(Weight::Thin)
        } else if has("light") {
            Some(Weight::Light)
        } else if has("bold") {
            Some(Weight::Bold)
        } else if has("black") {
            Some(Weight::Black)
        } else {
            None
        };
        if let Some(weight) = weight {
            self.weight = weight;
        }
    }
}
