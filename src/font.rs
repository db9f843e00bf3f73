//! The font façade.
//!
//! A [`Font`] parses everything it needs for lookups up front: the character map,
//! the identity and the font-wide metrics. Outlines, glyph metrics and kerning are
//! read from the font bytes on demand.
//!
//! A font created with [`Font::from_source`] drops its bytes after construction
//! and loads them again when a glyph is requested. The character map, identity and
//! metrics stay available the whole time.

use crate::char_map::CharacterMap;
use crate::description::{FeatureFlags, FontIdentity, Style, Weight};
use crate::glyf::{Component, Glyph, Placement, MAX_COMPONENTS, MAX_COMPONENT_DEPTH};
use crate::hhea::HheaInfo;
use crate::hmtx::Hmtx;
use crate::kern::Kern;
use crate::loca::Loca;
use crate::path::{GraphicPath, Point, Rect};
use crate::sfnt::FontDirectory;
use crate::{cmap, head, hhea, maxp, name, os2, Error, GlyphId, Result, Tag};
use std::fmt::{self, Debug, Formatter};
use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use unicode_normalization::UnicodeNormalization;

/// Somewhere the font bytes can be loaded from again.
pub trait FontSource: Send + Sync {
    /// Read the complete font file.
    fn load(&self) -> io::Result<Arc<[u8]>>;
}

impl FontSource for PathBuf {
    fn load(&self) -> io::Result<Arc<[u8]>> {
        std::fs::read(self).map(Arc::from)
    }
}

/// Font-wide metrics in em units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the tallest glyphs.
    pub ascender: f32,
    /// Distance from the baseline down to the bottom of the lowest glyphs,
    /// positive downwards.
    pub descender: f32,
    /// Extra space between lines.
    pub line_gap: f32,
    /// Height of lower-case letters.
    pub x_height: f32,
    /// Height of capital letters.
    pub cap_height: f32,
    /// Advance of the digit eight, the usual width of a tabular digit.
    pub digit_advance: f32,
}

/// The metrics of a single glyph in em units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphMetrics {
    /// The bounding box from the glyph header.
    pub bounding_rectangle: Rect,
    /// How far the pen moves after drawing the glyph.
    pub advance: f32,
    /// Space between the origin and the left edge of the bounding box.
    pub left_side_bearing: f32,
    /// Space between the right edge of the bounding box and the advance.
    pub right_side_bearing: f32,
}

/// Where the tables read on demand live inside the font bytes.
#[derive(Debug, Clone)]
struct TableRanges {
    glyf: Range<usize>,
    loca: Range<usize>,
    hmtx: Range<usize>,
    kern: Range<usize>,
}

impl TableRanges {
    fn new(directory: &FontDirectory) -> Self {
        Self {
            glyf: directory.range(Tag::GLYF),
            loca: directory.range(Tag::LOCA),
            hmtx: directory.range(Tag::HMTX),
            kern: directory.range(Tag::KERN),
        }
    }
}

/// The font bytes together with the table locations resolved against them.
#[derive(Debug)]
struct Mapping {
    data: Arc<[u8]>,
    tables: TableRanges,
}

impl Mapping {
    fn new(data: Arc<[u8]>) -> Result<Self> {
        let tables = TableRanges::new(&FontDirectory::parse(&data)?);
        Ok(Self { data, tables })
    }

    fn table(&self, range: &Range<usize>) -> &[u8] {
        self.data.get(range.clone()).unwrap_or_default()
    }
}

/// The tables needed to read glyphs, borrowed from a [`Mapping`].
struct Tables<'a> {
    loca: Loca<'a>,
    glyf: &'a [u8],
    hmtx: Hmtx<'a>,
}

/// An outline being assembled from components.
#[derive(Default)]
struct Outline {
    path: GraphicPath,
    /// The index into `path.points` of each point as the font numbers it.
    numbered: Vec<usize>,
}

impl Outline {
    /// The position of the point the font numbers `index`.
    fn point(&self, index: u16) -> Result<Point> {
        self.numbered
            .get(usize::from(index))
            .and_then(|&i| self.path.points.get(i))
            .map(|p| p.position)
            .ok_or(Error::InvalidGlyph)
    }

    fn append(&mut self, other: &Outline) -> Result<()> {
        let base = self.path.points.len();
        self.path.append(&other.path)?;
        self.numbered.extend(other.numbered.iter().map(|i| i + base));
        Ok(())
    }
}

/// A parsed TrueType font.
///
/// A font is `Send + Sync`. Lookups take `&self`; only reloading released bytes
/// takes a lock.
pub struct Font {
    source: Option<Box<dyn FontSource>>,
    mapping: Mutex<Option<Arc<Mapping>>>,
    char_map: CharacterMap,
    identity: FontIdentity,
    metrics: FontMetrics,
    units_per_em: u16,
    em_scale: f32,
    loca_is_offset32: bool,
    num_glyphs: u16,
    number_of_h_metrics: u16,
    kern_disabled: AtomicBool,
}

impl Font {
    /// Parse a font and keep its bytes in memory.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::parse(data.into(), None)
    }

    /// Load a font from a source and release the bytes once parsed.
    ///
    /// The bytes are loaded again whenever outlines, glyph metrics or kerning
    /// are needed.
    pub fn from_source(source: impl FontSource + 'static) -> Result<Self> {
        let data = source.load().map_err(|err| {
            log::error!("failed to load font: {err}");
            Error::Unmapped
        })?;
        let font = Self::parse(data, Some(Box::new(source)))?;
        font.unmap();
        Ok(font)
    }

    fn parse(data: Arc<[u8]>, source: Option<Box<dyn FontSource>>) -> Result<Self> {
        let directory = FontDirectory::parse(&data)?;

        let head = head::parse(directory.expect(&data, Tag::HEAD)?)?;
        let num_glyphs = maxp::parse(directory.expect(&data, Tag::MAXP)?)?;
        let hhea = hhea::parse(directory.expect(&data, Tag::HHEA)?, head.em_scale)?;
        Hmtx::new(
            directory.expect(&data, Tag::HMTX)?,
            hhea.number_of_h_metrics,
            num_glyphs,
            head.em_scale,
        )?;

        let (char_map, encoding) = cmap::parse(directory.expect(&data, Tag::CMAP)?)?;

        let names = match directory.record(Tag::NAME) {
            Some(_) => name::parse(directory.search(&data, Tag::NAME)).unwrap_or_else(|err| {
                log::warn!("ignoring name table: {err}");
                name::Names::default()
            }),
            None => name::Names::default(),
        };

        let os2 = directory.record(Tag::OS2).and_then(|_| {
            os2::parse(directory.search(&data, Tag::OS2), head.em_scale)
                .map_err(|err| log::warn!("ignoring OS/2 table: {err}"))
                .ok()
        });

        let features = FeatureFlags {
            kern: directory.contains(Tag::KERN),
            gsub: directory.contains(Tag::GSUB),
        };
        let identity = FontIdentity::new(names, os2.as_ref(), features);

        let mapping = Mapping { tables: TableRanges::new(&directory), data };
        let mut font = Self {
            source,
            mapping: Mutex::new(Some(Arc::new(mapping))),
            char_map,
            identity,
            metrics: FontMetrics::default(),
            units_per_em: head.units_per_em,
            em_scale: head.em_scale,
            loca_is_offset32: head.loca_is_offset32,
            num_glyphs,
            number_of_h_metrics: hhea.number_of_h_metrics,
            kern_disabled: AtomicBool::new(false),
        };
        font.metrics = font.font_metrics(&hhea, os2.as_ref());

        log::debug!(
            "loaded font {:?} {:?}: {} glyphs, cmap ({}, {}), features [{}]",
            font.identity.family_name,
            font.identity.sub_family_name,
            num_glyphs,
            encoding.platform_id,
            encoding.encoding_id,
            font.identity.features,
        );

        Ok(font)
    }

    fn font_metrics(&self, hhea: &HheaInfo, os2: Option<&os2::Os2Info>) -> FontMetrics {
        let measure = |c: char| {
            let glyph = self.find_glyph(u32::from(c));
            if !glyph.is_found() {
                return None;
            }
            self.get_metrics(glyph)
                .map_err(|err| log::warn!("failed to measure {c:?}: {err}"))
                .ok()
        };

        let x_height = os2.and_then(|os2| os2.x_height);
        let cap_height = os2.and_then(|os2| os2.cap_height);

        FontMetrics {
            ascender: hhea.ascender,
            descender: -hhea.descender,
            line_gap: hhea.line_gap,
            x_height: x_height
                .or_else(|| measure('x').map(|m| m.bounding_rectangle.height()))
                .unwrap_or_default(),
            cap_height: cap_height
                .or_else(|| measure('H').map(|m| m.bounding_rectangle.height()))
                .unwrap_or_default(),
            digit_advance: measure('8').map(|m| m.advance).unwrap_or_default(),
        }
    }

    /// The current bytes, loading them again if they were released.
    fn mapping(&self) -> Result<Arc<Mapping>> {
        let mut guard = self.mapping.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mapping) = guard.as_ref() {
            return Ok(mapping.clone());
        }

        let source = self.source.as_ref().ok_or(Error::Unmapped)?;
        let data = source.load().map_err(|err| {
            log::error!("failed to reload font {:?}: {err}", self.identity.family_name);
            Error::Unmapped
        })?;
        let mapping = Arc::new(Mapping::new(data)?);
        log::trace!("mapped font {:?}", self.identity.family_name);
        *guard = Some(mapping.clone());
        Ok(mapping)
    }

    /// Release the font bytes if they can be loaded again.
    ///
    /// Readers that are still using the bytes keep them alive until they are
    /// done. Returns whether the bytes were released.
    pub fn unmap(&self) -> bool {
        if self.source.is_none() {
            return false;
        }
        let mut guard = self.mapping.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            log::trace!("unmapped font {:?}", self.identity.family_name);
        }
        true
    }

    /// Whether the font bytes are currently in memory.
    pub fn is_mapped(&self) -> bool {
        self.mapping.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn tables<'a>(&self, mapping: &'a Mapping) -> Result<Tables<'a>> {
        let tables = &mapping.tables;
        Ok(Tables {
            loca: Loca::new(mapping.table(&tables.loca), self.loca_is_offset32, self.num_glyphs),
            glyf: mapping.table(&tables.glyf),
            hmtx: Hmtx::new(
                mapping.table(&tables.hmtx),
                self.number_of_h_metrics,
                self.num_glyphs,
                self.em_scale,
            )?,
        })
    }

    /// The identity of the font.
    pub fn identity(&self) -> &FontIdentity {
        &self.identity
    }

    /// The family name, like `Noto Sans`.
    pub fn family_name(&self) -> &str {
        &self.identity.family_name
    }

    /// The sub-family name, like `Bold Italic`.
    pub fn sub_family_name(&self) -> &str {
        &self.identity.sub_family_name
    }

    #[allow(missing_docs)]
    pub fn weight(&self) -> Weight {
        self.identity.weight
    }

    #[allow(missing_docs)]
    pub fn style(&self) -> Style {
        self.identity.style
    }

    /// Whether every glyph has the same advance.
    pub fn monospace(&self) -> bool {
        self.identity.monospace
    }

    /// Whether the font has serifs.
    pub fn serif(&self) -> bool {
        self.identity.serif
    }

    /// Whether the font is narrower than normal.
    pub fn condensed(&self) -> bool {
        self.identity.condensed
    }

    /// Layout tables present in the font.
    pub fn features(&self) -> FeatureFlags {
        self.identity.features
    }

    /// Font-wide metrics in em units.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// The character map.
    pub fn char_map(&self) -> &CharacterMap {
        &self.char_map
    }

    /// The number of glyphs.
    pub fn glyph_count(&self) -> u16 {
        self.num_glyphs
    }

    /// The size of the design grid.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// The factor converting design units to em units.
    pub fn em_scale(&self) -> f32 {
        self.em_scale
    }

    /// The glyph for a code point, or [`GlyphId::NOT_FOUND`].
    pub fn find_glyph(&self, code_point: u32) -> GlyphId {
        self.char_map.find(code_point)
    }

    /// The glyphs for a grapheme.
    ///
    /// Tries the composed form first and the decomposed form second. Returns an
    /// empty list when neither form is fully covered by the font.
    pub fn find_glyphs(&self, grapheme: &str) -> Vec<GlyphId> {
        let lookup = |chars: &mut dyn Iterator<Item = char>| -> Option<Vec<GlyphId>> {
            chars
                .map(|c| Some(self.find_glyph(u32::from(c))).filter(|glyph| glyph.is_found()))
                .collect()
        };

        lookup(&mut grapheme.nfc())
            .or_else(|| lookup(&mut grapheme.nfd()))
            .unwrap_or_default()
    }

    /// Whether the font maps a code point.
    pub fn contains(&self, code_point: u32) -> bool {
        self.char_map.contains(code_point)
    }

    /// Whether the font can display a grapheme.
    pub fn contains_grapheme(&self, grapheme: &str) -> bool {
        !self.find_glyphs(grapheme).is_empty()
    }

    /// The outline of a glyph, with composite glyphs resolved.
    ///
    /// Malformed glyph data is logged and gives an empty path. Errors are only
    /// returned for glyph ids past the end of the font and for fonts that cannot
    /// be loaded again.
    pub fn get_path(&self, glyph: GlyphId) -> Result<GraphicPath> {
        if glyph.0 >= self.num_glyphs {
            return Err(Error::OutOfRange);
        }

        let mapping = self.mapping()?;
        let tables = self.tables(&mapping)?;
        let mut budget = MAX_COMPONENTS;
        match self.glyph_outline(&tables, glyph, 0, &mut budget) {
            Ok(outline) => Ok(outline.path),
            Err(err) => {
                log::warn!(
                    "empty path for {glyph:?} in {:?}: {err}",
                    self.identity.family_name
                );
                Ok(GraphicPath::new())
            }
        }
    }

    fn glyph_outline(
        &self,
        tables: &Tables,
        glyph: GlyphId,
        depth: u8,
        budget: &mut u32,
    ) -> Result<Outline> {
        if depth > MAX_COMPONENT_DEPTH {
            return Err(Error::RecursiveGlyph);
        }

        let data = tables.loca.glyph_data(tables.glyf, glyph)?;
        let components = match Glyph::parse(data, self.em_scale)? {
            Glyph::Empty => return Ok(Outline::default()),
            Glyph::Simple { path, numbered, .. } => return Ok(Outline { path, numbered }),
            Glyph::Composite { components, .. } => components,
        };

        let mut outline = Outline::default();
        for component in components {
            let component = component?;
            *budget = budget.checked_sub(1).ok_or(Error::RecursiveGlyph)?;
            let mut child = self.glyph_outline(tables, component.glyph_id, depth + 1, budget)?;
            child.path.transform(&component.transform);

            let offset = match component.placement {
                Placement::ByOffset => component.offset,
                Placement::ByPointAnchor { parent_index, child_index } => {
                    outline.point(parent_index)? - child.point(child_index)?
                }
            };
            if offset != Point::default() {
                child.path.translate(offset);
            }
            outline.append(&child)?;
        }

        Ok(outline)
    }

    /// The components of a composite glyph. Empty for other glyphs.
    pub fn components(&self, glyph: GlyphId) -> Result<Vec<Component>> {
        let mapping = self.mapping()?;
        let tables = self.tables(&mapping)?;
        let data = tables.loca.glyph_data(tables.glyf, glyph)?;
        match Glyph::parse(data, self.em_scale)? {
            Glyph::Composite { components, .. } => components.collect(),
            _ => Ok(vec![]),
        }
    }

    /// The metrics of a glyph.
    ///
    /// A composite glyph with a `USE_MY_METRICS` component takes its advance and
    /// left side bearing from that component. Malformed glyph data is logged and
    /// gives zero metrics.
    pub fn get_metrics(&self, glyph: GlyphId) -> Result<GlyphMetrics> {
        if glyph.0 >= self.num_glyphs {
            return Err(Error::OutOfRange);
        }

        let mapping = self.mapping()?;
        let tables = self.tables(&mapping)?;
        self.glyph_metrics(&tables, glyph, 0).or_else(|err| {
            log::warn!(
                "zero metrics for {glyph:?} in {:?}: {err}",
                self.identity.family_name
            );
            Ok(GlyphMetrics::default())
        })
    }

    fn glyph_metrics(&self, tables: &Tables, glyph: GlyphId, depth: u8) -> Result<GlyphMetrics> {
        if depth > MAX_COMPONENT_DEPTH {
            return Err(Error::RecursiveGlyph);
        }

        let data = tables.loca.glyph_data(tables.glyf, glyph)?;
        let parsed = Glyph::parse(data, self.em_scale)?;
        let bounding_rectangle = parsed.bbox();

        let mut donor = None;
        if let Glyph::Composite { components, .. } = parsed {
            for component in components {
                let component = component?;
                if component.use_for_metrics {
                    donor = Some(component.glyph_id);
                    break;
                }
            }
        }

        let (advance, left_side_bearing) = match donor {
            Some(donor) => {
                let metrics = self.glyph_metrics(tables, donor, depth + 1)?;
                (metrics.advance, metrics.left_side_bearing)
            }
            None => tables.hmtx.get(glyph)?,
        };

        Ok(GlyphMetrics {
            bounding_rectangle,
            advance,
            left_side_bearing,
            right_side_bearing: advance - (left_side_bearing + bounding_rectangle.width()),
        })
    }

    /// The kerning between two glyphs in em units.
    ///
    /// A `kern` table that fails to parse is logged once and ignored from then on.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> Point {
        if !self.identity.features.kern || self.kern_disabled.load(Ordering::Relaxed) {
            return Point::default();
        }

        let result = self.mapping().and_then(|mapping| {
            let data = mapping.table(&mapping.tables.kern);
            Kern::new(data, self.em_scale).kerning(left, right)
        });

        result.unwrap_or_else(|err| {
            if !self.kern_disabled.swap(true, Ordering::Relaxed) {
                log::warn!(
                    "disabling kern table of {:?}: {err}",
                    self.identity.family_name
                );
            }
            Point::default()
        })
    }
}

impl Debug for Font {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Font")
            .field("family_name", &self.identity.family_name)
            .field("sub_family_name", &self.identity.sub_family_name)
            .field("glyph_count", &self.num_glyphs)
            .field("units_per_em", &self.units_per_em)
            .field("mapped", &self.is_mapped())
            .finish_non_exhaustive()
    }
}
