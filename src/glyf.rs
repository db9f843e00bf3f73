//! The `glyf` table holds glyph outlines.
//!
//! A glyph is either *simple*, a list of quadratic contours stored as compressed
//! coordinate deltas, or *composite*, a list of references to other glyphs with a
//! transform and a placement each. This module decodes a single glyph record;
//! resolving composite references happens in the font, which can look up other
//! glyphs.

use crate::path::{BezierPoint, GraphicPath, Matrix2, Point, PointKind, Rect};
use crate::stream::{F2Dot14, FByte, FWord, Readable, Reader};
use crate::{Error, GlyphId, Result};

/// The deepest nesting of composite glyphs that is resolved.
pub(crate) const MAX_COMPONENT_DEPTH: u8 = 8;

/// The most component references resolved for a single outline.
pub(crate) const MAX_COMPONENTS: u32 = 4096;

const HEADER_SIZE: usize = 10;

// Simple glyph flags.
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

// Composite glyph flags.
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const USE_MY_METRICS: u16 = 0x0200;
const SCALED_COMPONENT_OFFSET: u16 = 0x0800;

#[inline]
fn read<'a, T: Readable<'a>>(r: &mut Reader<'a>) -> Result<T> {
    r.read::<T>().ok_or(Error::InvalidGlyph)
}

/// A decoded glyph record.
#[derive(Debug, Clone)]
pub(crate) enum Glyph<'a> {
    /// No outline, like a space.
    Empty,
    /// `numbered` holds the index into `path.points` of each point as the font
    /// numbers it. Implied anchors have no number.
    Simple { bbox: Rect, path: GraphicPath, numbered: Vec<usize> },
    Composite { bbox: Rect, components: Components<'a> },
}

impl<'a> Glyph<'a> {
    /// Decode a glyph record, as located by `loca`.
    pub fn parse(data: &'a [u8], em_scale: f32) -> Result<Self> {
        if data.is_empty() {
            return Ok(Glyph::Empty);
        }

        let mut r = Reader::new(data);
        let num_contours = read::<i16>(&mut r)?;
        let x_min = read::<FWord>(&mut r)?;
        let y_min = read::<FWord>(&mut r)?;
        let x_max = read::<FWord>(&mut r)?;
        let y_max = read::<FWord>(&mut r)?;
        if x_min.0 > x_max.0 || y_min.0 > y_max.0 {
            return Err(Error::InvalidGlyph);
        }

        let bbox = Rect::new(
            x_min.scale(em_scale),
            y_min.scale(em_scale),
            x_max.scale(em_scale),
            y_max.scale(em_scale),
        );

        if let Ok(num_contours) = u16::try_from(num_contours) {
            let (path, numbered) = decode_simple(data, num_contours, em_scale)?;
            Ok(Glyph::Simple { bbox, path, numbered })
        } else {
            let components = Components::new(&data[HEADER_SIZE..], em_scale);
            Ok(Glyph::Composite { bbox, components })
        }
    }

    /// The bounding box stored in the glyph header.
    pub fn bbox(&self) -> Rect {
        match self {
            Glyph::Empty => Rect::default(),
            Glyph::Simple { bbox, .. } | Glyph::Composite { bbox, .. } => *bbox,
        }
    }
}

/// Decode the contours of a simple glyph, along with where each of its numbered
/// points ended up.
fn decode_simple(data: &[u8], num_contours: u16, em_scale: f32) -> Result<(GraphicPath, Vec<usize>)> {
    let mut r = Reader::new_at(data, HEADER_SIZE);
    let end_points = r
        .read_array::<u16>(usize::from(num_contours))
        .ok_or(Error::InvalidGlyph)?;

    let mut previous = None;
    for end in end_points {
        if previous.is_some_and(|previous| end <= previous) {
            return Err(Error::InvalidGlyph);
        }
        previous = Some(end);
    }
    let Some(last) = previous else {
        return Ok((GraphicPath::new(), vec![]));
    };
    let point_count = usize::from(last) + 1;

    let instruction_length = read::<u16>(&mut r)?;
    r.skip_bytes(usize::from(instruction_length)).ok_or(Error::InvalidGlyph)?;

    let mut flags = Vec::with_capacity(point_count);
    while flags.len() < point_count {
        let flag = read::<u8>(&mut r)?;
        let repeat = if flag & REPEAT_FLAG != 0 { read::<u8>(&mut r)? } else { 0 };
        for _ in 0..=repeat {
            flags.push(flag);
        }
    }
    if flags.len() != point_count {
        return Err(Error::InvalidGlyph);
    }

    let xs = decode_coordinates(&mut r, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE)?;
    let ys = decode_coordinates(&mut r, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE)?;

    let mut path = GraphicPath {
        contour_end_indices: Vec::with_capacity(usize::from(num_contours)),
        points: Vec::with_capacity(point_count),
    };
    let mut numbered = Vec::with_capacity(point_count);
    let mut start = 0;
    for end in end_points {
        let end = usize::from(end) + 1;
        let contour = (start..end).map(|i| BezierPoint {
            position: Point::new(xs[i] as f32 * em_scale, ys[i] as f32 * em_scale),
            kind: if flags[i] & ON_CURVE_POINT != 0 {
                PointKind::Anchor
            } else {
                PointKind::QuadraticControl
            },
        });
        push_contour(&mut path, &mut numbered, contour)?;
        start = end;
    }

    Ok((path, numbered))
}

/// Accumulate one axis of coordinate deltas into absolute coordinates.
fn decode_coordinates(
    r: &mut Reader,
    flags: &[u8],
    short: u8,
    same_or_positive: u8,
) -> Result<Vec<i32>> {
    let mut value = 0i32;
    let mut coordinates = Vec::with_capacity(flags.len());
    for &flag in flags {
        let delta = match (flag & short != 0, flag & same_or_positive != 0) {
            (true, true) => i32::from(read::<u8>(r)?),
            (true, false) => -i32::from(read::<u8>(r)?),
            (false, true) => 0,
            (false, false) => i32::from(read::<i16>(r)?),
        };
        value += delta;
        coordinates.push(value);
    }
    Ok(coordinates)
}

/// Append a contour to `path`.
///
/// A contour made only of control points gets the implied on-curve point between
/// its last and first control point, so every contour has an anchor.
fn push_contour(
    path: &mut GraphicPath,
    numbered: &mut Vec<usize>,
    contour: impl Iterator<Item = BezierPoint>,
) -> Result<()> {
    let first = path.points.len();
    path.points.extend(contour);
    if path.points.len() == first {
        return Ok(());
    }

    let contour = &path.points[first..];
    let mut shift = 0;
    if contour.iter().all(|p| p.kind == PointKind::QuadraticControl) {
        let a = contour[0].position;
        let b = contour[contour.len() - 1].position;
        let implied = BezierPoint::anchor((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        path.points.insert(first, implied);
        shift = 1;
    }
    numbered.extend(first + shift..path.points.len());

    let end = u16::try_from(path.points.len() - 1).map_err(|_| Error::InvalidGlyph)?;
    path.contour_end_indices.push(end);
    Ok(())
}

/// How a component is positioned inside its composite glyph.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Placement {
    /// Move the component by [`Component::offset`].
    ByOffset,
    /// Move the component so that its point `child_index` lands on point
    /// `parent_index` of the composite assembled so far.
    ByPointAnchor {
        /// A point index into the already assembled composite.
        parent_index: u16,
        /// A point index into the component.
        child_index: u16,
    },
}

/// One glyph referenced by a composite glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Component {
    /// The referenced glyph.
    pub glyph_id: GlyphId,
    /// The translation in em units, when placed by offset. The transform has
    /// already been applied to it if the font asks for scaled offsets.
    pub offset: Point,
    /// The linear part of the component's transform.
    pub transform: Matrix2,
    /// How the component is positioned.
    pub placement: Placement,
    /// Whether the composite takes its advance and side bearing from this
    /// component.
    pub use_for_metrics: bool,
}

/// Iterates over the components of a composite glyph.
///
/// Stops after the first component without `MORE_COMPONENTS` or after the first
/// error.
#[derive(Debug, Clone)]
pub(crate) struct Components<'a> {
    r: Reader<'a>,
    em_scale: f32,
    done: bool,
}

impl<'a> Components<'a> {
    fn new(data: &'a [u8], em_scale: f32) -> Self {
        Self { r: Reader::new(data), em_scale, done: false }
    }

    fn parse_next(&mut self) -> Result<(Component, bool)> {
        let r = &mut self.r;
        let flags = read::<u16>(r)?;
        let glyph_id = read::<GlyphId>(r)?;

        let words = flags & ARG_1_AND_2_ARE_WORDS != 0;
        let (mut offset, placement) = if flags & ARGS_ARE_XY_VALUES != 0 {
            let offset = if words {
                Point::new(read::<FWord>(r)?.scale(self.em_scale), read::<FWord>(r)?.scale(self.em_scale))
            } else {
                Point::new(read::<FByte>(r)?.scale(self.em_scale), read::<FByte>(r)?.scale(self.em_scale))
            };
            (offset, Placement::ByOffset)
        } else {
            let (parent_index, child_index) = if words {
                (read::<u16>(r)?, read::<u16>(r)?)
            } else {
                (u16::from(read::<u8>(r)?), u16::from(read::<u8>(r)?))
            };
            (Point::default(), Placement::ByPointAnchor { parent_index, child_index })
        };

        let transform = if flags & WE_HAVE_A_SCALE != 0 {
            Matrix2::scale(read::<F2Dot14>(r)?.to_f32())
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            Matrix2::scale_xy(read::<F2Dot14>(r)?.to_f32(), read::<F2Dot14>(r)?.to_f32())
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            Matrix2 {
                a: read::<F2Dot14>(r)?.to_f32(),
                b: read::<F2Dot14>(r)?.to_f32(),
                c: read::<F2Dot14>(r)?.to_f32(),
                d: read::<F2Dot14>(r)?.to_f32(),
            }
        } else {
            Matrix2::IDENTITY
        };

        if flags & SCALED_COMPONENT_OFFSET != 0 {
            offset = transform.apply(offset);
        }

        let component = Component {
            glyph_id,
            offset,
            transform,
            placement,
            use_for_metrics: flags & USE_MY_METRICS != 0,
        };
        Ok((component, flags & MORE_COMPONENTS != 0))
    }
}

impl Iterator for Components<'_> {
    type Item = Result<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.parse_next() {
            Ok((component, more)) => {
                self.done = !more;
                Some(Ok(component))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
