//! Geometry shared by outlines, metrics and shaping. All values are in em units.

use crate::{Error, Result};
use std::ops::{Add, Sub};

/// A point or vector.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing upwards.
    pub y: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    /// The bottom-left corner.
    pub min: Point,
    /// The top-right corner.
    pub max: Point,
}

impl Rect {
    /// Create a rectangle from its extremes.
    pub const fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self { min: Point::new(x_min, y_min), max: Point::new(x_max, y_max) }
    }

    /// The smallest rectangle containing all points, or the zero rectangle when
    /// there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::default();
        };
        points.fold(Self { min: first, max: first }, |rect, p| Self {
            min: Point::new(rect.min.x.min(p.x), rect.min.y.min(p.y)),
            max: Point::new(rect.max.x.max(p.x), rect.max.y.max(p.y)),
        })
    }

    /// The horizontal extent.
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// The vertical extent.
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Whether `other` lies inside this rectangle, allowing for rounding.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPSILON: f32 = 1e-4;
        other.min.x >= self.min.x - EPSILON
            && other.min.y >= self.min.y - EPSILON
            && other.max.x <= self.max.x + EPSILON
            && other.max.y <= self.max.y + EPSILON
    }

    /// The rectangle moved by `offset`.
    pub fn translate(&self, offset: Point) -> Self {
        Self { min: self.min + offset, max: self.max + offset }
    }
}

/// A 2×2 linear transform.
///
/// Maps `(x, y)` to `(a·x + c·y, b·x + d·y)`, the component matrix layout of
/// TrueType composite glyphs.
#[derive(Debug, Copy, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Matrix2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Matrix2 {
    /// The transform that changes nothing.
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0 };

    /// Scale both axes by `s`.
    pub const fn scale(s: f32) -> Self {
        Self { a: s, b: 0.0, c: 0.0, d: s }
    }

    /// Scale each axis separately.
    pub const fn scale_xy(x: f32, y: f32) -> Self {
        Self { a: x, b: 0.0, c: 0.0, d: y }
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y, self.b * p.x + self.d * p.y)
    }

    /// Whether this is the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Matrix2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Whether a point lies on the curve.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointKind {
    /// An on-curve point.
    Anchor,
    /// The off-curve control point of a quadratic curve.
    QuadraticControl,
}

/// A point of a quadratic bezier outline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BezierPoint {
    /// Where the point is.
    pub position: Point,
    /// What the point is.
    pub kind: PointKind,
}

impl BezierPoint {
    /// An on-curve point.
    pub const fn anchor(x: f32, y: f32) -> Self {
        Self { position: Point::new(x, y), kind: PointKind::Anchor }
    }

    /// An off-curve point.
    pub const fn control(x: f32, y: f32) -> Self {
        Self { position: Point::new(x, y), kind: PointKind::QuadraticControl }
    }
}

/// A glyph outline made of closed quadratic contours.
///
/// `contour_end_indices` holds the index of the last point of each contour and is
/// strictly increasing. The last end index is `points.len() - 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphicPath {
    /// The index of each contour's last point.
    pub contour_end_indices: Vec<u16>,
    /// All points of all contours.
    pub points: Vec<BezierPoint>,
}

impl GraphicPath {
    /// An empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The number of contours.
    pub fn contour_count(&self) -> usize {
        self.contour_end_indices.len()
    }

    /// The points of each contour.
    pub fn contours(&self) -> impl Iterator<Item = &[BezierPoint]> + '_ {
        let mut start = 0;
        self.contour_end_indices.iter().filter_map(move |&end| {
            let end = usize::from(end) + 1;
            let contour = self.points.get(start..end);
            start = end;
            contour
        })
    }

    /// The smallest rectangle containing every point.
    pub fn bounding_box(&self) -> Rect {
        Rect::from_points(self.points.iter().map(|p| p.position))
    }

    /// Apply a linear transform to every point.
    pub fn transform(&mut self, matrix: &Matrix2) {
        if matrix.is_identity() {
            return;
        }
        for point in &mut self.points {
            point.position = matrix.apply(point.position);
        }
    }

    /// Move every point by `offset`.
    pub fn translate(&mut self, offset: Point) {
        for point in &mut self.points {
            point.position = point.position + offset;
        }
    }

    /// Append the contours of `other`.
    ///
    /// Fails with [`Error::InvalidGlyph`] when the combined path has more points
    /// than an end index can address.
    pub fn append(&mut self, other: &GraphicPath) -> Result<()> {
        let base = self.points.len();
        if base + other.points.len() > usize::from(u16::MAX) + 1 {
            return Err(Error::InvalidGlyph);
        }
        self.points.extend_from_slice(&other.points);
        self.contour_end_indices
            .extend(other.contour_end_indices.iter().map(|&end| (usize::from(end) + base) as u16));
        Ok(())
    }
}
