//! Scale-to-fit mapping from model space to viewport pixels.
//!
//! Model space is Cartesian (y grows upward), the viewport has its origin at
//! the top-left corner (y grows downward), so every mapping flips the
//! vertical axis.

use thiserror::Error;

use crate::shape::{Drawing, Geometry, Point, Shape};

/// Fraction of the larger extent added as margin on every side.
pub const PADDING_RATIO: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("viewport must have a positive finite size, got {width}x{height}")]
pub struct ViewportError {
    pub width: f64,
    pub height: f64,
}

/// Target surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self, ViewportError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(ViewportError { width, height })
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Axis-aligned bounding box in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn from_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    fn around(center: Point, rx: f64, ry: f64) -> Self {
        Self::from_corners(center.x() - rx, center.y() - ry, center.x() + rx, center.y() + ry)
    }

    fn of_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let start = Self::from_corners(first.x(), first.y(), first.x(), first.y());
        Some(rest.iter().fold(start, |acc, p| {
            acc.union(&Self::from_corners(p.x(), p.y(), p.x(), p.y()))
        }))
    }

    /// Extent of a single shape, `None` only for a point list with no points.
    pub fn of_shape(shape: &Shape) -> Option<Self> {
        match &shape.geometry {
            Geometry::Line { points } => Self::of_points(points),
            Geometry::Triangle { points } | Geometry::Polygon { points } => {
                Self::of_points(points)
            }
            Geometry::Circle { center, radius } => Some(Self::around(*center, *radius, *radius)),
            Geometry::Rectangle {
                x,
                y,
                width,
                height,
            } => Some(Self::from_corners(*x, *y, x + width, y + height)),
            Geometry::Ellipse { center, rx, ry } => Some(Self::around(*center, *rx, *ry)),
        }
    }

    /// Union of every shape's extent. `None` when there is nothing to bound.
    pub fn of(shapes: &[Shape]) -> Option<Self> {
        shapes
            .iter()
            .filter_map(Self::of_shape)
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether both extents, padded for fitting, are still finite.
    pub fn fits_f64(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        // `f64::max` skips NaN, so check each extent before combining.
        w.is_finite() && h.is_finite() && (w.max(h) * (1.0 + 2.0 * PADDING_RATIO)).is_finite()
    }
}

/// Uniform scale plus centering offset for one drawing at one viewport size.
///
/// Derived on every render and never stored alongside the drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    bounds: Bounds,
    viewport: Viewport,
}

impl Transform {
    /// Fit `drawing` into `viewport`. Returns `None` for a drawing with no
    /// shapes, or one whose extent does not fit an `f64`; callers show the
    /// empty-state placeholder instead.
    pub fn fit(drawing: &Drawing, viewport: Viewport) -> Option<Self> {
        let bounds = Bounds::of(&drawing.shapes).filter(Bounds::fits_f64)?;
        let transform = Self::for_bounds(bounds, viewport);
        let finite = transform.scale.is_finite()
            && transform.scale > 0.0
            && transform.offset_x.is_finite()
            && transform.offset_y.is_finite();
        finite.then_some(transform)
    }

    pub fn for_bounds(bounds: Bounds, viewport: Viewport) -> Self {
        // A flat axis would divide by zero; treat it as one model unit.
        let extent = |v: f64| if v > 0.0 { v } else { 1.0 };
        let domain_w = extent(bounds.width());
        let domain_h = extent(bounds.height());

        let pad = PADDING_RATIO * domain_w.max(domain_h);
        let padded_w = domain_w + pad * 2.0;
        let padded_h = domain_h + pad * 2.0;

        let scale = (viewport.width / padded_w).min(viewport.height / padded_h);

        Self {
            scale,
            offset_x: (viewport.width - domain_w * scale) / 2.0,
            offset_y: (viewport.height - domain_h * scale) / 2.0,
            bounds,
            viewport,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Model point to viewport pixel.
    pub fn map(&self, point: Point) -> (f64, f64) {
        (
            (point.x() - self.bounds.min_x) * self.scale + self.offset_x,
            self.viewport.height - ((point.y() - self.bounds.min_y) * self.scale + self.offset_y),
        )
    }

    /// Viewport pixel back to model space; inverse of [`Transform::map`].
    pub fn unmap(&self, (px, py): (f64, f64)) -> Point {
        Point(
            (px - self.offset_x) / self.scale + self.bounds.min_x,
            (self.viewport.height - py - self.offset_y) / self.scale + self.bounds.min_y,
        )
    }

    /// Model length to pixels.
    pub fn length(&self, value: f64) -> f64 {
        value * self.scale
    }
}
