use crate::shape::{Drawing, Geometry, Measure, Point, Shape};
use crate::svg::escape_xml;
use crate::transform::Transform;

/// Id of the arrowhead `<marker>` defined by the document.
pub const ARROW_MARKER_ID: &str = "arrow";

/// Gap in pixels between a rectangle edge and its reference line.
const REFERENCE_GAP: f64 = 20.0;
/// How far the label sits above the line's midpoint.
const LABEL_RISE: f64 = 5.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LINE_COLOR: &str = "black";

/// An arrowed measurement line with its text label, in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionLine {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub label: String,
}

impl DimensionLine {
    fn new(from: (f64, f64), to: (f64, f64), value: &Measure, unit: &str) -> Self {
        Self {
            from,
            to,
            label: format!("{} {}", value, unit),
        }
    }

    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.from.0 + self.to.0) / 2.0,
            (self.from.1 + self.to.1) / 2.0,
        )
    }

    pub fn to_svg(&self) -> String {
        let (mx, my) = self.midpoint();
        format!(
            r#"<g><line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{color}" stroke-width="1" marker-start="url(#{marker})" marker-end="url(#{marker})" /><text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{}" fill="{color}" text-anchor="middle">{}</text></g>"#,
            self.from.0,
            self.from.1,
            self.to.0,
            self.to.1,
            mx,
            my - LABEL_RISE,
            LABEL_FONT_SIZE,
            escape_xml(&self.label),
            color = LINE_COLOR,
            marker = ARROW_MARKER_ID,
        )
    }
}

/// Reference lines for every annotated shape, meant to be painted after all
/// primitives.
///
/// Only rectangles, circles and triangles carry dimensions; any label that is
/// missing from the annotation just skips its own line.
pub fn render_dimensions(drawing: &Drawing, transform: &Transform) -> Vec<DimensionLine> {
    drawing
        .shapes
        .iter()
        .flat_map(|shape| shape_dimensions(shape, transform))
        .collect()
}

fn shape_dimensions(shape: &Shape, transform: &Transform) -> Vec<DimensionLine> {
    let Some(dimension) = &shape.dimension else {
        return Vec::new();
    };
    let unit = shape.unit();
    let mut lines = Vec::new();

    match &shape.geometry {
        Geometry::Rectangle {
            x,
            y,
            width,
            height,
        } => {
            let (tx, ty) = transform.map(Point(*x, *y));
            let width_px = transform.length(*width);
            let height_px = transform.length(*height);

            if let Some(value) = &dimension.width {
                lines.push(DimensionLine::new(
                    (tx, ty + REFERENCE_GAP),
                    (tx + width_px, ty + REFERENCE_GAP),
                    value,
                    unit,
                ));
            }
            if let Some(value) = &dimension.height {
                lines.push(DimensionLine::new(
                    (tx - REFERENCE_GAP, ty),
                    (tx - REFERENCE_GAP, ty - height_px),
                    value,
                    unit,
                ));
            }
        }
        Geometry::Circle { center, radius } => {
            if let Some(value) = &dimension.radius {
                let (cx, cy) = transform.map(*center);
                lines.push(DimensionLine::new(
                    (cx, cy),
                    (cx + transform.length(*radius), cy),
                    value,
                    unit,
                ));
            }
        }
        Geometry::Triangle { points } => {
            if let (Some(sides), [a, b, c, ..]) = (&dimension.sides, points.as_slice()) {
                let (a, b, c) = (transform.map(*a), transform.map(*b), transform.map(*c));
                let edges = [(a, b, &sides.ab), (b, c, &sides.bc), (c, a, &sides.ca)];
                for (from, to, value) in edges {
                    if let Some(value) = value {
                        lines.push(DimensionLine::new(from, to, value, unit));
                    }
                }
            }
        }
        // The producer never annotates these kinds.
        Geometry::Polygon { .. } | Geometry::Line { .. } | Geometry::Ellipse { .. } => {}
    }

    lines
}
