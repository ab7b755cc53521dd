use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::Bounds;

/// Unit shown next to dimension labels when the producer omits one.
pub const DEFAULT_UNIT: &str = "cm";

/// A point in model space, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

/// Geometry of one shape, tagged by `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Line {
        points: [Point; 2],
    },
    Triangle {
        points: Vec<Point>,
    },
    Polygon {
        points: Vec<Point>,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    /// `(x, y)` is the lower-left corner.
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
    },
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Line { .. } => "line",
            Geometry::Triangle { .. } => "triangle",
            Geometry::Polygon { .. } => "polygon",
            Geometry::Circle { .. } => "circle",
            Geometry::Rectangle { .. } => "rectangle",
            Geometry::Ellipse { .. } => "ellipse",
        }
    }
}

/// A display-only dimension value. Producers send either numbers or
/// preformatted strings; both are shown verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Number(value) => write!(f, "{}", value),
            Measure::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::Number(value)
    }
}

impl From<&str> for Measure {
    fn from(value: &str) -> Self {
        Measure::Text(value.to_string())
    }
}

/// Triangle side labels keyed by vertex pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideLengths {
    #[serde(rename = "AB", default, skip_serializing_if = "Option::is_none")]
    pub ab: Option<Measure>,
    #[serde(rename = "BC", default, skip_serializing_if = "Option::is_none")]
    pub bc: Option<Measure>,
    #[serde(rename = "CA", default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<Measure>,
}

/// Labeled lengths attached to a shape. Which fields are read depends on the
/// shape kind; the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<SideLengths>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Shape {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            dimension: None,
            unit: None,
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or(DEFAULT_UNIT)
    }
}

impl From<Geometry> for Shape {
    fn from(geometry: Geometry) -> Self {
        Shape::new(geometry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("invalid drawing JSON: {0}")]
    Json(String),

    #[error("shape {index} ({kind}): {field} must be a finite number")]
    NonFinite {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },

    #[error("shape {index} ({kind}): {field} must not be negative")]
    Negative {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },

    #[error("shape {index} ({kind}): needs at least 3 points, got {count}")]
    TooFewPoints {
        index: usize,
        kind: &'static str,
        count: usize,
    },

    #[error("drawing extent is too large to render")]
    ExtentOverflow,
}

/// One complete rendering state.
///
/// A drawing is never edited in place: every accepted command produces a new
/// one, which is what lets the history share them freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub shapes: Vec<Shape>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub meta: serde_json::Map<String, serde_json::Value>,
}

impl Drawing {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            meta: serde_json::Map::new(),
        }
    }

    /// Parse and validate a drawing document.
    pub fn from_json(source: &str) -> Result<Self, ShapeError> {
        let drawing: Drawing =
            serde_json::from_str(source).map_err(|e| ShapeError::Json(e.to_string()))?;
        drawing.validate()?;
        Ok(drawing)
    }

    pub fn to_pretty_json(&self) -> String {
        // Serializing plain data with string keys cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        for (index, shape) in self.shapes.iter().enumerate() {
            validate_geometry(index, &shape.geometry)?;
        }
        match Bounds::of(&self.shapes) {
            Some(bounds) if !bounds.fits_f64() => Err(ShapeError::ExtentOverflow),
            _ => Ok(()),
        }
    }
}

fn validate_geometry(index: usize, geometry: &Geometry) -> Result<(), ShapeError> {
    let kind = geometry.kind();
    let finite = |field: &'static str, value: f64| -> Result<(), ShapeError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ShapeError::NonFinite { index, kind, field })
        }
    };
    let size = |field: &'static str, value: f64| -> Result<(), ShapeError> {
        finite(field, value)?;
        if value < 0.0 {
            Err(ShapeError::Negative { index, kind, field })
        } else {
            Ok(())
        }
    };
    let points = |points: &[Point]| -> Result<(), ShapeError> {
        points
            .iter()
            .try_for_each(|p| finite("points", p.x()).and_then(|_| finite("points", p.y())))
    };

    match geometry {
        Geometry::Line { points: ends } => points(ends.as_slice()),
        Geometry::Triangle { points: pts } | Geometry::Polygon { points: pts } => {
            if pts.len() < 3 {
                return Err(ShapeError::TooFewPoints {
                    index,
                    kind,
                    count: pts.len(),
                });
            }
            points(pts.as_slice())
        }
        Geometry::Circle { center, radius } => {
            points(std::slice::from_ref(center))?;
            size("radius", *radius)
        }
        Geometry::Rectangle {
            x,
            y,
            width,
            height,
        } => {
            finite("x", *x)?;
            finite("y", *y)?;
            size("width", *width)?;
            size("height", *height)
        }
        Geometry::Ellipse { center, rx, ry } => {
            points(std::slice::from_ref(center))?;
            size("rx", *rx)?;
            size("ry", *ry)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_from_wire_format() {
        let source = r#"{
            "shapes": [
                {"type": "line", "points": [[0, 0], [200, 150]]},
                {"type": "triangle", "points": [[0, 100], [0, 0], [100, 0]]},
                {"type": "polygon", "points": [[0, 0], [10, 0], [10, 10], [0, 10]]},
                {"type": "circle", "center": [29.2893, 29.2893], "radius": 29.2893},
                {"type": "rectangle", "x": 40, "y": 60, "width": 180, "height": 90},
                {"type": "ellipse", "center": [150, 150], "rx": 80, "ry": 40}
            ],
            "meta": {"units": "user-space"}
        }"#;

        let drawing = Drawing::from_json(source).unwrap();
        let kinds: Vec<_> = drawing.shapes.iter().map(|s| s.geometry.kind()).collect();
        assert_eq!(
            kinds,
            ["line", "triangle", "polygon", "circle", "rectangle", "ellipse"]
        );
        assert_eq!(
            drawing.shapes[4].geometry,
            Geometry::Rectangle {
                x: 40.0,
                y: 60.0,
                width: 180.0,
                height: 90.0
            }
        );
        assert_eq!(drawing.meta["units"], "user-space");
    }

    #[test]
    fn parses_dimension_annotation_and_unit() {
        let source = r#"{"shapes": [
            {"type": "rectangle", "x": 0, "y": 0, "width": 4, "height": 2,
             "dimension": {"width": 4, "height": "2.0"}, "unit": "m"},
            {"type": "triangle", "points": [[0, 0], [3, 0], [0, 4]],
             "dimension": {"sides": {"AB": 3, "BC": 5, "CA": 4}}}
        ]}"#;

        let drawing = Drawing::from_json(source).unwrap();
        let rect = &drawing.shapes[0];
        let dims = rect.dimension.as_ref().unwrap();
        assert_eq!(dims.width, Some(Measure::Number(4.0)));
        assert_eq!(dims.height, Some(Measure::Text("2.0".into())));
        assert_eq!(rect.unit(), "m");

        let tri = &drawing.shapes[1];
        let sides = tri.dimension.as_ref().unwrap().sides.as_ref().unwrap();
        assert_eq!(sides.bc, Some(Measure::Number(5.0)));
        assert_eq!(tri.unit(), DEFAULT_UNIT);
    }

    #[test]
    fn measure_display_matches_producer_text() {
        assert_eq!(Measure::Number(180.0).to_string(), "180");
        assert_eq!(Measure::Number(2.5).to_string(), "2.5");
        assert_eq!(Measure::from("12 1/2").to_string(), "12 1/2");
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Drawing::from_json(r#"{"shapes": [{"type": "star", "points": []}]}"#)
            .unwrap_err();
        assert!(matches!(err, ShapeError::Json(_)));
    }

    #[test]
    fn rejects_line_without_two_points() {
        let err =
            Drawing::from_json(r#"{"shapes": [{"type": "line", "points": [[0, 0]]}]}"#)
                .unwrap_err();
        assert!(matches!(err, ShapeError::Json(_)));
    }

    #[test]
    fn rejects_polygon_with_two_points() {
        let drawing = Drawing::new(vec![
            Geometry::Polygon {
                points: vec![Point(0.0, 0.0), Point(1.0, 1.0)],
            }
            .into(),
        ]);
        assert_eq!(
            drawing.validate(),
            Err(ShapeError::TooFewPoints {
                index: 0,
                kind: "polygon",
                count: 2
            })
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_sizes() {
        let negative = Drawing::new(vec![
            Geometry::Circle {
                center: Point(0.0, 0.0),
                radius: 1.0,
            }
            .into(),
            Geometry::Ellipse {
                center: Point(0.0, 0.0),
                rx: -1.0,
                ry: 1.0,
            }
            .into(),
        ]);
        assert_eq!(
            negative.validate(),
            Err(ShapeError::Negative {
                index: 1,
                kind: "ellipse",
                field: "rx"
            })
        );

        let nan = Drawing::new(vec![
            Geometry::Rectangle {
                x: f64::NAN,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            }
            .into(),
        ]);
        assert!(matches!(
            nan.validate(),
            Err(ShapeError::NonFinite { field: "x", .. })
        ));
    }

    #[test]
    fn rejects_extent_that_overflows() {
        let err = Drawing::from_json(
            r#"{"shapes": [{"type": "line", "points": [[-1e308, 0], [1e308, 10]]}]}"#,
        )
        .unwrap_err();
        assert_eq!(err, ShapeError::ExtentOverflow);

        let far_circle = Drawing::new(vec![
            Geometry::Circle {
                center: Point(1e308, 0.0),
                radius: 1e308,
            }
            .into(),
        ]);
        assert_eq!(far_circle.validate(), Err(ShapeError::ExtentOverflow));
    }

    #[test]
    fn large_but_representable_extent_is_valid() {
        let drawing = Drawing::from_json(
            r#"{"shapes": [{"type": "line", "points": [[-1e300, 0], [1e300, 10]]}]}"#,
        )
        .unwrap();
        assert!(drawing.validate().is_ok());
    }

    #[test]
    fn zero_size_rectangle_is_valid() {
        let drawing = Drawing::new(vec![
            Geometry::Rectangle {
                x: 10.0,
                y: 10.0,
                width: 0.0,
                height: 0.0,
            }
            .into(),
        ]);
        assert!(drawing.validate().is_ok());
    }

    #[test]
    fn pretty_json_keeps_type_tag_and_omits_absent_fields() {
        let drawing = Drawing::new(vec![
            Shape::new(Geometry::Circle {
                center: Point(1.0, 2.0),
                radius: 3.0,
            })
            .with_unit("mm"),
        ]);
        let json = drawing.to_pretty_json();
        assert!(json.contains(r#""type": "circle""#));
        assert!(json.contains(r#""unit": "mm""#));
        assert!(!json.contains("dimension"));
        assert!(!json.contains("meta"));
    }
}
