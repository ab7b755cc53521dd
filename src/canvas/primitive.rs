use crate::shape::{Drawing, Geometry, Point};
use crate::svg::{fill_attr, points_attr};
use crate::transform::Transform;

/// Paint for one primitive. Styles are fixed per shape kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<&'static str>,
    pub stroke: &'static str,
    pub stroke_width: f64,
}

pub const POLYGON_STYLE: Style = Style {
    fill: Some("rgba(59,130,246,0.10)"),
    stroke: "rgba(59,130,246,1)",
    stroke_width: 2.2,
};

pub const LINE_STYLE: Style = Style {
    fill: None,
    stroke: "black",
    stroke_width: 2.0,
};

pub const CIRCLE_STYLE: Style = Style {
    fill: Some("rgba(34,197,94,0.15)"),
    stroke: "rgba(34,197,94,1)",
    stroke_width: 2.0,
};

pub const RECTANGLE_STYLE: Style = Style {
    fill: Some("rgba(168,85,247,0.10)"),
    stroke: "rgba(168,85,247,1)",
    stroke_width: 2.0,
};

pub const ELLIPSE_STYLE: Style = Style {
    fill: Some("rgba(239,68,68,0.12)"),
    stroke: "rgba(239,68,68,1)",
    stroke_width: 2.0,
};

pub fn style_for(geometry: &Geometry) -> Style {
    match geometry {
        Geometry::Triangle { .. } | Geometry::Polygon { .. } => POLYGON_STYLE,
        Geometry::Line { .. } => LINE_STYLE,
        Geometry::Circle { .. } => CIRCLE_STYLE,
        Geometry::Rectangle { .. } => RECTANGLE_STYLE,
        Geometry::Ellipse { .. } => ELLIPSE_STYLE,
    }
}

/// A drawable element in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polygon {
        points: Vec<(f64, f64)>,
        style: Style,
    },
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        style: Style,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    /// `(x, y)` is the top-left corner on screen.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Style,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        style: Style,
    },
}

impl Primitive {
    pub fn style(&self) -> Style {
        match self {
            Primitive::Polygon { style, .. }
            | Primitive::Segment { style, .. }
            | Primitive::Circle { style, .. }
            | Primitive::Rect { style, .. }
            | Primitive::Ellipse { style, .. } => *style,
        }
    }

    pub fn to_svg(&self) -> String {
        let style = self.style();
        let paint = format!(
            r#"fill="{}" stroke="{}" stroke-width="{}""#,
            fill_attr(style.fill),
            style.stroke,
            style.stroke_width
        );

        match self {
            Primitive::Polygon { points, .. } => {
                format!(r#"<polygon points="{}" {} />"#, points_attr(points), paint)
            }
            Primitive::Segment { from, to, .. } => format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}" />"#,
                from.0, from.1, to.0, to.1, style.stroke, style.stroke_width
            ),
            Primitive::Circle { cx, cy, r, .. } => format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" {} />"#,
                cx, cy, r, paint
            ),
            Primitive::Rect {
                x,
                y,
                width,
                height,
                ..
            } => format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {} />"#,
                x, y, width, height, paint
            ),
            Primitive::Ellipse { cx, cy, rx, ry, .. } => format!(
                r#"<ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" {} />"#,
                cx, cy, rx, ry, paint
            ),
        }
    }
}

/// Map every shape to its primitive, in paint order.
///
/// Nothing is cached between calls: a new drawing always gets a full set of
/// fresh primitives.
pub fn render_primitives(drawing: &Drawing, transform: &Transform) -> Vec<Primitive> {
    drawing
        .shapes
        .iter()
        .map(|shape| {
            let style = style_for(&shape.geometry);
            match &shape.geometry {
                Geometry::Triangle { points } | Geometry::Polygon { points } => {
                    Primitive::Polygon {
                        points: points.iter().map(|p| transform.map(*p)).collect(),
                        style,
                    }
                }
                Geometry::Line { points: [a, b] } => Primitive::Segment {
                    from: transform.map(*a),
                    to: transform.map(*b),
                    style,
                },
                Geometry::Circle { center, radius } => {
                    let (cx, cy) = transform.map(*center);
                    Primitive::Circle {
                        cx,
                        cy,
                        r: transform.length(*radius),
                        style,
                    }
                }
                Geometry::Rectangle {
                    x,
                    y,
                    width,
                    height,
                } => {
                    // map(x, y) lands on the bottom-left corner after the flip.
                    let (tx, ty) = transform.map(Point(*x, *y));
                    let height_px = transform.length(*height);
                    Primitive::Rect {
                        x: tx,
                        y: ty - height_px,
                        width: transform.length(*width),
                        height: height_px,
                        style,
                    }
                }
                Geometry::Ellipse { center, rx, ry } => {
                    let (cx, cy) = transform.map(*center);
                    Primitive::Ellipse {
                        cx,
                        cy,
                        rx: transform.length(*rx),
                        ry: transform.length(*ry),
                        style,
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Point, Shape};
    use crate::transform::Viewport;

    fn fit(drawing: &Drawing) -> Transform {
        Transform::fit(drawing, Viewport::new(720.0, 480.0).unwrap()).unwrap()
    }

    fn sample() -> Drawing {
        Drawing::new(vec![
            Shape::new(Geometry::Triangle {
                points: vec![Point(0.0, 100.0), Point(0.0, 0.0), Point(100.0, 0.0)],
            }),
            Shape::new(Geometry::Line {
                points: [Point(0.0, 0.0), Point(200.0, 150.0)],
            }),
            Shape::new(Geometry::Circle {
                center: Point(29.0, 29.0),
                radius: 29.0,
            }),
            Shape::new(Geometry::Rectangle {
                x: 40.0,
                y: 60.0,
                width: 180.0,
                height: 90.0,
            }),
            Shape::new(Geometry::Ellipse {
                center: Point(150.0, 150.0),
                rx: 80.0,
                ry: 40.0,
            }),
        ])
    }

    #[test]
    fn one_primitive_per_shape_in_order() {
        let drawing = sample();
        let primitives = render_primitives(&drawing, &fit(&drawing));

        assert_eq!(primitives.len(), 5);
        assert!(matches!(primitives[0], Primitive::Polygon { .. }));
        assert!(matches!(primitives[1], Primitive::Segment { .. }));
        assert!(matches!(primitives[2], Primitive::Circle { .. }));
        assert!(matches!(primitives[3], Primitive::Rect { .. }));
        assert!(matches!(primitives[4], Primitive::Ellipse { .. }));
    }

    #[test]
    fn styles_follow_kind_table() {
        let drawing = sample();
        let styles: Vec<_> = render_primitives(&drawing, &fit(&drawing))
            .iter()
            .map(Primitive::style)
            .collect();
        assert_eq!(
            styles,
            [
                POLYGON_STYLE,
                LINE_STYLE,
                CIRCLE_STYLE,
                RECTANGLE_STYLE,
                ELLIPSE_STYLE
            ]
        );
    }

    #[test]
    fn rectangle_top_left_is_lifted_by_height() {
        let drawing = Drawing::new(vec![Shape::new(Geometry::Rectangle {
            x: 40.0,
            y: 60.0,
            width: 180.0,
            height: 90.0,
        })]);
        let transform = fit(&drawing);
        let scale = transform.scale();

        let [Primitive::Rect {
            x,
            y,
            width,
            height,
            ..
        }] = render_primitives(&drawing, &transform)[..]
        else {
            panic!("expected a single rect");
        };

        assert_eq!(width, 180.0 * scale);
        assert_eq!(height, 90.0 * scale);
        let (bx, by) = transform.map(Point(40.0, 60.0));
        assert_eq!(x, bx);
        assert!((y - (by - 90.0 * scale)).abs() < 1e-9);
        // The upper model edge maps to the rect's top.
        let (_, top) = transform.map(Point(40.0, 150.0));
        assert!((y - top).abs() < 1e-9);
    }

    #[test]
    fn circle_radius_scales_uniformly() {
        let drawing = sample();
        let transform = fit(&drawing);
        let primitives = render_primitives(&drawing, &transform);
        let Primitive::Circle { r, .. } = primitives[2] else {
            panic!("expected circle");
        };
        assert_eq!(r, 29.0 * transform.scale());
    }

    #[test]
    fn rendering_twice_is_identical() {
        let drawing = sample();
        let transform = fit(&drawing);
        assert_eq!(
            render_primitives(&drawing, &transform),
            render_primitives(&drawing, &transform)
        );
    }

    #[test]
    fn line_is_stroke_only() {
        let svg = Primitive::Segment {
            from: (0.0, 0.0),
            to: (10.0, 5.0),
            style: LINE_STYLE,
        }
        .to_svg();
        assert_eq!(
            svg,
            r#"<line x1="0.00" y1="0.00" x2="10.00" y2="5.00" stroke="black" stroke-width="2" />"#
        );
    }

    #[test]
    fn polygon_svg_carries_fill_and_stroke() {
        let svg = Primitive::Polygon {
            points: vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)],
            style: POLYGON_STYLE,
        }
        .to_svg();
        assert!(svg.starts_with(r#"<polygon points="0.00,0.00 1.00,0.00 0.00,1.00""#));
        assert!(svg.contains(r#"fill="rgba(59,130,246,0.10)""#));
        assert!(svg.contains(r#"stroke-width="2.2""#));
    }
}
