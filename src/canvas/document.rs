use crate::shape::Drawing;
use crate::svg::escape_xml;
use crate::transform::{Transform, Viewport};

use super::overlay::{ARROW_MARKER_ID, render_dimensions};
use super::primitive::render_primitives;

pub const PLACEHOLDER_TEXT: &str = "No drawing yet. Enter commands above.";
pub const PROGRESS_TEXT: &str = "Generating...";

const PLACEHOLDER_COLOR: &str = "#9ca3af";
const PROGRESS_COLOR: &str = "#3b82f6";

/// What the surface should show right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasView<'a> {
    Empty,
    Loading,
    Drawing(&'a Drawing),
}

/// Build a complete SVG document for `view`.
///
/// Every call starts from an empty buffer; nothing from a previous drawing
/// can leak into the output.
pub fn render_document(view: CanvasView<'_>, viewport: Viewport, background: &str) -> String {
    let (w, h) = (viewport.width(), viewport.height());
    let mut body = String::new();

    match view {
        CanvasView::Loading => {
            body.push_str(&centered_text(viewport, PROGRESS_TEXT, PROGRESS_COLOR));
        }
        CanvasView::Empty => {
            body.push_str(&centered_text(viewport, PLACEHOLDER_TEXT, PLACEHOLDER_COLOR));
        }
        CanvasView::Drawing(drawing) => match Transform::fit(drawing, viewport) {
            Some(transform) => {
                body.push_str(r#"<g class="shapes">"#);
                for primitive in render_primitives(drawing, &transform) {
                    body.push_str(&primitive.to_svg());
                }
                body.push_str("</g>");

                body.push_str(r#"<g class="dimensions">"#);
                for line in render_dimensions(drawing, &transform) {
                    body.push_str(&line.to_svg());
                }
                body.push_str("</g>");
            }
            // Zero shapes, or an extent too large to fit.
            None => {
                body.push_str(&centered_text(viewport, PLACEHOLDER_TEXT, PLACEHOLDER_COLOR));
            }
        },
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs>{defs}</defs><rect width="100%" height="100%" fill="{bg}" />{body}</svg>"#,
        w = w,
        h = h,
        defs = arrow_marker(),
        bg = escape_xml(background),
        body = body,
    )
}

fn arrow_marker() -> String {
    format!(
        r#"<marker id="{}" markerWidth="10" markerHeight="10" refX="4" refY="3" orient="auto-start-reverse"><path d="M0,0 L0,6 L6,3 z" fill="black" /></marker>"#,
        ARROW_MARKER_ID
    )
}

fn centered_text(viewport: Viewport, text: &str, color: &str) -> String {
    format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="16" fill="{}" text-anchor="middle">{}</text>"#,
        viewport.width() / 2.0,
        viewport.height() / 2.0,
        color,
        escape_xml(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Dimension, Geometry, Measure, Point, Shape};
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn viewport() -> Viewport {
        Viewport::new(720.0, 480.0).unwrap()
    }

    /// Names of every element in document order.
    fn element_names(svg: &str) -> Vec<String> {
        let mut reader = Reader::from_str(svg);
        let mut names = Vec::new();
        loop {
            match reader.read_event().expect("well-formed svg") {
                Event::Start(e) | Event::Empty(e) => {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).into_owned())
                }
                Event::Eof => break,
                _ => {}
            }
        }
        names
    }

    fn count(names: &[String], name: &str) -> usize {
        names.iter().filter(|n| *n == name).count()
    }

    fn house() -> Drawing {
        Drawing::new(vec![
            Shape::new(Geometry::Rectangle {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 60.0,
            })
            .with_dimension(Dimension {
                width: Some(Measure::Number(100.0)),
                height: Some(Measure::Number(60.0)),
                ..Default::default()
            }),
            Shape::new(Geometry::Triangle {
                points: vec![Point(0.0, 60.0), Point(100.0, 60.0), Point(50.0, 100.0)],
            }),
            Shape::new(Geometry::Circle {
                center: Point(50.0, 30.0),
                radius: 10.0,
            }),
        ])
    }

    #[test]
    fn empty_view_shows_placeholder() {
        let svg = render_document(CanvasView::Empty, viewport(), "#ffffff");
        assert!(svg.contains(PLACEHOLDER_TEXT));
        assert!(svg.contains(r#"viewBox="0 0 720 480""#));
        let names = element_names(&svg);
        assert_eq!(count(&names, "polygon"), 0);
    }

    #[test]
    fn zero_shape_drawing_degrades_to_placeholder() {
        let drawing = Drawing::default();
        let svg = render_document(CanvasView::Drawing(&drawing), viewport(), "#ffffff");
        assert!(svg.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn loading_view_shows_progress() {
        let svg = render_document(CanvasView::Loading, viewport(), "#ffffff");
        assert!(svg.contains(PROGRESS_TEXT));
        assert!(!svg.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn drawing_emits_one_element_per_shape_then_overlay() {
        let drawing = house();
        let svg = render_document(CanvasView::Drawing(&drawing), viewport(), "#fafafa");
        let names = element_names(&svg);

        // Background rect plus the house body.
        assert_eq!(count(&names, "rect"), 2);
        assert_eq!(count(&names, "polygon"), 1);
        assert_eq!(count(&names, "circle"), 1);
        // Two dimension lines, each a line + label.
        assert_eq!(count(&names, "line"), 2);
        assert_eq!(count(&names, "text"), 2);
        assert_eq!(count(&names, "marker"), 1);

        let shapes_at = svg.find(r#"class="shapes""#).unwrap();
        let dims_at = svg.find(r#"class="dimensions""#).unwrap();
        assert!(shapes_at < dims_at);
        assert!(svg.contains(r##"fill="#fafafa""##));
    }

    #[test]
    fn identical_input_gives_identical_document() {
        let drawing = house();
        let a = render_document(CanvasView::Drawing(&drawing), viewport(), "#ffffff");
        let b = render_document(CanvasView::Drawing(&drawing), viewport(), "#ffffff");
        assert_eq!(a, b);
    }
}
