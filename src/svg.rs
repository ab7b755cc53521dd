//! Small helpers shared by everything that writes SVG markup.

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escape text for element content and attribute values, dropping chars
/// XML cannot carry at all. Labels come from an external producer, so
/// anything can show up here.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `points` attribute value for `<polygon>`.
pub fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill attribute value, `none` when the primitive is stroke-only.
pub fn fill_attr(fill: Option<&str>) -> &str {
    fill.unwrap_or("none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_label_text() {
        let cases = [
            ("12 cm", "12 cm"),
            ("3 m&sup2;", "3 m&amp;sup2;"),
            ("<b>5</b> in", "&lt;b&gt;5&lt;/b&gt; in"),
            (r#"4 "ft""#, "4 &quot;ft&quot;"),
            ("radius 'r'", "radius &apos;r&apos;"),
            ("a\tb\nc", "a\tb\nc"),
            ("7\u{0007} cm\u{000C}", "7 cm"),
        ];
        for (input, expected) in cases {
            assert_eq!(escape_xml(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn fill_falls_back_to_none() {
        assert_eq!(fill_attr(None), "none");
        assert_eq!(fill_attr(Some("black")), "black");
    }

    #[test]
    fn formats_polygon_points() {
        assert_eq!(
            points_attr(&[(1.0, 2.0), (3.456, 4.0)]),
            "1.00,2.00 3.46,4.00"
        );
        assert_eq!(points_attr(&[]), "");
    }
}
