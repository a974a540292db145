// SVG document assembly for a rendered graph
use crate::domain::graph_style::GraphStyle;
use crate::domain::telemetry::GraphPaths;

/// Standalone SVG with a gradient fill under the curve. The stroke element is
/// left out entirely when the line width is zero.
pub fn svg_document(card_id: &str, paths: &GraphPaths, style: &GraphStyle) -> String {
    let gradient_id = format!("fill-{}", slug(card_id));
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\">",
        w = style.width,
        h = style.height
    );

    if !paths.fill.is_empty() {
        let color = escape(&style.fill_color);
        svg.push_str(&format!(
            "<defs><linearGradient id=\"{id}\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">\
             <stop offset=\"0%\" stop-color=\"{color}\" stop-opacity=\"0.4\"/>\
             <stop offset=\"100%\" stop-color=\"{color}\" stop-opacity=\"0\"/>\
             </linearGradient></defs>",
            id = gradient_id,
        ));
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"url(#{})\" stroke=\"none\"/>",
            paths.fill, gradient_id
        ));
    }

    if style.draws_stroke() && !paths.stroke.is_empty() {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
            paths.stroke,
            escape(&style.line_color),
            style.line_width
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn slug(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> GraphPaths {
        GraphPaths {
            stroke: "M 0.00 40.00 C 1.00 2.00, 3.00 4.00, 300.00 20.00".to_string(),
            fill: "M 0.00 40.00 C 1.00 2.00, 3.00 4.00, 300.00 20.00 L 300.00 80.00 L 0.00 80.00 Z"
                .to_string(),
        }
    }

    #[test]
    fn test_document_contains_both_paths() {
        let svg = svg_document("living room", &paths(), &GraphStyle::default());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 300 80\""));
        assert!(svg.contains("fill=\"url(#fill-living-room)\""));
        assert!(svg.contains("stroke=\"#ff9800\" stroke-width=\"2\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_zero_line_width_suppresses_stroke() {
        let style = GraphStyle {
            line_width: 0.0,
            ..GraphStyle::default()
        };
        let svg = svg_document("living", &paths(), &style);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("stroke=\"none\""));
    }

    #[test]
    fn test_colors_are_escaped() {
        let style = GraphStyle {
            line_color: "red\" onload=\"x".to_string(),
            ..GraphStyle::default()
        };
        let svg = svg_document("living", &paths(), &style);
        assert!(svg.contains("stroke=\"red&quot; onload=&quot;x\""));
    }
}
