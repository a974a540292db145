// Curve generator - Turns a processed series into vector path strings
use super::graph_style::{CurveMode, GraphStyle};
use super::telemetry::{CurvePoint, GraphPaths, ProcessedSeries};

/// Fraction of the height kept free above and below the data.
const MARGIN: f64 = 0.1;
const NEAR_WEIGHT: f64 = 0.7;
const FAR_WEIGHT: f64 = 0.3;

/// Render the stroke and fill paths for a series. Pure: identical inputs
/// always produce byte-identical strings.
pub fn render(series: &ProcessedSeries, style: &GraphStyle) -> GraphPaths {
    let points = curve_points(series, style.width, style.height);
    let stroke = match style.curve {
        CurveMode::Smooth => smooth_path(&points, style.tension, style.height),
        CurveMode::Simple => simple_path(&points),
    };
    let fill = fill_path(&stroke, points.len(), style.width, style.height);
    GraphPaths { stroke, fill }
}

/// Index-linear x, inverted and inset y.
pub fn curve_points(series: &ProcessedSeries, width: f64, height: f64) -> Vec<CurvePoint> {
    let n = series.values.len();
    let step = if n > 1 { width / (n - 1) as f64 } else { 0.0 };
    let span = series.span();

    series
        .values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let norm = if span > 0.0 {
                ((value - series.range_min) / span).clamp(0.0, 1.0)
            } else {
                0.5
            };
            let y = height - (MARGIN * height + norm * height * (1.0 - 2.0 * MARGIN));
            CurvePoint::new(i as f64 * step, y)
        })
        .collect()
}

fn smooth_path(points: &[CurvePoint], tension: f64, height: f64) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };

    let tangents: Vec<CurvePoint> = (0..points.len())
        .map(|i| tangent(points, i as isize, tension))
        .collect();

    let mut path = format!("M {} {}", coord(first.x), coord(first.y));
    for (i, pair) in points.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let (t_from, t_to) = (tangents[i], tangents[i + 1]);
        let c1 = CurvePoint::new(
            from.x + t_from.x / 3.0,
            (from.y + t_from.y / 3.0).clamp(0.0, height),
        );
        let c2 = CurvePoint::new(to.x - t_to.x / 3.0, (to.y - t_to.y / 3.0).clamp(0.0, height));
        push_cubic(&mut path, c1, c2, to);
    }
    path
}

fn simple_path(points: &[CurvePoint]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };

    let mut path = format!("M {} {}", coord(first.x), coord(first.y));
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let mid_x = (from.x + to.x) / 2.0;
        push_cubic(
            &mut path,
            CurvePoint::new(mid_x, from.y),
            CurvePoint::new(mid_x, to.y),
            to,
        );
    }
    path
}

fn fill_path(stroke: &str, point_count: usize, width: f64, height: f64) -> String {
    if point_count < 2 {
        return String::new();
    }
    format!(
        "{} L {} {} L {} {} Z",
        stroke,
        coord(width),
        coord(height),
        coord(0.0),
        coord(height)
    )
}

/// Tangent blended from the one-step and two-step neighbours.
fn tangent(points: &[CurvePoint], i: isize, tension: f64) -> CurvePoint {
    let near_prev = neighbour(points, i - 1);
    let near_next = neighbour(points, i + 1);
    let far_prev = neighbour(points, i - 2);
    let far_next = neighbour(points, i + 2);

    let blend = |near_a: f64, near_b: f64, far_a: f64, far_b: f64| {
        tension * (NEAR_WEIGHT * (near_b - near_a) / 2.0 + FAR_WEIGHT * (far_b - far_a) / 4.0)
    };

    CurvePoint::new(
        blend(near_prev.x, near_next.x, far_prev.x, far_next.x),
        blend(near_prev.y, near_next.y, far_prev.y, far_next.y),
    )
}

/// Point at `index`, extending the nearest end segment linearly when the
/// index falls outside the sequence.
fn neighbour(points: &[CurvePoint], index: isize) -> CurvePoint {
    let n = points.len() as isize;
    if (0..n).contains(&index) {
        return points[index as usize];
    }
    if n < 2 {
        return points[0];
    }

    let (edge, inner, steps) = if index < 0 {
        (points[0], points[1], -index)
    } else {
        (points[(n - 1) as usize], points[(n - 2) as usize], index - (n - 1))
    };
    let steps = steps as f64;
    CurvePoint::new(
        edge.x + (edge.x - inner.x) * steps,
        edge.y + (edge.y - inner.y) * steps,
    )
}

fn push_cubic(path: &mut String, c1: CurvePoint, c2: CurvePoint, to: CurvePoint) {
    path.push_str(&format!(
        " C {} {}, {} {}, {} {}",
        coord(c1.x),
        coord(c1.y),
        coord(c2.x),
        coord(c2.y),
        coord(to.x),
        coord(to.y)
    ));
}

fn coord(value: f64) -> String {
    // `+ 0.0` turns a rounded -0.0 into 0.0
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64], range_min: f64, range_max: f64) -> ProcessedSeries {
        ProcessedSeries::new(values.to_vec(), range_min, range_max)
    }

    fn coords(path: &str) -> Vec<(f64, f64)> {
        let numbers: Vec<f64> = path
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter_map(|t| t.parse().ok())
            .collect();
        numbers.chunks(2).map(|c| (c[0], c[1])).collect()
    }

    #[test]
    fn test_empty_series_renders_nothing() {
        let paths = render(&series(&[], 0.0, 1.0), &GraphStyle::default());
        assert_eq!(paths, GraphPaths::default());
    }

    #[test]
    fn test_single_point_is_move_only() {
        let paths = render(&series(&[18.0], 17.0, 19.0), &GraphStyle::default());
        assert_eq!(paths.stroke, "M 0.00 40.00");
        assert!(!paths.stroke.contains('C'));
        assert!(paths.fill.is_empty());
    }

    #[test]
    fn test_linear_series_keeps_control_points_on_the_line() {
        let style = GraphStyle {
            tension: 1.0,
            ..GraphStyle::default()
        };
        let paths = render(&series(&[0.0, 1.0, 2.0, 3.0], -1.0, 4.0), &style);
        assert!(
            paths
                .stroke
                .starts_with("M 0.00 59.20 C 33.33 54.93, 66.67 50.67, 100.00 46.40"),
            "unexpected path {}",
            paths.stroke
        );
        assert_eq!(paths.stroke.matches(" C ").count(), 3);
    }

    #[test]
    fn test_simple_mode_uses_midpoint_controls() {
        let style = GraphStyle {
            curve: CurveMode::Simple,
            ..GraphStyle::default()
        };
        let paths = render(&series(&[0.0, 3.0], -1.0, 4.0), &style);
        assert_eq!(
            paths.stroke,
            "M 0.00 59.20 C 150.00 59.20, 150.00 20.80, 300.00 20.80"
        );
    }

    #[test]
    fn test_fill_closes_down_to_baseline() {
        let style = GraphStyle::default();
        let paths = render(&series(&[20.0, 21.0, 20.5], 19.0, 22.0), &style);
        assert!(paths.fill.starts_with(&paths.stroke));
        assert!(paths.fill.ends_with(" L 300.00 80.00 L 0.00 80.00 Z"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let s = series(&[20.1, 22.4, 19.8, 21.7, 23.0, 20.2], 18.0, 25.0);
        let style = GraphStyle::default();
        assert_eq!(render(&s, &style), render(&s, &style));
    }

    #[test]
    fn test_spiky_series_stays_inside_viewport() {
        let style = GraphStyle {
            tension: 1.0,
            ..GraphStyle::default()
        };
        let s = series(&[10.0, 30.0, 10.0, 30.0, 10.0, 30.0], 6.0, 34.0);
        let paths = render(&s, &style);
        for (x, y) in coords(&paths.stroke) {
            assert!((0.0..=style.width).contains(&x), "x {x} outside viewport");
            assert!((0.0..=style.height).contains(&y), "y {y} outside viewport");
        }
    }

    #[test]
    fn test_points_are_inset_from_edges() {
        let points = curve_points(&series(&[17.0, 19.0], 17.0, 19.0), 300.0, 80.0);
        assert_eq!(points[0], CurvePoint::new(0.0, 72.0));
        assert_eq!(points[1].x, 300.0);
        assert!((points[1].y - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_coord_normalizes_negative_zero() {
        assert_eq!(coord(-0.001), "0.00");
        assert_eq!(coord(12.345_6), "12.35");
    }
}
