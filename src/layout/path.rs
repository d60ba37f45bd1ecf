use std::f32::consts::TAU;

/// Point on a circle for an angle measured clockwise from 12 o'clock.
pub fn polar(center: (f32, f32), radius: f32, angle: f32) -> (f32, f32) {
    (
        center.0 + radius * angle.sin(),
        center.1 - radius * angle.cos(),
    )
}

/// Straight segments through `points`.
pub fn polyline_path(points: &[(f32, f32)]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    for point in rest {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

/// Cardinal spline through `points` as cubic Bézier segments.
///
/// `tension` 0 gives the Catmull-Rom curve, 1 collapses every control point
/// onto its vertex so the result matches [`polyline_path`]. End segments reuse
/// the end point as the missing neighbour, so the curve always passes through
/// every vertex and never overshoots the first or last one.
pub fn cardinal_path(points: &[(f32, f32)], tension: f32) -> String {
    if points.len() < 3 {
        return polyline_path(points);
    }
    let k = (1.0 - tension.clamp(0.0, 1.0)) / 6.0;
    let mut d = format!("M {:.2} {:.2}", points[0].0, points[0].1);
    for i in 0..points.len() - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];
        let c1 = (p1.0 + k * (p2.0 - p0.0), p1.1 + k * (p2.1 - p0.1));
        let c2 = (p2.0 - k * (p3.0 - p1.0), p2.1 - k * (p3.1 - p1.1));
        d.push_str(&format!(
            " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            c1.0, c1.1, c2.0, c2.1, p2.0, p2.1
        ));
    }
    d
}

/// Close a line path down to `baseline` to form a fillable area.
pub fn area_path(line_path: &str, points: &[(f32, f32)], baseline: f32) -> Option<String> {
    let first = points.first()?;
    let last = points.last()?;
    Some(format!(
        "{line_path} L {:.2} {baseline:.2} L {:.2} {baseline:.2} Z",
        last.0, first.0
    ))
}

/// Annular sector between `start` and `end` (radians, clockwise from
/// 12 o'clock). `inner == 0` draws a pie wedge. A span of a full turn is drawn
/// as two half arcs since a single SVG arc cannot close on itself.
pub fn arc_path(center: (f32, f32), inner: f32, outer: f32, start: f32, end: f32) -> String {
    let span = end - start;
    if span <= 1e-6 || outer <= 0.0 {
        return String::new();
    }
    if span >= TAU - 1e-4 {
        return ring_path(center, inner, outer);
    }
    let large = if span > std::f32::consts::PI { 1 } else { 0 };
    let (osx, osy) = polar(center, outer, start);
    let (oex, oey) = polar(center, outer, end);
    if inner <= 0.0 {
        return format!(
            "M {:.2} {:.2} L {osx:.2} {osy:.2} A {outer:.2} {outer:.2} 0 {large} 1 {oex:.2} {oey:.2} Z",
            center.0, center.1
        );
    }
    let (isx, isy) = polar(center, inner, start);
    let (iex, iey) = polar(center, inner, end);
    format!(
        "M {osx:.2} {osy:.2} A {outer:.2} {outer:.2} 0 {large} 1 {oex:.2} {oey:.2} L {iex:.2} {iey:.2} A {inner:.2} {inner:.2} 0 {large} 0 {isx:.2} {isy:.2} Z"
    )
}

/// Annular sector with a fixed command list whatever the span: each edge is
/// split into two arcs of at most half a turn, so the large-arc flag is always
/// 0. Interpolating two of these paths point by point gives a valid sector,
/// which SMIL needs to tween `d`. A zero span collapses onto one edge and a
/// pie wedge collapses its inner edge onto the centre.
pub fn sweep_path(center: (f32, f32), inner: f32, outer: f32, start: f32, end: f32) -> String {
    let end = end.max(start);
    let mid = (start + end) / 2.0;
    let inner = inner.max(0.0);
    let outer = outer.max(0.0);
    let (osx, osy) = polar(center, outer, start);
    let (omx, omy) = polar(center, outer, mid);
    let (oex, oey) = polar(center, outer, end);
    let (isx, isy) = polar(center, inner, start);
    let (imx, imy) = polar(center, inner, mid);
    let (iex, iey) = polar(center, inner, end);
    format!(
        "M {osx:.2} {osy:.2} A {outer:.2} {outer:.2} 0 0 1 {omx:.2} {omy:.2} A {outer:.2} {outer:.2} 0 0 1 {oex:.2} {oey:.2} L {iex:.2} {iey:.2} A {inner:.2} {inner:.2} 0 0 0 {imx:.2} {imy:.2} A {inner:.2} {inner:.2} 0 0 0 {isx:.2} {isy:.2} Z"
    )
}

fn ring_path(center: (f32, f32), inner: f32, outer: f32) -> String {
    let (cx, cy) = center;
    let mut d = format!(
        "M {cx:.2} {:.2} A {outer:.2} {outer:.2} 0 1 1 {cx:.2} {:.2} A {outer:.2} {outer:.2} 0 1 1 {cx:.2} {:.2} Z",
        cy - outer,
        cy + outer,
        cy - outer
    );
    if inner > 0.0 {
        d.push_str(&format!(
            " M {cx:.2} {:.2} A {inner:.2} {inner:.2} 0 1 0 {cx:.2} {:.2} A {inner:.2} {inner:.2} 0 1 0 {cx:.2} {:.2} Z",
            cy - inner,
            cy + inner,
            cy - inner
        ));
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_starts_at_twelve_and_runs_clockwise() {
        let (x, y) = polar((100.0, 100.0), 50.0, 0.0);
        assert!((x - 100.0).abs() < 1e-4 && (y - 50.0).abs() < 1e-4);
        let (x, y) = polar((100.0, 100.0), 50.0, std::f32::consts::FRAC_PI_2);
        assert!((x - 150.0).abs() < 1e-3 && (y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn full_tension_matches_polyline_vertices() {
        let points = [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)];
        let d = cardinal_path(&points, 1.0);
        assert!(d.starts_with("M 0.00 0.00"));
        assert!(d.contains("C 0.00 0.00 10.00 10.00 10.00 10.00"));
    }

    #[test]
    fn cardinal_passes_through_every_point() {
        let points = [(0.0, 5.0), (10.0, 1.0), (20.0, 8.0), (30.0, 3.0)];
        let d = cardinal_path(&points, 0.0);
        for (x, y) in points.iter().skip(1) {
            assert!(d.contains(&format!("{x:.2} {y:.2}")), "{d}");
        }
        assert_eq!(d.matches(" C ").count(), 3);
    }

    #[test]
    fn short_lines_fall_back_to_segments() {
        assert_eq!(cardinal_path(&[], 0.0), "");
        assert_eq!(
            cardinal_path(&[(0.0, 0.0), (5.0, 5.0)], 0.0),
            "M 0.00 0.00 L 5.00 5.00"
        );
    }

    #[test]
    fn arc_paths_cover_wedge_donut_and_ring() {
        let wedge = arc_path((50.0, 50.0), 0.0, 40.0, 0.0, 1.0);
        assert!(wedge.starts_with("M 50.00 50.00"));
        let donut = arc_path((50.0, 50.0), 24.0, 40.0, 0.0, 4.0);
        assert!(donut.contains(" 0 1 1 ") && donut.contains(" 0 1 0 "));
        let ring = arc_path((50.0, 50.0), 24.0, 40.0, 0.0, TAU);
        assert_eq!(ring.matches('Z').count(), 2);
        assert_eq!(arc_path((50.0, 50.0), 0.0, 40.0, 1.0, 1.0), "");
    }

    fn commands(d: &str) -> Vec<&str> {
        d.split_whitespace()
            .filter(|token| token.chars().all(|c| c.is_ascii_alphabetic()))
            .collect()
    }

    #[test]
    fn sweep_path_keeps_one_shape_across_the_sweep() {
        let center = (100.0, 100.0);
        let empty = sweep_path(center, 30.0, 60.0, 0.0, 0.0);
        let wide = sweep_path(center, 30.0, 60.0, 0.0, 5.0);
        let full = sweep_path(center, 0.0, 60.0, 0.0, TAU);
        assert_eq!(commands(&empty), commands(&wide));
        assert_eq!(commands(&wide), commands(&full));
        assert_eq!(commands(&full), vec!["M", "A", "A", "L", "A", "A", "Z"]);
        for d in [&empty, &wide, &full] {
            assert!(!d.contains(" 0 1 1 ") && !d.contains(" 0 1 0 "), "{d}");
        }
        // The full turn passes the bottom of the circle halfway round.
        assert!(full.contains("100.00 160.00"));
    }
}
