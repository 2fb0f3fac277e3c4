//! Curve sampling for continuous controller automation.

use alloc::vec::Vec;

/// A point on a sampled curve: `x` is time, `y` is value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Sample the quadratic Bézier curve through control points `p0`, `p1`,
/// `p2` at `point_count` equal parameter steps.
///
/// Both endpoints are included, so the result holds `point_count + 1`
/// points. A `point_count` of zero is treated as one.
pub fn quadratic_bezier_curve(p0: Point, p1: Point, p2: Point, point_count: usize) -> Vec<Point> {
    let steps = point_count.max(1);
    let mut points = Vec::with_capacity(steps + 1);

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let a = (1.0 - t) * (1.0 - t);
        let b = 2.0 * (1.0 - t) * t;
        let c = t * t;
        points.push(Point::new(
            a * p0.x + b * p1.x + c * p2.x,
            a * p0.y + b * p1.y + c * p2.y,
        ));
    }

    points
}
