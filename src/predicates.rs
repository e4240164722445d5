//! Geometric predicates and small constructions.
//!
//! Orientation and in-circle tests are delegated to the adaptive-precision
//! predicates in the `robust` crate; everything downstream of a sign
//! decision goes through this module so the kernel never branches on a
//! naively-rounded determinant. The constructions (circumcircles, areas)
//! are plain floating point — their results feed sizes and positions, not
//! topology.

use nalgebra::{Point2, Point3};
use robust::Coord;

#[inline]
fn coord(p: &Point2<f64>) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Robust orientation test.
///
/// Positive if `a`, `b`, `c` wind counter-clockwise, negative if
/// clockwise, zero if exactly collinear.
#[inline]
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    robust::orient2d(coord(a), coord(b), coord(c))
}

/// Robust in-circle test.
///
/// Positive if `d` lies strictly inside the circle through `a`, `b`, `c`,
/// assuming `a`, `b`, `c` wind counter-clockwise. Zero for exactly
/// cocircular configurations; callers apply their own tie-break.
#[inline]
pub fn in_circle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    robust::incircle(coord(a), coord(b), coord(c), coord(d))
}

/// Signed area of the parameter-space triangle `(a, b, c)`.
#[inline]
pub fn signed_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * orient2d(a, b, c)
}

/// Circumcircle of a parameter-space triangle.
///
/// Returns `(center, radius)`, or `None` when the points are (near)
/// collinear and the circumcenter is unusable.
pub fn circumcircle(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> Option<(Point2<f64>, f64)> {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;

    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < f64::EPSILON * (bx * bx + by * by + cx * cx + cy * cy) {
        return None;
    }

    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;

    let center = Point2::new(a.x + ux, a.y + uy);
    let radius = (ux * ux + uy * uy).sqrt();
    Some((center, radius))
}

/// Circumradius of the 3D triangle `(a, b, c)`.
///
/// `R = |ab| |bc| |ca| / (4 A)`. Degenerate triangles (zero area in 3D)
/// report an effectively infinite radius so size-driven quality metrics
/// treat them as maximally bad.
pub fn circumradius3(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let bc = c - b;
    let ca = a - c;

    let area2 = ab.cross(&(-ca)).norm();
    if area2 < f64::MIN_POSITIVE.sqrt() {
        return f64::MAX;
    }
    ab.norm() * bc.norm() * ca.norm() / (2.0 * area2)
}

/// Test whether segments `(p0, p1)` and `(q0, q1)` cross in their
/// interiors.
///
/// Shared endpoints and mere touching do not count as a crossing.
pub fn segments_cross(
    p0: &Point2<f64>,
    p1: &Point2<f64>,
    q0: &Point2<f64>,
    q1: &Point2<f64>,
) -> bool {
    let d1 = orient2d(q0, q1, p0);
    let d2 = orient2d(q0, q1, p1);
    let d3 = orient2d(p0, p1, q0);
    let d4 = orient2d(p0, p1, q1);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Point-in-triangle test with a tolerance scaled by the triangle's area.
///
/// Accepts points on (or within tolerance of) an edge, so walks that end
/// on a shared edge resolve to one of the incident triangles rather than
/// neither.
pub fn enclosed(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    let area = orient2d(a, b, c);
    let tol = -f64::EPSILON.sqrt() * area.abs();

    orient2d(a, b, p) >= tol && orient2d(b, c, p) >= tol && orient2d(c, a, p) >= tol
}

/// Test whether `q` lies strictly between `p0` and `p1` along their
/// common line. Callers have already established collinearity.
pub fn strictly_between(p0: &Point2<f64>, p1: &Point2<f64>, q: &Point2<f64>) -> bool {
    let d = p1 - p0;
    let t = (q - p0).dot(&d);
    t > 0.0 && t < d.norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orient2d_signs() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);

        assert!(orient2d(&a, &b, &c) > 0.0);
        assert!(orient2d(&a, &c, &b) < 0.0);
        assert_eq!(orient2d(&a, &b, &Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_in_circle() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);

        assert!(in_circle(&a, &b, &c, &Point2::new(0.4, 0.4)) > 0.0);
        assert!(in_circle(&a, &b, &c, &Point2::new(2.0, 2.0)) < 0.0);
        // The fourth corner of the unit square is exactly cocircular.
        assert_eq!(in_circle(&a, &b, &c, &Point2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_circumcircle() {
        let (center, radius) = circumcircle(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(1.0, 1.0),
        )
        .unwrap();
        assert!((center.x - 1.0).abs() < 1e-12);
        assert!((center.y - 0.0).abs() < 1e-12);
        assert!((radius - 1.0).abs() < 1e-12);

        assert!(circumcircle(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn test_circumradius3() {
        // Equilateral triangle with side 1 has R = 1/sqrt(3).
        let r = circumradius3(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.5, 3f64.sqrt() / 2.0, 0.0),
        );
        assert!((r - 1.0 / 3f64.sqrt()).abs() < 1e-12);

        let degenerate = circumradius3(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(degenerate, f64::MAX);
    }

    #[test]
    fn test_segments_cross() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 1.0);
        let c = Point2::new(0.0, 1.0);
        let d = Point2::new(1.0, 0.0);

        assert!(segments_cross(&a, &b, &c, &d));
        // Shared endpoint is not a crossing.
        assert!(!segments_cross(&a, &b, &b, &c));
        // Disjoint.
        assert!(!segments_cross(&a, &d, &c, &b));
    }

    #[test]
    fn test_enclosed() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);

        assert!(enclosed(&Point2::new(0.2, 0.2), &a, &b, &c));
        assert!(enclosed(&Point2::new(0.5, 0.0), &a, &b, &c));
        assert!(!enclosed(&Point2::new(1.0, 1.0), &a, &b, &c));
    }
}
