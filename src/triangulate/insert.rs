//! Incremental Delaunay insertion: point location and cavity digging.

use nalgebra::Point2;
use smallvec::SmallVec;

use crate::error::{MeshError, Result};
use crate::mesh::{Triangle, TriangleId};
use crate::predicates;
use crate::surface::Surface;

use super::Triangulator;

impl<S: Surface + ?Sized> Triangulator<'_, S> {
    /// Append a point to the store and the quadtree.
    ///
    /// The surface is evaluated exactly once, here.
    pub(crate) fn add_point(&mut self, param: Point2<f64>) -> u32 {
        let coord = self.eval(&param);
        let id = self.points.add(param, coord);
        self.quadtree.insert(id, param.x, param.y);
        id
    }

    /// Locate the live triangle enclosing `p`.
    ///
    /// Seeds a walk from the hint triangle of the nearest indexed point,
    /// crossing at each step the edge whose outward half-plane contains
    /// `p`. The walk is bounded by `4 × point_count` steps; if it stalls
    /// or leaves the mesh it falls back to a linear scan with the
    /// area-tolerant enclosure test.
    pub(crate) fn find_enclosing(&self, p: &Point2<f64>) -> Option<TriangleId> {
        let seed = self
            .quadtree
            .find_closest(p.x, p.y)
            .map(|(q, _)| self.points.hint(q))
            .filter(|&h| self.tris.contains(h))
            .or_else(|| self.tris.iter().next().map(|(id, _)| id))?;

        let mut current = seed;
        for _ in 0..4 * self.points.len() {
            let tri = self.tris.get(current)?;

            // Cross the most violated edge; none violated means enclosed.
            let mut exit: Option<(f64, u32, u32)> = None;
            for (a, b) in tri.edges() {
                let o =
                    predicates::orient2d(&self.points.param(a), &self.points.param(b), p);
                if o < 0.0 && exit.map_or(true, |(worst, _, _)| o < worst) {
                    exit = Some((o, a, b));
                }
            }
            match exit {
                None => return Some(current),
                Some((_, a, b)) => match self.edges.complete(b, a) {
                    Some(next) => current = next,
                    None => break,
                },
            }
        }
        self.scan_enclosing(p)
    }

    fn scan_enclosing(&self, p: &Point2<f64>) -> Option<TriangleId> {
        for (id, tri) in self.tris.iter() {
            let [a, b, c] = tri.vertices();
            if predicates::enclosed(
                p,
                &self.points.param(a),
                &self.points.param(b),
                &self.points.param(c),
            ) {
                return Some(id);
            }
        }
        None
    }

    /// Insert a point into the mesh, restoring the Delaunay property.
    pub(crate) fn add_point_to_mesh(&mut self, p: Point2<f64>) -> Result<u32> {
        let t = self
            .find_enclosing(&p)
            .ok_or(MeshError::PointOutsideDomain { u: p.x, v: p.y })?;
        Ok(self.add_point_in_triangle(p, t))
    }

    /// Insert a point known to lie inside triangle `t`.
    pub(crate) fn add_point_in_triangle(&mut self, p: Point2<f64>, t: TriangleId) -> u32 {
        let x = self.add_point(p);
        let tri = self.delete_triangle(t);
        for (a, b) in tri.edges() {
            self.dig_cavity(a, b, x);
        }
        x
    }

    /// Dig the insertion cavity across edge `(a, b)`, seen from the new
    /// point `x` on its left.
    ///
    /// Constrained and boundary edges close the cavity immediately;
    /// otherwise the in-circle test against the far triangle decides
    /// whether the cavity expands through the edge. An exactly
    /// cocircular quadruple reads as "outside" (the tie-break perturbs
    /// the new point off the circle), so the cavity always terminates
    /// and reruns are deterministic.
    ///
    /// Runs on an explicit stack; cavity depth is unbounded on
    /// pathological inputs and must not consume call stack.
    pub(crate) fn dig_cavity(&mut self, a: u32, b: u32, x: u32) {
        let mut stack: SmallVec<[(u32, u32); 32]> = SmallVec::new();
        stack.push((a, b));

        while let Some((a, b)) = stack.pop() {
            if self.edge_in_pslg(a, b) {
                self.add_triangle(Triangle::new(a, b, x));
                continue;
            }
            let Some(far) = self.edges.complete(b, a) else {
                self.add_triangle(Triangle::new(a, b, x));
                continue;
            };
            let far_tri = *self
                .tris
                .get(far)
                .expect("edge map references a dead triangle");

            if self.in_circle_tri(&far_tri, x) > 0.0 {
                let c = far_tri.opposite(b, a);
                self.delete_triangle(far);
                stack.push((a, c));
                stack.push((c, b));
            } else {
                self.add_triangle(Triangle::new(a, b, x));
            }
        }
    }

    /// In-circle test of point `x` against a triangle's own
    /// counter-clockwise vertex order.
    pub(crate) fn in_circle_tri(&self, tri: &Triangle, x: u32) -> f64 {
        predicates::in_circle(
            &self.points.param(tri.u),
            &self.points.param(tri.v),
            &self.points.param(tri.w),
            &self.points.param(x),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{circle_pslg, square_pslg};
    use super::super::{Triangulator, FIXED_POINT_OFFSET};
    use crate::surface::PlaneSurface;
    use nalgebra::Point2;

    #[test]
    fn test_find_enclosing() {
        let (pts, segs) = square_pslg();
        let tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();

        let id = tri.find_enclosing(&Point2::new(0.9, 0.5)).unwrap();
        let t = tri.tris.get(id).unwrap();
        let [a, b, c] = t.vertices();
        assert!(crate::predicates::enclosed(
            &Point2::new(0.9, 0.5),
            &tri.points.param(a),
            &tri.points.param(b),
            &tri.points.param(c),
        ));

        // Far outside the domain nothing encloses.
        assert!(tri.find_enclosing(&Point2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_incremental_insertion_keeps_invariants() {
        let (pts, segs) = circle_pslg(12, 1.0);
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();

        let before = tri.num_triangles();
        tri.add_point_to_mesh(Point2::new(0.1, 0.2)).unwrap();
        // An interior insertion into a triangulation adds two triangles.
        assert_eq!(tri.num_triangles(), before + 2);
        assert!(tri.is_valid());
    }

    /// After initialization every unconstrained interior edge satisfies
    /// the Delaunay in-circle property.
    #[test]
    fn test_delaunay_property_after_init() {
        let (pts, segs) = circle_pslg(16, 1.0);
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();
        // A few interior points to give the check something to bite on.
        for p in [
            Point2::new(0.3, 0.1),
            Point2::new(-0.2, 0.4),
            Point2::new(0.0, -0.5),
            Point2::new(0.25, -0.25),
        ] {
            tri.add_point_to_mesh(p).unwrap();
        }
        assert!(tri.is_valid());

        for (_, t) in tri.tris.iter() {
            for (a, b) in t.edges() {
                if tri.edge_in_pslg(a, b) {
                    continue;
                }
                let Some(rev) = tri.edges.complete(b, a) else {
                    continue;
                };
                let rev_tri = tri.tris.get(rev).unwrap();
                let d = rev_tri.opposite(b, a);
                assert!(
                    tri.in_circle_tri(t, d) <= 0.0,
                    "edge ({a}, {b}) violates the Delaunay property"
                );
            }
        }
    }

    /// Four exactly cocircular points must triangulate without looping;
    /// either diagonal of the square is a valid answer.
    #[test]
    fn test_cocircular_square() {
        let (pts, segs) = square_pslg();
        let tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();

        assert_eq!(tri.num_triangles(), 2);
        assert!(tri.is_valid());

        // The two triangles share exactly one diagonal.
        let diag_02 = tri
            .edges
            .complete(FIXED_POINT_OFFSET, FIXED_POINT_OFFSET + 2)
            .is_some();
        let diag_13 = tri
            .edges
            .complete(FIXED_POINT_OFFSET + 1, FIXED_POINT_OFFSET + 3)
            .is_some();
        assert!(diag_02 || diag_13);
    }
}
