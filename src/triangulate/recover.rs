//! Segment recovery: forcing constrained edges into the triangulation.
//!
//! A constrained edge the Delaunay pass did not produce is recovered by
//! walking the corridor of triangles its straight line crosses, deleting
//! them, and re-triangulating the two resulting pseudo-polygons by gift
//! wrapping. A mesh vertex sitting exactly on the segment splits the
//! constraint in two, and both halves are recovered instead.

use smallvec::SmallVec;

use crate::error::Result;
use crate::mesh::{Triangle, TriangleId};
use crate::predicates;
use crate::surface::Surface;

use super::Triangulator;

enum CorridorStart {
    /// First crossed triangle with the (right, left) vertices of its
    /// exit edge, as seen along the segment.
    Cross(TriangleId, u32, u32),
    /// A vertex lies exactly on the segment interior.
    SplitAt(u32),
}

impl<S: Surface + ?Sized> Triangulator<'_, S> {
    /// Force edge `(u, v)` into the mesh.
    ///
    /// No-op when the edge already exists.
    pub(crate) fn insert_segment(&mut self, u: u32, v: u32) -> Result<()> {
        if self.edges.complete(u, v).is_some() || self.edges.complete(v, u).is_some() {
            return Ok(());
        }
        match self.corridor_start(u, v) {
            CorridorStart::SplitAt(c) => {
                self.split_pslg_edge(u, v, c);
                self.insert_segment(u, c)?;
                self.insert_segment(c, v)
            }
            CorridorStart::Cross(t0, right, left) => self.carve_corridor(u, v, t0, right, left),
        }
    }

    /// All live triangles incident to `p`, by fan rotation where
    /// possible.
    fn fan_around(&self, p: u32) -> SmallVec<[TriangleId; 16]> {
        let mut fan: SmallVec<[TriangleId; 16]> = SmallVec::new();
        if let Some(t0) = self.triangle_at(p) {
            let mut cur = t0;
            for _ in 0..self.points.len() {
                fan.push(cur);
                let [_, _, b] = self
                    .tris
                    .get(cur)
                    .expect("fan triangle died mid-walk")
                    .rotated_to(p);
                match self.edges.complete(p, b) {
                    Some(next) if next == t0 => return fan,
                    Some(next) => cur = next,
                    None => break,
                }
            }
        }
        // Open fan (walk hit a boundary): fall back to a scan.
        fan.clear();
        fan.extend(
            self.tris
                .iter()
                .filter(|(_, t)| t.contains(p))
                .map(|(id, _)| id),
        );
        fan
    }

    /// Find the triangle in `u`'s fan that the segment `u → v` exits.
    fn corridor_start(&self, u: u32, v: u32) -> CorridorStart {
        let pu = self.points.param(u);
        let pv = self.points.param(v);

        for id in self.fan_around(u) {
            let [_, a, b] = self
                .tris
                .get(id)
                .expect("fan returned a dead triangle")
                .rotated_to(u);
            let pa = self.points.param(a);
            let pb = self.points.param(b);
            let oa = predicates::orient2d(&pu, &pv, &pa);
            let ob = predicates::orient2d(&pu, &pv, &pb);

            if oa == 0.0 && predicates::strictly_between(&pu, &pv, &pa) {
                return CorridorStart::SplitAt(a);
            }
            if ob == 0.0 && predicates::strictly_between(&pu, &pv, &pb) {
                return CorridorStart::SplitAt(b);
            }
            // For a counter-clockwise fan triangle (u, a, b) the segment
            // leaves through (a, b) when a is right of u→v and b left.
            if oa < 0.0 && ob > 0.0 {
                return CorridorStart::Cross(id, a, b);
            }
        }
        panic!("no corridor found for constrained edge ({u}, {v})");
    }

    /// Walk the corridor of triangles crossed by `u → v`, delete them,
    /// and gift-wrap the two sides.
    fn carve_corridor(
        &mut self,
        u: u32,
        v: u32,
        t0: TriangleId,
        right0: u32,
        left0: u32,
    ) -> Result<()> {
        let pu = self.points.param(u);
        let pv = self.points.param(v);

        let mut to_delete: SmallVec<[TriangleId; 16]> = SmallVec::new();
        to_delete.push(t0);
        let mut left: SmallVec<[u32; 16]> = SmallVec::new();
        let mut right: SmallVec<[u32; 16]> = SmallVec::new();
        left.push(left0);
        right.push(right0);
        let (mut l, mut r) = (left0, right0);

        loop {
            let next = self
                .edges
                .complete(l, r)
                .expect("constrained segment walked off the mesh");
            let c = self
                .tris
                .get(next)
                .expect("edge map references a dead triangle")
                .opposite(l, r);
            if c == v {
                to_delete.push(next);
                break;
            }
            let oc = predicates::orient2d(&pu, &pv, &self.points.param(c));
            if oc == 0.0 {
                // A vertex sits exactly on the segment; nothing has been
                // deleted yet, so recover the halves instead.
                self.split_pslg_edge(u, v, c);
                self.insert_segment(u, c)?;
                return self.insert_segment(c, v);
            }
            to_delete.push(next);
            if oc > 0.0 {
                left.push(c);
                l = c;
            } else {
                right.push(c);
                r = c;
            }
        }

        for id in to_delete {
            self.delete_triangle(id);
        }
        self.gift_wrap(u, v, &left);
        let right_rev: SmallVec<[u32; 16]> = right.iter().rev().copied().collect();
        self.gift_wrap(v, u, &right_rev);
        Ok(())
    }

    /// Triangulate the pseudo-polygon to the left of `a → b`.
    ///
    /// Picks the chain vertex whose circumcircle with the base edge
    /// contains no other candidate, emits that triangle, and recurses on
    /// the two sub-chains. Recursion depth is bounded by the chain
    /// length.
    fn gift_wrap(&mut self, a: u32, b: u32, chain: &[u32]) {
        if chain.is_empty() {
            return;
        }
        let pa = self.points.param(a);
        let pb = self.points.param(b);

        let mut ci = 0;
        for i in 1..chain.len() {
            let best = self.points.param(chain[ci]);
            let cand = self.points.param(chain[i]);
            if predicates::in_circle(&pa, &pb, &best, &cand) > 0.0 {
                ci = i;
            }
        }

        let c = chain[ci];
        self.gift_wrap(a, c, &chain[..ci]);
        self.gift_wrap(c, b, &chain[ci + 1..]);
        self.add_triangle(Triangle::new(a, b, c));
    }

    /// Replace constrained edge `(u, v)` by `(u, c)` and `(c, v)` after a
    /// vertex `c` was found on its interior.
    fn split_pslg_edge(&mut self, u: u32, v: u32, c: u32) {
        let key = (u.min(v), u.max(v));
        if let Ok(pos) = self.pslg.binary_search(&key) {
            self.pslg.remove(pos);
        }
        self.pslg.push((u.min(c), u.max(c)));
        self.pslg.push((c.min(v), c.max(v)));
        self.pslg.sort_unstable();
        self.pslg.dedup();
    }
}
