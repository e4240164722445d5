//! Frontal point insertion driven by circumradius/size heuristics.
//!
//! After constrained Delaunay initialization every triangle is scored by
//! `R / h̄` — circumradius measured in surface space over the feature
//! size at the surface-space centroid. Triangles at the front (adjacent
//! to an accepted triangle, a boundary edge or a constrained edge) whose
//! score exceeds the quality threshold are refined one at a time: a new
//! point is proposed off the front edge, snapped to an existing point if
//! one is close enough, and otherwise inserted by the Delaunay kernel.
//! The loop ends when nothing above the threshold remains on the front.
//!
//! Measuring `R` in surface space while proposing positions in parameter
//! space is what makes the front track the surface metric under
//! parametric distortion; both halves of that mix are load-bearing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::{Point2, Point3, Vector2};

use crate::error::{MeshError, Result};
use crate::mesh::{TriStatus, TriangleId};
use crate::predicates;
use crate::surface::{FeatureSize, Surface};

use super::{Triangulator, FIXED_POINT_OFFSET};

/// Options for frontal refinement.
#[derive(Debug, Clone)]
pub struct FrontalOptions {
    /// Quality threshold β: triangles with `R / h̄` at or below it are
    /// accepted as-is.
    pub quality_threshold: f64,

    /// Hard cap on point insertions; `None` derives
    /// `100 × initial boundary points`.
    pub max_insertions: Option<usize>,

    /// Run one smoothing pass every this many insertions (0 disables).
    pub smooth_interval: usize,

    /// Log progress every this many front iterations (0 disables).
    pub print_iter: usize,
}

impl Default for FrontalOptions {
    fn default() -> Self {
        Self {
            quality_threshold: 1.0,
            max_insertions: None,
            smooth_interval: 0,
            print_iter: 1000,
        }
    }
}

impl FrontalOptions {
    /// Set the quality threshold β.
    pub fn with_quality_threshold(mut self, beta: f64) -> Self {
        self.quality_threshold = beta;
        self
    }

    /// Set the insertion cap.
    pub fn with_max_insertions(mut self, max: usize) -> Self {
        self.max_insertions = Some(max);
        self
    }

    /// Enable periodic smoothing every `interval` insertions.
    pub fn with_smooth_interval(mut self, interval: usize) -> Self {
        self.smooth_interval = interval;
        self
    }

    /// Set the progress-log cadence.
    pub fn with_print_iter(mut self, iter: usize) -> Self {
        self.print_iter = iter;
        self
    }
}

/// Summary of a completed frontal run.
#[derive(Debug, Clone, Copy)]
pub struct FrontalReport {
    /// Points inserted.
    pub insertions: usize,
    /// Front iterations processed.
    pub iterations: usize,
}

/// Heap entry: pops the smallest quality first. Stale entries are
/// filtered on pop by comparing the recorded quality bits.
#[derive(Copy, Clone)]
struct FrontEntry {
    quality: f64,
    id: TriangleId,
}

impl Ord for FrontEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .quality
            .total_cmp(&self.quality)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for FrontEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontEntry {}

impl<S: Surface + ?Sized> Triangulator<'_, S> {
    /// Refine the interior until every triangle meets the quality
    /// criterion.
    ///
    /// Returns [`MeshError::ConvergenceFailed`] if the insertion budget
    /// runs out first; the partial mesh remains retrievable through
    /// [`mesh`](Triangulator::mesh).
    pub fn frontal<F: FeatureSize + ?Sized>(
        &mut self,
        fs: &F,
        options: &FrontalOptions,
    ) -> Result<FrontalReport> {
        let beta = options.quality_threshold;
        if !beta.is_finite() || beta <= 0.0 {
            return Err(MeshError::invalid_param(
                "quality_threshold",
                beta,
                "must be positive",
            ));
        }
        let max_insertions = options
            .max_insertions
            .unwrap_or(100 * self.init_boundary_points as usize);

        let mut heap = BinaryHeap::new();
        self.created.clear();
        self.classify_all(fs, beta, &mut heap, false);

        let mut insertions = 0usize;
        let mut iterations = 0usize;

        loop {
            let Some(entry) = heap.pop() else {
                if self.reactivate_stranded(beta, &mut heap) {
                    continue;
                }
                break;
            };

            // Lazy invalidation: skip entries for dead, retired or
            // re-scored triangles.
            let (status, qbits) = match self.tris.get(entry.id) {
                Some(t) => (t.status, t.quality.to_bits()),
                None => continue,
            };
            if status != TriStatus::Active || qbits != entry.quality.to_bits() {
                continue;
            }

            iterations += 1;
            if options.print_iter > 0 && iterations % options.print_iter == 0 {
                log::info!(
                    "frontal: iteration {iterations}, {} triangles, {insertions} insertions",
                    self.tris.len()
                );
            }

            let Some((a, b)) = self.base_edge(entry.id) else {
                // The accepted neighbor was dug away; back to waiting.
                if let Some(t) = self.tris.get_mut(entry.id) {
                    t.status = TriStatus::Waiting;
                }
                continue;
            };

            let (p, h) = self.propose_point(entry.id, a, b, fs);

            // Snap: an existing point close enough serves as the apex.
            if let Some((q, _)) = self.quadtree.find_closest(p.x, p.y) {
                let d3 = (self.points.coord(q) - self.eval(&p)).norm();
                if d3 < 0.5 * h {
                    self.accept_triangle(entry.id, &mut heap);
                    continue;
                }
            }

            if insertions >= max_insertions {
                log::warn!(
                    "frontal: gave up after {insertions} insertions with the front still open"
                );
                return Err(MeshError::ConvergenceFailed { insertions });
            }

            let target = {
                let t = self
                    .tris
                    .get(entry.id)
                    .expect("candidate triangle vanished");
                let [ta, tb, tc] = t.vertices();
                if predicates::enclosed(
                    &p,
                    &self.points.param(ta),
                    &self.points.param(tb),
                    &self.points.param(tc),
                ) {
                    Some(entry.id)
                } else {
                    self.find_enclosing(&p)
                }
            };

            match target {
                Some(t) => {
                    self.created.clear();
                    self.add_point_in_triangle(p, t);
                    insertions += 1;
                    self.classify_created(fs, beta, &mut heap);

                    if options.smooth_interval > 0 && insertions % options.smooth_interval == 0
                    {
                        self.smooth(1);
                        self.classify_all(fs, beta, &mut heap, true);
                    }
                }
                // Clamping pushed the proposal out of the domain; the
                // candidate is as good as it gets here.
                None => self.accept_triangle(entry.id, &mut heap),
            }
        }

        log::debug!(
            "frontal: converged after {iterations} iterations, {insertions} insertions, {} triangles",
            self.tris.len()
        );
        Ok(FrontalReport {
            insertions,
            iterations,
        })
    }

    /// Score a triangle: surface-space circumradius over the feature
    /// size at the surface-space centroid.
    fn compute_size_ratio<F: FeatureSize + ?Sized>(
        &self,
        id: TriangleId,
        fs: &F,
    ) -> (f64, f64) {
        let t = self.tris.get(id).expect("scoring a dead triangle");
        let xa = self.points.coord(t.u);
        let xb = self.points.coord(t.v);
        let xc = self.points.coord(t.w);

        let r = predicates::circumradius3(&xa, &xb, &xc);
        let centroid = Point3::from((xa.coords + xb.coords + xc.coords) / 3.0);
        let h = fs.feature_size(&centroid).max(f64::MIN_POSITIVE);
        (r / h, r)
    }

    fn classify_triangle<F: FeatureSize + ?Sized>(&mut self, id: TriangleId, fs: &F, beta: f64) {
        let (quality, r) = self.compute_size_ratio(id, fs);
        let t = self
            .tris
            .get_mut(id)
            .expect("classifying a dead triangle");
        t.quality = quality;
        t.circumradius = r;
        t.status = if quality <= beta {
            TriStatus::Accepted
        } else {
            TriStatus::Waiting
        };
    }

    /// Whether the triangle touches the front: a boundary edge, a
    /// constrained edge, or an accepted neighbor.
    fn front_adjacent(&self, id: TriangleId) -> bool {
        let Some(t) = self.tris.get(id) else {
            return false;
        };
        t.edges().into_iter().any(|(a, b)| {
            if self.edge_in_pslg(a, b) {
                return true;
            }
            match self.edges.complete(b, a) {
                None => true,
                Some(n) => self.tris.get(n).map(|t| t.status) == Some(TriStatus::Accepted),
            }
        })
    }

    fn activate(&mut self, id: TriangleId, heap: &mut BinaryHeap<FrontEntry>) {
        if let Some(t) = self.tris.get_mut(id) {
            t.status = TriStatus::Active;
            heap.push(FrontEntry {
                quality: t.quality,
                id,
            });
        }
    }

    /// Accept a triangle and pull its waiting neighbors onto the front.
    fn accept_triangle(&mut self, id: TriangleId, heap: &mut BinaryHeap<FrontEntry>) {
        if let Some(t) = self.tris.get_mut(id) {
            t.status = TriStatus::Accepted;
        }
        self.propagate_accept(id, heap);
    }

    fn propagate_accept(&mut self, id: TriangleId, heap: &mut BinaryHeap<FrontEntry>) {
        let Some(edges) = self.tris.get(id).map(|t| t.edges()) else {
            return;
        };
        for (a, b) in edges {
            if let Some(n) = self.edges.complete(b, a) {
                if self.tris.get(n).map(|t| t.status) == Some(TriStatus::Waiting) {
                    self.activate(n, heap);
                }
            }
        }
    }

    /// Score and classify every triangle, then seed the front.
    ///
    /// With `preserve_accepted` set, previously accepted triangles keep
    /// their status (used after smoothing moved points under them).
    fn classify_all<F: FeatureSize + ?Sized>(
        &mut self,
        fs: &F,
        beta: f64,
        heap: &mut BinaryHeap<FrontEntry>,
        preserve_accepted: bool,
    ) {
        heap.clear();
        let ids = self.tris.ids();
        for &id in &ids {
            if preserve_accepted
                && self.tris.get(id).map(|t| t.status) == Some(TriStatus::Accepted)
            {
                continue;
            }
            self.classify_triangle(id, fs, beta);
        }
        for &id in &ids {
            if self.tris.get(id).map(|t| t.status) == Some(TriStatus::Waiting)
                && self.front_adjacent(id)
            {
                self.activate(id, heap);
            }
        }
    }

    /// Classify the triangles the last insertion created and grow the
    /// front through them.
    fn classify_created<F: FeatureSize + ?Sized>(
        &mut self,
        fs: &F,
        beta: f64,
        heap: &mut BinaryHeap<FrontEntry>,
    ) {
        let created = std::mem::take(&mut self.created);
        for &id in &created {
            if self.tris.contains(id) {
                self.classify_triangle(id, fs, beta);
            }
        }
        for &id in &created {
            match self.tris.get(id).map(|t| t.status) {
                Some(TriStatus::Accepted) => self.propagate_accept(id, heap),
                Some(TriStatus::Waiting) if self.front_adjacent(id) => {
                    self.activate(id, heap);
                }
                _ => {}
            }
        }
    }

    /// Re-arm any triangle the heap lost track of. Returns whether
    /// anything was pushed.
    fn reactivate_stranded(&mut self, beta: f64, heap: &mut BinaryHeap<FrontEntry>) -> bool {
        let mut found = false;
        for id in self.tris.ids() {
            let Some(t) = self.tris.get(id) else { continue };
            if t.quality <= beta {
                continue;
            }
            let eligible = t.status == TriStatus::Active
                || (t.status == TriStatus::Waiting && self.front_adjacent(id));
            if eligible {
                self.activate(id, heap);
                found = true;
            }
        }
        found
    }

    /// The front edge to advance from: an edge shared with an accepted
    /// triangle, or failing that a boundary or constrained edge.
    fn base_edge(&self, id: TriangleId) -> Option<(u32, u32)> {
        let t = self.tris.get(id)?;
        let mut fallback = None;
        for (a, b) in t.edges() {
            match self.edges.complete(b, a) {
                Some(n) => {
                    if self.tris.get(n).map(|t| t.status) == Some(TriStatus::Accepted) {
                        return Some((a, b));
                    }
                    if fallback.is_none() && self.edge_in_pslg(a, b) {
                        fallback = Some((a, b));
                    }
                }
                None => {
                    if fallback.is_none() {
                        fallback = Some((a, b));
                    }
                }
            }
        }
        fallback
    }

    /// Propose the next front point off base edge `(a, b)` of the given
    /// triangle. Returns the parameter-space proposal and the local
    /// feature size.
    ///
    /// The apex starts over the base midpoint and is scaled along the
    /// base perpendicular so its surface-space distance to both
    /// endpoints is the local feature size, then clamped to stay inside
    /// the triangle's circumscribed search region.
    fn propose_point<F: FeatureSize + ?Sized>(
        &self,
        id: TriangleId,
        a: u32,
        b: u32,
        fs: &F,
    ) -> (Point2<f64>, f64) {
        let t = self.tris.get(id).expect("proposing off a dead triangle");
        let w = t.opposite(a, b);

        let pa = self.points.param(a);
        let pb = self.points.param(b);
        let pw = self.points.param(w);
        let m = Point2::from((pa.coords + pb.coords) * 0.5);
        let e = pb - pa;
        let l2 = e.norm();
        let n = Vector2::new(-e.y, e.x) / l2;

        let l3 = (self.points.coord(b) - self.points.coord(a)).norm();
        let h = fs.feature_size(&self.eval(&m)).max(f64::MIN_POSITIVE);

        // Surface-space height putting the apex at distance h from both
        // endpoints; an equilateral apex when the base is already longer
        // than 2h. The floor keeps the apex off the base when the two
        // regimes meet.
        let h3 = if 2.0 * h > l3 {
            (h * h - 0.25 * l3 * l3).sqrt()
        } else {
            0.5 * 3f64.sqrt() * h
        }
        .max(0.5 * h);

        // First derivatives convert the height to parameter space.
        let (_, xu, xv) = self.surface.eval_deriv(m.x, m.y);
        let metric = (xu * n.x + xv * n.y).norm();
        let mut d = if metric > 1e-12 {
            h3 / metric
        } else {
            0.5 * 3f64.sqrt() * l2
        };

        // The perpendicular bisector of the base passes through the
        // circumcenter; clamp along it to stay inside the circumcircle.
        if let Some((cc, rc)) = predicates::circumcircle(&pa, &pb, &pw) {
            let reach = (cc - m).dot(&n) + rc;
            if reach > 0.0 {
                d = d.min(0.95 * reach);
            }
        }
        d = d.max(0.05 * l2);

        (m + d * n, h)
    }

    /// One pass of guarded Laplacian smoothing over interior points.
    ///
    /// Each point inserted by the frontal loop moves to the centroid of
    /// its neighbor ring unless the move would invert an incident
    /// triangle. Input points never move, so boundary and constrained
    /// edges are preserved by construction. Positions change but
    /// topology does not, so the edge map stays untouched.
    pub fn smooth(&mut self, iterations: usize) {
        let first = FIXED_POINT_OFFSET + self.init_boundary_points;
        for _ in 0..iterations {
            for p in first..self.points.len() as u32 {
                let Some(ring) = self.vertex_ring(p) else {
                    continue;
                };

                let mut centroid = Vector2::zeros();
                for &r in &ring {
                    centroid += self.points.param(r).coords;
                }
                let target = Point2::from(centroid / ring.len() as f64);

                let keeps_orientation = (0..ring.len()).all(|i| {
                    let ra = self.points.param(ring[i]);
                    let rb = self.points.param(ring[(i + 1) % ring.len()]);
                    predicates::orient2d(&target, &ra, &rb) > 0.0
                });
                if !keeps_orientation {
                    continue;
                }

                let old = self.points.param(p);
                self.quadtree.remove(p, old.x, old.y);
                let coord = self.eval(&target);
                self.points.relocate(p, target, coord);
                self.quadtree.insert(p, target.x, target.y);
            }
        }
    }

    /// Merge point pairs whose surface positions coincide.
    ///
    /// Each pair is given in input-point indexing. All triangle and
    /// constraint references to the higher merged id are rewritten to
    /// the lower one; triangles that collapse to a line are dropped, and
    /// the edge map is rebuilt.
    pub fn remove_degenerate_edges(&mut self, degen: &[[usize; 2]]) {
        if degen.is_empty() {
            return;
        }

        let n = self.points.len();
        let mut remap: Vec<u32> = (0..n as u32).collect();
        for pair in degen {
            let a = resolve(&remap, pair[0] as u32 + FIXED_POINT_OFFSET);
            let b = resolve(&remap, pair[1] as u32 + FIXED_POINT_OFFSET);
            if a != b {
                remap[a.max(b) as usize] = a.min(b);
            }
        }

        // Rewrite connectivity, dropping collapsed triangles, then
        // rebuild the edge map from the survivors.
        self.edges.clear();
        for id in self.tris.ids() {
            let t = self
                .tris
                .get_mut(id)
                .expect("triangle vanished during merge");
            t.u = resolve(&remap, t.u);
            t.v = resolve(&remap, t.v);
            t.w = resolve(&remap, t.w);
            if t.u == t.v || t.v == t.w || t.w == t.u {
                self.tris.remove(id);
            }
        }
        let live: Vec<_> = self.tris.iter().map(|(id, t)| (id, *t)).collect();
        for (id, t) in live {
            self.edges.insert_triangle(id, &t);
            for p in t.vertices() {
                self.points.set_hint(p, id);
            }
        }

        self.pslg = self
            .pslg
            .iter()
            .map(|&(a, b)| {
                let (a, b) = (resolve(&remap, a), resolve(&remap, b));
                (a.min(b), a.max(b))
            })
            .filter(|&(a, b)| a != b)
            .collect();
        self.pslg.sort_unstable();
        self.pslg.dedup();

        let mut merged = 0usize;
        for id in FIXED_POINT_OFFSET..n as u32 {
            if resolve(&remap, id) != id {
                let p = self.points.param(id);
                if self.quadtree.remove(id, p.x, p.y) {
                    self.retired_points += 1;
                    merged += 1;
                }
            }
        }
        log::debug!(
            "merged {merged} degenerate points, {} triangles remain",
            self.tris.len()
        );
    }
}

/// Follow a merge chain to its lowest surviving id.
fn resolve(remap: &[u32], mut id: u32) -> u32 {
    while remap[id as usize] != id {
        id = remap[id as usize];
    }
    id
}

#[cfg(test)]
mod tests {
    use super::super::tests::{circle_pslg, square_pslg};
    use super::super::{Triangulator, FIXED_POINT_OFFSET};
    use super::*;
    use crate::surface::{CylinderSurface, PlaneSurface, UniformFeatureSize};

    /// Unit disk, 16 boundary points, uniform h = 0.25: boundary points
    /// survive untouched and all circumradii respect the feature size.
    #[test]
    fn test_frontal_disk() {
        let (pts, segs) = circle_pslg(16, 1.0);
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();

        let report = tri
            .frontal(&UniformFeatureSize::new(0.25), &FrontalOptions::default())
            .unwrap();

        assert!(tri.is_valid());
        assert!(report.insertions > 0);
        assert!(report.iterations >= report.insertions);

        // The 16 input points keep their ids and positions.
        for (i, p) in pts.iter().enumerate() {
            assert_eq!(tri.points.param(i as u32 + FIXED_POINT_OFFSET), *p);
        }

        for (_, t) in tri.tris.iter() {
            let xa = tri.points.coord(t.u);
            let xb = tri.points.coord(t.v);
            let xc = tri.points.coord(t.w);
            let r = predicates::circumradius3(&xa, &xb, &xc);
            assert!(
                r <= 0.25 * 2.0,
                "triangle {t:?} has circumradius {r} against h = 0.25"
            );
        }
    }

    /// Square with a constrained diagonal: both halves get refined and
    /// no edge crosses the constraint.
    #[test]
    fn test_frontal_square_with_diagonal() {
        let (pts, mut segs) = square_pslg();
        segs.push([0, 2]);
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();
        tri.frontal(&UniformFeatureSize::new(0.2), &FrontalOptions::default())
            .unwrap();

        assert!(tri.is_valid());

        let d0 = tri.points.param(FIXED_POINT_OFFSET);
        let d2 = tri.points.param(FIXED_POINT_OFFSET + 2);
        let mut diagonal_pieces = 0;
        for (_, t) in tri.tris.iter() {
            for (a, b) in t.edges() {
                let pa = tri.points.param(a);
                let pb = tri.points.param(b);
                assert!(
                    !predicates::segments_cross(&pa, &pb, &d0, &d2),
                    "edge ({a}, {b}) crosses the constrained diagonal"
                );
                if tri.edge_in_pslg(a, b) {
                    diagonal_pieces += 1;
                }
            }
        }
        assert!(diagonal_pieces > 0, "constrained edges disappeared");
        // Both halves hold triangles: some centroid above the diagonal,
        // some below.
        let sides: Vec<f64> = tri
            .tris
            .iter()
            .map(|(_, t)| {
                let c = (tri.points.param(t.u).coords
                    + tri.points.param(t.v).coords
                    + tri.points.param(t.w).coords)
                    / 3.0;
                c.y - c.x
            })
            .collect();
        assert!(sides.iter().any(|&s| s > 0.0));
        assert!(sides.iter().any(|&s| s < 0.0));
    }

    /// Annulus with a hole seed: the hole stays empty through
    /// refinement.
    #[test]
    fn test_frontal_annulus() {
        let (mut pts, mut segs) = circle_pslg(32, 1.0);
        let (inner_pts, inner_segs) = circle_pslg(16, 0.3);
        let offset = pts.len();
        pts.extend(inner_pts);
        segs.extend(inner_segs.iter().map(|s| [s[0] + offset, s[1] + offset]));

        let holes = [Point2::new(0.0, 0.0)];
        let mut tri = Triangulator::new(&pts, &segs, &holes, &PlaneSurface).unwrap();
        tri.frontal(&UniformFeatureSize::new(0.15), &FrontalOptions::default())
            .unwrap();

        assert!(tri.is_valid());
        for (_, t) in tri.tris.iter() {
            let c = (tri.points.param(t.u).coords
                + tri.points.param(t.v).coords
                + tri.points.param(t.w).coords)
                / 3.0;
            assert!(c.norm() > 0.3, "centroid {c:?} fell inside the hole");
        }
    }

    /// L-shaped domain: the reentrant corner stays a mesh vertex and no
    /// triangle reaches into the notch.
    #[test]
    fn test_frontal_l_shape() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.5),
            Point2::new(0.5, 0.5),
            Point2::new(0.5, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.5),
        ];
        let segs: Vec<[usize; 2]> = (0..8).map(|i| [i, (i + 1) % 8]).collect();
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();
        tri.frontal(&UniformFeatureSize::new(0.5), &FrontalOptions::default())
            .unwrap();

        assert!(tri.is_valid());
        // The reentrant corner keeps its identity and position.
        assert_eq!(
            tri.points.param(4 + FIXED_POINT_OFFSET),
            Point2::new(0.5, 0.5)
        );
        // The notch [0.5,1]×[0.5,1] holds no triangle.
        for (_, t) in tri.tris.iter() {
            let c = (tri.points.param(t.u).coords
                + tri.points.param(t.v).coords
                + tri.points.param(t.w).coords)
                / 3.0;
            assert!(
                c.x < 0.5 + 1e-12 || c.y < 0.5 + 1e-12,
                "centroid {c:?} straddles the reentrant corner"
            );
        }
    }

    /// The insertion cap is advisory: the error reports it but the
    /// partial mesh stays consistent.
    #[test]
    fn test_convergence_failure_keeps_partial_mesh() {
        let (pts, segs) = circle_pslg(16, 1.0);
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();

        let err = tri
            .frontal(
                &UniformFeatureSize::new(0.05),
                &FrontalOptions::default().with_max_insertions(3),
            )
            .unwrap_err();
        assert!(matches!(err, MeshError::ConvergenceFailed { insertions: 3 }));

        assert!(tri.is_valid());
        assert!(tri.mesh().num_triangles() > 0);
    }

    #[test]
    fn test_invalid_quality_threshold() {
        let (pts, segs) = square_pslg();
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();
        let err = tri
            .frontal(
                &UniformFeatureSize::new(0.2),
                &FrontalOptions::default().with_quality_threshold(0.0),
            )
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter { .. }));
    }

    /// Periodic smoothing must not break any structural invariant.
    #[test]
    fn test_frontal_with_smoothing() {
        let (pts, segs) = circle_pslg(16, 1.0);
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();
        tri.frontal(
            &UniformFeatureSize::new(0.2),
            &FrontalOptions::default().with_smooth_interval(10),
        )
        .unwrap();
        assert!(tri.is_valid());

        // Standalone passes on top stay consistent too.
        tri.smooth(2);
        assert!(tri.is_valid());
    }

    /// Refinement on a curved surface: circumradii are measured in
    /// surface space, so a cylinder patch refines by arc length even
    /// though the parameter domain is a flat rectangle.
    #[test]
    fn test_frontal_cylinder_patch() {
        let surf = CylinderSurface::new(2.0);
        // Quarter turn, unit height: 2.0 × π/2 ≈ 3.14 long in space.
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(std::f64::consts::FRAC_PI_2, 0.0),
            Point2::new(std::f64::consts::FRAC_PI_2, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let segs = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
        let mut tri = Triangulator::new(&pts, &segs, &[], &surf).unwrap();
        let report = tri
            .frontal(&UniformFeatureSize::new(0.4), &FrontalOptions::default())
            .unwrap();

        assert!(tri.is_valid());
        assert!(report.insertions > 0);
        for (_, t) in tri.tris.iter() {
            let r = predicates::circumradius3(
                &tri.points.coord(t.u),
                &tri.points.coord(t.v),
                &tri.points.coord(t.w),
            );
            assert!(r <= 0.4 * 2.0, "surface-space circumradius {r} too large");
        }
    }

    /// Declaring a short boundary edge degenerate merges its endpoints
    /// and keeps invariants 1–4 intact.
    #[test]
    fn test_remove_degenerate_edges() {
        let eps = 1e-3;
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.5, 1.0),
            Point2::new(0.5 - eps, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let segs: Vec<[usize; 2]> = (0..6).map(|i| [i, (i + 1) % 6]).collect();
        let mut tri = Triangulator::new(&pts, &segs, &[], &PlaneSurface).unwrap();
        tri.frontal(&UniformFeatureSize::new(0.3), &FrontalOptions::default())
            .unwrap();

        let before = tri.num_triangles();
        tri.remove_degenerate_edges(&[[3, 4]]);

        assert!(tri.is_valid());
        assert!(tri.num_triangles() < before);
        // Point 4 is retired: no live triangle references it.
        for (_, t) in tri.tris.iter() {
            assert!(!t.contains(4 + FIXED_POINT_OFFSET));
        }
    }
}
