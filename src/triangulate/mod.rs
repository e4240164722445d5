//! The frontal-Delaunay triangulator.
//!
//! [`Triangulator`] owns the working mesh: the point store, the quadtree
//! index, the triangle slab and the directed-edge map. Construction runs
//! the full Bowyer–Watson + segment-recovery pipeline over the input
//! PSLG; [`Triangulator::frontal`] then refines the interior until every
//! triangle meets the size-driven quality criterion.
//!
//! # Pipeline
//!
//! 1. Validate the input PSLG (fail fast on degenerate input).
//! 2. Inflate the parameter-space bounding box by 10% and cover it with
//!    four super-points and two triangles.
//! 3. Insert the input points by incremental Delaunay.
//! 4. Recover missing constraint segments.
//! 5. Classify triangles against the domain (flood fill from the
//!    super-point triangles and the hole seeds, stopping at constrained
//!    edges) and sweep the outside.
//! 6. Advance the front ([`Triangulator::frontal`]), inserting interior
//!    points until quality converges.

mod frontal;
mod insert;
mod recover;

pub use frontal::{FrontalOptions, FrontalReport};

use nalgebra::{Point2, Point3};
use smallvec::SmallVec;

use crate::error::{MeshError, Result};
use crate::mesh::{EdgeMap, Mesh, PointStore, TriStatus, Triangle, TriangleId, TriangleStore};
use crate::predicates;
use crate::quadtree::{QuadDomain, QuadTree};
use crate::surface::Surface;

/// The four bounding-box super-points occupy ids `0..4`.
pub(crate) const FIXED_POINT_OFFSET: u32 = 4;

/// Relative tolerance (against the domain diagonal) below which two
/// input points count as coincident.
const DUPLICATE_TOL: f64 = 1e-10;

/// Frontal-Delaunay triangulator over a parametric surface patch.
///
/// See the [module docs](self) for the pipeline and the
/// [crate docs](crate) for a complete example.
pub struct Triangulator<'a, S: Surface + ?Sized> {
    pub(crate) surface: &'a S,
    pub(crate) points: PointStore,
    pub(crate) quadtree: QuadTree,
    pub(crate) tris: TriangleStore,
    pub(crate) edges: EdgeMap,
    /// Constrained edges as normalized `(lo, hi)` pairs, sorted.
    pub(crate) pslg: Vec<(u32, u32)>,
    pub(crate) init_boundary_points: u32,
    /// Points merged away by degenerate-edge removal; excluded from the
    /// quadtree and from validity accounting.
    pub(crate) retired_points: usize,
    /// Triangles created since the last drain; the frontal loop uses
    /// this to classify exactly the triangles each insertion produced.
    pub(crate) created: Vec<TriangleId>,
    duplicate_tol: f64,
}

impl<'a, S: Surface + ?Sized> std::fmt::Debug for Triangulator<'a, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triangulator").finish_non_exhaustive()
    }
}

impl<'a, S: Surface + ?Sized> Triangulator<'a, S> {
    /// Build the constrained Delaunay triangulation of a PSLG.
    ///
    /// `points` are parameter-space locations (boundary plus any fixed
    /// interior points); `segments` index into `points` and must appear
    /// as edges of the result; `holes` are parameter-space seeds, one
    /// per hole, from which outside triangles are flooded.
    ///
    /// Fails fast on degenerate input: coincident points, out-of-range
    /// or self-referential segments, and crossing constraints.
    pub fn new(
        points: &[Point2<f64>],
        segments: &[[usize; 2]],
        holes: &[Point2<f64>],
        surface: &'a S,
    ) -> Result<Self> {
        if points.len() < 3 {
            return Err(MeshError::invalid_param(
                "points",
                points.len(),
                "at least 3 input points are required",
            ));
        }
        validate_segments(points, segments)?;

        // Bounding box, inflated by 10%.
        let (mut xlow, mut xhigh) = (f64::MAX, f64::MIN);
        let (mut ylow, mut yhigh) = (f64::MAX, f64::MIN);
        for p in points {
            xlow = xlow.min(p.x);
            xhigh = xhigh.max(p.x);
            ylow = ylow.min(p.y);
            yhigh = yhigh.max(p.y);
        }
        let span = (xhigh - xlow).max(yhigh - ylow).max(f64::MIN_POSITIVE);
        let pad_x = 0.05 * (xhigh - xlow).max(0.1 * span);
        let pad_y = 0.05 * (yhigh - ylow).max(0.1 * span);
        let domain = QuadDomain {
            xlow: xlow - pad_x,
            xhigh: xhigh + pad_x,
            ylow: ylow - pad_y,
            yhigh: yhigh + pad_y,
        };

        let mut tri = Self {
            surface,
            points: PointStore::new(),
            quadtree: QuadTree::new(domain),
            tris: TriangleStore::new(),
            edges: EdgeMap::new(),
            pslg: Vec::new(),
            init_boundary_points: points.len() as u32,
            retired_points: 0,
            created: Vec::new(),
            duplicate_tol: DUPLICATE_TOL * span,
        };

        // Super-points at the inflated corners and two covering
        // triangles. The super-points are deliberately absent from the
        // quadtree so nearest-point queries never return them.
        let corners = [
            Point2::new(domain.xlow, domain.ylow),
            Point2::new(domain.xhigh, domain.ylow),
            Point2::new(domain.xlow, domain.yhigh),
            Point2::new(domain.xhigh, domain.yhigh),
        ];
        for c in corners {
            let coord = surface.eval_point(c.x, c.y);
            tri.points.add(c, coord);
        }
        tri.add_triangle(Triangle::new(0, 1, 3));
        tri.add_triangle(Triangle::new(0, 3, 2));

        // Constrained edges are registered before any insertion so the
        // cavity digger refuses to flip across one from the start.
        tri.setup_pslg_edges(segments);

        for (i, p) in points.iter().enumerate() {
            if let Some((prev, dist)) = tri.quadtree.find_closest(p.x, p.y) {
                if dist < tri.duplicate_tol {
                    return Err(MeshError::DuplicatePoint {
                        first: (prev - FIXED_POINT_OFFSET) as usize,
                        second: i,
                    });
                }
            }
            tri.add_point_to_mesh(*p)?;
        }

        // Recover constraint segments the Delaunay pass did not produce.
        let missing: Vec<(u32, u32)> = tri
            .pslg
            .iter()
            .copied()
            .filter(|&(a, b)| tri.edges.complete(a, b).is_none() && tri.edges.complete(b, a).is_none())
            .collect();
        for (a, b) in missing {
            tri.insert_segment(a, b)?;
        }

        tri.classify_and_sweep(holes)?;
        tri.created.clear();
        log::debug!(
            "triangulated PSLG: {} points, {} triangles",
            tri.points.len() - FIXED_POINT_OFFSET as usize,
            tri.tris.len()
        );
        Ok(tri)
    }

    /// Number of points, super-points excluded.
    pub fn num_points(&self) -> usize {
        self.points.len() - FIXED_POINT_OFFSET as usize
    }

    /// Number of live triangles.
    pub fn num_triangles(&self) -> usize {
        self.tris.len()
    }

    // ==================== Topology mutation ====================
    //
    // These two are the only entry points that touch the triangle slab
    // and the edge map, so the pairing invariant lives here.

    pub(crate) fn add_triangle(&mut self, tri: Triangle) -> TriangleId {
        let id = self.tris.insert(tri);
        self.edges.insert_triangle(id, &tri);
        for p in tri.vertices() {
            self.points.set_hint(p, id);
        }
        self.created.push(id);
        id
    }

    pub(crate) fn delete_triangle(&mut self, id: TriangleId) -> Triangle {
        let tri = self.tris.remove(id);
        self.edges.remove_triangle(id, &tri);
        tri
    }

    /// Delete every triangle marked [`TriStatus::DeleteMe`].
    pub(crate) fn sweep_deleted(&mut self) {
        for id in self.tris.ids() {
            if self.tris.get(id).map(|t| t.status) == Some(TriStatus::DeleteMe) {
                self.delete_triangle(id);
            }
        }
    }

    // ==================== PSLG bookkeeping ====================

    fn setup_pslg_edges(&mut self, segments: &[[usize; 2]]) {
        self.pslg = segments
            .iter()
            .map(|s| {
                let a = s[0] as u32 + FIXED_POINT_OFFSET;
                let b = s[1] as u32 + FIXED_POINT_OFFSET;
                (a.min(b), a.max(b))
            })
            .collect();
        self.pslg.sort_unstable();
        self.pslg.dedup();
    }

    /// Whether `(a, b)` (in either direction) is a constrained edge.
    #[inline]
    pub(crate) fn edge_in_pslg(&self, a: u32, b: u32) -> bool {
        let key = (a.min(b), a.max(b));
        self.pslg.binary_search(&key).is_ok()
    }

    // ==================== Classification ====================

    /// Flood-mark triangles outside the domain and sweep them.
    ///
    /// Seeds are every triangle touching a super-point (the region
    /// between the PSLG and the bounding box) and the triangle enclosing
    /// each hole seed. The flood spreads across unconstrained edges
    /// only, so it fills exactly the regions the PSLG separates from the
    /// interior.
    fn classify_and_sweep(&mut self, holes: &[Point2<f64>]) -> Result<()> {
        let mut stack: Vec<TriangleId> = Vec::new();
        for (id, tri) in self.tris.iter() {
            if tri.vertices().iter().any(|&p| p < FIXED_POINT_OFFSET) {
                stack.push(id);
            }
        }
        for hole in holes {
            match self.find_enclosing(hole) {
                Some(id) => stack.push(id),
                None => {
                    return Err(MeshError::PointOutsideDomain {
                        u: hole.x,
                        v: hole.y,
                    })
                }
            }
        }

        while let Some(id) = stack.pop() {
            let edges = {
                let Some(tri) = self.tris.get_mut(id) else {
                    continue;
                };
                if tri.status == TriStatus::DeleteMe {
                    continue;
                }
                tri.status = TriStatus::DeleteMe;
                tri.edges()
            };
            for (a, b) in edges {
                if self.edge_in_pslg(a, b) {
                    continue;
                }
                if let Some(next) = self.edges.complete(b, a) {
                    if self.tris.get(next).map(|t| t.status) != Some(TriStatus::DeleteMe) {
                        stack.push(next);
                    }
                }
            }
        }
        self.sweep_deleted();

        // An open PSLG lets the flood reach everything; any survivor
        // still referencing a super-point is swept here regardless.
        for id in self.tris.ids() {
            let Some(tri) = self.tris.get(id) else { continue };
            if tri.vertices().iter().any(|&p| p < FIXED_POINT_OFFSET) {
                self.delete_triangle(id);
            }
        }
        Ok(())
    }

    // ==================== Output ====================

    /// Extract the finished triangulation.
    ///
    /// Super-points are dropped and the remaining points renumbered
    /// densely; connectivity is counter-clockwise in parameter space.
    pub fn mesh(&self) -> Mesh {
        let n = self.points.len() - FIXED_POINT_OFFSET as usize;
        let mut params = Vec::with_capacity(n);
        let mut points = Vec::with_capacity(n);
        for id in FIXED_POINT_OFFSET..self.points.len() as u32 {
            params.push(self.points.param(id));
            points.push(self.points.coord(id));
        }

        let triangles = self
            .tris
            .iter()
            .map(|(_, t)| {
                [
                    t.u - FIXED_POINT_OFFSET,
                    t.v - FIXED_POINT_OFFSET,
                    t.w - FIXED_POINT_OFFSET,
                ]
            })
            .collect();

        Mesh {
            params,
            points,
            triangles,
        }
    }

    /// Write the triangulation as legacy ASCII VTK.
    ///
    /// `space` selects surface coordinates or the parameter domain.
    pub fn write_vtk<P: AsRef<std::path::Path>>(
        &self,
        path: P,
        space: crate::io::VtkSpace,
    ) -> Result<()> {
        crate::io::vtk::save(&self.mesh(), path, space)
    }

    // ==================== Validation ====================

    /// Check the structural invariants of the working mesh.
    ///
    /// Verifies triangle orientation, edge-map consistency in both
    /// directions, PSLG preservation and point/quadtree accounting.
    /// Violations are logged at `error` level.
    pub fn is_valid(&self) -> bool {
        let mut ok = true;

        for (id, tri) in self.tris.iter() {
            let [a, b, c] = tri.vertices();
            if a as usize >= self.points.len()
                || b as usize >= self.points.len()
                || c as usize >= self.points.len()
            {
                log::error!("triangle {id:?} references an unknown point");
                return false;
            }
            let area = predicates::orient2d(
                &self.points.param(a),
                &self.points.param(b),
                &self.points.param(c),
            );
            if area <= 0.0 {
                log::error!("triangle {id:?} = {tri:?} is not counter-clockwise");
                ok = false;
            }
            for (ea, eb) in tri.edges() {
                if self.edges.complete(ea, eb) != Some(id) {
                    log::error!("edge ({ea}, {eb}) of {id:?} missing from edge map");
                    ok = false;
                }
            }
        }

        if self.edges.len() != 3 * self.tris.len() {
            log::error!(
                "edge map holds {} entries for {} triangles",
                self.edges.len(),
                self.tris.len()
            );
            ok = false;
        }
        for ((a, b), id) in self.edges.iter() {
            match self.tris.get(id) {
                Some(tri) if tri.edges().contains(&(a, b)) => {}
                _ => {
                    log::error!("edge map entry ({a}, {b}) -> {id:?} is stale");
                    ok = false;
                }
            }
        }

        for &(a, b) in &self.pslg {
            if self.edges.complete(a, b).is_none() && self.edges.complete(b, a).is_none() {
                log::error!(
                    "constrained edge ({}, {}) is not an edge of the mesh",
                    a - FIXED_POINT_OFFSET,
                    b - FIXED_POINT_OFFSET
                );
                ok = false;
            }
        }

        let expected =
            self.points.len() - FIXED_POINT_OFFSET as usize - self.retired_points;
        if self.quadtree.len() != expected {
            log::error!(
                "quadtree indexes {} points, expected {}",
                self.quadtree.len(),
                expected
            );
            ok = false;
        }

        ok
    }

    /// A live triangle incident to point `p`, preferring the hint.
    pub(crate) fn triangle_at(&self, p: u32) -> Option<TriangleId> {
        let hint = self.points.hint(p);
        if let Some(tri) = self.tris.get(hint) {
            if tri.contains(p) {
                return Some(hint);
            }
        }
        self.tris
            .iter()
            .find(|(_, t)| t.contains(p))
            .map(|(id, _)| id)
    }

    /// The ring of neighbors around `p` in counter-clockwise order, or
    /// `None` if the fan is open (touches a boundary) or `p` is unused.
    pub(crate) fn vertex_ring(&self, p: u32) -> Option<SmallVec<[u32; 12]>> {
        let t0 = self.triangle_at(p)?;
        let [_, first, mut b] = self.tris.get(t0)?.rotated_to(p);
        let mut ring: SmallVec<[u32; 12]> = SmallVec::new();
        ring.push(first);
        ring.push(b);

        for _ in 0..self.points.len() {
            let next = self.edges.complete(p, b)?;
            let [_, _, c] = self.tris.get(next)?.rotated_to(p);
            if c == first {
                return Some(ring);
            }
            ring.push(c);
            b = c;
        }
        None
    }

    pub(crate) fn eval(&self, p: &Point2<f64>) -> Point3<f64> {
        self.surface.eval_point(p.x, p.y)
    }
}

fn validate_segments(points: &[Point2<f64>], segments: &[[usize; 2]]) -> Result<()> {
    for (i, seg) in segments.iter().enumerate() {
        for &idx in seg {
            if idx >= points.len() {
                return Err(MeshError::SegmentOutOfRange {
                    segment: i,
                    index: idx,
                });
            }
        }
        if seg[0] == seg[1] {
            return Err(MeshError::InvalidSegment {
                segment: i,
                index: seg[0],
            });
        }
    }

    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let [a, b] = segments[i];
            let [c, d] = segments[j];
            if a == c || a == d || b == c || b == d {
                continue;
            }
            if predicates::segments_cross(&points[a], &points[b], &points[c], &points[d]) {
                return Err(MeshError::CrossingSegments { first: i, second: j });
            }
        }
    }
    Ok(())
}
