//! Append-only point storage.

use nalgebra::{Point2, Point3};

use super::TriangleId;

/// The point store: parallel arrays of parameter-space and surface-space
/// positions, plus one hint triangle per point.
///
/// Points are never deleted; identifiers are indices into the store. The
/// hint triangle is the last triangle known to touch the point and seeds
/// walk-based point location. It can go stale when cavities are dug, so
/// readers must check liveness before trusting it.
#[derive(Debug, Default)]
pub struct PointStore {
    params: Vec<Point2<f64>>,
    coords: Vec<Point3<f64>>,
    hints: Vec<TriangleId>,
}

impl PointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point; returns its identifier.
    pub fn add(&mut self, param: Point2<f64>, coord: Point3<f64>) -> u32 {
        let id = self.params.len() as u32;
        self.params.push(param);
        self.coords.push(coord);
        self.hints.push(TriangleId::invalid());
        id
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter-space position of a point.
    #[inline]
    pub fn param(&self, id: u32) -> Point2<f64> {
        self.params[id as usize]
    }

    /// Surface-space position of a point.
    #[inline]
    pub fn coord(&self, id: u32) -> Point3<f64> {
        self.coords[id as usize]
    }

    /// Overwrite a point's positions (used by smoothing and degenerate
    /// merging; the identifier is unchanged).
    pub fn relocate(&mut self, id: u32, param: Point2<f64>, coord: Point3<f64>) {
        self.params[id as usize] = param;
        self.coords[id as usize] = coord;
    }

    /// The hint triangle last known to touch this point.
    #[inline]
    pub fn hint(&self, id: u32) -> TriangleId {
        self.hints[id as usize]
    }

    /// Record a triangle touching this point.
    #[inline]
    pub fn set_hint(&mut self, id: u32, tri: TriangleId) {
        self.hints[id as usize] = tri;
    }
}
