//! # Tessella
//!
//! A frontal-Delaunay triangulation core for parametric surface meshing.
//!
//! Tessella meshes a surface patch described by a planar straight-line
//! graph (PSLG) in the patch's parameter domain: boundary points,
//! constraint segments that must survive as mesh edges, and seed points
//! marking holes. Element sizes follow a user-supplied feature-size
//! field evaluated on the surface, so the mesh grades correctly even
//! under strong parametric distortion.
//!
//! ## Features
//!
//! - **Bowyer–Watson kernel**: incremental Delaunay insertion with
//!   iterative cavity digging and robust adaptive-precision predicates
//! - **Constraint recovery**: corridor carving and gift wrapping force
//!   every PSLG segment into the triangulation
//! - **Frontal refinement**: advancing-front point insertion driven by
//!   a circumradius-to-feature-size quality metric
//! - **Spatial indexing**: a bucketed quadtree accelerates point
//!   location and proximity snapping
//! - **VTK output**: legacy ASCII unstructured grids, in surface or
//!   parameter coordinates
//!
//! ## Quick Start
//!
//! ```
//! use tessella::prelude::*;
//! use nalgebra::Point2;
//!
//! // A unit disk sampled by 12 boundary points.
//! let n = 12;
//! let points: Vec<Point2<f64>> = (0..n)
//!     .map(|i| {
//!         let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
//!         Point2::new(t.cos(), t.sin())
//!     })
//!     .collect();
//! let segments: Vec<[usize; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();
//!
//! // Triangulate the PSLG, then refine to a uniform element size.
//! let mut tri = Triangulator::new(&points, &segments, &[], &PlaneSurface)?;
//! tri.frontal(&UniformFeatureSize::new(0.4), &FrontalOptions::default())?;
//!
//! let mesh = tri.mesh();
//! assert!(mesh.num_triangles() > 0);
//! # Ok::<(), tessella::MeshError>(())
//! ```
//!
//! ## Collaborators
//!
//! The surface and the sizing field stay outside the core: implement
//! [`Surface`](surface::Surface) for your geometry and
//! [`FeatureSize`](surface::FeatureSize) for your sizing (any
//! `Fn(&Point3<f64>) -> f64` closure qualifies). The triangulator holds
//! both as read-only borrows for its lifetime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod predicates;
pub mod quadtree;
pub mod surface;
pub mod triangulate;

pub use error::{MeshError, Result};
pub use io::VtkSpace;
pub use mesh::Mesh;
pub use triangulate::{FrontalOptions, FrontalReport, Triangulator};

/// Prelude module for convenient imports.
///
/// ```
/// use tessella::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::io::VtkSpace;
    pub use crate::mesh::Mesh;
    pub use crate::surface::{
        CylinderSurface, FeatureSize, PlaneSurface, PointFeatureSize, SizeSource, Surface,
        UniformFeatureSize,
    };
    pub use crate::triangulate::{FrontalOptions, FrontalReport, Triangulator};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point2;

    /// End to end: build, refine, write, read back, compare.
    #[test]
    fn test_disk_pipeline_round_trip() {
        let n = 16;
        let points: Vec<Point2<f64>> = (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point2::new(t.cos(), t.sin())
            })
            .collect();
        let segments: Vec<[usize; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();

        let mut tri = Triangulator::new(&points, &segments, &[], &PlaneSurface).unwrap();
        tri.frontal(&UniformFeatureSize::new(0.25), &FrontalOptions::default())
            .unwrap();
        let mesh = tri.mesh();

        let path = std::env::temp_dir().join("tessella_pipeline_test.vtk");
        tri.write_vtk(&path, VtkSpace::Physical).unwrap();
        let (points3, triangles) = crate::io::vtk::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(points3.len(), mesh.num_points());
        assert_eq!(triangles.len(), mesh.num_triangles());

        // Triangle multisets match up to rotation and ordering.
        let norm = |tris: &[[u32; 3]]| {
            let mut out: Vec<[u32; 3]> = tris
                .iter()
                .map(|t| {
                    let lead = (0..3).min_by_key(|&i| t[i]).unwrap();
                    [t[lead], t[(lead + 1) % 3], t[(lead + 2) % 3]]
                })
                .collect();
            out.sort_unstable();
            out
        };
        assert_eq!(norm(&triangles), norm(&mesh.triangles));
    }
}
