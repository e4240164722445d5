//! Mesh file I/O.
//!
//! The triangulation core speaks one format: legacy ASCII VTK 3.0
//! unstructured grids, the lingua franca of mesh inspection tools.
//! Meshes can be written in surface coordinates or flattened into the
//! parameter domain, and read back for round-tripping.
//!
//! ```no_run
//! use tessella::io::{vtk, VtkSpace};
//! use tessella::mesh::Mesh;
//!
//! let mesh = Mesh::default();
//! vtk::save(&mesh, "mesh.vtk", VtkSpace::Physical).unwrap();
//! let (points, triangles) = vtk::load("mesh.vtk").unwrap();
//! ```

pub mod vtk;

/// Which coordinates a VTK file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VtkSpace {
    /// Surface coordinates `(x, y, z)`.
    #[default]
    Physical,
    /// Parameter coordinates `(u, v, 0)`.
    Parametric,
}
