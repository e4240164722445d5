//! Legacy ASCII VTK 3.0 unstructured-grid support.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

use super::VtkSpace;

/// Save a mesh as a legacy ASCII VTK unstructured grid (cell type 5).
///
/// `space` selects surface coordinates or the parameter domain (with a
/// zero third coordinate).
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P, space: VtkSpace) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut w = BufWriter::new(file);

    writeln!(w, "# vtk DataFile Version 3.0")?;
    writeln!(w, "vtk output")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(w, "POINTS {} float", mesh.num_points())?;
    match space {
        VtkSpace::Physical => {
            for p in &mesh.points {
                writeln!(w, "{:e} {:e} {:e}", p.x, p.y, p.z)?;
            }
        }
        VtkSpace::Parametric => {
            for p in &mesh.params {
                writeln!(w, "{:e} {:e} {:e}", p.x, p.y, 0.0)?;
            }
        }
    }

    let nt = mesh.num_triangles();
    writeln!(w, "CELLS {} {}", nt, 4 * nt)?;
    for t in &mesh.triangles {
        writeln!(w, "3 {} {} {}", t[0], t[1], t[2])?;
    }

    writeln!(w, "CELL_TYPES {}", nt)?;
    for _ in 0..nt {
        writeln!(w, "5")?;
    }
    w.flush()?;
    Ok(())
}

/// Load points and triangles from a legacy ASCII VTK unstructured grid.
///
/// Only the dialect [`save`] writes is supported: triangle cells in an
/// ASCII `UNSTRUCTURED_GRID` dataset.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(Vec<Point3<f64>>, Vec<[u32; 3]>)> {
    let path = path.as_ref();
    let bad = |message: &str| MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let mut header = Vec::new();
    for _ in 0..4 {
        match lines.next() {
            Some(line) => header.push(line?),
            None => return Err(bad("truncated header")),
        }
    }
    if !header[0].starts_with("# vtk DataFile") {
        return Err(bad("not a VTK data file"));
    }
    if header[2].trim() != "ASCII" {
        return Err(bad("only ASCII files are supported"));
    }
    if header[3].trim() != "DATASET UNSTRUCTURED_GRID" {
        return Err(bad("only UNSTRUCTURED_GRID datasets are supported"));
    }

    // POINTS n <type>
    let points_line = lines.next().ok_or_else(|| bad("missing POINTS"))??;
    let mut fields = points_line.split_whitespace();
    if fields.next() != Some("POINTS") {
        return Err(bad("expected POINTS"));
    }
    let n: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| bad("malformed POINTS count"))?;

    let mut coords: Vec<f64> = Vec::with_capacity(3 * n);
    while coords.len() < 3 * n {
        let line = lines.next().ok_or_else(|| bad("truncated point data"))??;
        for tok in line.split_whitespace() {
            coords.push(tok.parse().map_err(|_| bad("malformed coordinate"))?);
        }
    }
    if coords.len() != 3 * n {
        return Err(bad("surplus point data"));
    }
    let points = coords
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();

    // CELLS n size
    let cells_line = lines.next().ok_or_else(|| bad("missing CELLS"))??;
    let mut fields = cells_line.split_whitespace();
    if fields.next() != Some("CELLS") {
        return Err(bad("expected CELLS"));
    }
    let nt: usize = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| bad("malformed CELLS count"))?;

    let mut triangles = Vec::with_capacity(nt);
    for _ in 0..nt {
        let line = lines.next().ok_or_else(|| bad("truncated cell data"))??;
        let ids: Vec<u32> = line
            .split_whitespace()
            .map(|t| t.parse().map_err(|_| bad("malformed connectivity")))
            .collect::<Result<_>>()?;
        if ids.len() != 4 || ids[0] != 3 {
            return Err(bad("only triangle cells are supported"));
        }
        if ids[1..].iter().any(|&v| v as usize >= n) {
            return Err(bad("connectivity references a missing point"));
        }
        triangles.push([ids[1], ids[2], ids[3]]);
    }

    Ok((points, triangles))
}
