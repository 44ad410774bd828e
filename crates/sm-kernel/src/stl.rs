//! STL file writing

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use glam::Vec3;

use crate::kernel::{KernelError, KernelResult, TessellatedMesh};

/// STL encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Binary STL (80 byte header, little endian facets)
    #[default]
    Binary,
    /// ASCII STL
    Ascii,
}

impl StlFormat {
    pub fn name(&self) -> &'static str {
        match self {
            StlFormat::Binary => "stl_bin",
            StlFormat::Ascii => "stl_ascii",
        }
    }

    pub const ALL: &'static [StlFormat] = &[StlFormat::Binary, StlFormat::Ascii];
}

impl fmt::Display for StlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StlFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Write a tessellated mesh as an STL file
///
/// Facet normals are derived from the triangle winding.
pub fn write_stl(
    mesh: &TessellatedMesh,
    path: impl AsRef<Path>,
    format: StlFormat,
) -> KernelResult<()> {
    let path = path.as_ref();

    let triangles = build_triangles(mesh);
    if triangles.is_empty() {
        return Err(KernelError::StlWrite(format!(
            "no triangles to write to {}",
            path.display()
        )));
    }

    let file = File::create(path)
        .map_err(|e| KernelError::StlWrite(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        StlFormat::Binary => stl_io::write_stl(&mut writer, triangles.iter()),
        StlFormat::Ascii => write_ascii(&mut writer, &solid_name(path), &triangles),
    };
    result
        .and_then(|_| writer.flush())
        .map_err(|e| KernelError::StlWrite(format!("{}: {}", path.display(), e)))?;

    tracing::info!(
        "Wrote {} triangles to {} ({})",
        triangles.len(),
        path.display(),
        format
    );
    Ok(())
}

/// Convert indexed triangles to STL facets
fn build_triangles(mesh: &TessellatedMesh) -> Vec<stl_io::Triangle> {
    mesh.triangles()
        .map(|[v0, v1, v2]| {
            let normal = facet_normal(v0, v1, v2);
            stl_io::Triangle {
                normal: stl_io::Normal::new(normal),
                vertices: [
                    stl_io::Vertex::new(v0),
                    stl_io::Vertex::new(v1),
                    stl_io::Vertex::new(v2),
                ],
            }
        })
        .collect()
}

/// Unit normal of a triangle, +Z for degenerate triangles
fn facet_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let (a, b, c) = (Vec3::from(v0), Vec3::from(v1), Vec3::from(v2));
    (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Z).into()
}

fn solid_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.contains(char::is_whitespace))
        .unwrap_or("mesh")
        .to_string()
}

fn write_ascii<W: Write>(
    writer: &mut W,
    name: &str,
    triangles: &[stl_io::Triangle],
) -> std::io::Result<()> {
    writeln!(writer, "solid {name}")?;
    for triangle in triangles {
        let n = &triangle.normal;
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n[0], n[1], n[2])?;
        writeln!(writer, "    outer loop")?;
        for v in &triangle.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v[0], v[1], v[2])?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}
