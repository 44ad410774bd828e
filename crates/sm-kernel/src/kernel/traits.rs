//! Geometry provider trait definitions
//!
//! These traits define the interface that all kernel backends must implement.

use std::path::Path;

use thiserror::Error;

use crate::document::ShapeDocument;
use crate::shape::Compound;
use crate::stl::{self, StlFormat};
use crate::unit::LengthUnit;

/// Error type for kernel operations
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("STEP import failed: {0}")]
    StepImport(String),

    #[error("Could not set unit '{0}'")]
    InvalidUnit(String),

    #[error("Tessellation failed: {0}")]
    Tessellation(String),

    #[error("Shape not found in kernel storage")]
    ShapeNotFound,

    #[error("STL export failed: {0}")]
    StlWrite(String),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// Kernel settings fixed at construction time
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelConfig {
    /// Unit all output coordinates and deflections are expressed in
    pub unit: LengthUnit,
}

/// Tessellation tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    /// Maximum chordal distance between mesh and surface, in output units
    pub linear_deflection: f64,
    /// Maximum angle between adjacent mesh normals, in radians
    pub angular_deflection: f64,
}

impl MeshParams {
    /// Create parameters from an angular deflection given in degrees
    pub fn from_degrees(linear_deflection: f64, angular_deflection_degrees: f64) -> Self {
        Self {
            linear_deflection,
            angular_deflection: angular_deflection_degrees.to_radians(),
        }
    }

    /// Check that both tolerances are usable
    pub fn validate(&self) -> KernelResult<()> {
        if !(self.linear_deflection.is_finite() && self.linear_deflection > 0.0) {
            return Err(KernelError::Tessellation(format!(
                "linear deflection must be positive, got {}",
                self.linear_deflection
            )));
        }
        if !(self.angular_deflection.is_finite() && self.angular_deflection > 0.0) {
            return Err(KernelError::Tessellation(format!(
                "angular deflection must be positive, got {}",
                self.angular_deflection
            )));
        }
        Ok(())
    }
}

/// A tessellated mesh output from the kernel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh {
    /// Vertex positions (3 floats per vertex)
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices (3 indices per triangle)
    pub indices: Vec<u32>,
}

impl TessellatedMesh {
    /// Create an empty tessellated mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, re-basing its indices
    pub fn append(&mut self, other: &TessellatedMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Iterate over triangle corner positions
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.vertices.get(tri[0] as usize)?,
                *self.vertices.get(tri[1] as usize)?,
                *self.vertices.get(tri[2] as usize)?,
            ])
        })
    }
}

/// The geometry provider trait
///
/// Implementations read STEP files into a labeled shape document, tessellate
/// compounds of shapes they created, and serialize the result as STL.
///
/// Precondition: a provider is configured once at construction (see
/// `KernelConfig`) before any other call; the unit never changes afterwards.
pub trait GeometryProvider {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Output unit for coordinates and deflections
    fn unit(&self) -> LengthUnit;

    /// Read a STEP file into a labeled shape document
    ///
    /// # Arguments
    /// * `path` - Path to the STEP file
    fn read_step(&self, path: &Path) -> KernelResult<ShapeDocument>;

    /// Tessellate all shapes of a compound and attach the result to it
    ///
    /// Backends whose mesher takes a single chordal tolerance may validate the
    /// angular deflection without applying it.
    ///
    /// # Arguments
    /// * `compound` - The compound to mesh; its triangulation is replaced
    /// * `params` - Deflection tolerances (angular in radians)
    fn mesh(&self, compound: &mut Compound, params: &MeshParams) -> KernelResult<()>;

    /// Write the triangulation attached to a compound as STL
    ///
    /// # Arguments
    /// * `compound` - A compound previously passed to `mesh`
    /// * `path` - Output file path
    /// * `format` - Binary or ASCII encoding
    fn write_stl(&self, compound: &Compound, path: &Path, format: StlFormat) -> KernelResult<()> {
        let mesh = compound
            .triangulation()
            .ok_or_else(|| KernelError::StlWrite("shape has no triangulation".into()))?;
        stl::write_stl(mesh, path, format)
    }
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel {
    config: KernelConfig,
}

impl NullKernel {
    pub fn new(config: KernelConfig) -> Self {
        Self { config }
    }
}

impl GeometryProvider for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn unit(&self) -> LengthUnit {
        self.config.unit
    }

    fn read_step(&self, _path: &Path) -> KernelResult<ShapeDocument> {
        Err(KernelError::KernelNotAvailable(
            "No geometry kernel available for STEP import".into(),
        ))
    }

    fn mesh(&self, _compound: &mut Compound, _params: &MeshParams) -> KernelResult<()> {
        Err(KernelError::KernelNotAvailable(
            "No geometry kernel available".into(),
        ))
    }
}

/// Get the default geometry kernel based on available features
///
/// This is the single initialization point for kernel configuration.
pub fn default_kernel(config: KernelConfig) -> Box<dyn GeometryProvider> {
    tracing::debug!("Initializing geometry kernel with unit {}", config.unit);

    #[cfg(feature = "truck")]
    {
        Box::new(super::TruckKernel::new(config))
    }

    #[cfg(not(feature = "truck"))]
    {
        Box::new(NullKernel::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_degrees_converts_to_radians() {
        let params = MeshParams::from_degrees(0.1, 180.0);
        assert_relative_eq!(params.angular_deflection, std::f64::consts::PI);
        assert_relative_eq!(params.linear_deflection, 0.1);
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        assert!(MeshParams::from_degrees(0.1, 5.0).validate().is_ok());
        assert!(MeshParams::from_degrees(0.0, 5.0).validate().is_err());
        assert!(MeshParams::from_degrees(0.1, -1.0).validate().is_err());
        assert!(MeshParams::from_degrees(f64::NAN, 5.0).validate().is_err());
    }

    #[test]
    fn test_append_rebases_indices() {
        let tri = TessellatedMesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
        };
        let mut mesh = TessellatedMesh::new();
        mesh.append(&tri);
        mesh.append(&tri);

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangles().count(), 2);
    }

    #[test]
    fn test_null_kernel_is_unavailable() {
        let kernel = NullKernel::new(KernelConfig {
            unit: LengthUnit::Inch,
        });
        assert!(!kernel.is_available());
        assert_eq!(kernel.unit(), LengthUnit::Inch);
        assert!(matches!(
            kernel.read_step(Path::new("missing.step")),
            Err(KernelError::KernelNotAvailable(_))
        ));
    }

    #[test]
    fn test_write_requires_triangulation() {
        let kernel = NullKernel::default();
        let dir = tempfile::tempdir().unwrap();
        let result = kernel.write_stl(
            &Compound::new(),
            &dir.path().join("out.stl"),
            StlFormat::Binary,
        );
        assert!(matches!(result, Err(KernelError::StlWrite(_))));
    }
}
