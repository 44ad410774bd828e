//! Geometry Kernel Abstraction
//!
//! This crate provides:
//! - The `GeometryProvider` trait implemented by kernel backends
//! - A labeled shape document describing the product structure of a STEP file
//! - Shape handles, locations and tessellated meshes
//! - Output length units and STL serialization

pub mod document;
pub mod kernel;
pub mod location;
pub mod shape;
#[cfg(feature = "truck")]
mod step;
pub mod stl;
pub mod unit;

// Re-exports for convenience
pub use document::{Label, LabelContent, LabelId, ShapeDocument};
pub use kernel::{
    GeometryProvider, KernelConfig, KernelError, KernelResult, MeshParams, NullKernel,
    TessellatedMesh, default_kernel,
};
#[cfg(feature = "truck")]
pub use kernel::TruckKernel;
pub use location::Location;
pub use shape::{Compound, Shape, ShapeType};
pub use stl::{StlFormat, write_stl};
pub use unit::LengthUnit;
