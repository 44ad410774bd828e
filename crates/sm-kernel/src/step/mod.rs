//! STEP exchange structure decoding for the truck backend
//!
//! Geometry (faces, shells) is converted by `truck-stepio`; this module only
//! recovers what truck does not model: product structure, occurrence
//! placements and the file's length unit.

pub mod assembly;
pub mod index;
pub mod units;

pub use assembly::{ItemKind, ProductTree, ShapeItem};
pub use index::EntityIndex;
pub use units::length_unit_millimeters;
