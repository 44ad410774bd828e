//! Shape handles and compounds

use uuid::Uuid;

use crate::kernel::TessellatedMesh;
use crate::location::Location;

/// Topological type of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// Group of arbitrary shapes
    Compound,
    /// Closed volume bounded by one or more shells
    Solid,
    /// Set of connected faces
    Shell,
}

/// A handle to kernel geometry placed in space
///
/// The geometry itself is stored inside the kernel that created the handle;
/// handles are cheap to clone and never copy geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Identifier of the geometry inside the kernel
    pub id: Uuid,
    shape_type: ShapeType,
    location: Location,
}

impl Shape {
    /// Create a handle with identity location
    pub fn new(id: Uuid, shape_type: ShapeType) -> Self {
        Self {
            id,
            shape_type,
            location: Location::identity(),
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Check if this shape is a solid
    pub fn is_solid(&self) -> bool {
        self.shape_type == ShapeType::Solid
    }

    /// Return a copy of this handle moved by `location`
    ///
    /// The new placement is `location * self.location()`.
    pub fn moved(&self, location: Location) -> Self {
        Self {
            id: self.id,
            shape_type: self.shape_type,
            location: location * self.location,
        }
    }
}

/// An ordered group of shapes with an optional attached triangulation
#[derive(Debug, Clone, Default)]
pub struct Compound {
    shapes: Vec<Shape>,
    triangulation: Option<TessellatedMesh>,
}

impl Compound {
    /// Create an empty compound
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape; the same shape may be added more than once
    pub fn add(&mut self, shape: Shape) {
        self.shapes.push(shape);
        // Existing triangulation no longer covers the content
        self.triangulation = None;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Triangulation attached by the last successful mesh call
    pub fn triangulation(&self) -> Option<&TessellatedMesh> {
        self.triangulation.as_ref()
    }

    /// Attach a triangulation covering all shapes of this compound
    pub fn set_triangulation(&mut self, mesh: TessellatedMesh) {
        self.triangulation = Some(mesh);
    }
}

impl FromIterator<Shape> for Compound {
    fn from_iter<I: IntoIterator<Item = Shape>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().collect(),
            triangulation: None,
        }
    }
}
