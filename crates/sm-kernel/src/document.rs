//! Labeled shape document
//!
//! A `ShapeDocument` is the product structure read from a STEP file: a tree of
//! labels where assemblies list component labels, components reference the
//! definition they instantiate, and leaf definitions carry a shape.

use crate::location::Location;
use crate::shape::Shape;

/// Index of a label inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub usize);

/// What a label holds
#[derive(Debug, Clone, PartialEq)]
pub enum LabelContent {
    /// An instance of another label (the referred definition)
    Reference(LabelId),
    /// An assembly listing its component labels in file order
    Assembly(Vec<LabelId>),
    /// A leaf definition carrying geometry
    Shape(Shape),
    /// A definition without geometry
    Empty,
}

/// A node of the shape document
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Explicit name, if the file provides one
    pub name: Option<String>,
    /// Placement relative to the parent label
    pub location: Location,
    /// Label content
    pub content: LabelContent,
}

/// Tree of labels produced by reading a STEP file
#[derive(Debug, Clone, Default)]
pub struct ShapeDocument {
    labels: Vec<Label>,
    free: Vec<LabelId>,
}

impl ShapeDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label and return its id
    pub fn add_label(&mut self, name: Option<String>, content: LabelContent) -> LabelId {
        let id = LabelId(self.labels.len());
        self.labels.push(Label {
            name: name.filter(|n| !n.is_empty()),
            location: Location::identity(),
            content,
        });
        id
    }

    /// Add a leaf definition carrying `shape`
    pub fn add_shape(&mut self, name: Option<String>, shape: Shape) -> LabelId {
        self.add_label(name, LabelContent::Shape(shape))
    }

    /// Add an assembly definition without components
    pub fn add_assembly(&mut self, name: Option<String>) -> LabelId {
        self.add_label(name, LabelContent::Assembly(Vec::new()))
    }

    /// Add a component to `assembly` instantiating `referred` at `location`
    ///
    /// Returns `None` if `assembly` is not an assembly label.
    pub fn add_component(
        &mut self,
        assembly: LabelId,
        referred: LabelId,
        location: Location,
        name: Option<String>,
    ) -> Option<LabelId> {
        if !matches!(
            self.labels.get(assembly.0).map(|l| &l.content),
            Some(LabelContent::Assembly(_))
        ) {
            return None;
        }

        let component = self.add_label(name, LabelContent::Reference(referred));
        self.labels[component.0].location = location;
        if let LabelContent::Assembly(components) = &mut self.labels[assembly.0].content {
            components.push(component);
        }
        Some(component)
    }

    /// Mark a label as a top-level (free) shape
    pub fn add_free_shape(&mut self, label: LabelId) {
        if !self.free.contains(&label) {
            self.free.push(label);
        }
    }

    /// Top-level labels in file order
    pub fn free_shapes(&self) -> &[LabelId] {
        &self.free
    }

    /// Look up a label
    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(id.0)
    }

    /// Number of labels in the document
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Check whether a label is an instance of another label
    pub fn is_reference(&self, id: LabelId) -> bool {
        matches!(
            self.label(id).map(|l| &l.content),
            Some(LabelContent::Reference(_))
        )
    }

    /// Resolve an instance to its referred definition
    pub fn referred(&self, id: LabelId) -> Option<LabelId> {
        match self.label(id)?.content {
            LabelContent::Reference(target) => Some(target),
            _ => None,
        }
    }

    /// Explicit name of a label
    pub fn name(&self, id: LabelId) -> Option<&str> {
        self.label(id)?.name.as_deref()
    }

    /// Local placement of a label (identity for unknown labels)
    pub fn location(&self, id: LabelId) -> Location {
        self.label(id).map(|l| l.location).unwrap_or_default()
    }

    /// Component labels of an assembly
    pub fn components(&self, id: LabelId) -> Option<&[LabelId]> {
        match &self.label(id)?.content {
            LabelContent::Assembly(components) => Some(components),
            _ => None,
        }
    }

    /// Geometry of a leaf definition
    pub fn shape(&self, id: LabelId) -> Option<&Shape> {
        match &self.label(id)?.content {
            LabelContent::Shape(shape) => Some(shape),
            _ => None,
        }
    }
}
