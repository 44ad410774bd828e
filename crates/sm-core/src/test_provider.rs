//! In-memory geometry provider for tests

use std::cell::RefCell;
use std::path::Path;

use glam::DVec3;
use sm_kernel::{
    Compound, GeometryProvider, KernelError, KernelResult, LengthUnit, MeshParams, Shape,
    ShapeDocument, ShapeType, TessellatedMesh,
};
use uuid::Uuid;

/// Provider whose solids are single triangles; records the last mesh call
pub struct RecordingProvider {
    solids: Vec<Uuid>,
    fail_read: bool,
    params: RefCell<Option<MeshParams>>,
    compound_len: RefCell<Option<usize>>,
}

impl RecordingProvider {
    pub fn with_solids(count: usize) -> Self {
        Self {
            solids: (0..count).map(|_| Uuid::new_v4()).collect(),
            fail_read: false,
            params: RefCell::new(None),
            compound_len: RefCell::new(None),
        }
    }

    pub fn failing_read() -> Self {
        Self {
            fail_read: true,
            ..Self::with_solids(0)
        }
    }

    /// Document with one unnamed free solid per registered id
    pub fn document(&self) -> ShapeDocument {
        let mut doc = ShapeDocument::new();
        for id in &self.solids {
            let label = doc.add_shape(None, Shape::new(*id, ShapeType::Solid));
            doc.add_free_shape(label);
        }
        doc
    }

    pub fn last_params(&self) -> Option<MeshParams> {
        *self.params.borrow()
    }

    pub fn last_compound_len(&self) -> Option<usize> {
        *self.compound_len.borrow()
    }
}

impl GeometryProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn unit(&self) -> LengthUnit {
        LengthUnit::Millimeter
    }

    fn read_step(&self, path: &Path) -> KernelResult<ShapeDocument> {
        if self.fail_read {
            return Err(KernelError::StepImport(path.display().to_string()));
        }
        Ok(self.document())
    }

    fn mesh(&self, compound: &mut Compound, params: &MeshParams) -> KernelResult<()> {
        *self.params.borrow_mut() = Some(*params);
        *self.compound_len.borrow_mut() = Some(compound.len());
        params.validate()?;

        let mut mesh = TessellatedMesh::new();
        for shape in compound.shapes() {
            if !self.solids.contains(&shape.id) {
                return Err(KernelError::ShapeNotFound);
            }
            let location = shape.location();
            let corners = [DVec3::ZERO, DVec3::X, DVec3::Y];
            mesh.append(&TessellatedMesh {
                vertices: corners
                    .iter()
                    .map(|c| location.transform_point(*c).as_vec3().into())
                    .collect(),
                indices: vec![0, 1, 2],
            });
        }
        compound.set_triangulation(mesh);
        Ok(())
    }
}
