//! Truck-based geometry kernel implementation
//!
//! STEP geometry is decoded by `truck-stepio` and triangulated by
//! `truck-meshalgo`. Product structure and units come from the `step` module.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::DVec3;
use parking_lot::Mutex;
use truck_meshalgo::prelude::*;
use truck_polymesh::PolygonMesh;
use truck_stepio::r#in::Table;
use truck_stepio::r#in::ruststep;
use uuid::Uuid;

use super::traits::*;
use crate::document::{LabelContent, LabelId, ShapeDocument};
use crate::location::Location;
use crate::shape::{Compound, Shape, ShapeType};
use crate::step::{EntityIndex, ItemKind, ProductTree, ShapeItem, length_unit_millimeters};
use crate::unit::LengthUnit;

/// Geometry registered by `read_step`
struct StoredShape {
    table: Arc<Table>,
    shells: Vec<u64>,
    /// File units to output units
    scale: f64,
}

/// Truck-based geometry kernel
pub struct TruckKernel {
    config: KernelConfig,
    /// Storage for shapes (keyed by UUID)
    shapes: Mutex<HashMap<Uuid, StoredShape>>,
}

impl TruckKernel {
    /// Create a new truck kernel
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            shapes: Mutex::new(HashMap::new()),
        }
    }

    /// Register geometry and return a handle to it
    fn store(
        &self,
        table: &Arc<Table>,
        scale: f64,
        shells: Vec<u64>,
        shape_type: ShapeType,
    ) -> Shape {
        let id = Uuid::new_v4();
        self.shapes.lock().insert(
            id,
            StoredShape {
                table: Arc::clone(table),
                shells,
                scale,
            },
        );
        Shape::new(id, shape_type)
    }

    /// Label content for the geometric items of a definition
    fn item_content(
        &self,
        table: &Arc<Table>,
        scale: f64,
        items: &[ShapeItem],
    ) -> LabelContent {
        match items {
            [] => LabelContent::Empty,
            [item] => {
                let shape_type = match item.kind {
                    ItemKind::Solid => ShapeType::Solid,
                    ItemKind::Shell => ShapeType::Shell,
                };
                LabelContent::Shape(self.store(table, scale, item.shells.clone(), shape_type))
            }
            _ => {
                let shells = items.iter().flat_map(|i| i.shells.iter().copied()).collect();
                LabelContent::Shape(self.store(table, scale, shells, ShapeType::Compound))
            }
        }
    }

    /// Convert the product tree into a labeled document
    fn build_document(&self, tree: &ProductTree, table: &Arc<Table>, scale: f64) -> ShapeDocument {
        let mut doc = ShapeDocument::new();

        for item in &tree.loose_items {
            let content = self.item_content(table, scale, std::slice::from_ref(item));
            let label = doc.add_label(item.name.clone(), content);
            doc.add_free_shape(label);
        }

        // One label per definition first so occurrences can refer to any of them
        let labels: Vec<LabelId> = tree
            .definitions
            .iter()
            .map(|definition| {
                let content = if definition.components.is_empty() {
                    self.item_content(table, scale, &definition.items)
                } else {
                    if !definition.items.is_empty() {
                        tracing::warn!(
                            "Ignoring {} geometric items of assembly #{}",
                            definition.items.len(),
                            definition.entity
                        );
                    }
                    LabelContent::Assembly(Vec::new())
                };
                doc.add_label(definition.name.clone(), content)
            })
            .collect();

        for (definition, &label) in tree.definitions.iter().zip(&labels) {
            for occurrence in &definition.components {
                doc.add_component(
                    label,
                    labels[occurrence.child],
                    occurrence.location,
                    occurrence.name.clone(),
                );
            }
        }

        for &root in &tree.roots {
            doc.add_free_shape(labels[root]);
        }
        doc
    }

    /// Triangulate the shells of one stored shape
    fn tessellate(
        &self,
        stored: &StoredShape,
        location: Location,
        params: &MeshParams,
    ) -> KernelResult<TessellatedMesh> {
        // Tolerance is given in output units, geometry is in file units
        let tolerance = params.linear_deflection / stored.scale;
        let to_output = Location::from_matrix(glam::DMat4::from_scale(DVec3::splat(stored.scale)))
            * location;

        let mut mesh = TessellatedMesh::new();
        for shell_id in &stored.shells {
            let holder = stored.table.shell.get(shell_id).ok_or_else(|| {
                KernelError::Tessellation(format!(
                    "shell #{} is not supported by the STEP decoder",
                    shell_id
                ))
            })?;
            let shell = stored.table.to_compressed_shell(holder).map_err(|e| {
                KernelError::Tessellation(format!("shell #{}: {}", shell_id, e))
            })?;
            let polygon = shell.robust_triangulation(tolerance).to_polygon();
            append_polygon(&mut mesh, &polygon, &to_output);
        }
        Ok(mesh)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

impl GeometryProvider for TruckKernel {
    fn name(&self) -> &str {
        "truck"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn unit(&self) -> LengthUnit {
        self.config.unit
    }

    fn read_step(&self, path: &Path) -> KernelResult<ShapeDocument> {
        let bytes = std::fs::read(path)
            .map_err(|e| KernelError::StepImport(format!("{}: {}", path.display(), e)))?;
        let text = decode_step_text(bytes);

        let exchange = ruststep::parser::parse(&text)
            .map_err(|e| KernelError::StepImport(format!("{}: {}", path.display(), e)))?;
        let data = exchange.data.first().ok_or_else(|| {
            KernelError::StepImport(format!("{}: no data section", path.display()))
        })?;

        let index = EntityIndex::new(data);
        let file_unit = length_unit_millimeters(&index).unwrap_or_else(|| {
            tracing::warn!("No length unit in {}, assuming millimeters", path.display());
            1.0
        });
        let scale = file_unit / self.config.unit.millimeters();
        tracing::debug!(
            "{} entities, file unit {} mm, scale to {} = {}",
            index.len(),
            file_unit,
            self.config.unit,
            scale
        );

        let tree = ProductTree::build(&index);
        let table = Arc::new(Table::from_data_section(data));
        let doc = self.build_document(&tree, &table, scale);

        tracing::info!(
            "Read {} labels ({} free) from {}",
            doc.len(),
            doc.free_shapes().len(),
            path.display()
        );
        Ok(doc)
    }

    fn mesh(&self, compound: &mut Compound, params: &MeshParams) -> KernelResult<()> {
        params.validate()?;
        // robust_triangulation takes a single chordal tolerance
        tracing::debug!(
            "Meshing {} shapes, linear {} {}, angular {} rad (not used by truck)",
            compound.len(),
            params.linear_deflection,
            self.config.unit,
            params.angular_deflection
        );

        let mut mesh = TessellatedMesh::new();
        {
            let shapes = self.shapes.lock();
            for shape in compound.shapes() {
                let stored = shapes.get(&shape.id).ok_or(KernelError::ShapeNotFound)?;
                mesh.append(&self.tessellate(stored, shape.location(), params)?);
            }
        }

        tracing::info!(
            "Tessellated {} shapes into {} triangles",
            compound.len(),
            mesh.triangle_count()
        );
        compound.set_triangulation(mesh);
        Ok(())
    }
}

/// Decode exchange file text, falling back to ISO-8859-1 for non UTF-8 bytes
///
/// Plain STEP text is ASCII but many writers put raw Latin-1 into names.
fn decode_step_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        tracing::debug!("File is not valid UTF-8, decoding as ISO-8859-1");
        e.into_bytes().iter().map(|&b| char::from(b)).collect()
    })
}

/// Append a truck polygon mesh, placing its positions with `location`
fn append_polygon(mesh: &mut TessellatedMesh, polygon: &PolygonMesh, location: &Location) {
    let offset = mesh.vertices.len() as u32;

    for pos in polygon.positions() {
        let p = location.transform_point(DVec3::new(pos.x, pos.y, pos.z));
        mesh.vertices.push(p.as_vec3().into());
    }

    for face in polygon.tri_faces() {
        mesh.indices.extend([
            face[0].pos as u32 + offset,
            face[1].pos as u32 + offset,
            face[2].pos as u32 + offset,
        ]);
    }

    // Split quads along their first diagonal
    for quad in polygon.quad_faces() {
        mesh.indices.extend([
            quad[0].pos as u32 + offset,
            quad[1].pos as u32 + offset,
            quad[2].pos as u32 + offset,
            quad[0].pos as u32 + offset,
            quad[2].pos as u32 + offset,
            quad[3].pos as u32 + offset,
        ]);
    }
}
