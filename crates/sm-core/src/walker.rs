//! Shape tree flattening
//!
//! Walks the labeled document depth-first and materializes every leaf solid
//! with its accumulated placement and hierarchical name.

use sm_kernel::{LabelId, Location, Shape, ShapeDocument};

/// A solid with its full hierarchical name (e.g. `/Assembly/Part`)
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSolid {
    /// Solid handle moved to its accumulated location
    pub solid: Shape,
    /// Full path of the solid
    pub name: String,
}

/// State carried through the traversal
#[derive(Debug, Clone)]
struct TraversalContext {
    /// Next fallback name for unnamed nodes
    next_id: u32,
    /// Path of the node being visited
    path: String,
    /// Placement of the node being visited
    location: Location,
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self {
            next_id: 1,
            path: String::new(),
            location: Location::identity(),
        }
    }
}

/// Flatten a shape document into its solids, in depth-first order
///
/// Unnamed nodes are named after a counter that advances once per visited node.
/// Leaves that are not solids are skipped.
pub fn flatten(doc: &ShapeDocument) -> Vec<NamedSolid> {
    let mut ctx = TraversalContext::default();
    let mut solids = Vec::new();
    for &label in doc.free_shapes() {
        visit(doc, label, &mut ctx, &mut solids);
    }
    tracing::info!("Found {} solids", solids.len());
    solids
}

fn visit(
    doc: &ShapeDocument,
    label: LabelId,
    ctx: &mut TraversalContext,
    out: &mut Vec<NamedSolid>,
) {
    let definition = doc.referred(label).unwrap_or(label);

    let id = ctx.next_id;
    ctx.next_id += 1;
    let name = doc
        .name(definition)
        .map_or_else(|| id.to_string(), str::to_string);

    let parent_path = ctx.path.len();
    let parent_location = ctx.location;
    ctx.path.push('/');
    ctx.path.push_str(&name);
    ctx.location = parent_location * doc.location(label);

    if let Some(components) = doc.components(definition) {
        for &component in components {
            visit(doc, component, ctx, out);
        }
    } else if let Some(shape) = doc.shape(definition) {
        if shape.is_solid() {
            tracing::debug!("Solid {}", ctx.path);
            out.push(NamedSolid {
                solid: shape.moved(ctx.location),
                name: ctx.path.clone(),
            });
        } else {
            tracing::debug!("Skipping {:?} at {}", shape.shape_type(), ctx.path);
        }
    }

    ctx.path.truncate(parent_path);
    ctx.location = parent_location;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use sm_kernel::{LabelContent, ShapeType};
    use uuid::Uuid;

    fn solid() -> Shape {
        Shape::new(Uuid::new_v4(), ShapeType::Solid)
    }

    fn names(solids: &[NamedSolid]) -> Vec<&str> {
        solids.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_unnamed_top_level_solids() {
        let mut doc = ShapeDocument::new();
        for _ in 0..3 {
            let label = doc.add_shape(None, solid());
            doc.add_free_shape(label);
        }

        let solids = flatten(&doc);
        assert_eq!(names(&solids), vec!["/1", "/2", "/3"]);
    }

    #[test]
    fn test_named_assembly_with_instances() {
        let mut doc = ShapeDocument::new();
        let part = doc.add_shape(Some("Part".into()), solid());
        let asm = doc.add_assembly(Some("Asm".into()));
        let offset = Location::from_translation(DVec3::new(5.0, 0.0, 0.0));
        doc.add_component(asm, part, Location::identity(), Some("Part:1".into()));
        doc.add_component(asm, part, offset, Some("Part:2".into()));
        doc.add_free_shape(asm);

        let solids = flatten(&doc);
        assert_eq!(names(&solids), vec!["/Asm/Part", "/Asm/Part"]);
        assert!(solids[0].solid.location().is_identity());
        assert_eq!(
            solids[1].solid.location().translation(),
            DVec3::new(5.0, 0.0, 0.0)
        );
        assert_eq!(solids[0].solid.id, solids[1].solid.id);
    }

    #[test]
    fn test_locations_accumulate_top_down() {
        let mut doc = ShapeDocument::new();
        let part = doc.add_shape(Some("Part".into()), solid());
        let sub = doc.add_assembly(Some("Sub".into()));
        let top = doc.add_assembly(Some("Top".into()));
        doc.add_component(
            sub,
            part,
            Location::from_translation(DVec3::new(0.0, 1.0, 0.0)),
            None,
        );
        doc.add_component(
            top,
            sub,
            Location::from_translation(DVec3::new(2.0, 0.0, 0.0)),
            None,
        );
        doc.add_free_shape(top);

        let solids = flatten(&doc);
        assert_eq!(names(&solids), vec!["/Top/Sub/Part"]);
        assert_eq!(
            solids[0].solid.location().translation(),
            DVec3::new(2.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_counter_advances_for_every_node() {
        let mut doc = ShapeDocument::new();
        let named = doc.add_shape(Some("Named".into()), solid());
        let unnamed = doc.add_shape(None, solid());
        let asm = doc.add_assembly(None);
        doc.add_component(asm, named, Location::identity(), None);
        doc.add_component(asm, unnamed, Location::identity(), None);
        doc.add_free_shape(asm);

        // asm = 1, Named consumes 2, unnamed = 3
        let solids = flatten(&doc);
        assert_eq!(names(&solids), vec!["/1/Named", "/1/3"]);
    }

    #[test]
    fn test_non_solid_leaves_are_skipped() {
        let mut doc = ShapeDocument::new();
        let shell = doc.add_shape(
            Some("Skin".into()),
            Shape::new(Uuid::new_v4(), ShapeType::Shell),
        );
        let empty = doc.add_label(Some("Nothing".into()), LabelContent::Empty);
        let part = doc.add_shape(Some("Part".into()), solid());
        for label in [shell, empty, part] {
            doc.add_free_shape(label);
        }

        let solids = flatten(&doc);
        assert_eq!(names(&solids), vec!["/Part"]);
    }

    #[test]
    fn test_empty_document() {
        assert!(flatten(&ShapeDocument::new()).is_empty());
    }
}
