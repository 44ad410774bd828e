//! Product structure of a STEP file
//!
//! Recovers the assembly tree from `PRODUCT_DEFINITION`s, their shape
//! representations and the `NEXT_ASSEMBLY_USAGE_OCCURRENCE`s that place one
//! definition inside another.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::index::{EntityIndex, arg_is_list, arg_name, arg_ref, arg_refs, args};
use crate::location::Location;

/// Kind of geometric representation item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Closed volume (`MANIFOLD_SOLID_BREP`, `BREP_WITH_VOIDS`, `FACETED_BREP`)
    Solid,
    /// Surface model (`SHELL_BASED_SURFACE_MODEL`)
    Shell,
}

/// A geometric item of a shape representation
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeItem {
    pub entity: u64,
    pub kind: ItemKind,
    /// Shell instances bounding the item
    pub shells: Vec<u64>,
    pub name: Option<String>,
}

/// Placement of a definition inside an assembly
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub entity: u64,
    pub name: Option<String>,
    /// Index of the placed definition in `ProductTree::definitions`
    pub child: usize,
    pub location: Location,
}

/// A product definition with its geometry and components
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub entity: u64,
    pub name: Option<String>,
    pub items: Vec<ShapeItem>,
    pub components: Vec<Occurrence>,
}

/// Product structure of a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductTree {
    /// Definitions in id order
    pub definitions: Vec<Definition>,
    /// Definitions not placed inside any other
    pub roots: Vec<usize>,
    /// Geometry of files without product structure
    pub loose_items: Vec<ShapeItem>,
}

impl ProductTree {
    pub fn build(index: &EntityIndex) -> Self {
        let definition_ids: Vec<u64> = index
            .instances_of("PRODUCT_DEFINITION")
            .map(|(id, _)| id)
            .collect();

        if definition_ids.is_empty() {
            let loose_items = loose_items(index);
            tracing::debug!(
                "No product structure, {} loose geometric items",
                loose_items.len()
            );
            return Self {
                loose_items,
                ..Default::default()
            };
        }

        let slot: HashMap<u64, usize> = definition_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let links = RepresentationLinks::new(index);

        // Shape representations of each definition
        let mut representations: Vec<BTreeSet<u64>> = vec![BTreeSet::new(); definition_ids.len()];
        for (_, sdr) in index.instances_of("SHAPE_DEFINITION_REPRESENTATION") {
            let (Some(pds), Some(rep)) = (arg_ref(sdr, 0), arg_ref(sdr, 1)) else {
                continue;
            };
            let definition = index
                .record(pds, "PRODUCT_DEFINITION_SHAPE")
                .and_then(|r| arg_ref(r, 2))
                .and_then(|d| slot.get(&d));
            if let Some(&i) = definition {
                representations[i].extend(links.group(rep));
            }
        }

        let mut definitions: Vec<Definition> = definition_ids
            .iter()
            .zip(&representations)
            .map(|(&id, reps)| Definition {
                entity: id,
                name: product_name(index, id),
                items: reps
                    .iter()
                    .flat_map(|rep| representation_items(index, *rep))
                    .collect(),
                components: Vec::new(),
            })
            .collect();

        // Dedup items shared by linked representations
        for definition in &mut definitions {
            let mut seen = HashSet::new();
            definition.items.retain(|item| seen.insert(item.entity));
        }

        let placements = occurrence_placements(index);
        let mut placed = vec![false; definitions.len()];
        for (id, nauo) in index.instances_of("NEXT_ASSEMBLY_USAGE_OCCURRENCE") {
            let parent = arg_ref(nauo, 3).and_then(|d| slot.get(&d).copied());
            let child = arg_ref(nauo, 4).and_then(|d| slot.get(&d).copied());
            let (Some(parent), Some(child)) = (parent, child) else {
                tracing::warn!("Skipping occurrence #{} with unknown definitions", id);
                continue;
            };

            let location = match placements.get(&id) {
                Some(&(rep_1, transform)) => {
                    // rep_1 normally belongs to the child; invert when written parent-first
                    if representations[child].contains(&rep_1) {
                        transform
                    } else {
                        transform.inverted()
                    }
                }
                None => Location::identity(),
            };

            placed[child] = true;
            definitions[parent].components.push(Occurrence {
                entity: id,
                name: arg_name(nauo, 1).or_else(|| arg_name(nauo, 0)),
                child,
                location,
            });
        }

        break_cycles(&mut definitions);

        let roots = (0..definitions.len()).filter(|i| !placed[*i]).collect();
        Self {
            definitions,
            roots,
            loose_items: Vec::new(),
        }
    }
}

/// Representations joined by plain `SHAPE_REPRESENTATION_RELATIONSHIP`s
struct RepresentationLinks {
    edges: HashMap<u64, Vec<u64>>,
}

impl RepresentationLinks {
    fn new(index: &EntityIndex) -> Self {
        let mut edges: HashMap<u64, Vec<u64>> = HashMap::new();
        for (id, srr) in index.instances_of("SHAPE_REPRESENTATION_RELATIONSHIP") {
            // Complex instances carry a transformation and place an occurrence
            if index.is_complex(id) {
                continue;
            }
            if let (Some(a), Some(b)) = (arg_ref(srr, 2), arg_ref(srr, 3)) {
                edges.entry(a).or_default().push(b);
                edges.entry(b).or_default().push(a);
            }
        }
        Self { edges }
    }

    /// All representations reachable from `rep`, itself included
    fn group(&self, rep: u64) -> BTreeSet<u64> {
        let mut group = BTreeSet::from([rep]);
        let mut todo = vec![rep];
        while let Some(current) = todo.pop() {
            for &next in self.edges.get(&current).into_iter().flatten() {
                if group.insert(next) {
                    todo.push(next);
                }
            }
        }
        group
    }
}

/// Name of the product a definition belongs to
fn product_name(index: &EntityIndex, definition: u64) -> Option<String> {
    let formation = index
        .record(definition, "PRODUCT_DEFINITION")
        .and_then(|r| arg_ref(r, 2))?;
    let product = index.first(formation).and_then(|r| arg_ref(r, 2))?;
    let product = index.record(product, "PRODUCT")?;
    arg_name(product, 1).or_else(|| arg_name(product, 0))
}

/// Geometric items listed by a representation
fn representation_items(index: &EntityIndex, rep: u64) -> Vec<ShapeItem> {
    let Some(record) = index.records(rep).iter().copied().find(|r| {
        r.name.to_uppercase().ends_with("REPRESENTATION") && arg_is_list(r, 1)
    }) else {
        return Vec::new();
    };

    arg_refs(record, 1)
        .into_iter()
        .filter_map(|item| shape_item(index, item))
        .collect()
}

/// Classify a representation item, `None` for non-geometric items
fn shape_item(index: &EntityIndex, id: u64) -> Option<ShapeItem> {
    let record = index.first(id)?;
    let (kind, shells) = match record.name.to_uppercase().as_str() {
        "MANIFOLD_SOLID_BREP" | "FACETED_BREP" => {
            (ItemKind::Solid, arg_ref(record, 1).into_iter().collect())
        }
        "BREP_WITH_VOIDS" => {
            let mut shells: Vec<u64> = arg_ref(record, 1).into_iter().collect();
            shells.extend(arg_refs(record, 2));
            (ItemKind::Solid, shells)
        }
        "SHELL_BASED_SURFACE_MODEL" => (ItemKind::Shell, arg_refs(record, 1)),
        "AXIS2_PLACEMENT_3D" => return None,
        other => {
            tracing::debug!("Ignoring representation item #{} ({})", id, other);
            return None;
        }
    };

    Some(ShapeItem {
        entity: id,
        kind,
        shells,
        name: arg_name(record, 0),
    })
}

/// Every geometric item of the file, in id order
fn loose_items(index: &EntityIndex) -> Vec<ShapeItem> {
    const KEYWORDS: [&str; 4] = [
        "MANIFOLD_SOLID_BREP",
        "BREP_WITH_VOIDS",
        "FACETED_BREP",
        "SHELL_BASED_SURFACE_MODEL",
    ];

    let ids: BTreeSet<u64> = KEYWORDS
        .iter()
        .flat_map(|kw| index.instances_of(kw).map(|(id, _)| id))
        .collect();
    ids.into_iter()
        .filter_map(|id| shape_item(index, id))
        .collect()
}

/// Transform of each occurrence, keyed by `NEXT_ASSEMBLY_USAGE_OCCURRENCE` id
///
/// The value holds the relationship's first representation and
/// `T(item_2) * T(item_1)^-1`.
fn occurrence_placements(index: &EntityIndex) -> HashMap<u64, (u64, Location)> {
    let mut placements = HashMap::new();
    for (id, cdsr) in index.instances_of("CONTEXT_DEPENDENT_SHAPE_REPRESENTATION") {
        let (Some(relation), Some(pds)) = (arg_ref(cdsr, 0), arg_ref(cdsr, 1)) else {
            continue;
        };
        let Some(occurrence) = index
            .record(pds, "PRODUCT_DEFINITION_SHAPE")
            .and_then(|r| arg_ref(r, 2))
        else {
            continue;
        };

        let rep_1 = index
            .records(relation)
            .iter()
            .find(|r| {
                r.name.eq_ignore_ascii_case("REPRESENTATION_RELATIONSHIP") && args(r).len() >= 4
            })
            .and_then(|r| arg_ref(r, 2));
        let transform = index
            .record(relation, "REPRESENTATION_RELATIONSHIP_WITH_TRANSFORMATION")
            .and_then(|r| arg_ref(r, 0))
            .and_then(|t| item_defined_transformation(index, t));

        match (rep_1, transform) {
            (Some(rep_1), Some(transform)) => {
                placements.insert(occurrence, (rep_1, transform));
            }
            _ => tracing::warn!("Unsupported occurrence placement #{}", id),
        }
    }
    placements
}

fn item_defined_transformation(index: &EntityIndex, id: u64) -> Option<Location> {
    let record = index.record(id, "ITEM_DEFINED_TRANSFORMATION")?;
    let from = index.placement(arg_ref(record, 2)?)?;
    let to = index.placement(arg_ref(record, 3)?)?;
    Some(to * from.inverted())
}

/// Drop occurrences that would place a definition inside itself
fn break_cycles(definitions: &mut [Definition]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(definitions: &mut [Definition], marks: &mut [Mark], node: usize) {
        marks[node] = Mark::Active;
        let mut i = 0;
        while i < definitions[node].components.len() {
            let child = definitions[node].components[i].child;
            match marks[child] {
                Mark::Active => {
                    let removed = definitions[node].components.remove(i);
                    tracing::warn!("Dropping cyclic occurrence #{}", removed.entity);
                    continue;
                }
                Mark::New => visit(definitions, marks, child),
                Mark::Done => {}
            }
            i += 1;
        }
        marks[node] = Mark::Done;
    }

    let mut marks = vec![Mark::New; definitions.len()];
    for node in 0..definitions.len() {
        if marks[node] == Mark::New {
            visit(definitions, &mut marks, node);
        }
    }
}
