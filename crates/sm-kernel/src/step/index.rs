//! Entity lookup over a parsed STEP data section

use std::collections::BTreeMap;

use glam::DVec3;
use truck_stepio::r#in::ruststep::ast::{DataSection, EntityInstance, Name, Parameter, Record};

use crate::location::Location;

/// Records of every entity instance, keyed by instance id
///
/// Simple instances hold one record; complex instances hold one record per
/// partial entity, in file order.
pub struct EntityIndex<'a> {
    entities: BTreeMap<u64, Vec<&'a Record>>,
}

impl<'a> EntityIndex<'a> {
    pub fn new(data: &'a DataSection) -> Self {
        let mut entities = BTreeMap::new();
        for instance in &data.entities {
            match instance {
                EntityInstance::Simple { id, record } => {
                    entities.insert(*id, vec![record]);
                }
                EntityInstance::Complex { id, subsuper } => {
                    entities.insert(*id, subsuper.0.iter().collect());
                }
            }
        }
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// All records of an instance
    pub fn records(&self, id: u64) -> &[&'a Record] {
        self.entities.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Check whether an instance is a complex (multi-record) entity
    pub fn is_complex(&self, id: u64) -> bool {
        self.records(id).len() > 1
    }

    /// The record of an instance with the given keyword (case-insensitive)
    pub fn record(&self, id: u64, keyword: &str) -> Option<&'a Record> {
        self.records(id)
            .iter()
            .copied()
            .find(|r| r.name.eq_ignore_ascii_case(keyword))
    }

    pub fn has(&self, id: u64, keyword: &str) -> bool {
        self.record(id, keyword).is_some()
    }

    /// The first record of an instance, whatever its keyword
    pub fn first(&self, id: u64) -> Option<&'a Record> {
        self.records(id).first().copied()
    }

    /// Instances carrying a record with the given keyword, in id order
    pub fn instances_of<'s>(
        &'s self,
        keyword: &'s str,
    ) -> impl Iterator<Item = (u64, &'a Record)> + 's {
        self.entities.iter().filter_map(move |(id, records)| {
            records
                .iter()
                .copied()
                .find(|r| r.name.eq_ignore_ascii_case(keyword))
                .map(|r| (*id, r))
        })
    }

    /// Resolve a `CARTESIAN_POINT` or `DIRECTION`
    pub fn vector(&self, id: u64) -> Option<DVec3> {
        let record = self
            .record(id, "CARTESIAN_POINT")
            .or_else(|| self.record(id, "DIRECTION"))?;
        let coords = arg_reals(record, 1);
        match coords.as_slice() {
            [x, y, z, ..] => Some(DVec3::new(*x, *y, *z)),
            [x, y] => Some(DVec3::new(*x, *y, 0.0)),
            _ => None,
        }
    }

    /// Resolve an `AXIS2_PLACEMENT_3D` into a location
    ///
    /// Omitted axis and reference directions default to +Z and +X.
    pub fn placement(&self, id: u64) -> Option<Location> {
        let record = self.record(id, "AXIS2_PLACEMENT_3D")?;
        let origin = arg_ref(record, 1).and_then(|p| self.vector(p))?;
        let axis = arg_ref(record, 2)
            .and_then(|d| self.vector(d))
            .unwrap_or(DVec3::Z);
        let ref_direction = arg_ref(record, 3)
            .and_then(|d| self.vector(d))
            .unwrap_or(DVec3::X);
        Some(Location::from_axis_placement(origin, axis, ref_direction))
    }
}

/// Positional attributes of a record
pub fn args(record: &Record) -> &[Parameter] {
    match &record.parameter {
        Parameter::List(items) => items,
        _ => &[],
    }
}

fn strip_typed(param: &Parameter) -> &Parameter {
    match param {
        Parameter::Typed { parameter, .. } => strip_typed(parameter),
        other => other,
    }
}

fn param_ref(param: &Parameter) -> Option<u64> {
    match strip_typed(param) {
        Parameter::Ref(Name::Entity(id)) => Some(*id),
        _ => None,
    }
}

fn param_real(param: &Parameter) -> Option<f64> {
    match strip_typed(param) {
        Parameter::Real(v) => Some(*v),
        Parameter::Integer(v) => Some(*v as f64),
        _ => None,
    }
}

/// Entity reference at position `i`
pub fn arg_ref(record: &Record, i: usize) -> Option<u64> {
    args(record).get(i).and_then(param_ref)
}

/// Entity references of the list at position `i`
pub fn arg_refs(record: &Record, i: usize) -> Vec<u64> {
    match args(record).get(i).map(strip_typed) {
        Some(Parameter::List(items)) => items.iter().filter_map(param_ref).collect(),
        _ => Vec::new(),
    }
}

/// Check whether position `i` holds a list
pub fn arg_is_list(record: &Record, i: usize) -> bool {
    matches!(args(record).get(i).map(strip_typed), Some(Parameter::List(_)))
}

/// String attribute at position `i`
pub fn arg_str(record: &Record, i: usize) -> Option<&str> {
    match args(record).get(i).map(strip_typed) {
        Some(Parameter::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Non-blank string attribute at position `i`
pub fn arg_name(record: &Record, i: usize) -> Option<String> {
    arg_str(record, i)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numeric attribute at position `i`, looking through typed measures
pub fn arg_real(record: &Record, i: usize) -> Option<f64> {
    args(record).get(i).and_then(param_real)
}

/// Numeric values of the list at position `i`
pub fn arg_reals(record: &Record, i: usize) -> Vec<f64> {
    match args(record).get(i).map(strip_typed) {
        Some(Parameter::List(items)) => items.iter().filter_map(param_real).collect(),
        _ => Vec::new(),
    }
}

/// Enumeration value at position `i`, without the surrounding dots
pub fn arg_enum(record: &Record, i: usize) -> Option<&str> {
    match args(record).get(i).map(strip_typed) {
        Some(Parameter::Enumeration(e)) => Some(e.trim_matches('.')),
        _ => None,
    }
}
