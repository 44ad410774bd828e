//! Length unit detection

use super::index::{EntityIndex, arg_enum, arg_name, arg_real, arg_ref, arg_refs, args};

const MAX_CONVERSION_DEPTH: usize = 8;

/// Size of the file's length unit in millimeters
///
/// The unit assigned by a `GLOBAL_UNIT_ASSIGNED_CONTEXT` wins; otherwise the
/// first `LENGTH_UNIT` instance of the file is used. Returns `None` when no
/// length unit can be resolved.
pub fn length_unit_millimeters(index: &EntityIndex) -> Option<f64> {
    let assigned = index
        .instances_of("GLOBAL_UNIT_ASSIGNED_CONTEXT")
        .flat_map(|(_, record)| arg_refs(record, 0))
        .find(|unit| index.has(*unit, "LENGTH_UNIT"));

    let unit = assigned.or_else(|| index.instances_of("LENGTH_UNIT").map(|(id, _)| id).next())?;
    unit_millimeters(index, unit, 0)
}

fn unit_millimeters(index: &EntityIndex, unit: u64, depth: usize) -> Option<f64> {
    if depth > MAX_CONVERSION_DEPTH {
        tracing::warn!("Unit conversion chain too deep at #{}", unit);
        return None;
    }

    if let Some(si) = index.record(unit, "SI_UNIT") {
        let name = arg_enum(si, 1)?;
        if !name.eq_ignore_ascii_case("METRE") {
            tracing::warn!("Unsupported SI length unit '{}' (#{})", name, unit);
            return None;
        }
        let prefix = arg_enum(si, 0).map_or(Some(1.0), si_prefix)?;
        return Some(1000.0 * prefix);
    }

    if let Some(conversion) = index.record(unit, "CONVERSION_BASED_UNIT") {
        let factor = arg_ref(conversion, 1)?;
        let measure = index
            .records(factor)
            .iter()
            .copied()
            .find(|r| r.name.to_uppercase().ends_with("MEASURE_WITH_UNIT") && args(r).len() >= 2)?;
        let value = arg_real(measure, 0)?;
        let base = unit_millimeters(index, arg_ref(measure, 1)?, depth + 1)?;
        tracing::debug!(
            "Conversion based unit '{}' = {} mm",
            arg_name(conversion, 0).unwrap_or_default(),
            value * base
        );
        return Some(value * base);
    }

    tracing::warn!("Unrecognized length unit #{}", unit);
    None
}

fn si_prefix(prefix: &str) -> Option<f64> {
    let factor = match prefix.to_uppercase().as_str() {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        _ => return None,
    };
    Some(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use truck_stepio::r#in::ruststep::parser::parse;

    fn millimeters(entities: &str) -> Option<f64> {
        let text = format!(
            "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\n\
             FILE_NAME('t.step','',(''),(''),'','','');\n\
             FILE_SCHEMA(('AUTOMOTIVE_DESIGN'));\nENDSEC;\nDATA;\n{entities}ENDSEC;\n\
             END-ISO-10303-21;\n"
        );
        let exchange = parse(&text).unwrap();
        let index = EntityIndex::new(&exchange.data[0]);
        length_unit_millimeters(&index)
    }

    #[test]
    fn test_si_prefixes() {
        let mm = millimeters("#1=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.));\n");
        assert_relative_eq!(mm.unwrap(), 1.0);

        let m = millimeters("#1=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT($,.METRE.));\n");
        assert_relative_eq!(m.unwrap(), 1000.0);

        let cm = millimeters("#1=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.CENTI.,.METRE.));\n");
        assert_relative_eq!(cm.unwrap(), 10.0);
    }

    #[test]
    fn test_conversion_based_inch() {
        let inch = millimeters(
            "#1=(CONVERSION_BASED_UNIT('INCH',#2)LENGTH_UNIT()NAMED_UNIT(#4));\n\
             #2=LENGTH_MEASURE_WITH_UNIT(LENGTH_MEASURE(25.4),#3);\n\
             #3=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.));\n\
             #4=DIMENSIONAL_EXPONENTS(1.,0.,0.,0.,0.,0.,0.);\n",
        );
        assert_relative_eq!(inch.unwrap(), 25.4);
    }

    #[test]
    fn test_assigned_context_wins() {
        let mm = millimeters(
            "#1=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT($,.METRE.));\n\
             #2=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.));\n\
             #3=(GEOMETRIC_REPRESENTATION_CONTEXT(3)GLOBAL_UNIT_ASSIGNED_CONTEXT((#2))\
             REPRESENTATION_CONTEXT('',''));\n",
        );
        assert_relative_eq!(mm.unwrap(), 1.0);
    }

    #[test]
    fn test_missing_unit() {
        assert!(millimeters("#1=CARTESIAN_POINT('',(0.,0.,0.));\n").is_none());
    }
}
