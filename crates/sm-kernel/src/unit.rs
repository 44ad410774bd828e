//! Output length units

use std::fmt;
use std::str::FromStr;

use crate::kernel::KernelError;

/// Length unit the kernel writes coordinates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    /// Inches
    Inch,
    /// Millimeters
    #[default]
    Millimeter,
    /// Feet
    Foot,
    /// Statute miles
    Mile,
    /// Meters
    Meter,
    /// Kilometers
    Kilometer,
    /// Thousandths of an inch
    Mil,
    /// Micrometers
    Micrometer,
    /// Centimeters
    Centimeter,
    /// Millionths of an inch
    Microinch,
}

impl LengthUnit {
    /// Size of one unit in millimeters
    pub fn millimeters(&self) -> f64 {
        match self {
            LengthUnit::Inch => 25.4,
            LengthUnit::Millimeter => 1.0,
            LengthUnit::Foot => 304.8,
            LengthUnit::Mile => 1_609_344.0,
            LengthUnit::Meter => 1000.0,
            LengthUnit::Kilometer => 1_000_000.0,
            LengthUnit::Mil => 0.0254,
            LengthUnit::Micrometer => 0.001,
            LengthUnit::Centimeter => 10.0,
            LengthUnit::Microinch => 0.0000254,
        }
    }

    /// Kernel token for this unit
    pub fn name(&self) -> &'static str {
        match self {
            LengthUnit::Inch => "INCH",
            LengthUnit::Millimeter => "MM",
            LengthUnit::Foot => "FT",
            LengthUnit::Mile => "MI",
            LengthUnit::Meter => "M",
            LengthUnit::Kilometer => "KM",
            LengthUnit::Mil => "MIL",
            LengthUnit::Micrometer => "UM",
            LengthUnit::Centimeter => "CM",
            LengthUnit::Microinch => "UIN",
        }
    }

    /// All valid units in kernel enumeration order
    pub const ALL: &'static [LengthUnit] = &[
        LengthUnit::Inch,
        LengthUnit::Millimeter,
        LengthUnit::Foot,
        LengthUnit::Mile,
        LengthUnit::Meter,
        LengthUnit::Kilometer,
        LengthUnit::Mil,
        LengthUnit::Micrometer,
        LengthUnit::Centimeter,
        LengthUnit::Microinch,
    ];

    /// Comma separated list of the valid unit tokens
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(LengthUnit::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LengthUnit {
    type Err = KernelError;

    /// Parse a unit token, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.name() == upper)
            .ok_or(KernelError::InvalidUnit(upper))
    }
}
