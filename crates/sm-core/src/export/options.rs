//! Export options for STL generation

use sm_kernel::StlFormat;

/// Export options for STL generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Maximum chordal deviation, in output units
    pub linear_deflection: f64,
    /// Maximum angular deviation, in degrees
    pub angular_deflection_degrees: f64,
    /// STL encoding
    pub format: StlFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            linear_deflection: 0.1,
            angular_deflection_degrees: 5.0,
            format: StlFormat::Binary,
        }
    }
}
