//! STL export functionality

mod options;

use std::path::Path;

use sm_kernel::{Compound, GeometryProvider, MeshParams, Shape};

use crate::error::{ConvertError, ConvertResult};

pub use options::ExportOptions;

/// Tessellate solids and write them as one STL file
///
/// All solids go into a single compound, in order and without deduplication.
pub fn write(
    provider: &dyn GeometryProvider,
    path: &Path,
    solids: &[Shape],
    options: &ExportOptions,
) -> ConvertResult<()> {
    let mut compound: Compound = solids.iter().cloned().collect();

    let params = MeshParams::from_degrees(
        options.linear_deflection,
        options.angular_deflection_degrees,
    );
    provider.mesh(&mut compound, &params)?;

    provider
        .write_stl(&compound, path, options.format)
        .map_err(|source| ConvertError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        "Exported {} solids to {} ({})",
        compound.len(),
        path.display(),
        options.format
    );
    Ok(())
}
