//! STEP import

use std::path::Path;

use sm_kernel::GeometryProvider;

use crate::error::{ConvertError, ConvertResult};
use crate::walker::{NamedSolid, flatten};

/// Read a STEP file and flatten it into named solids
pub fn read_named_solids(
    provider: &dyn GeometryProvider,
    path: &Path,
) -> ConvertResult<Vec<NamedSolid>> {
    let doc = provider
        .read_step(path)
        .map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(flatten(&doc))
}
