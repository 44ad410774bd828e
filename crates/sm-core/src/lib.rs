//! step2mesh core
//!
//! Turns the labeled shape document read by a geometry provider into a flat
//! list of named solids, selects solids by index or path and writes them as a
//! single triangulated STL file.

pub mod error;
pub mod export;
pub mod import;
pub mod select;
pub mod walker;

#[cfg(test)]
pub(crate) mod test_provider;

pub use error::{ConvertError, ConvertResult};
pub use export::{ExportOptions, write};
pub use import::read_named_solids;
pub use select::{SelectionToken, select};
pub use walker::{NamedSolid, flatten};
