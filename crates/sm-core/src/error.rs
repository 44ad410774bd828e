//! Conversion errors

use std::path::PathBuf;

use sm_kernel::KernelError;
use thiserror::Error;

/// Errors raised while reading, selecting or writing solids
///
/// The messages are the exact texts reported to the user.
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error("Could not read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: KernelError,
    },

    #[error("Could not find solid with name '{0}'")]
    NotFound(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Index out of range: {0}")]
    IndexOutOfRange(i64),

    #[error("Could not write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: KernelError,
    },

    #[error("Format '{0}' not supported")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;
