//! Array-level error types.

use std::error::Error;
use std::fmt;

/// Errors describing a single malformed or unexchangeable array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The array's storage type is outside the supported numeric set.
    /// Recoverable: the exchange skips the array and continues.
    TypeMismatch {
        /// Array name.
        name: String,
        /// Name of the unsupported storage type.
        type_name: String,
    },
    /// The array holds a different number of tuples than its extent needs.
    LengthMismatch {
        /// Array name.
        name: String,
        /// Tuples implied by the extent.
        expected: usize,
        /// Tuples actually stored.
        actual: usize,
    },
    /// An array was declared with zero components per tuple.
    ZeroComponents {
        /// Array name.
        name: String,
    },
    /// The stored value count is not a multiple of the component count.
    RaggedLength {
        /// Array name.
        name: String,
        /// Number of stored values.
        len: usize,
        /// Declared components per tuple.
        components: usize,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { name, type_name } => {
                write!(f, "array '{name}' has unsupported element type {type_name}")
            }
            Self::LengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "array '{name}' has {actual} tuples, extent requires {expected}"
            ),
            Self::ZeroComponents { name } => {
                write!(f, "array '{name}' declares zero components")
            }
            Self::RaggedLength {
                name,
                len,
                components,
            } => write!(
                f,
                "array '{name}' length {len} is not a multiple of {components} components"
            ),
        }
    }
}

impl Error for ArrayError {}
