//! Clone error types

use mimic_core::HeapError;
use thiserror::Error;

/// Errors that abort a clone operation
#[derive(Debug, Error)]
pub enum CloneError {
    /// Class exposes no public constructor
    #[error("cannot instantiate {class}: no public constructor")]
    Instantiation {
        /// Class name
        class: String,
    },

    /// Selected constructor rejected the synthesized arguments
    #[error("constructor of {class} failed")]
    Constructor {
        /// Class name
        class: String,
        /// Underlying failure
        #[source]
        source: HeapError,
    },

    /// Reading or writing a field failed
    #[error("cannot copy field `{class}.{field}`")]
    FieldAccess {
        /// Runtime class of the source object
        class: String,
        /// Field name
        field: String,
        /// Underlying failure
        #[source]
        source: HeapError,
    },

    /// Reading or writing an array element failed
    #[error("cannot copy element {index} of {array_type}")]
    ElementAccess {
        /// Array type
        array_type: String,
        /// Element index
        index: usize,
        /// Underlying failure
        #[source]
        source: HeapError,
    },

    /// Iterating or appending to a collection failed
    #[error("cannot copy collection {class}")]
    CollectionAccess {
        /// Collection class
        class: String,
        /// Underlying failure
        #[source]
        source: HeapError,
    },

    /// Typed entry point got a result of the wrong type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Runtime type of the result
        found: String,
    },

    /// Heap failure outside a field, element or collection context
    #[error(transparent)]
    Heap(#[from] HeapError),
}

impl CloneError {
    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type for clone operations
pub type CloneResult<T> = std::result::Result<T, CloneError>;
