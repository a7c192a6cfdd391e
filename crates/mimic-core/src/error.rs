//! Heap and object model error types

use crate::heap::ObjRef;
use thiserror::Error;

/// Errors raised by heap access, field access and constructor invocation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HeapError {
    /// Handle does not point into this heap
    #[error("dangling reference {0:?}")]
    DanglingReference(ObjRef),

    /// Object is not a class instance
    #[error("{0:?} is not a class instance")]
    NotAnInstance(ObjRef),

    /// Object is not an array
    #[error("{0:?} is not an array")]
    NotAnArray(ObjRef),

    /// Object is not a temporal value
    #[error("{0:?} is not a temporal value")]
    NotTemporal(ObjRef),

    /// Array index past the end
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Array length
        len: usize,
    },

    /// No field with that name anywhere in the class hierarchy
    #[error("{class} has no field `{field}`")]
    NoSuchField {
        /// Class searched
        class: String,
        /// Field name
        field: String,
    },

    /// Field exists but is not public
    #[error("field `{class}.{field}` is not accessible")]
    FieldNotAccessible {
        /// Declaring class
        class: String,
        /// Field name
        field: String,
    },

    /// Field handle belongs to a class outside the object's hierarchy
    #[error("field `{declaring}.{field}` is not declared by {class}")]
    FieldNotDeclared {
        /// Runtime class of the object
        class: String,
        /// Class that declares the field
        declaring: String,
        /// Field name
        field: String,
    },

    /// Static field accessed through an instance
    #[error("field `{class}.{field}` is static")]
    StaticField {
        /// Declaring class
        class: String,
        /// Field name
        field: String,
    },

    /// Value is not assignable to the declared type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Runtime type of the offending value
        found: String,
    },

    /// Wrong number of constructor arguments
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// No public constructor accepts the supplied arguments
    #[error("no public constructor of {class} accepts the given arguments")]
    NoMatchingConstructor {
        /// Class being constructed
        class: String,
    },

    /// Class has no collection capability
    #[error("{class} is not a collection")]
    NotACollection {
        /// Class of the object
        class: String,
    },

    /// Heap object limit reached
    #[error("heap limit of {limit} objects exceeded")]
    OutOfMemory {
        /// Configured limit
        limit: usize,
    },

    /// Failure raised by a constructor body
    #[error("constructor failed: {0}")]
    Constructor(String),

    /// Failure raised by a collection capability
    #[error("collection operation failed: {0}")]
    Collection(String),
}

impl HeapError {
    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a constructor failure
    pub fn constructor(msg: impl Into<String>) -> Self {
        Self::Constructor(msg.into())
    }

    /// Create a collection failure
    pub fn collection(msg: impl Into<String>) -> Self {
        Self::Collection(msg.into())
    }
}

/// Result type for heap operations
pub type HeapResult<T> = std::result::Result<T, HeapError>;
