//! # Mimic Core
//!
//! Dynamic object model used by the mimic deep-copy engine.
//!
//! ## Design Principles
//!
//! - **Arena heap**: every reference object lives in a [`Heap`]; an [`ObjRef`]
//!   handle is the object's identity
//! - **Class metadata**: types are described once through [`ClassBuilder`]
//!   (fields, constructors, collection capability) and shared as `Arc<Class>`
//! - **Thread-safe metadata**: classes and enum types are `Send + Sync`, heaps
//!   are owned by one thread at a time

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod builtins;
pub mod class;
pub mod convert;
pub mod error;
pub mod heap;
pub mod string;
pub mod temporal;
pub mod types;
pub mod value;

pub use class::{
    Class, ClassBuilder, ClassId, CollectionOps, Constructor, FieldDescriptor, FieldModifiers,
    FieldRef, Visibility,
};
pub use convert::{FromValue, IntoValue};
pub use error::{HeapError, HeapResult};
pub use heap::{ArrayObject, Heap, HeapConfig, HeapObject, HeapStats, Instance, ObjRef};
pub use string::Text;
pub use temporal::TemporalValue;
pub use types::{EnumConstant, EnumType, ValueType};
pub use value::Value;
