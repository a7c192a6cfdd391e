//! # Mimic Clone
//!
//! Deep-copy engine for object graphs on a [`mimic_core::Heap`].
//!
//! Copies never share mutable structure with their source, while aliasing
//! and cycles inside the source are reproduced in the copy. Types need no
//! clone support of their own: the engine works from class metadata.
//!
//! ## Pipeline
//!
//! - [`classify`] picks a strategy from the runtime type
//! - [`constructor`] synthesizes empty instances (cached per class)
//! - [`fields`] lists the copyable fields (cached per class)
//! - [`session`] maps source objects to their copies for one call
//! - [`engine`] runs the recursive walk
//! - [`facade`] is the entry point
//!
//! ## Example
//!
//! ```ignore
//! let copy = mimic_clone::clone_value(&mut heap, &Value::Ref(root))?;
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod cache;
pub mod classify;
pub mod config;
pub mod constructor;
pub mod engine;
pub mod error;
pub mod facade;
pub mod fields;
pub mod session;

pub use cache::CacheStats;
pub use classify::{Strategy, classify};
pub use config::{EngineConfig, TextPolicy};
pub use engine::{CloningEngine, DefaultCloningEngine};
pub use error::{CloneError, CloneResult};
pub use facade::{Typed, clone_typed, clone_typed_with, clone_value, clone_value_with};
pub use session::CloneSession;
