//! Cloning engine.
//!
//! Walks the source graph depth-first and builds the copy as it goes:
//!
//! - null, scalars and enum constants come back unchanged
//! - text is duplicated according to [`TextPolicy`]
//! - temporal cells are rebuilt from their components
//! - arrays get a new array of the same element type and length
//! - collections are instantiated empty and refilled in iteration order
//! - other instances are instantiated and copied field by field
//!
//! Each heap object is copied at most once per call. The copy is entered
//! into the [`CloneSession`] before anything inside it is visited, so shared
//! references stay shared and cycles close back onto the copy.
//!
//! Recursion depth follows graph depth; very deep graphs can exhaust the
//! stack.

use crate::classify::{Strategy, classify};
use crate::config::{EngineConfig, TextPolicy};
use crate::constructor::instantiate;
use crate::error::{CloneError, CloneResult};
use crate::fields::copyable_fields;
use crate::session::CloneSession;
use mimic_core::{Class, FieldRef, Heap, HeapError, ObjRef, Value, ValueType};
use std::sync::Arc;
use tracing::{debug, trace};

/// Produces deep copies of values on a heap
pub trait CloningEngine {
    /// Deep copy of `value`.
    ///
    /// On error nothing is returned; objects allocated before the failure
    /// stay in the heap unreachable.
    fn clone_value(&mut self, heap: &mut Heap, value: &Value) -> CloneResult<Value>;
}

/// Metadata-driven engine; each call runs in a fresh session
#[derive(Debug, Default)]
pub struct DefaultCloningEngine {
    config: EngineConfig,
}

impl DefaultCloningEngine {
    /// Engine with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom config
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get config
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl CloningEngine for DefaultCloningEngine {
    fn clone_value(&mut self, heap: &mut Heap, value: &Value) -> CloneResult<Value> {
        let before = heap.len();
        debug!(root = %heap.type_name(value), "clone started");

        let mut walk = Walk {
            heap,
            session: CloneSession::with_capacity(self.config.session_capacity),
            text_policy: self.config.text_policy,
        };
        let copy = walk.clone_in(value)?;

        debug!(
            allocated = walk.heap.len() - before,
            copied = walk.session.len(),
            "clone finished"
        );
        Ok(copy)
    }
}

/// State of one top-level clone call
struct Walk<'h> {
    heap: &'h mut Heap,
    session: CloneSession,
    text_policy: TextPolicy,
}

impl Walk<'_> {
    fn clone_in(&mut self, value: &Value) -> CloneResult<Value> {
        let strategy = classify(self.heap, value)?;
        trace!(strategy = strategy.name(), "dispatch");

        let source = match (strategy, value) {
            (Strategy::Text, Value::Text(text)) => {
                let copy = match self.text_policy {
                    TextPolicy::Copy => text.fresh_copy(),
                    TextPolicy::Share => text.clone(),
                };
                return Ok(Value::Text(copy));
            }
            (
                Strategy::Temporal(r) | Strategy::Array(r) | Strategy::Collection(r) | Strategy::Composite(r),
                _,
            ) => r,
            _ => return Ok(value.clone()),
        };

        if let Some(copy) = self.session.lookup(source) {
            return Ok(Value::Ref(copy));
        }

        let copy = match strategy {
            Strategy::Temporal(r) => self.clone_temporal(r)?,
            Strategy::Array(r) => self.clone_array(r)?,
            Strategy::Collection(r) => self.clone_collection(r)?,
            _ => self.clone_composite(source)?,
        };
        Ok(Value::Ref(copy))
    }

    fn clone_temporal(&mut self, source: ObjRef) -> CloneResult<ObjRef> {
        let value = self.heap.temporal(source)?;
        let copy = self.heap.alloc_temporal(value.rebuild())?;
        self.session.register(source, copy);
        Ok(copy)
    }

    fn clone_array(&mut self, source: ObjRef) -> CloneResult<ObjRef> {
        let (element, items) = {
            let arr = self.heap.array(source)?;
            (arr.element_type().clone(), arr.items().to_vec())
        };
        let copy = self.heap.alloc_array(element.clone(), items.len())?;
        self.session.register(source, copy);

        for (index, item) in items.iter().enumerate() {
            let cloned = self.clone_in(item)?;
            self.heap
                .array_set(copy, index, cloned)
                .map_err(|e| element_error(&element, index, e))?;
        }
        Ok(copy)
    }

    fn clone_collection(&mut self, source: ObjRef) -> CloneResult<ObjRef> {
        let class = Arc::clone(self.heap.class_of(source)?);
        let copy = instantiate(self.heap, &class)?;
        self.session.register(source, copy);

        let items = self
            .heap
            .collection_elements(source)
            .map_err(|e| collection_error(&class, e))?;
        for item in &items {
            let cloned = self.clone_in(item)?;
            self.heap
                .collection_append(copy, cloned)
                .map_err(|e| collection_error(&class, e))?;
        }
        Ok(copy)
    }

    fn clone_composite(&mut self, source: ObjRef) -> CloneResult<ObjRef> {
        let class = Arc::clone(self.heap.class_of(source)?);
        let copy = instantiate(self.heap, &class)?;
        self.session.register(source, copy);

        for field in copyable_fields(&class).iter() {
            let value = self
                .heap
                .read_field(source, field)
                .map_err(|e| field_error(&class, field, e))?;
            let cloned = self.clone_in(&value)?;
            self.heap
                .write_field(copy, field, cloned)
                .map_err(|e| field_error(&class, field, e))?;
        }
        Ok(copy)
    }
}

// Copies share their source's class and element types, so every write
// wrapped below is one the source slot already accepted.

fn element_error(element: &ValueType, index: usize, source: HeapError) -> CloneError {
    CloneError::ElementAccess {
        array_type: ValueType::array_of(element.clone()).to_string(),
        index,
        source,
    }
}

fn field_error(class: &Class, field: &FieldRef, source: HeapError) -> CloneError {
    CloneError::FieldAccess {
        class: class.name().to_string(),
        field: field.name().to_string(),
        source,
    }
}

fn collection_error(class: &Class, source: HeapError) -> CloneError {
    CloneError::CollectionAccess {
        class: class.name().to_string(),
        source,
    }
}
