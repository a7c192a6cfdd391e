//! Entry points.
//!
//! The untyped functions hand back whatever the engine produced. The typed
//! ones also verify that the copy has the runtime type of the source, which
//! matters only for engines other than [`DefaultCloningEngine`].

use crate::engine::{CloningEngine, DefaultCloningEngine};
use crate::error::{CloneError, CloneResult};
use mimic_core::{FromValue, Heap, IntoValue, Value, ValueType};

/// Rust types the typed entry points accept
pub trait Typed: FromValue + IntoValue + Clone {}

impl<T: FromValue + IntoValue + Clone> Typed for T {}

/// Deep copy of `value` with the default engine
pub fn clone_value(heap: &mut Heap, value: &Value) -> CloneResult<Value> {
    DefaultCloningEngine::new().clone_value(heap, value)
}

/// Deep copy of `value` with a caller-supplied engine
pub fn clone_value_with(heap: &mut Heap, value: &Value, engine: &mut dyn CloningEngine) -> CloneResult<Value> {
    engine.clone_value(heap, value)
}

/// Deep copy of `source` with the default engine, returned as `T`
pub fn clone_typed<T: Typed>(heap: &mut Heap, source: &T) -> CloneResult<T> {
    clone_typed_with(heap, source, &mut DefaultCloningEngine::new())
}

/// Deep copy of `source` with a caller-supplied engine, returned as `T`.
///
/// Fails with [`CloneError::TypeMismatch`] when the engine's result is not
/// of the source's runtime type (or a subclass of it).
pub fn clone_typed_with<T: Typed>(heap: &mut Heap, source: &T, engine: &mut dyn CloningEngine) -> CloneResult<T> {
    let source = source.clone().into_value();
    let copy = engine.clone_value(heap, &source)?;
    check_runtime_type(heap, &source, &copy)?;
    T::from_value(&copy).map_err(|_| CloneError::type_mismatch(T::TYPE_NAME, heap.type_name(&copy)))
}

fn check_runtime_type(heap: &Heap, source: &Value, copy: &Value) -> CloneResult<()> {
    let Some(expected) = heap.runtime_type(source)? else {
        return Ok(());
    };
    let assignable = match (&expected, heap.runtime_type(copy)?) {
        (ValueType::Object(class), Some(ValueType::Object(found))) => found.is_subclass_of(class),
        (_, Some(found)) => found == expected,
        (_, None) => false,
    };
    if assignable {
        Ok(())
    } else {
        Err(CloneError::type_mismatch(expected.to_string(), heap.type_name(copy)))
    }
}
