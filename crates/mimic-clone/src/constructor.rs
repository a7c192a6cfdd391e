//! Constructor selection and instance synthesis.
//!
//! Copies are created through a public constructor of the source's class,
//! never by raw allocation alone, so a class keeps control over how its
//! instances come into existence. The constructor with the fewest
//! parameters is used, ties going to the one declared first, and each
//! parameter receives a neutral default argument.
//!
//! Constructors that validate their arguments or have side effects may
//! reject the defaults; such classes cannot be cloned.

use crate::cache::{CacheStats, MetadataCache};
use crate::error::{CloneError, CloneResult};
use mimic_core::{Class, Constructor, Heap, ObjRef, Value, ValueType};
use std::sync::{Arc, LazyLock};

static CONSTRUCTORS: LazyLock<MetadataCache<Arc<Constructor>>> =
    LazyLock::new(|| MetadataCache::new("constructor"));

/// Public constructor used to synthesize instances of `class`
pub fn select_constructor(class: &Class) -> CloneResult<Arc<Constructor>> {
    CONSTRUCTORS.get_or_try_build(class, || {
        class
            .constructors()
            .iter()
            .filter(|c| c.is_public())
            .min_by_key(|c| c.param_count())
            .cloned()
            .ok_or_else(|| CloneError::Instantiation {
                class: class.name().to_string(),
            })
    })
}

/// Argument passed for a parameter of type `ty`
pub fn default_argument(ty: &ValueType) -> Value {
    match ty {
        ty if ty.is_integral() || ty.is_floating() => ty.zero_value(),
        ValueType::Bool => Value::Bool(false),
        ValueType::Char => Value::Char(' '),
        ValueType::Enum(ty) => ty.first().map_or(Value::Null, Value::Enum),
        _ => Value::Null,
    }
}

/// Allocate an instance of `class` and run its selected constructor
pub fn instantiate(heap: &mut Heap, class: &Arc<Class>) -> CloneResult<ObjRef> {
    let ctor = select_constructor(class)?;
    let args: Vec<Value> = ctor.params().iter().map(default_argument).collect();
    let this = heap.alloc_instance(class)?;
    ctor.invoke(heap, this, &args)
        .map_err(|source| CloneError::Constructor {
            class: class.name().to_string(),
            source,
        })?;
    Ok(this)
}

/// Counters of the process-wide constructor cache
pub fn cache_stats() -> CacheStats {
    CONSTRUCTORS.stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{ClassBuilder, EnumType, HeapError, Visibility};

    /// Class whose constructors record which one ran in `picked`
    fn recorder(name: &str) -> Arc<Class> {
        ClassBuilder::new(name)
            .public_field("picked", ValueType::Int)
            .constructor(Visibility::Public, vec![ValueType::Int, ValueType::Int], |heap, this, _| {
                heap.set(this, "picked", 2)
            })
            .constructor(Visibility::Public, vec![ValueType::Text], |heap, this, _| {
                heap.set(this, "picked", 10)
            })
            .constructor(Visibility::Public, vec![ValueType::Long], |heap, this, _| {
                heap.set(this, "picked", 11)
            })
            .constructor(Visibility::Private, vec![], |heap, this, _| heap.set(this, "picked", -1))
            .build()
    }

    #[test]
    fn test_fewest_public_params_first_declared() {
        let class = recorder("Recorder");
        let ctor = select_constructor(&class).unwrap();
        assert_eq!(ctor.params(), &[ValueType::Text][..]);

        let mut heap = Heap::new();
        let r = instantiate(&mut heap, &class).unwrap();
        assert_eq!(heap.get(r, "picked").unwrap(), Value::Int(10));
    }

    #[test]
    fn test_selection_is_cached() {
        let class = recorder("CachedRecorder");
        let first = select_constructor(&class).unwrap();
        let second = select_constructor(&class).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_no_public_constructor() {
        let class = ClassBuilder::new("Hidden")
            .constructor(Visibility::Protected, vec![], |_, _, _| Ok(()))
            .build();
        let mut heap = Heap::new();
        let err = instantiate(&mut heap, &class).unwrap_err();
        assert!(matches!(err, CloneError::Instantiation { ref class } if class == "Hidden"));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_default_arguments() {
        let mood = EnumType::new("Mood", &["Calm", "Angry"]);
        let empty = EnumType::new("Empty", &[]);

        assert_eq!(default_argument(&ValueType::Byte), Value::Byte(0));
        assert_eq!(default_argument(&ValueType::Short), Value::Short(0));
        assert_eq!(default_argument(&ValueType::Int), Value::Int(0));
        assert_eq!(default_argument(&ValueType::Long), Value::Long(0));
        assert_eq!(default_argument(&ValueType::Float), Value::Float(0.0));
        assert_eq!(default_argument(&ValueType::Double), Value::Double(0.0));
        assert_eq!(default_argument(&ValueType::Bool), Value::Bool(false));
        assert_eq!(default_argument(&ValueType::Char), Value::Char(' '));
        assert_eq!(default_argument(&ValueType::Enum(mood.clone())), Value::Enum(mood.value_of("Calm").unwrap()));
        assert_eq!(default_argument(&ValueType::Enum(empty)), Value::Null);
        assert_eq!(default_argument(&ValueType::Text), Value::Null);
        assert_eq!(default_argument(&ValueType::Temporal), Value::Null);
        assert_eq!(default_argument(&ValueType::array_of(ValueType::Int)), Value::Null);
        assert_eq!(default_argument(&ValueType::Any), Value::Null);
    }

    #[test]
    fn test_constructor_receives_defaults() {
        let mood = EnumType::new("Tone", &["Soft", "Loud"]);
        let class = ClassBuilder::new("Args")
            .public_field("flag", ValueType::Bool)
            .public_field("letter", ValueType::Char)
            .public_field("tone", ValueType::Enum(mood.clone()))
            .public_field("label", ValueType::Text)
            .constructor(
                Visibility::Public,
                vec![ValueType::Bool, ValueType::Char, ValueType::Enum(mood.clone()), ValueType::Text],
                |heap, this, args| {
                    heap.set(this, "flag", args[0].clone())?;
                    heap.set(this, "letter", args[1].clone())?;
                    heap.set(this, "tone", args[2].clone())?;
                    heap.set(this, "label", args[3].clone())
                },
            )
            .build();

        let mut heap = Heap::new();
        let r = instantiate(&mut heap, &class).unwrap();
        assert_eq!(heap.get(r, "flag").unwrap(), Value::Bool(false));
        assert_eq!(heap.get(r, "letter").unwrap(), Value::Char(' '));
        assert_eq!(heap.get(r, "tone").unwrap(), Value::Enum(mood.first().unwrap()));
        assert_eq!(heap.get(r, "label").unwrap(), Value::Null);
    }

    #[test]
    fn test_rejecting_constructor() {
        let class = ClassBuilder::new("Strict")
            .constructor(Visibility::Public, vec![ValueType::Text], |_, _, args| {
                if args[0].is_null() {
                    return Err(HeapError::constructor("name required"));
                }
                Ok(())
            })
            .build();
        let mut heap = Heap::new();
        let err = instantiate(&mut heap, &class).unwrap_err();
        assert!(matches!(
            err,
            CloneError::Constructor { ref class, source: HeapError::Constructor(_) } if class == "Strict"
        ));
    }
}
