//! Runtime type classification.
//!
//! Every value maps to exactly one [`Strategy`]. Checks run in a fixed order
//! and the first match wins, so a collection class that also declares fields
//! is still copied through its collection capability.

use mimic_core::{Heap, HeapObject, HeapResult, ObjRef, Value};

/// How a value is duplicated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `null`, returned as is
    Null,
    /// Scalar or enum constant, returned as is
    Value,
    /// Text, duplicated per the engine's text policy
    Text,
    /// Temporal cell, rebuilt from its components
    Temporal(ObjRef),
    /// Array, copied element by element
    Array(ObjRef),
    /// Instance with the collection capability, refilled by appending
    Collection(ObjRef),
    /// Any other instance, copied field by field
    Composite(ObjRef),
}

impl Strategy {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Value => "value",
            Self::Text => "text",
            Self::Temporal(_) => "temporal",
            Self::Array(_) => "array",
            Self::Collection(_) => "collection",
            Self::Composite(_) => "composite",
        }
    }

    /// Whether the copy needs an entry in the clone session
    pub fn is_tracked(&self) -> bool {
        matches!(
            self,
            Self::Temporal(_) | Self::Array(_) | Self::Collection(_) | Self::Composite(_)
        )
    }
}

/// Pick the strategy for `value`; fails only on a dangling reference
pub fn classify(heap: &Heap, value: &Value) -> HeapResult<Strategy> {
    let r = match value {
        Value::Null => return Ok(Strategy::Null),
        Value::Text(_) => return Ok(Strategy::Text),
        Value::Ref(r) => *r,
        _ => return Ok(Strategy::Value),
    };
    Ok(match heap.object(r)? {
        HeapObject::Temporal(_) => Strategy::Temporal(r),
        HeapObject::Array(_) => Strategy::Array(r),
        HeapObject::Instance(inst) if inst.class().collection().is_some() => Strategy::Collection(r),
        HeapObject::Instance(_) => Strategy::Composite(r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::builtins::{array_list, linked_hash_set};
    use mimic_core::{ClassBuilder, EnumType, HeapError, TemporalValue, ValueType};

    #[test]
    fn test_scalars_and_enums_are_values() {
        let heap = Heap::new();
        let level = EnumType::new("Level", &["Low", "High"]);
        for value in [
            Value::Bool(true),
            Value::Byte(1),
            Value::Short(2),
            Value::Int(3),
            Value::Long(4),
            Value::Float(1.5),
            Value::Double(2.5),
            Value::Char('x'),
            Value::Enum(level.first().unwrap()),
        ] {
            assert_eq!(classify(&heap, &value).unwrap(), Strategy::Value, "{:?}", value);
        }
        assert_eq!(classify(&heap, &Value::Null).unwrap(), Strategy::Null);
        assert_eq!(classify(&heap, &Value::text("t")).unwrap(), Strategy::Text);
    }

    #[test]
    fn test_heap_objects() {
        let mut heap = Heap::new();
        let date = heap.alloc_temporal(TemporalValue::date(2024, 1, 31).unwrap()).unwrap();
        let arr = heap.alloc_array(ValueType::Int, 3).unwrap();
        let list = heap.construct(&array_list(), &[]).unwrap();
        let set = heap.construct(&linked_hash_set(), &[]).unwrap();
        let plain = heap
            .alloc_instance(&ClassBuilder::new("Plain").build())
            .unwrap();

        assert_eq!(classify(&heap, &date.into()).unwrap(), Strategy::Temporal(date));
        assert_eq!(classify(&heap, &arr.into()).unwrap(), Strategy::Array(arr));
        assert_eq!(classify(&heap, &list.into()).unwrap(), Strategy::Collection(list));
        assert_eq!(classify(&heap, &set.into()).unwrap(), Strategy::Collection(set));
        assert_eq!(classify(&heap, &plain.into()).unwrap(), Strategy::Composite(plain));
    }

    #[test]
    fn test_subclass_of_collection_is_collection() {
        let custom = ClassBuilder::new("TaggedList")
            .extends(&array_list())
            .public_field("tag", ValueType::Text)
            .default_constructor()
            .build();
        let mut heap = Heap::new();
        let r = heap.construct(&custom, &[]).unwrap();
        assert_eq!(classify(&heap, &r.into()).unwrap(), Strategy::Collection(r));
    }

    #[test]
    fn test_dangling_reference_is_an_error() {
        let mut heap = Heap::new();
        let r = heap.alloc_array(ValueType::Int, 0).unwrap();
        let other = Heap::new();
        assert_eq!(classify(&other, &r.into()), Err(HeapError::DanglingReference(r)));
    }

    #[test]
    fn test_tracking() {
        assert!(!Strategy::Null.is_tracked());
        assert!(!Strategy::Text.is_tracked());
        assert!(!Strategy::Value.is_tracked());
    }
}
