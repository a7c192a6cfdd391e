//! Built-in collection classes.
//!
//! `ArrayList` and `LinkedHashSet` are ordinary classes: their storage is a
//! private `elementData` array plus a `size` counter, and they expose the
//! collection capability (single-element append, ordered iteration). The
//! backing array grows by doubling, starting at ten slots.

use crate::class::{Class, ClassBuilder, CollectionOps, FieldModifiers, FieldRef, Visibility};
use crate::error::{HeapError, HeapResult};
use crate::heap::{Heap, ObjRef};
use crate::types::ValueType;
use crate::value::Value;
use std::sync::{Arc, LazyLock};

const DEFAULT_CAPACITY: usize = 10;

static ARRAY_LIST: LazyLock<Arc<Class>> = LazyLock::new(|| backed_collection("ArrayList", false));

static LINKED_HASH_SET: LazyLock<Arc<Class>> = LazyLock::new(|| backed_collection("LinkedHashSet", true));

/// Ordered list allowing duplicates
pub fn array_list() -> Arc<Class> {
    Arc::clone(&ARRAY_LIST)
}

/// Insertion-ordered set; appending an element equal to a present one is a no-op
pub fn linked_hash_set() -> Arc<Class> {
    Arc::clone(&LINKED_HASH_SET)
}

/// Allocate an `ArrayList` holding `items`
pub fn array_list_of(heap: &mut Heap, items: impl IntoIterator<Item = Value>) -> HeapResult<ObjRef> {
    collect_into(heap, &ARRAY_LIST, items)
}

/// Allocate a `LinkedHashSet` holding `items`
pub fn linked_hash_set_of(heap: &mut Heap, items: impl IntoIterator<Item = Value>) -> HeapResult<ObjRef> {
    collect_into(heap, &LINKED_HASH_SET, items)
}

fn collect_into(heap: &mut Heap, class: &Arc<Class>, items: impl IntoIterator<Item = Value>) -> HeapResult<ObjRef> {
    let target = heap.construct(class, &[])?;
    for item in items {
        heap.collection_append(target, item)?;
    }
    Ok(target)
}

fn backed_collection(name: &str, distinct: bool) -> Arc<Class> {
    ClassBuilder::new(name)
        .field_with(
            "elementData",
            ValueType::array_of(ValueType::Any),
            FieldModifiers::private().transient(),
        )
        .field("size", ValueType::Int)
        .default_constructor()
        .constructor(Visibility::Public, vec![ValueType::Int], |heap, this, args| {
            let capacity = match args {
                [Value::Int(n)] if *n >= 0 => *n as usize,
                [other] => return Err(HeapError::constructor(format!("illegal capacity {}", heap.describe(other)))),
                _ => return Err(HeapError::ArityMismatch { expected: 1, found: args.len() }),
            };
            let (data_field, _) = storage_fields(heap, this)?;
            let data = heap.alloc_array(ValueType::Any, capacity)?;
            heap.write_field(this, &data_field, Value::Ref(data))
        })
        .collection(CollectionOps::new(
            move |heap, this, value| append(heap, this, value, distinct),
            elements,
        ))
        .build()
}

fn storage_fields(heap: &Heap, this: ObjRef) -> HeapResult<(FieldRef, FieldRef)> {
    let class = heap.class_of(this)?;
    let lookup = |name: &str| {
        class.field(name).ok_or_else(|| HeapError::NoSuchField {
            class: class.name().to_string(),
            field: name.to_string(),
        })
    };
    Ok((lookup("elementData")?, lookup("size")?))
}

fn read_size(heap: &Heap, this: ObjRef, size_field: &FieldRef) -> HeapResult<usize> {
    match heap.read_field(this, size_field)? {
        Value::Int(n) if n >= 0 => Ok(n as usize),
        other => Err(HeapError::collection(format!("corrupt size {}", heap.describe(&other)))),
    }
}

fn append(heap: &mut Heap, this: ObjRef, value: Value, distinct: bool) -> HeapResult<()> {
    let (data_field, size_field) = storage_fields(heap, this)?;
    let size = read_size(heap, this, &size_field)?;
    let data = heap.read_field(this, &data_field)?.as_obj();

    if distinct && let Some(d) = data {
        for i in 0..size {
            if heap.array_get(d, i)?.same_value(&value) {
                return Ok(());
            }
        }
    }

    let capacity = match data {
        Some(d) => heap.array_len(d)?,
        None => 0,
    };
    let data = match data {
        Some(d) if size < capacity => d,
        _ => {
            let grown = heap.alloc_array(ValueType::Any, (capacity * 2).max(DEFAULT_CAPACITY))?;
            if let Some(old) = data {
                for i in 0..size {
                    let item = heap.array_get(old, i)?;
                    heap.array_set(grown, i, item)?;
                }
            }
            heap.write_field(this, &data_field, Value::Ref(grown))?;
            grown
        }
    };

    heap.array_set(data, size, value)?;
    let new_size = i32::try_from(size + 1).map_err(|_| HeapError::collection("collection too large"))?;
    heap.write_field(this, &size_field, Value::Int(new_size))
}

fn elements(heap: &Heap, this: ObjRef) -> HeapResult<Vec<Value>> {
    let (data_field, size_field) = storage_fields(heap, this)?;
    let size = read_size(heap, this, &size_field)?;
    match heap.read_field(this, &data_field)?.as_obj() {
        Some(data) => (0..size).map(|i| heap.array_get(data, i)).collect(),
        None if size == 0 => Ok(Vec::new()),
        None => Err(HeapError::collection("missing element storage")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keeps_order_and_duplicates() {
        let mut heap = Heap::new();
        let list = array_list_of(&mut heap, [Value::Int(3), Value::Int(1), Value::Int(3)]).unwrap();
        assert_eq!(
            heap.collection_elements(list).unwrap(),
            vec![Value::Int(3), Value::Int(1), Value::Int(3)]
        );
    }

    #[test]
    fn test_list_grows_past_default_capacity() {
        let mut heap = Heap::new();
        let list = array_list_of(&mut heap, (0..25).map(Value::Int)).unwrap();
        let items = heap.collection_elements(list).unwrap();
        assert_eq!(items.len(), 25);
        assert_eq!(items[24], Value::Int(24));
    }

    #[test]
    fn test_set_ignores_equal_elements() {
        let mut heap = Heap::new();
        let set = linked_hash_set_of(
            &mut heap,
            [Value::text("b"), Value::text("a"), Value::text("b")],
        )
        .unwrap();
        assert_eq!(
            heap.collection_elements(set).unwrap(),
            vec![Value::text("b"), Value::text("a")]
        );
    }

    #[test]
    fn test_capacity_constructor_validates() {
        let mut heap = Heap::new();
        let list = heap.construct(&array_list(), &[Value::Int(2)]).unwrap();
        assert!(heap.collection_elements(list).unwrap().is_empty());
        let err = heap.construct(&array_list(), &[Value::Int(-1)]).unwrap_err();
        assert!(matches!(err, HeapError::Constructor(_)));
    }

    #[test]
    fn test_storage_is_private() {
        let mut heap = Heap::new();
        let list = array_list_of(&mut heap, [Value::Int(1)]).unwrap();
        assert!(matches!(heap.get(list, "size"), Err(HeapError::FieldNotAccessible { .. })));
    }
}
