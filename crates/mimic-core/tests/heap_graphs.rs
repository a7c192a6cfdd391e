//! Object graph tests
//!
//! Builds small graphs through the public API and checks identity,
//! inheritance and comparison behavior.

use mimic_core::builtins::{array_list, array_list_of};
use mimic_core::{
    ClassBuilder, EnumType, FieldModifiers, Heap, HeapError, TemporalValue, Value, ValueType, Visibility,
};

#[test]
fn test_constructor_initializes_fields() {
    let person = ClassBuilder::new("Person")
        .public_field("name", ValueType::Text)
        .public_field("age", ValueType::Int)
        .constructor(
            Visibility::Public,
            vec![ValueType::Text, ValueType::Int],
            |heap, this, args| {
                heap.set(this, "name", args[0].clone())?;
                heap.set(this, "age", args[1].clone())
            },
        )
        .build();

    let mut heap = Heap::new();
    let p = heap.construct(&person, &[Value::text("Ada"), Value::Int(36)]).unwrap();
    assert_eq!(heap.get(p, "name").unwrap(), Value::text("Ada"));
    assert_eq!(heap.get(p, "age").unwrap(), Value::Int(36));

    let err = heap.construct(&person, &[Value::Int(1)]).unwrap_err();
    assert!(matches!(err, HeapError::NoMatchingConstructor { .. }));
}

#[test]
fn test_private_constructor_is_not_public_construction() {
    let singleton = ClassBuilder::new("Singleton")
        .constructor(Visibility::Private, vec![], |_, _, _| Ok(()))
        .build();
    let mut heap = Heap::new();
    assert!(heap.construct(&singleton, &[]).is_err());
}

#[test]
fn test_inherited_fields_share_layout() {
    let base = ClassBuilder::new("Base")
        .public_field("id", ValueType::Long)
        .default_constructor()
        .build();
    let derived = ClassBuilder::new("Derived")
        .extends(&base)
        .public_field("tag", ValueType::Text)
        .default_constructor()
        .build();

    let mut heap = Heap::new();
    let d = heap.construct(&derived, &[]).unwrap();
    heap.set(d, "id", 9i64).unwrap();
    let id = base.field("id").unwrap();
    assert_eq!(heap.read_field(d, &id).unwrap(), Value::Long(9));
    assert!(ValueType::Object(base.clone()).accepts(&heap, &Value::Ref(d)));

    let plain = heap.alloc_instance(&base).unwrap();
    assert!(!ValueType::Object(derived.clone()).accepts(&heap, &Value::Ref(plain)));
}

#[test]
fn test_transient_fields_ignored_by_comparison() {
    let cached = ClassBuilder::new("Cached")
        .public_field("key", ValueType::Text)
        .field_with("memo", ValueType::Any, FieldModifiers::public().transient())
        .build();
    let mut heap = Heap::new();
    let a = heap.alloc_instance(&cached).unwrap();
    let b = heap.alloc_instance(&cached).unwrap();
    heap.set(a, "key", "k").unwrap();
    heap.set(b, "key", "k").unwrap();
    heap.set(a, "memo", 1).unwrap();
    assert!(heap.structurally_equal(&a.into(), &b.into()).unwrap());
}

#[test]
fn test_enum_and_temporal_fields() {
    let status = EnumType::new("Status", &["Active", "Retired"]);
    let record = ClassBuilder::new("Record")
        .public_field("status", ValueType::Enum(status.clone()))
        .public_field("since", ValueType::Temporal)
        .build();

    let mut heap = Heap::new();
    let r = heap.alloc_instance(&record).unwrap();
    assert_eq!(heap.get(r, "status").unwrap(), Value::Null);

    let since = heap.alloc_temporal(TemporalValue::date(2020, 5, 1).unwrap()).unwrap();
    heap.set(r, "since", since).unwrap();
    heap.set(r, "status", status.value_of("Retired").unwrap()).unwrap();

    let other = EnumType::new("Other", &["Active"]);
    assert!(heap.set(r, "status", other.first().unwrap()).is_err());
    assert!(heap.set(r, "since", Value::Int(1)).is_err());
}

#[test]
fn test_collection_inside_object() {
    let holder = ClassBuilder::new("Holder")
        .public_field("items", ValueType::Object(array_list()))
        .build();
    let mut heap = Heap::new();
    let h = heap.alloc_instance(&holder).unwrap();
    let items = array_list_of(&mut heap, [Value::text("a"), Value::text("b")]).unwrap();
    heap.set(h, "items", items).unwrap();

    let rendered = heap.describe(&h.into());
    assert!(rendered.starts_with("Holder#"));
    assert!(rendered.contains("ArrayList#"));
    assert!(rendered.contains("[\"a\", \"b\"]"));
}

#[test]
fn test_collection_subclass_compared_by_elements_only() {
    let tagged = ClassBuilder::new("TaggedList")
        .extends(&array_list())
        .public_field("tag", ValueType::Text)
        .default_constructor()
        .build();
    let mut heap = Heap::new();
    let a = heap.construct(&tagged, &[]).unwrap();
    let b = heap.construct(&tagged, &[]).unwrap();
    for r in [a, b] {
        heap.collection_append(r, Value::Int(1)).unwrap();
    }
    heap.set(a, "tag", Value::text("important")).unwrap();

    assert_eq!(heap.get(b, "tag").unwrap(), Value::Null);
    assert!(heap.structurally_equal(&a.into(), &b.into()).unwrap());

    heap.collection_append(b, Value::Int(2)).unwrap();
    assert!(!heap.structurally_equal(&a.into(), &b.into()).unwrap());
}
