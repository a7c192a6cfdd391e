//! Clone failure paths
//!
//! Every failure aborts the whole call: no partial copy is returned, and
//! objects allocated before the failure remain in the heap unreachable.

use mimic_clone::{
    CloneError, CloneResult, CloningEngine, DefaultCloningEngine, EngineConfig, TextPolicy, clone_typed_with,
    clone_value, clone_value_with,
};
use mimic_core::builtins::array_list_of;
use mimic_core::{ClassBuilder, CollectionOps, Heap, HeapConfig, HeapError, ObjRef, Text, Value, ValueType, Visibility};
use std::error::Error;

#[test]
fn test_nested_class_without_public_constructor() {
    let token = ClassBuilder::new("Token")
        .constructor(Visibility::Private, vec![], |_, _, _| Ok(()))
        .build();
    let wallet = ClassBuilder::new("Wallet")
        .public_field("token", ValueType::Object(token.clone()))
        .default_constructor()
        .build();

    let mut heap = Heap::new();
    let t = heap.alloc_instance(&token).unwrap();
    let w = heap.construct(&wallet, &[]).unwrap();
    heap.set(w, "token", t).unwrap();
    let before = heap.len();

    let err = clone_value(&mut heap, &Value::Ref(w)).unwrap_err();
    assert!(matches!(err, CloneError::Instantiation { ref class } if class == "Token"));
    assert_eq!(err.to_string(), "cannot instantiate Token: no public constructor");
    // The wallet copy was made before the failure
    assert_eq!(heap.len(), before + 1);
}

#[test]
fn test_constructor_rejecting_defaults() {
    let port = ClassBuilder::new("Port")
        .public_field("number", ValueType::Int)
        .constructor(Visibility::Public, vec![ValueType::Int], |heap, this, args| {
            match args[0] {
                Value::Int(n) if n > 0 => heap.set(this, "number", n),
                _ => Err(HeapError::constructor("port must be positive")),
            }
        })
        .build();

    let mut heap = Heap::new();
    let p = heap.construct(&port, &[Value::Int(8080)]).unwrap();
    let err = clone_value(&mut heap, &Value::Ref(p)).unwrap_err();
    assert!(matches!(err, CloneError::Constructor { ref class, .. } if class == "Port"));
    let source = err.source().unwrap().to_string();
    assert!(source.contains("port must be positive"), "{}", source);
}

#[test]
fn test_heap_limit_aborts_clone() {
    let mut heap = Heap::with_config(HeapConfig {
        initial_capacity: 8,
        object_limit: 4,
    });
    let list = array_list_of(&mut heap, [Value::text("a")]).unwrap();
    let holder = ClassBuilder::new("Holder")
        .public_field("list", ValueType::Any)
        .default_constructor()
        .build();
    let h = heap.construct(&holder, &[]).unwrap();
    heap.set(h, "list", list).unwrap();
    assert_eq!(heap.len(), 3);

    let err = clone_value(&mut heap, &Value::Ref(h)).unwrap_err();
    assert!(matches!(err, CloneError::Heap(HeapError::OutOfMemory { limit: 4 })));
    assert_eq!(heap.len(), 4);
}

#[test]
fn test_failing_collection_append() {
    let sink = ClassBuilder::new("Sink")
        .default_constructor()
        .collection(CollectionOps::new(
            |_, _, _| Err(HeapError::collection("read-only")),
            |_, _| Ok(vec![Value::Int(1)]),
        ))
        .build();
    let mut heap = Heap::new();
    let s = heap.construct(&sink, &[]).unwrap();

    let err = clone_value(&mut heap, &Value::Ref(s)).unwrap_err();
    assert!(matches!(
        err,
        CloneError::CollectionAccess { ref class, source: HeapError::Collection(_) } if class == "Sink"
    ));
}

#[test]
fn test_failing_collection_iteration() {
    let broken = ClassBuilder::new("Broken")
        .default_constructor()
        .collection(CollectionOps::new(
            |_, _, _| Ok(()),
            |_, _| Err(HeapError::collection("iterator invalidated")),
        ))
        .build();
    let mut heap = Heap::new();
    let b = heap.construct(&broken, &[]).unwrap();
    assert!(matches!(
        clone_value(&mut heap, &Value::Ref(b)),
        Err(CloneError::CollectionAccess { .. })
    ));
}

#[test]
fn test_dangling_reference() {
    let mut heap = Heap::new();
    let elsewhere = {
        let mut other = Heap::new();
        for _ in 0..3 {
            other.alloc_array(ValueType::Int, 0).unwrap();
        }
        other.alloc_array(ValueType::Int, 0).unwrap()
    };
    let err = clone_value(&mut heap, &Value::Ref(elsewhere)).unwrap_err();
    assert!(matches!(err, CloneError::Heap(HeapError::DanglingReference(r)) if r == elsewhere));
}

/// Returns a fixed value whatever it is asked to copy
struct Rogue(Value);

impl CloningEngine for Rogue {
    fn clone_value(&mut self, _heap: &mut Heap, _value: &Value) -> CloneResult<Value> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_rogue_engine_rejected_by_typed_entry() {
    let mut heap = Heap::new();
    let list = array_list_of(&mut heap, []).unwrap();
    let arr = heap.alloc_array(ValueType::Int, 1).unwrap();

    let mut rogue = Rogue(Value::Ref(arr));
    let err = clone_typed_with::<ObjRef>(&mut heap, &list, &mut rogue).unwrap_err();
    assert!(matches!(err, CloneError::TypeMismatch { ref expected, ref found } if expected == "ArrayList" && found == "int[]"));

    let mut rogue = Rogue(Value::Long(1));
    assert!(matches!(
        clone_typed_with(&mut heap, &1i32, &mut rogue),
        Err(CloneError::TypeMismatch { .. })
    ));

    // The untyped entry point trusts the engine
    let mut rogue = Rogue(Value::Long(1));
    assert_eq!(clone_value_with(&mut heap, &Value::Int(1), &mut rogue).unwrap(), Value::Long(1));
}

#[test]
fn test_shared_text_policy() {
    let mut heap = Heap::new();
    let source = Text::new("shared");
    let list = array_list_of(&mut heap, [Value::Text(source.clone())]).unwrap();

    let mut engine = DefaultCloningEngine::with_config(EngineConfig {
        text_policy: TextPolicy::Share,
        session_capacity: 4,
    });
    let copy = engine.clone_value(&mut heap, &Value::Ref(list)).unwrap().as_obj().unwrap();
    let elements = heap.collection_elements(copy).unwrap();
    assert!(Text::same_allocation(elements[0].as_text().unwrap(), &source));
}
