//! Sample object graphs for the CLI commands.

use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use mimic_core::builtins::{array_list, array_list_of};
use mimic_core::{Class, ClassBuilder, FieldRef, Heap, HeapResult, ObjRef, Value, ValueType, Visibility};
use std::sync::{Arc, LazyLock};

static MAN: LazyLock<Arc<Class>> = LazyLock::new(|| {
    let tags = ValueType::Object(array_list());
    ClassBuilder::new("Man")
        .field("name", ValueType::Text)
        .field("age", ValueType::Int)
        .field("tags", tags.clone())
        .constructor(
            Visibility::Public,
            vec![ValueType::Text, ValueType::Int, tags],
            |heap, this, args| {
                let class = Arc::clone(heap.class_of(this)?);
                for (name, arg) in ["name", "age", "tags"].into_iter().zip(args) {
                    let field = class.field(name).ok_or_else(|| mimic_core::HeapError::NoSuchField {
                        class: class.name().to_string(),
                        field: name.to_string(),
                    })?;
                    heap.write_field(this, &field, arg.clone())?;
                }
                Ok(())
            },
        )
        .build()
});

static GRAPH_NODE: LazyLock<Arc<Class>> = LazyLock::new(|| {
    ClassBuilder::new("GraphNode")
        .field("id", ValueType::Int)
        .field("label", ValueType::Text)
        .field("next", ValueType::Any)
        .field("links", ValueType::array_of(ValueType::Any))
        .default_constructor()
        .build()
});

/// `Man` with private `name`, `age` and `tags`
pub fn man_class() -> Arc<Class> {
    Arc::clone(&MAN)
}

/// Allocate a `Man` through its public constructor
pub fn new_man(heap: &mut Heap, name: &str, age: i32, tags: &[&str]) -> HeapResult<ObjRef> {
    let tags = array_list_of(heap, tags.iter().map(|t| Value::text(t)))?;
    heap.construct(&MAN, &[Value::text(name), Value::Int(age), Value::Ref(tags)])
}

/// Read a field of any visibility by name
pub fn field_of(heap: &Heap, r: ObjRef, name: &str) -> Result<Value> {
    let field = heap
        .class_of(r)?
        .field(name)
        .with_context(|| format!("no field `{}`", name))?;
    Ok(heap.read_field(r, &field)?)
}

/// Synthetic graph layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    /// Linked list
    Chain,
    /// Linked list closed into a cycle
    Ring,
    /// List of nodes all pointing at one hub node
    Shared,
    /// Every node links to its successor, a scattered node and itself
    Mesh,
}

struct NodeFields {
    id: FieldRef,
    label: FieldRef,
    next: FieldRef,
    links: FieldRef,
}

impl NodeFields {
    fn resolve(class: &Arc<Class>) -> Result<Self> {
        let get = |name: &str| class.field(name).with_context(|| format!("GraphNode.{} missing", name));
        Ok(Self {
            id: get("id")?,
            label: get("label")?,
            next: get("next")?,
            links: get("links")?,
        })
    }
}

/// Build a graph of `nodes` nodes (at least one) and return its root
pub fn build_graph(heap: &mut Heap, shape: Shape, nodes: usize) -> Result<ObjRef> {
    ensure!(nodes > 0, "a graph needs at least one node");
    let class = Arc::clone(&GRAPH_NODE);
    let fields = NodeFields::resolve(&class)?;

    let mut refs = Vec::with_capacity(nodes);
    for i in 0..nodes {
        let node = heap.construct(&class, &[])?;
        heap.write_field(node, &fields.id, Value::Int(i32::try_from(i)?))?;
        heap.write_field(node, &fields.label, Value::text(&format!("node-{}", i)))?;
        refs.push(node);
    }

    let root = match shape {
        Shape::Chain | Shape::Ring => {
            for (i, &node) in refs.iter().enumerate() {
                let next = match refs.get(i + 1) {
                    Some(&succ) => Value::Ref(succ),
                    None if shape == Shape::Ring => Value::Ref(refs[0]),
                    None => Value::Null,
                };
                heap.write_field(node, &fields.next, next)?;
            }
            refs[0]
        }
        Shape::Shared => {
            let hub = heap.construct(&class, &[])?;
            heap.write_field(hub, &fields.label, Value::text("hub"))?;
            for &node in &refs {
                heap.write_field(node, &fields.next, Value::Ref(hub))?;
            }
            array_list_of(heap, refs.iter().map(|&r| Value::Ref(r)))?
        }
        Shape::Mesh => {
            let n = refs.len();
            for (i, &node) in refs.iter().enumerate() {
                let targets = [refs[(i + 1) % n], refs[(i * 7 + 3) % n], node];
                let links = heap.alloc_array_from(ValueType::Any, targets.iter().map(|&t| Value::Ref(t)).collect())?;
                heap.write_field(node, &fields.links, Value::Ref(links))?;
                heap.write_field(node, &fields.next, Value::Ref(refs[(i + 1) % n]))?;
            }
            refs[0]
        }
    };
    Ok(root)
}

/// Fail unless `copy` matches `source` in shape and shares no object with it
pub fn verify_copy(heap: &Heap, source: &Value, copy: &Value) -> Result<usize> {
    ensure!(heap.structurally_equal(source, copy)?, "copy differs from source");
    let from_source = heap.reachable(source)?;
    let from_copy = heap.reachable(copy)?;
    ensure!(from_source.is_disjoint(&from_copy), "copy shares objects with source");
    ensure!(
        from_source.len() == from_copy.len(),
        "source reaches {} objects, copy {}",
        from_source.len(),
        from_copy.len()
    );
    Ok(from_copy.len())
}
