//! Class metadata: fields, constructors and the collection capability.
//!
//! A [`Class`] is the per-type metadata table that stands in for runtime
//! reflection. It is built once through [`ClassBuilder`] and shared as
//! `Arc<Class>`; instances on the heap point at it.
//!
//! ## Usage
//!
//! ```ignore
//! let person = ClassBuilder::new("Person")
//!     .field("name", ValueType::Text)
//!     .field("age", ValueType::Int)
//!     .default_constructor()
//!     .build();
//! ```
//!
//! Instance slots are laid out ancestor-first: a subclass's own fields follow
//! every field of its superclass, so a [`FieldRef`] taken from a superclass
//! addresses the same slot in every subclass instance.

use crate::error::{HeapError, HeapResult};
use crate::heap::{Heap, ObjRef};
use crate::types::ValueType;
use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique class identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Access level of a field or constructor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Accessible to everyone
    Public,
    /// Accessible to subclasses
    Protected,
    /// Accessible to the declaring class only
    #[default]
    Private,
}

/// Field modifiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldModifiers {
    /// Access level
    pub visibility: Visibility,
    /// Class-level storage, no instance slot
    pub is_static: bool,
    /// Excluded from copies and structural comparison
    pub is_transient: bool,
}

impl FieldModifiers {
    /// Public instance field
    pub const fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            is_static: false,
            is_transient: false,
        }
    }

    /// Protected instance field
    pub const fn protected() -> Self {
        Self {
            visibility: Visibility::Protected,
            is_static: false,
            is_transient: false,
        }
    }

    /// Private instance field
    pub const fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            is_static: false,
            is_transient: false,
        }
    }

    /// Mark as static
    pub const fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as transient
    pub const fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }
}

/// A declared field
#[derive(Debug)]
pub struct FieldDescriptor {
    name: Arc<str>,
    ty: ValueType,
    modifiers: FieldModifiers,
    /// Instance slot, or index into the class's static storage
    slot: usize,
}

impl FieldDescriptor {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn value_type(&self) -> &ValueType {
        &self.ty
    }

    /// Modifiers
    pub fn modifiers(&self) -> FieldModifiers {
        self.modifiers
    }

    /// Static field
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    /// Transient field
    pub fn is_transient(&self) -> bool {
        self.modifiers.is_transient
    }

    /// Public field
    pub fn is_public(&self) -> bool {
        self.modifiers.visibility == Visibility::Public
    }

    /// Slot index
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Handle to a field of a specific declaring class
#[derive(Clone)]
pub struct FieldRef {
    class: Arc<Class>,
    index: usize,
}

impl FieldRef {
    /// Class that declares the field
    pub fn declaring_class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Field descriptor
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.class.fields[self.index]
    }

    /// Field name
    pub fn name(&self) -> &str {
        self.descriptor().name()
    }
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class.name, self.name())
    }
}

/// Constructor body: initializes the freshly allocated instance `this`
pub type ConstructorBody = Arc<dyn Fn(&mut Heap, ObjRef, &[Value]) -> HeapResult<()> + Send + Sync>;

/// A constructor: parameter types, visibility and body
pub struct Constructor {
    params: Vec<ValueType>,
    visibility: Visibility,
    body: ConstructorBody,
}

impl Constructor {
    /// Create a constructor
    pub fn new<F>(visibility: Visibility, params: Vec<ValueType>, body: F) -> Self
    where
        F: Fn(&mut Heap, ObjRef, &[Value]) -> HeapResult<()> + Send + Sync + 'static,
    {
        Self {
            params,
            visibility,
            body: Arc::new(body),
        }
    }

    /// Parameter types
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Access level
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Callable from outside the class
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Check whether `args` match the parameter list
    pub fn accepts(&self, heap: &Heap, args: &[Value]) -> bool {
        args.len() == self.params.len() && self.params.iter().zip(args).all(|(ty, a)| ty.accepts(heap, a))
    }

    /// Run the body on `this` after checking the arguments
    pub fn invoke(&self, heap: &mut Heap, this: ObjRef, args: &[Value]) -> HeapResult<()> {
        if args.len() != self.params.len() {
            return Err(HeapError::ArityMismatch {
                expected: self.params.len(),
                found: args.len(),
            });
        }
        for (ty, arg) in self.params.iter().zip(args) {
            if !ty.accepts(heap, arg) {
                return Err(HeapError::type_mismatch(ty.to_string(), heap.type_name(arg)));
            }
        }
        (self.body)(heap, this, args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// Appends one element to a collection instance
pub type AppendFn = Arc<dyn Fn(&mut Heap, ObjRef, Value) -> HeapResult<()> + Send + Sync>;

/// Lists a collection instance's elements in iteration order
pub type ElementsFn = Arc<dyn Fn(&Heap, ObjRef) -> HeapResult<Vec<Value>> + Send + Sync>;

/// Collection capability: single-element append plus ordered iteration
#[derive(Clone)]
pub struct CollectionOps {
    append: AppendFn,
    elements: ElementsFn,
}

impl CollectionOps {
    /// Create from an append and an iteration function
    pub fn new<A, E>(append: A, elements: E) -> Self
    where
        A: Fn(&mut Heap, ObjRef, Value) -> HeapResult<()> + Send + Sync + 'static,
        E: Fn(&Heap, ObjRef) -> HeapResult<Vec<Value>> + Send + Sync + 'static,
    {
        Self {
            append: Arc::new(append),
            elements: Arc::new(elements),
        }
    }

    /// Append `value` to `target`
    pub fn append(&self, heap: &mut Heap, target: ObjRef, value: Value) -> HeapResult<()> {
        (self.append)(heap, target, value)
    }

    /// Elements of `target` in iteration order
    pub fn elements(&self, heap: &Heap, target: ObjRef) -> HeapResult<Vec<Value>> {
        (self.elements)(heap, target)
    }
}

/// Runtime metadata of a composite type
pub struct Class {
    id: ClassId,
    name: Arc<str>,
    superclass: Option<Arc<Class>>,
    fields: Vec<FieldDescriptor>,
    slot_count: usize,
    constructors: Vec<Arc<Constructor>>,
    collection: Option<CollectionOps>,
    statics: RwLock<Vec<Value>>,
}

impl Class {
    /// Process-unique id
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclass
    pub fn superclass(&self) -> Option<&Arc<Class>> {
        self.superclass.as_ref()
    }

    /// Fields declared by this class, in declaration order
    pub fn declared_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Handles to the fields declared by this class
    pub fn declared_field_refs(self: &Arc<Self>) -> impl Iterator<Item = FieldRef> + '_ {
        (0..self.fields.len()).map(move |index| FieldRef {
            class: Arc::clone(self),
            index,
        })
    }

    /// Number of instance slots, inherited ones included
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Declared constructors, in declaration order
    pub fn constructors(&self) -> &[Arc<Constructor>] {
        &self.constructors
    }

    /// This class followed by each ancestor
    pub fn ancestors(self: &Arc<Self>) -> impl Iterator<Item = &Arc<Class>> {
        std::iter::successors(Some(self), |c| c.superclass.as_ref())
    }

    /// Whether `self` is `other` or inherits from it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.id == other.id {
                return true;
            }
            current = class.superclass.as_deref();
        }
        false
    }

    /// Collection capability, own or inherited
    pub fn collection(&self) -> Option<&CollectionOps> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(ops) = &class.collection {
                return Some(ops);
            }
            current = class.superclass.as_deref();
        }
        None
    }

    /// Look up a field by name, most-derived declaration first
    pub fn field(self: &Arc<Self>, name: &str) -> Option<FieldRef> {
        self.ancestors().find_map(|class| {
            class
                .fields
                .iter()
                .position(|f| f.name() == name)
                .map(|index| FieldRef {
                    class: Arc::clone(class),
                    index,
                })
        })
    }

    /// Read a static field
    pub fn get_static(self: &Arc<Self>, name: &str) -> HeapResult<Value> {
        let field = self.static_field(name)?;
        let slot = field.descriptor().slot();
        Ok(field.class.statics.read()[slot].clone())
    }

    /// Write a static field
    pub fn set_static(self: &Arc<Self>, heap: &Heap, name: &str, value: Value) -> HeapResult<()> {
        let field = self.static_field(name)?;
        let desc = field.descriptor();
        if !desc.value_type().accepts(heap, &value) {
            return Err(HeapError::type_mismatch(desc.value_type().to_string(), heap.type_name(&value)));
        }
        field.class.statics.write()[desc.slot()] = value;
        Ok(())
    }

    fn static_field(self: &Arc<Self>, name: &str) -> HeapResult<FieldRef> {
        self.field(name)
            .filter(|f| f.descriptor().is_static())
            .ok_or_else(|| HeapError::NoSuchField {
                class: self.name.to_string(),
                field: name.to_string(),
            })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Builder for [`Class`] metadata
pub struct ClassBuilder {
    name: String,
    superclass: Option<Arc<Class>>,
    fields: Vec<(String, ValueType, FieldModifiers)>,
    constructors: Vec<Constructor>,
    collection: Option<CollectionOps>,
}

impl ClassBuilder {
    /// Start a class named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            fields: Vec::new(),
            constructors: Vec::new(),
            collection: None,
        }
    }

    /// Inherit from `parent`
    pub fn extends(mut self, parent: &Arc<Class>) -> Self {
        self.superclass = Some(Arc::clone(parent));
        self
    }

    /// Private instance field
    pub fn field(self, name: &str, ty: ValueType) -> Self {
        self.field_with(name, ty, FieldModifiers::private())
    }

    /// Public instance field
    pub fn public_field(self, name: &str, ty: ValueType) -> Self {
        self.field_with(name, ty, FieldModifiers::public())
    }

    /// Private static field
    pub fn static_field(self, name: &str, ty: ValueType) -> Self {
        self.field_with(name, ty, FieldModifiers::private().with_static())
    }

    /// Field with explicit modifiers
    pub fn field_with(mut self, name: &str, ty: ValueType, modifiers: FieldModifiers) -> Self {
        self.fields.push((name.to_string(), ty, modifiers));
        self
    }

    /// Add a constructor
    pub fn constructor<F>(mut self, visibility: Visibility, params: Vec<ValueType>, body: F) -> Self
    where
        F: Fn(&mut Heap, ObjRef, &[Value]) -> HeapResult<()> + Send + Sync + 'static,
    {
        self.constructors.push(Constructor::new(visibility, params, body));
        self
    }

    /// Add a public no-argument constructor that leaves every field at its zero value
    pub fn default_constructor(self) -> Self {
        self.constructor(Visibility::Public, Vec::new(), |_, _, _| Ok(()))
    }

    /// Declare the collection capability
    pub fn collection(mut self, ops: CollectionOps) -> Self {
        self.collection = Some(ops);
        self
    }

    /// Finish the class
    pub fn build(self) -> Arc<Class> {
        let mut next_slot = self.superclass.as_ref().map_or(0, |s| s.slot_count);
        let mut statics = Vec::new();
        let fields = self
            .fields
            .into_iter()
            .map(|(name, ty, modifiers)| {
                let slot = if modifiers.is_static {
                    statics.push(ty.zero_value());
                    statics.len() - 1
                } else {
                    next_slot += 1;
                    next_slot - 1
                };
                FieldDescriptor {
                    name: Arc::from(name),
                    ty,
                    modifiers,
                    slot,
                }
            })
            .collect();

        Arc::new(Class {
            id: ClassId::next(),
            name: Arc::from(self.name),
            superclass: self.superclass,
            fields,
            slot_count: next_slot,
            constructors: self.constructors.into_iter().map(Arc::new).collect(),
            collection: self.collection,
            statics: RwLock::new(statics),
        })
    }
}
