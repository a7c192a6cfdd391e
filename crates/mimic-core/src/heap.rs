//! Heap management
//!
//! The heap is an arena: objects are appended to a vector and addressed by
//! [`ObjRef`] handles. A handle is the object's identity, so graphs may hold
//! cycles and shared references without any reference counting. Nothing is
//! freed before the heap itself is dropped.

use crate::class::{Class, FieldDescriptor, FieldRef};
use crate::error::{HeapError, HeapResult};
use crate::temporal::TemporalValue;
use crate::types::ValueType;
use crate::value::Value;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Handle to a heap object; equal handles are the same object
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(u32);

impl ObjRef {
    /// Arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A class instance: one slot per non-static field in the hierarchy
#[derive(Debug)]
pub struct Instance {
    class: Arc<Class>,
    slots: Vec<Value>,
}

impl Instance {
    /// Runtime class
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Raw slot values
    pub fn slots(&self) -> &[Value] {
        &self.slots
    }
}

/// A fixed-length typed array
#[derive(Debug)]
pub struct ArrayObject {
    element: ValueType,
    items: Vec<Value>,
}

impl ArrayObject {
    /// Element type
    pub fn element_type(&self) -> &ValueType {
        &self.element
    }

    /// Length
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// An object stored on the heap
#[derive(Debug)]
pub enum HeapObject {
    /// Class instance
    Instance(Instance),
    /// Array
    Array(ArrayObject),
    /// Mutable temporal cell
    Temporal(TemporalValue),
}

impl HeapObject {
    /// Short kind name
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Instance(_) => "instance",
            Self::Array(_) => "array",
            Self::Temporal(_) => "temporal",
        }
    }
}

/// Heap configuration
#[derive(Debug, Clone)]
pub struct HeapConfig {
    /// Object slots reserved up front (default: 1024)
    pub initial_capacity: usize,
    /// Maximum number of live objects (default: 16M)
    pub object_limit: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            object_limit: 16 * 1024 * 1024,
        }
    }
}

/// Heap statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Total objects
    pub objects: usize,
    /// Class instances
    pub instances: usize,
    /// Arrays
    pub arrays: usize,
    /// Temporal cells
    pub temporals: usize,
}

/// Arena of heap objects
pub struct Heap {
    objects: Vec<HeapObject>,
    config: HeapConfig,
}

impl Heap {
    /// Create new heap with default config
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    /// Create new heap with custom config
    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            objects: Vec::with_capacity(config.initial_capacity.min(config.object_limit)),
            config,
        }
    }

    /// Get config
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Number of allocated objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing has been allocated
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Count objects per kind
    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            objects: self.objects.len(),
            ..Default::default()
        };
        for object in &self.objects {
            match object {
                HeapObject::Instance(_) => stats.instances += 1,
                HeapObject::Array(_) => stats.arrays += 1,
                HeapObject::Temporal(_) => stats.temporals += 1,
            }
        }
        stats
    }

    fn alloc(&mut self, object: HeapObject) -> HeapResult<ObjRef> {
        let limit = self.config.object_limit;
        if self.objects.len() >= limit {
            return Err(HeapError::OutOfMemory { limit });
        }
        let index = u32::try_from(self.objects.len()).map_err(|_| HeapError::OutOfMemory { limit })?;
        self.objects.push(object);
        Ok(ObjRef(index))
    }

    /// Allocate an instance with every field at its zero value.
    ///
    /// No constructor runs; see [`Heap::construct`].
    pub fn alloc_instance(&mut self, class: &Arc<Class>) -> HeapResult<ObjRef> {
        let mut slots = vec![Value::Null; class.slot_count()];
        for field in instance_fields(class) {
            slots[field.slot()] = field.value_type().zero_value();
        }
        self.alloc(HeapObject::Instance(Instance {
            class: Arc::clone(class),
            slots,
        }))
    }

    /// Allocate a zero-filled array
    pub fn alloc_array(&mut self, element: ValueType, len: usize) -> HeapResult<ObjRef> {
        let items = vec![element.zero_value(); len];
        self.alloc(HeapObject::Array(ArrayObject { element, items }))
    }

    /// Allocate an array holding `items`
    pub fn alloc_array_from(&mut self, element: ValueType, items: Vec<Value>) -> HeapResult<ObjRef> {
        if let Some(bad) = items.iter().find(|v| !element.accepts(self, v)) {
            return Err(HeapError::type_mismatch(element.to_string(), self.type_name(bad)));
        }
        self.alloc(HeapObject::Array(ArrayObject { element, items }))
    }

    /// Allocate a temporal cell
    pub fn alloc_temporal(&mut self, value: TemporalValue) -> HeapResult<ObjRef> {
        self.alloc(HeapObject::Temporal(value))
    }

    /// Allocate an instance and run the first public constructor accepting `args`
    pub fn construct(&mut self, class: &Arc<Class>, args: &[Value]) -> HeapResult<ObjRef> {
        let ctor = class
            .constructors()
            .iter()
            .find(|c| c.is_public() && c.accepts(self, args))
            .cloned()
            .ok_or_else(|| HeapError::NoMatchingConstructor {
                class: class.name().to_string(),
            })?;
        let this = self.alloc_instance(class)?;
        ctor.invoke(self, this, args)?;
        Ok(this)
    }

    /// Get an object
    pub fn object(&self, r: ObjRef) -> HeapResult<&HeapObject> {
        self.objects.get(r.index()).ok_or(HeapError::DanglingReference(r))
    }

    fn object_mut(&mut self, r: ObjRef) -> HeapResult<&mut HeapObject> {
        self.objects.get_mut(r.index()).ok_or(HeapError::DanglingReference(r))
    }

    /// Get an instance
    pub fn instance(&self, r: ObjRef) -> HeapResult<&Instance> {
        match self.object(r)? {
            HeapObject::Instance(inst) => Ok(inst),
            _ => Err(HeapError::NotAnInstance(r)),
        }
    }

    fn instance_mut(&mut self, r: ObjRef) -> HeapResult<&mut Instance> {
        match self.object_mut(r)? {
            HeapObject::Instance(inst) => Ok(inst),
            _ => Err(HeapError::NotAnInstance(r)),
        }
    }

    /// Get an array
    pub fn array(&self, r: ObjRef) -> HeapResult<&ArrayObject> {
        match self.object(r)? {
            HeapObject::Array(arr) => Ok(arr),
            _ => Err(HeapError::NotAnArray(r)),
        }
    }

    fn array_mut(&mut self, r: ObjRef) -> HeapResult<&mut ArrayObject> {
        match self.object_mut(r)? {
            HeapObject::Array(arr) => Ok(arr),
            _ => Err(HeapError::NotAnArray(r)),
        }
    }

    /// Runtime class of an instance
    pub fn class_of(&self, r: ObjRef) -> HeapResult<&Arc<Class>> {
        Ok(self.instance(r)?.class())
    }

    // ------------------------------------------------------------------
    // Field access
    // ------------------------------------------------------------------

    /// Read a public field by name
    pub fn get(&self, r: ObjRef, name: &str) -> HeapResult<Value> {
        let field = self.public_field(r, name)?;
        self.read_field(r, &field)
    }

    /// Write a public field by name
    pub fn set(&mut self, r: ObjRef, name: &str, value: impl Into<Value>) -> HeapResult<()> {
        let field = self.public_field(r, name)?;
        self.write_field(r, &field, value.into())
    }

    fn public_field(&self, r: ObjRef, name: &str) -> HeapResult<FieldRef> {
        let class = self.class_of(r)?;
        let field = class
            .field(name)
            .filter(|f| !f.descriptor().is_static())
            .ok_or_else(|| HeapError::NoSuchField {
                class: class.name().to_string(),
                field: name.to_string(),
            })?;
        if !field.descriptor().is_public() {
            return Err(HeapError::FieldNotAccessible {
                class: field.declaring_class().name().to_string(),
                field: name.to_string(),
            });
        }
        Ok(field)
    }

    /// Read any instance field regardless of visibility
    pub fn read_field(&self, r: ObjRef, field: &FieldRef) -> HeapResult<Value> {
        let inst = self.instance(r)?;
        check_declared(inst, field)?;
        Ok(inst.slots[field.descriptor().slot()].clone())
    }

    /// Write any instance field regardless of visibility; the value must
    /// match the declared type
    pub fn write_field(&mut self, r: ObjRef, field: &FieldRef, value: Value) -> HeapResult<()> {
        check_declared(self.instance(r)?, field)?;
        let desc = field.descriptor();
        if !desc.value_type().accepts(self, &value) {
            return Err(HeapError::type_mismatch(desc.value_type().to_string(), self.type_name(&value)));
        }
        self.instance_mut(r)?.slots[desc.slot()] = value;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Arrays
    // ------------------------------------------------------------------

    /// Array length
    pub fn array_len(&self, r: ObjRef) -> HeapResult<usize> {
        Ok(self.array(r)?.len())
    }

    /// Read an array element
    pub fn array_get(&self, r: ObjRef, index: usize) -> HeapResult<Value> {
        let arr = self.array(r)?;
        arr.items.get(index).cloned().ok_or(HeapError::IndexOutOfBounds {
            index,
            len: arr.items.len(),
        })
    }

    /// Write an array element; the value must match the element type
    pub fn array_set(&mut self, r: ObjRef, index: usize, value: Value) -> HeapResult<()> {
        let arr = self.array(r)?;
        let len = arr.items.len();
        if index >= len {
            return Err(HeapError::IndexOutOfBounds { index, len });
        }
        if !arr.element.accepts(self, &value) {
            return Err(HeapError::type_mismatch(arr.element.to_string(), self.type_name(&value)));
        }
        self.array_mut(r)?.items[index] = value;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Temporal cells
    // ------------------------------------------------------------------

    /// Read a temporal cell
    pub fn temporal(&self, r: ObjRef) -> HeapResult<TemporalValue> {
        match self.object(r)? {
            HeapObject::Temporal(t) => Ok(*t),
            _ => Err(HeapError::NotTemporal(r)),
        }
    }

    /// Overwrite a temporal cell
    pub fn set_temporal(&mut self, r: ObjRef, value: TemporalValue) -> HeapResult<()> {
        match self.object_mut(r)? {
            HeapObject::Temporal(t) => {
                *t = value;
                Ok(())
            }
            _ => Err(HeapError::NotTemporal(r)),
        }
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// Append through the class's collection capability
    pub fn collection_append(&mut self, r: ObjRef, value: Value) -> HeapResult<()> {
        let class = self.class_of(r)?;
        let ops = class.collection().cloned().ok_or_else(|| HeapError::NotACollection {
            class: class.name().to_string(),
        })?;
        ops.append(self, r, value)
    }

    /// Elements in iteration order
    pub fn collection_elements(&self, r: ObjRef) -> HeapResult<Vec<Value>> {
        let class = self.class_of(r)?;
        let ops = class.collection().ok_or_else(|| HeapError::NotACollection {
            class: class.name().to_string(),
        })?;
        ops.elements(self, r)
    }

    // ------------------------------------------------------------------
    // Typing
    // ------------------------------------------------------------------

    /// Runtime type of a value; `None` for null
    pub fn runtime_type(&self, value: &Value) -> HeapResult<Option<ValueType>> {
        let ty = match value {
            Value::Null => return Ok(None),
            Value::Bool(_) => ValueType::Bool,
            Value::Byte(_) => ValueType::Byte,
            Value::Short(_) => ValueType::Short,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Char(_) => ValueType::Char,
            Value::Enum(c) => ValueType::Enum(Arc::clone(c.enum_type())),
            Value::Text(_) => ValueType::Text,
            Value::Ref(r) => match self.object(*r)? {
                HeapObject::Instance(inst) => ValueType::Object(Arc::clone(&inst.class)),
                HeapObject::Array(arr) => ValueType::array_of(arr.element.clone()),
                HeapObject::Temporal(_) => ValueType::Temporal,
            },
        };
        Ok(Some(ty))
    }

    /// Human-readable runtime type name
    pub fn type_name(&self, value: &Value) -> String {
        match self.runtime_type(value) {
            Ok(Some(ty)) => ty.to_string(),
            Ok(None) => "null".to_string(),
            Err(_) => "<dangling>".to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Graph utilities
    // ------------------------------------------------------------------

    /// Every object reachable from `root` through instance slots and array
    /// elements
    pub fn reachable(&self, root: &Value) -> HeapResult<FxHashSet<ObjRef>> {
        let mut seen = FxHashSet::default();
        let mut worklist: VecDeque<ObjRef> = root.as_obj().into_iter().collect();
        while let Some(r) = worklist.pop_front() {
            if !seen.insert(r) {
                continue;
            }
            let children = match self.object(r)? {
                HeapObject::Instance(inst) => inst.slots.as_slice(),
                HeapObject::Array(arr) => arr.items.as_slice(),
                HeapObject::Temporal(_) => &[][..],
            };
            worklist.extend(children.iter().filter_map(Value::as_obj));
        }
        Ok(seen)
    }

    /// Deep equality of two graphs.
    ///
    /// Scalars and text compare by value, temporal cells by content, arrays
    /// element-wise, collections by their elements in iteration order and
    /// other instances field by field (transient fields excluded). Pairs
    /// already under comparison are assumed equal, so cyclic graphs
    /// terminate.
    ///
    /// Collections compare by elements only: fields a collection subclass
    /// declares on top of its storage are not compared.
    pub fn structurally_equal(&self, a: &Value, b: &Value) -> HeapResult<bool> {
        let mut assumed = FxHashSet::default();
        self.equal_in(a, b, &mut assumed)
    }

    fn equal_in(&self, a: &Value, b: &Value, assumed: &mut FxHashSet<(ObjRef, ObjRef)>) -> HeapResult<bool> {
        let (ra, rb) = match (a, b) {
            (Value::Ref(ra), Value::Ref(rb)) => (*ra, *rb),
            _ => return Ok(a.same_value(b)),
        };
        if !assumed.insert((ra, rb)) {
            return Ok(true);
        }
        match (self.object(ra)?, self.object(rb)?) {
            (HeapObject::Temporal(x), HeapObject::Temporal(y)) => Ok(x == y),
            (HeapObject::Array(x), HeapObject::Array(y)) => {
                if x.element != y.element || x.items.len() != y.items.len() {
                    return Ok(false);
                }
                self.all_equal(&x.items, &y.items, assumed)
            }
            (HeapObject::Instance(x), HeapObject::Instance(y)) => {
                if x.class.id() != y.class.id() {
                    return Ok(false);
                }
                if x.class.collection().is_some() {
                    let xs = self.collection_elements(ra)?;
                    let ys = self.collection_elements(rb)?;
                    return if xs.len() == ys.len() {
                        self.all_equal(&xs, &ys, assumed)
                    } else {
                        Ok(false)
                    };
                }
                for field in instance_fields(&x.class).filter(|f| !f.is_transient()) {
                    if !self.equal_in(&x.slots[field.slot()], &y.slots[field.slot()], assumed)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn all_equal(&self, xs: &[Value], ys: &[Value], assumed: &mut FxHashSet<(ObjRef, ObjRef)>) -> HeapResult<bool> {
        for (x, y) in xs.iter().zip(ys) {
            if !self.equal_in(x, y, assumed)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Render a value for humans; objects already printed show as `Class#n {..}`
    pub fn describe(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut seen = FxHashSet::default();
        // Writing into a String cannot fail
        let _ = self.describe_in(value, &mut out, &mut seen);
        out
    }

    fn describe_in(&self, value: &Value, out: &mut String, seen: &mut FxHashSet<ObjRef>) -> fmt::Result {
        use std::fmt::Write;

        let r = match value {
            Value::Null => return out.write_str("null"),
            Value::Bool(b) => return write!(out, "{}", b),
            Value::Byte(n) => return write!(out, "{}", n),
            Value::Short(n) => return write!(out, "{}", n),
            Value::Int(n) => return write!(out, "{}", n),
            Value::Long(n) => return write!(out, "{}", n),
            Value::Float(n) => return write!(out, "{:?}", n),
            Value::Double(n) => return write!(out, "{:?}", n),
            Value::Char(c) => return write!(out, "{:?}", c),
            Value::Enum(c) => return write!(out, "{:?}", c),
            Value::Text(t) => return write!(out, "{:?}", t),
            Value::Ref(r) => *r,
        };

        let object = match self.object(r) {
            Ok(object) => object,
            Err(_) => return write!(out, "<dangling {:?}>", r),
        };
        let label = match object {
            HeapObject::Instance(inst) => inst.class.name().to_string(),
            HeapObject::Array(arr) => format!("{}[]", arr.element),
            HeapObject::Temporal(t) => return write!(out, "{}{:?}({})", t.kind_name(), r, t),
        };
        if !seen.insert(r) {
            return write!(out, "{}{:?} {{..}}", label, r);
        }

        match object {
            HeapObject::Instance(inst) if inst.class.collection().is_some() => {
                write!(out, "{}{:?} ", label, r)?;
                match self.collection_elements(r) {
                    Ok(items) => self.describe_list(&items, out, seen),
                    Err(e) => write!(out, "<{}>", e),
                }
            }
            HeapObject::Instance(inst) => {
                write!(out, "{}{:?} {{ ", label, r)?;
                for (i, field) in instance_fields(&inst.class).enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    write!(out, "{}: ", field.name())?;
                    self.describe_in(&inst.slots[field.slot()], out, seen)?;
                }
                out.write_str(" }")
            }
            HeapObject::Array(arr) => {
                write!(out, "{}{:?} ", label, r)?;
                self.describe_list(&arr.items, out, seen)
            }
            HeapObject::Temporal(_) => Ok(()),
        }
    }

    fn describe_list(&self, items: &[Value], out: &mut String, seen: &mut FxHashSet<ObjRef>) -> fmt::Result {
        use std::fmt::Write;

        out.write_char('[')?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            self.describe_in(item, out, seen)?;
        }
        out.write_char(']')
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("stats", &self.stats())
            .field("config", &self.config)
            .finish()
    }
}

/// Non-static fields of `class` and its ancestors, most-derived class first
fn instance_fields(class: &Arc<Class>) -> impl Iterator<Item = &FieldDescriptor> {
    class
        .ancestors()
        .flat_map(|c| c.declared_fields())
        .filter(|f| !f.is_static())
}

fn check_declared(inst: &Instance, field: &FieldRef) -> HeapResult<()> {
    let desc = field.descriptor();
    if desc.is_static() {
        return Err(HeapError::StaticField {
            class: field.declaring_class().name().to_string(),
            field: desc.name().to_string(),
        });
    }
    if !inst.class.is_subclass_of(field.declaring_class()) {
        return Err(HeapError::FieldNotDeclared {
            class: inst.class.name().to_string(),
            declaring: field.declaring_class().name().to_string(),
            field: desc.name().to_string(),
        });
    }
    Ok(())
}
