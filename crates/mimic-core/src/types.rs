//! Declared types of fields, constructor parameters and array elements.

use crate::class::Class;
use crate::heap::{Heap, HeapObject};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENUM_ID: AtomicU64 = AtomicU64::new(1);

/// An enumerated type: a fixed, ordered list of named constants
pub struct EnumType {
    id: u64,
    name: Arc<str>,
    constants: Vec<Arc<str>>,
}

impl EnumType {
    /// Declare a new enum type
    pub fn new(name: &str, constants: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_ENUM_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
            constants: constants.iter().map(|c| Arc::from(*c)).collect(),
        })
    }

    /// Process-unique id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of constants
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Whether the enum declares no constants
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Constant at `ordinal`
    pub fn constant(self: &Arc<Self>, ordinal: u32) -> Option<EnumConstant> {
        ((ordinal as usize) < self.constants.len()).then(|| EnumConstant {
            ty: Arc::clone(self),
            ordinal,
        })
    }

    /// First declared constant
    pub fn first(self: &Arc<Self>) -> Option<EnumConstant> {
        self.constant(0)
    }

    /// Constant by name
    pub fn value_of(self: &Arc<Self>, name: &str) -> Option<EnumConstant> {
        let ordinal = self.constants.iter().position(|c| &**c == name)?;
        self.constant(ordinal as u32)
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType")
            .field("name", &self.name)
            .field("constants", &self.constants)
            .finish()
    }
}

/// A constant of an [`EnumType`]
#[derive(Clone)]
pub struct EnumConstant {
    ty: Arc<EnumType>,
    ordinal: u32,
}

impl EnumConstant {
    /// The enum type
    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.ty
    }

    /// Declaration index
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Constant name
    pub fn name(&self) -> &str {
        &self.ty.constants[self.ordinal as usize]
    }
}

impl PartialEq for EnumConstant {
    fn eq(&self, other: &Self) -> bool {
        self.ty.id == other.ty.id && self.ordinal == other.ordinal
    }
}

impl Eq for EnumConstant {}

impl fmt::Debug for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.ty.name, self.name())
    }
}

/// Declared type of a field, parameter or array element
#[derive(Clone)]
pub enum ValueType {
    /// `bool`
    Bool,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Single character
    Char,
    /// Immutable text
    Text,
    /// Constant of the given enum type
    Enum(Arc<EnumType>),
    /// Temporal heap object
    Temporal,
    /// Array with the given element type
    Array(Box<ValueType>),
    /// Instance of the given class or one of its subclasses
    Object(Arc<Class>),
    /// Any value, including null
    Any,
}

impl ValueType {
    /// Array type with the given element type
    pub fn array_of(element: ValueType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Whether the type is one of the integral kinds
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Whether the type is one of the floating-point kinds
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Whether values of this type can be null
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Enum(_) | Self::Temporal | Self::Array(_) | Self::Object(_) | Self::Any
        )
    }

    /// Value a freshly allocated field or array slot holds
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Byte => Value::Byte(0),
            Self::Short => Value::Short(0),
            Self::Int => Value::Int(0),
            Self::Long => Value::Long(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            Self::Char => Value::Char('\0'),
            _ => Value::Null,
        }
    }

    /// Check whether `value` may be stored in a slot of this type
    pub fn accepts(&self, heap: &Heap, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (ty, Value::Null) => ty.is_nullable(),
            (Self::Bool, Value::Bool(_))
            | (Self::Byte, Value::Byte(_))
            | (Self::Short, Value::Short(_))
            | (Self::Int, Value::Int(_))
            | (Self::Long, Value::Long(_))
            | (Self::Float, Value::Float(_))
            | (Self::Double, Value::Double(_))
            | (Self::Char, Value::Char(_))
            | (Self::Text, Value::Text(_)) => true,
            (Self::Enum(ty), Value::Enum(c)) => c.enum_type().id() == ty.id(),
            (expected, Value::Ref(r)) => match (expected, heap.object(*r)) {
                (Self::Temporal, Ok(HeapObject::Temporal(_))) => true,
                (Self::Array(elem), Ok(HeapObject::Array(arr))) => {
                    matches!(**elem, Self::Any) || **elem == *arr.element_type()
                }
                (Self::Object(class), Ok(HeapObject::Instance(inst))) => inst.class().is_subclass_of(class),
                _ => false,
            },
            _ => false,
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Enum(a), Self::Enum(b)) => a.id() == b.id(),
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.id() == b.id(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Byte => f.write_str("byte"),
            Self::Short => f.write_str("short"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Char => f.write_str("char"),
            Self::Text => f.write_str("text"),
            Self::Enum(ty) => f.write_str(ty.name()),
            Self::Temporal => f.write_str("temporal"),
            Self::Array(elem) => write!(f, "{}[]", elem),
            Self::Object(class) => f.write_str(class.name()),
            Self::Any => f.write_str("any"),
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueType({})", self)
    }
}
