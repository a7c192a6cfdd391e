//! Values of the object model
//!
//! A [`Value`] is either an immutable scalar (numbers, booleans, characters,
//! enum constants, text) or a reference into a [`Heap`](crate::Heap).
//! Equality on [`Value::Ref`] is reference identity; use
//! [`Heap::structurally_equal`](crate::Heap::structurally_equal) to compare
//! object graphs.

use crate::heap::ObjRef;
use crate::string::Text;
use crate::types::EnumConstant;

/// A value stored in a field, array slot or local
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Null reference
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Character
    Char(char),
    /// Enum constant
    Enum(EnumConstant),
    /// Immutable text
    Text(Text),
    /// Reference to a heap object
    Ref(ObjRef),
}

impl Value {
    /// Create a text value
    pub fn text(s: &str) -> Self {
        Self::Text(Text::new(s))
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the heap reference, if any
    pub fn as_obj(&self) -> Option<ObjRef> {
        match self {
            Self::Ref(r) => Some(*r),
            _ => None,
        }
    }

    /// Get as text
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Name of the value's kind, without consulting a heap
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Char(_) => "char",
            Self::Enum(_) => "enum",
            Self::Text(_) => "text",
            Self::Ref(_) => "reference",
        }
    }

    /// Equality for scalars and text, identity for references.
    ///
    /// Floats compare by bit pattern so that NaN equals itself.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<Text> for Value {
    fn from(t: Text) -> Self {
        Self::Text(t)
    }
}

impl From<ObjRef> for Value {
    fn from(r: ObjRef) -> Self {
        Self::Ref(r)
    }
}

impl From<EnumConstant> for Value {
    fn from(c: EnumConstant) -> Self {
        Self::Enum(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_equality_is_by_content() {
        assert_eq!(Value::text("abc"), Value::from("abc"));
        assert_ne!(Value::text("abc"), Value::text("abd"));
    }

    #[test]
    fn test_same_value_nan() {
        assert!(Value::Double(f64::NAN).same_value(&Value::Double(f64::NAN)));
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }
}
