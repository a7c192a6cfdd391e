//! Conversion traits between Rust types and [`Value`].
//!
//! `FromValue` is strict: no numeric widening, no string coercion. A value of
//! the wrong kind is a [`HeapError::TypeMismatch`].

use crate::error::{HeapError, HeapResult};
use crate::heap::ObjRef;
use crate::string::Text;
use crate::types::EnumConstant;
use crate::value::Value;

/// Convert a [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// Name used in mismatch errors
    const TYPE_NAME: &'static str;

    /// Convert, returning `TypeMismatch` when the kind differs.
    fn from_value(value: &Value) -> HeapResult<Self>;
}

/// Convert a Rust type into a [`Value`].
pub trait IntoValue {
    /// Convert into a Value.
    fn into_value(self) -> Value;
}

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: &Value) -> HeapResult<Self> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => Err(HeapError::type_mismatch($name, other.kind_name())),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => Bool, "bool";
    i8 => Byte, "byte";
    i16 => Short, "short";
    i32 => Int, "int";
    i64 => Long, "long";
    f32 => Float, "float";
    f64 => Double, "double";
    char => Char, "char";
    Text => Text, "text";
    EnumConstant => Enum, "enum";
    ObjRef => Ref, "reference";
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "any";

    fn from_value(value: &Value) -> HeapResult<Self> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> HeapResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_scalars() {
        assert_eq!(i32::from_value(&Value::Int(4)).unwrap(), 4);
        assert!(i32::from_value(&Value::Long(4)).is_err());
        assert!(bool::from_value(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<i32>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Some(3i64).into_value(), Value::Long(3));
        assert_eq!(None::<i64>.into_value(), Value::Null);
    }

    #[test]
    fn test_text_round_trip() {
        let t = Text::new("abc");
        assert_eq!(Text::from_value(&t.clone().into_value()).unwrap(), t);
    }
}
