//! Dynamic values for defaults and coerced arguments, plus enum variant sets.

use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::error::ValueError;

/// A closed, named set of variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: String,
    variants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Look up a variant by exact, case-sensitive name.
    pub fn value(self: &Arc<Self>, variant: &str) -> Option<EnumValue> {
        self.variants
            .iter()
            .position(|v| v == variant)
            .map(|index| EnumValue {
                ty: Arc::clone(self),
                index,
            })
    }

    /// `{a,b,c}`, the way usage lines show a choice list.
    pub fn choices_label(&self) -> String {
        format!("{{{}}}", self.variants.join(","))
    }
}

/// One variant of an [`EnumType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    ty: Arc<EnumType>,
    index: usize,
}

impl EnumValue {
    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.ty
    }

    pub fn variant(&self) -> &str {
        &self.ty.variants[self.index]
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant())
    }
}

/// A default value or a coerced argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Enum(EnumValue),
    List(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn tuple<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Wrap a Rust enum that implements [`CliEnum`].
    pub fn enum_of<E: CliEnum>(value: &E) -> Self {
        let ty = Arc::new(E::enum_type());
        // variant() always names a member of enum_type()
        match ty.value(value.variant()) {
            Some(v) => Value::Enum(v),
            None => Value::Str(value.variant().to_string()),
        }
    }

    /// Short name of the value's shape, used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Str(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Value::None => f.write_str("None"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Enum(e) => write!(f, "{}.{}", e.enum_type().name(), e.variant()),
            Value::List(items) => {
                f.write_str("[")?;
                join(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                join(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_none(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Enum(e) => serializer.serialize_str(e.variant()),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// A Rust enum usable as a choice parameter. Usually derived with [`cli_enum!`](crate::cli_enum).
pub trait CliEnum: Sized {
    fn enum_type() -> EnumType;
    fn from_variant(name: &str) -> Option<Self>;
    fn variant(&self) -> &'static str;
}

/// Typed extraction from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: &str, found: &Value) -> ValueError {
    ValueError::Mismatch {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            Value::Enum(e) => Ok(e.variant().to_string()),
            other => Err(mismatch("str", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(n) => Ok(*n),
            other => Err(mismatch("int", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(n) => Ok(*n as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) | Value::Tuple(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("list", other)),
        }
    }
}

fn sequence_of_len(value: &Value, len: usize) -> Result<&[Value], ValueError> {
    match value {
        Value::List(items) | Value::Tuple(items) if items.len() == len => Ok(items),
        Value::List(items) | Value::Tuple(items) => Err(ValueError::Mismatch {
            expected: format!("{len} values"),
            found: format!("{} values", items.len()),
        }),
        other => Err(mismatch("tuple", other)),
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let items = sequence_of_len(value, 2)?;
        Ok((A::from_value(&items[0])?, B::from_value(&items[1])?))
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let items = sequence_of_len(value, 3)?;
        Ok((
            A::from_value(&items[0])?,
            B::from_value(&items[1])?,
            C::from_value(&items[2])?,
        ))
    }
}

/// Extract a [`CliEnum`] from an enum or string value. Used by [`cli_enum!`](crate::cli_enum).
pub fn enum_from_value<E: CliEnum>(value: &Value) -> Result<E, ValueError> {
    let variant = match value {
        Value::Enum(e) => e.variant(),
        Value::Str(s) => s.as_str(),
        other => return Err(mismatch("enum", other)),
    };
    E::from_variant(variant).ok_or_else(|| ValueError::UnknownVariant {
        enum_name: E::enum_type().name().to_string(),
        variant: variant.to_string(),
    })
}

/// Declare a fieldless enum usable as a choice parameter.
///
/// Variant names double as the accepted command-line tokens.
///
/// ```
/// sigcli::cli_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Mode { Fast, Slow }
/// }
/// ```
#[macro_export]
macro_rules! cli_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant),+
        }

        impl $crate::CliEnum for $name {
            fn enum_type() -> $crate::EnumType {
                $crate::EnumType::new(stringify!($name), [$(stringify!($variant)),+])
            }

            fn from_variant(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn variant(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(value: &$crate::Value) -> Result<Self, $crate::ValueError> {
                $crate::value::enum_from_value(value)
            }
        }
    };
}
