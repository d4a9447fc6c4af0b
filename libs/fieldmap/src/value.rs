use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Canonical value carried in a [`FieldMap`](crate::map::FieldMap).
///
/// Closed set of variants:
/// - Scalars (`Bool`, integers, floats, `Char`): stored by value.
/// - `Str`: owned UTF-8 text, usually the raw form of request parameters.
/// - `Date`, `DateTime`: naive calendar values, no time zone.
/// - `List`: collection passthrough; elements are never coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
}

/// Declared type of a field, or the runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    I32,
    I64,
    U64,
    F32,
    F64,
    Char,
    Str,
    Date,
    DateTime,
    /// Field whose type is a [`NamedEnum`](crate::record::NamedEnum).
    /// Values of this kind travel as `Value::Str` holding the variant name.
    Enum(EnumKind),
    List,
}

/// Name and declared variant names of an enum field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumKind {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

/// ISO 8601 layout used whenever a date-time becomes text.
pub(crate) const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub(crate) const ISO_DATE: &str = "%Y-%m-%d";

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Char(_) => ValueKind::Char,
            Value::Str(_) => ValueKind::Str,
            Value::Date(_) => ValueKind::Date,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::I32 => write!(f, "i32"),
            ValueKind::I64 => write!(f, "i64"),
            ValueKind::U64 => write!(f, "u64"),
            ValueKind::F32 => write!(f, "f32"),
            ValueKind::F64 => write!(f, "f64"),
            ValueKind::Char => write!(f, "char"),
            ValueKind::Str => write!(f, "string"),
            ValueKind::Date => write!(f, "date"),
            ValueKind::DateTime => write!(f, "datetime"),
            ValueKind::Enum(e) => write!(f, "enum {}", e.name),
            ValueKind::List => write!(f, "list"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format(ISO_DATE)),
            Value::DateTime(v) => write!(f, "{}", v.format(ISO_DATE_TIME)),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => Str,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    Vec<Value> => List,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Null, ValueKind::Null)]
    #[case(Value::from(3), ValueKind::I32)]
    #[case(Value::from(3_i64), ValueKind::I64)]
    #[case(Value::from("x"), ValueKind::Str)]
    #[case(Value::from(vec![Value::from(1)]), ValueKind::List)]
    #[case(Value::from(None::<i32>), ValueKind::Null)]
    fn test_kind_reports_runtime_type(#[case] value: Value, #[case] expected: ValueKind) {
        assert_eq!(value.kind(), expected);
    }

    #[rstest]
    fn test_display_dates_are_iso() {
        // Arrange
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let dt = date.and_hms_opt(13, 5, 9).unwrap();

        // Act & Assert
        assert_eq!(Value::Date(date).to_string(), "2024-02-29");
        assert_eq!(Value::DateTime(dt).to_string(), "2024-02-29T13:05:09");
    }

    #[rstest]
    fn test_display_list() {
        let list = Value::List(vec![Value::from(1), Value::from("a")]);

        assert_eq!(list.to_string(), "[1, a]");
    }
}
