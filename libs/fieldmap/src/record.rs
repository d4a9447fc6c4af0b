use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::{Value, ValueKind};

/// A Rust type that can sit in a record field.
///
/// `from_value` is strict: it accepts only values whose kind already equals
/// `KIND` (or `Null` when `NULLABLE`). Coercion happens before, in the converter.
pub trait FieldValue: Sized {
    const KIND: ValueKind;
    const NULLABLE: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

/// A type with named fields, readable and writable by name.
///
/// Implemented by `#[derive(Record)]`. `Option<T>` is a record too;
/// `None` fails the validity check.
pub trait Record {
    /// Field table in declaration order.
    fn schema() -> Schema;

    /// Current value of a readable field.
    fn get(&self, name: &str) -> Option<Value>;

    /// Assign a writable field. `value` must already have the field's kind.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    /// Validity guard checked at the entry of every conversion.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Field-less enum whose variants are addressed by name.
///
/// Implemented by `#[derive(NamedEnum)]`, which also emits the
/// [`FieldValue`] impl so the enum can be used as a record field.
pub trait NamedEnum: Sized + Clone + 'static {
    const NAME: &'static str;
    /// Variants in declaration order.
    const VARIANTS: &'static [Self];
    /// Variant names, index-aligned with `VARIANTS`.
    const NAMES: &'static [&'static str];

    fn name(&self) -> &'static str;
}

pub(crate) fn kind_mismatch(expected: ValueKind, value: &Value) -> Error {
    Error::conversion(format!("expected {expected}, got {}", value.kind()))
}

macro_rules! scalar_field_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(kind_mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

scalar_field_value! {
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
}

/// Integer types without a kind of their own travel as the nearest wider
/// kind. Reading back narrows with a range check.
macro_rules! carried_int_field_value {
    ($($ty:ty => $variant:ident($wide:ty)),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $wide)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => <$ty>::try_from(v).map_err(|_| {
                            Error::conversion(format!(
                                "{v} is out of range for {}",
                                stringify!($ty)
                            ))
                        }),
                        other => Err(kind_mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

// Widening only; `usize`/`isize` are at most 64 bits on supported targets.
carried_int_field_value! {
    i8 => I32(i32),
    i16 => I32(i32),
    u8 => I32(i32),
    u16 => I32(i32),
    u32 => I64(i64),
    isize => I64(i64),
    usize => U64(u64),
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: ValueKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    const KIND: ValueKind = ValueKind::List;

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    /// Elements are taken as they are; no element-wise coercion.
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_value(item).map_err(|e| e.with_context(format!("element {i}"))))
                .collect(),
            other => Err(kind_mismatch(Self::KIND, &other)),
        }
    }
}

impl<T: Record> Record for Option<T> {
    fn schema() -> Schema {
        T::schema()
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.as_ref().and_then(|inner| inner.get(name))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self {
            Some(inner) => inner.set(name, value),
            None => Err(Error::invalid_argument(format!(
                "{} not valid",
                T::schema().type_name
            ))),
        }
    }

    fn is_valid(&self) -> bool {
        self.as_ref().is_some_and(T::is_valid)
    }
}
