//! Scalar coercion primitives.
//!
//! The generic matrix follows the usual numeric/text conversion rules:
//! checked integer narrowing, round-half-to-even from floats, invariant
//! culture text parsing. Everything that has no sensible conversion
//! fails with [`Error::Conversion`].

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::record::{FieldValue, NamedEnum};
use crate::value::{EnumKind, Value, ValueKind};

/// Fixed layout of [`to_date_time_string`]: `MM/dd/yyyy h:mm:ss tt`.
pub const DATE_TIME_STRING_FORMAT: &str = "%m/%d/%Y %-I:%M:%S %p";

const TEXT_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TRUTHY: &[&str] = &["Y", "YES", "T", "TRUE"];

/// Convert `value` to `T`, coercing across kinds when needed.
///
/// Enum targets match variant names case-insensitively.
pub fn change_type<T: FieldValue>(value: Value) -> Result<T> {
    if T::NULLABLE && value.is_null() {
        return T::from_value(Value::Null);
    }
    T::from_value(coerce(value, T::KIND, true)?)
}

/// Enum variant whose name equals `text`.
///
/// Variants are tried in declaration order and the first match wins. An exact
/// match always counts; with `ignore_case` an ASCII case-insensitive one does too.
pub fn parse_enum<T: NamedEnum>(text: &str, ignore_case: bool) -> Result<T> {
    match_variant(T::NAMES, text, ignore_case)
        .and_then(|i| T::VARIANTS.get(i).cloned())
        .ok_or_else(no_enum_match)
}

/// [`parse_enum`] with case-insensitive matching.
pub fn parse_enum_default<T: NamedEnum>(text: &str) -> Result<T> {
    parse_enum(text, true)
}

/// `true` iff the upper-cased text is one of `Y`, `YES`, `T`, `TRUE`.
pub fn from_yes_no(text: Option<&str>) -> bool {
    text.is_some_and(|t| {
        let upper = t.to_uppercase();
        TRUTHY.contains(&upper.as_str())
    })
}

/// Parse an 8-digit `yyyyMMdd` number into a calendar date.
pub fn parse_date(num: i32) -> Result<NaiveDate> {
    let digits = num.to_string();
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_number_format());
    }
    let year: i32 = digits[0..4].parse().map_err(|_| invalid_number_format())?;
    let month: u32 = digits[4..6].parse().map_err(|_| invalid_number_format())?;
    let day: u32 = digits[6..8].parse().map_err(|_| invalid_number_format())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid_number_format)
}

/// Format a date-like value as `MM/dd/yyyy h:mm:ss tt`.
///
/// Accepts `Date`, `DateTime` and non-empty text parseable as a date;
/// anything else yields an empty string.
pub fn to_date_time_string(value: &Value) -> String {
    let dt = match value {
        Value::DateTime(dt) => *dt,
        Value::Date(d) => d.and_time(chrono::NaiveTime::MIN),
        Value::Str(s) if !s.is_empty() => match parse_text_date_time(s) {
            Some(dt) => dt,
            None => return String::new(),
        },
        _ => return String::new(),
    };
    dt.format(DATE_TIME_STRING_FORMAT).to_string()
}

impl Value {
    /// Coerce into `target` using the generic conversion rules.
    pub fn coerce(self, target: ValueKind) -> Result<Value> {
        coerce(self, target, true)
    }

    pub fn to_i32(&self) -> Result<i32> {
        change_type(self.clone())
    }

    pub fn to_i64(&self) -> Result<i64> {
        change_type(self.clone())
    }

    pub fn to_f32(&self) -> Result<f32> {
        change_type(self.clone())
    }

    pub fn to_f64(&self) -> Result<f64> {
        change_type(self.clone())
    }
}

/// Intermediate numeric form of a source value.
enum Num {
    Int(i128),
    Float(f64),
}

pub(crate) fn coerce(value: Value, target: ValueKind, enum_ignore_case: bool) -> Result<Value> {
    if value.kind() == target {
        return Ok(value);
    }
    let source = value.kind();
    let fail = || Error::conversion(format!("cannot convert {source} to {target}"));

    match target {
        ValueKind::I32 => {
            let v = to_integer(value, target)?;
            i32::try_from(v).map(Value::I32).map_err(|_| out_of_range(v, target))
        }
        ValueKind::I64 => {
            let v = to_integer(value, target)?;
            i64::try_from(v).map(Value::I64).map_err(|_| out_of_range(v, target))
        }
        ValueKind::U64 => {
            let v = to_integer(value, target)?;
            u64::try_from(v).map(Value::U64).map_err(|_| out_of_range(v, target))
        }
        ValueKind::F32 => match value {
            Value::Str(s) => s
                .trim()
                .parse::<f32>()
                .map(Value::F32)
                .map_err(|e| parse_failed(&s, target, e)),
            other => match to_num(other).ok_or_else(fail)? {
                Num::Int(i) => Ok(Value::F32(i as f32)),
                Num::Float(f) => Ok(Value::F32(f as f32)),
            },
        },
        ValueKind::F64 => match value {
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::F64)
                .map_err(|e| parse_failed(&s, target, e)),
            other => match to_num(other).ok_or_else(fail)? {
                Num::Int(i) => Ok(Value::F64(i as f64)),
                Num::Float(f) => Ok(Value::F64(f)),
            },
        },
        ValueKind::Bool => match value {
            Value::Str(s) => {
                let t = s.trim();
                if t.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if t.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(Error::conversion(format!("'{s}' is not a valid bool")))
                }
            }
            other => match to_num(other).ok_or_else(fail)? {
                Num::Int(i) => Ok(Value::Bool(i != 0)),
                Num::Float(f) => Ok(Value::Bool(f != 0.0)),
            },
        },
        ValueKind::Char => match value {
            Value::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(Error::conversion(format!(
                        "string must be exactly one character long, got '{s}'"
                    ))),
                }
            }
            Value::I32(_) | Value::I64(_) | Value::U64(_) => {
                let Some(Num::Int(code)) = to_num(value) else {
                    return Err(fail());
                };
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .map(Value::Char)
                    .ok_or_else(|| out_of_range(code, target))
            }
            _ => Err(fail()),
        },
        ValueKind::Str => match value {
            Value::Null | Value::List(_) => Err(fail()),
            other => Ok(Value::Str(other.to_string())),
        },
        ValueKind::Date => match value {
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            Value::Str(s) => parse_text_date_time(&s)
                .map(|dt| Value::Date(dt.date()))
                .ok_or_else(|| Error::conversion(format!("'{s}' is not a valid date"))),
            _ => Err(fail()),
        },
        ValueKind::DateTime => match value {
            Value::Date(d) => Ok(Value::DateTime(d.and_time(chrono::NaiveTime::MIN))),
            Value::Str(s) => parse_text_date_time(&s)
                .map(Value::DateTime)
                .ok_or_else(|| Error::conversion(format!("'{s}' is not a valid date"))),
            _ => Err(fail()),
        },
        ValueKind::Enum(kind) => match value {
            Value::Str(s) => enum_by_name(kind, &s, enum_ignore_case),
            _ => Err(fail()),
        },
        ValueKind::Null | ValueKind::List => Err(fail()),
    }
}

/// Canonical `Value::Str` holding the matched variant name.
fn enum_by_name(kind: EnumKind, text: &str, ignore_case: bool) -> Result<Value> {
    match_variant(kind.variants, text, ignore_case)
        .map(|i| Value::Str(kind.variants[i].to_string()))
        .ok_or_else(|| no_enum_match().with_context(kind.name))
}

fn match_variant(names: &[&str], text: &str, ignore_case: bool) -> Option<usize> {
    names
        .iter()
        .position(|name| (ignore_case && text.eq_ignore_ascii_case(name)) || text == *name)
}

fn to_num(value: Value) -> Option<Num> {
    match value {
        Value::Bool(b) => Some(Num::Int(i128::from(b))),
        Value::I32(v) => Some(Num::Int(i128::from(v))),
        Value::I64(v) => Some(Num::Int(i128::from(v))),
        Value::U64(v) => Some(Num::Int(i128::from(v))),
        Value::F32(v) => Some(Num::Float(f64::from(v))),
        Value::F64(v) => Some(Num::Float(v)),
        _ => None,
    }
}

/// Any integer-convertible value widened to `i128`, range checked by the caller.
fn to_integer(value: Value, target: ValueKind) -> Result<i128> {
    let source = value.kind();
    match value {
        Value::Str(s) => s.trim().parse::<i128>().map_err(|e| parse_failed(&s, target, e)),
        Value::Char(c) => Ok(i128::from(u32::from(c))),
        other => match to_num(other) {
            Some(Num::Int(i)) => Ok(i),
            Some(Num::Float(f)) => {
                let rounded = f.round_ties_even();
                if !rounded.is_finite() || rounded.abs() >= 1e30 {
                    return Err(Error::conversion(format!("value {f} out of range for {target}")));
                }
                Ok(rounded as i128)
            }
            None => Err(Error::conversion(format!("cannot convert {source} to {target}"))),
        },
    }
}

fn parse_text_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TEXT_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            TEXT_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

fn out_of_range(v: impl std::fmt::Display, target: ValueKind) -> Error {
    Error::conversion(format!("value {v} out of range for {target}"))
}

fn parse_failed(text: &str, target: ValueKind, e: impl std::fmt::Display) -> Error {
    Error::conversion(format!("'{text}' is not a valid {target}: {e}"))
}

fn no_enum_match() -> Error {
    Error::conversion("conversion failed because the input did not match any enum values")
}

fn invalid_number_format() -> Error {
    Error::conversion("invalid number format")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[allow(non_camel_case_types)]
    #[derive(Debug, Clone, PartialEq, crate::NamedEnum)]
    enum Color {
        Red,
        Green,
        red,
    }

    #[rstest]
    #[case(Value::I64(42), ValueKind::I32, Value::I32(42))]
    #[case(Value::I32(-1), ValueKind::I64, Value::I64(-1))]
    #[case(Value::from(" 17 "), ValueKind::I32, Value::I32(17))]
    #[case(Value::from("+5"), ValueKind::U64, Value::U64(5))]
    #[case(Value::F64(2.5), ValueKind::I32, Value::I32(2))]
    #[case(Value::F64(3.5), ValueKind::I32, Value::I32(4))]
    #[case(Value::F32(-2.5), ValueKind::I64, Value::I64(-2))]
    #[case(Value::Bool(true), ValueKind::I32, Value::I32(1))]
    #[case(Value::I32(0), ValueKind::Bool, Value::Bool(false))]
    #[case(Value::from("TRUE"), ValueKind::Bool, Value::Bool(true))]
    #[case(Value::I32(3), ValueKind::F64, Value::F64(3.0))]
    #[case(Value::from("1.25"), ValueKind::F32, Value::F32(1.25))]
    #[case(Value::I32(65), ValueKind::Char, Value::Char('A'))]
    #[case(Value::Char('A'), ValueKind::I64, Value::I64(65))]
    #[case(Value::from("x"), ValueKind::Char, Value::Char('x'))]
    #[case(Value::I32(7), ValueKind::Str, Value::from("7"))]
    #[case(Value::Bool(false), ValueKind::Str, Value::from("false"))]
    fn test_coerce_succeeds(#[case] value: Value, #[case] target: ValueKind, #[case] expected: Value) {
        assert_eq!(value.coerce(target), Ok(expected));
    }

    #[rstest]
    #[case(Value::from("not-a-number"), ValueKind::I32)]
    #[case(Value::from("1.5"), ValueKind::I32)]
    #[case(Value::I64(i64::MAX), ValueKind::I32)]
    #[case(Value::I32(-1), ValueKind::U64)]
    #[case(Value::F64(f64::NAN), ValueKind::I64)]
    #[case(Value::F64(1e40), ValueKind::I64)]
    #[case(Value::from("yes"), ValueKind::Bool)]
    #[case(Value::from("ab"), ValueKind::Char)]
    #[case(Value::F64(65.0), ValueKind::Char)]
    #[case(Value::Null, ValueKind::I32)]
    #[case(Value::Null, ValueKind::Str)]
    #[case(Value::List(vec![]), ValueKind::Str)]
    #[case(Value::I32(20240101), ValueKind::Date)]
    #[case(Value::from("x"), ValueKind::List)]
    fn test_coerce_fails(#[case] value: Value, #[case] target: ValueKind) {
        let err = value.coerce(target).unwrap_err();

        assert!(err.is_conversion(), "{err}");
    }

    #[rstest]
    fn test_coerce_text_to_dates() {
        // Arrange
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let dt = date.and_hms_opt(15, 4, 5).unwrap();

        // Act & Assert
        assert_eq!(Value::from("2024-02-29").coerce(ValueKind::Date), Ok(Value::Date(date)));
        assert_eq!(
            Value::from("2024-02-29T15:04:05").coerce(ValueKind::DateTime),
            Ok(Value::DateTime(dt))
        );
        assert_eq!(
            Value::from("02/29/2024 3:04:05 PM").coerce(ValueKind::DateTime),
            Ok(Value::DateTime(dt))
        );
        assert_eq!(Value::DateTime(dt).coerce(ValueKind::Date), Ok(Value::Date(date)));
        assert_eq!(
            Value::Date(date).coerce(ValueKind::DateTime),
            Ok(Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap()))
        );
    }

    #[rstest]
    #[case("Red", true, Color::Red)]
    #[case("red", true, Color::Red)]
    #[case("RED", true, Color::Red)]
    #[case("green", true, Color::Green)]
    #[case("red", false, Color::red)]
    #[case("Red", false, Color::Red)]
    fn test_parse_enum(#[case] text: &str, #[case] ignore_case: bool, #[case] expected: Color) {
        assert_eq!(parse_enum::<Color>(text, ignore_case), Ok(expected));
    }

    #[rstest]
    #[case("purple", true)]
    #[case("GREEN", false)]
    #[case("", true)]
    fn test_parse_enum_no_match(#[case] text: &str, #[case] ignore_case: bool) {
        assert_eq!(
            parse_enum::<Color>(text, ignore_case),
            Err(Error::Conversion(
                "conversion failed because the input did not match any enum values".to_string()
            ))
        );
    }

    #[rstest]
    fn test_parse_enum_default_ignores_case() {
        assert_eq!(parse_enum_default::<Color>("GREEN"), Ok(Color::Green));
    }

    #[rstest]
    #[case(Some("Y"), true)]
    #[case(Some("yes"), true)]
    #[case(Some("T"), true)]
    #[case(Some("true"), true)]
    #[case(Some("tRuE"), true)]
    #[case(Some("N"), false)]
    #[case(Some("no"), false)]
    #[case(Some("maybe"), false)]
    #[case(Some(""), false)]
    #[case(Some(" yes"), false)]
    #[case(None, false)]
    fn test_from_yes_no(#[case] text: Option<&str>, #[case] expected: bool) {
        assert_eq!(from_yes_no(text), expected);
    }

    #[rstest]
    fn test_parse_date_leap_day() {
        assert_eq!(parse_date(20240229), Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[rstest]
    #[case(20230229)]
    #[case(20231301)]
    #[case(20230100)]
    #[case(2023101)]
    #[case(-20230101)]
    #[case(0)]
    fn test_parse_date_rejects(#[case] num: i32) {
        assert_eq!(
            parse_date(num),
            Err(Error::Conversion("invalid number format".to_string()))
        );
    }

    #[rstest]
    fn test_to_date_time_string() {
        // Arrange
        let dt = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();

        // Act & Assert
        assert_eq!(to_date_time_string(&Value::DateTime(dt)), "03/07/2024 2:05:09 PM");
        assert_eq!(
            to_date_time_string(&Value::Date(dt.date())),
            "03/07/2024 12:00:00 AM"
        );
        assert_eq!(
            to_date_time_string(&Value::from("2024-03-07T14:05:09")),
            "03/07/2024 2:05:09 PM"
        );
    }

    #[rstest]
    #[case(Value::from(""))]
    #[case(Value::from("not a date"))]
    #[case(Value::I32(20240307))]
    #[case(Value::Null)]
    fn test_to_date_time_string_other_input_is_empty(#[case] value: Value) {
        assert_eq!(to_date_time_string(&value), "");
    }

    #[rstest]
    fn test_change_type_and_numeric_shortcuts() {
        assert_eq!(change_type::<i64>(Value::from("12")), Ok(12));
        assert_eq!(change_type::<Option<i32>>(Value::Null), Ok(None));
        assert_eq!(change_type::<Option<i32>>(Value::from("3")), Ok(Some(3)));
        assert_eq!(change_type::<Color>(Value::from("green")), Ok(Color::Green));
        assert_eq!(Value::from("9").to_i32(), Ok(9));
        assert_eq!(Value::I32(9).to_i64(), Ok(9));
        assert_eq!(Value::I32(2).to_f32(), Ok(2.0));
        assert_eq!(Value::from("0.5").to_f64(), Ok(0.5));
        assert!(Value::Bool(true).to_f64().is_ok());
        assert!(change_type::<String>(Value::List(vec![])).is_err());
    }
}
