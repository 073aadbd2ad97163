//! Conversion between raw cell text and typed field values.
//!
//! Both directions are keyed by the same [`FieldKind`], so whatever the
//! reader accepts for a kind is exactly what the writer produces for it.

use std::fmt::{self, Write};

use chrono::{
    DateTime, FixedOffset, Offset, ParseResult, SecondsFormat, Utc,
    format::{ParseErrorKind, Parsed, StrftimeItems, parse},
};

use crate::error::ValueError;

/// Semantic type of a record field, independent of its concrete Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Uint,
    Float,
    Bool,
    DateTime,
    /// A kind the converter has no routine for. Carries a name for error messages.
    Unsupported(&'static str),
}

impl FieldKind {
    /// Lower-case name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Uint => "uint",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::DateTime => "datetime",
            FieldKind::Unsupported(name) => *name,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed field value as exchanged between records and the converter.
///
/// Integers travel as 64-bit values; records narrow them to their own field
/// types. A `DateTime(None)` is the zero-value timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    DateTime(Option<DateTime<FixedOffset>>),
}

impl Value {
    /// Kind this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::String(_) => FieldKind::String,
            Value::Int(_) => FieldKind::Int,
            Value::Uint(_) => FieldKind::Uint,
            Value::Float(_) => FieldKind::Float,
            Value::Bool(_) => FieldKind::Bool,
            Value::DateTime(_) => FieldKind::DateTime,
        }
    }
}

/// Parses `text` as a value of `kind`.
///
/// Empty text yields the zero value of every kind except strings, which stay
/// empty. `format` is only consulted for date/time fields; when it is empty
/// RFC 3339 is expected.
///
/// Booleans are parsed loosely: anything that is not a boolean literal reads
/// as `false` instead of failing.
///
/// # Examples
///
/// ```
/// use csvx::core::value::{parse_value, FieldKind, Value};
///
/// assert_eq!(parse_value(FieldKind::Int, "-42", "").unwrap(), Value::Int(-42));
/// assert_eq!(parse_value(FieldKind::Uint, "", "").unwrap(), Value::Uint(0));
/// assert_eq!(parse_value(FieldKind::Bool, "yes", "").unwrap(), Value::Bool(false));
/// ```
pub fn parse_value(kind: FieldKind, text: &str, format: &str) -> Result<Value, ValueError> {
    let value = match kind {
        FieldKind::String => Value::String(text.to_string()),
        FieldKind::Int if text.is_empty() => Value::Int(0),
        FieldKind::Int => Value::Int(text.parse()?),
        FieldKind::Uint if text.is_empty() => Value::Uint(0),
        FieldKind::Uint => Value::Uint(text.parse()?),
        FieldKind::Float if text.is_empty() => Value::Float(0.0),
        FieldKind::Float => Value::Float(text.parse()?),
        FieldKind::Bool => Value::Bool(parse_bool(text).unwrap_or(false)),
        FieldKind::DateTime if text.is_empty() => Value::DateTime(None),
        FieldKind::DateTime => Value::DateTime(Some(parse_datetime(text, format)?)),
        FieldKind::Unsupported(name) => return Err(ValueError::UnsupportedKind(name.to_string())),
    };

    Ok(value)
}

/// Renders `value` as cell text for a field of `kind`.
///
/// The zero-value timestamp renders as an empty string. Floats use the
/// shortest representation that reads back to the same value.
pub fn format_value(kind: FieldKind, value: &Value, format: &str) -> Result<String, ValueError> {
    if let FieldKind::Unsupported(name) = kind {
        return Err(ValueError::UnsupportedKind(name.to_string()));
    }

    if value.kind() != kind {
        return Err(ValueError::Mismatch {
            expected: kind.name(),
            found: value.kind().name(),
        });
    }

    let text = match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Uint(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::DateTime(None) => String::new(),
        Value::DateTime(Some(dt)) => format_datetime(dt, format)?,
    };

    Ok(text)
}

/// Boolean literals: `1 t T TRUE true True` and `0 f F FALSE false False`.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_datetime(text: &str, format: &str) -> Result<DateTime<FixedOffset>, ValueError> {
    if format.is_empty() {
        return Ok(DateTime::parse_from_rfc3339(text)?);
    }

    let mut parsed = Parsed::new();
    parse(&mut parsed, text, StrftimeItems::new(format))?;
    fill_missing_parts(&mut parsed)?;

    let naive = parsed.to_naive_date()?.and_time(parsed.to_naive_time()?);
    let offset = match parsed.to_fixed_offset() {
        Ok(offset) => offset,
        Err(error) if error.kind() == ParseErrorKind::NotEnough => Utc.fix(),
        Err(error) => return Err(error.into()),
    };

    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ValueError::OutOfRange {
            value: text.to_string(),
            target: "DateTime<FixedOffset>",
        })
}

/// Fields a format leaves out take their zero value: year 0, January 1,
/// midnight. A date given by ordinal or week number keeps its own month
/// and day.
fn fill_missing_parts(parsed: &mut Parsed) -> ParseResult<()> {
    if parsed.year().is_none()
        && parsed.year_div_100().is_none()
        && parsed.year_mod_100().is_none()
        && parsed.isoyear().is_none()
    {
        parsed.set_year(0)?;
    }

    let by_week = parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if !by_week {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }

    if parsed.hour_div_12().is_none() && parsed.hour_mod_12().is_none() {
        parsed.set_hour(0)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }

    Ok(())
}

fn format_datetime(dt: &DateTime<FixedOffset>, format: &str) -> Result<String, ValueError> {
    if format.is_empty() {
        return Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }

    let mut text = String::new();
    write!(text, "{}", dt.format(format)).map_err(|_| ValueError::Layout(format.to_string()))?;
    Ok(text)
}
