//! Record types and the typed fields they are made of.

use chrono::{DateTime, FixedOffset};

use crate::{
    core::{
        field::FieldTag,
        value::{FieldKind, Value},
    },
    error::ValueError,
};

/// A structured type whose fields map to columns of delimited text.
///
/// Implementations list their settable fields in declaration order and give
/// name-keyed access to their values. The [`csv_record!`](crate::csv_record)
/// macro generates all three methods from inline tags.
///
/// # Examples
///
/// A hand-written implementation:
///
/// ```
/// use csvx::{FieldKind, FieldTag, FieldType, Record, Value, ValueError};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct City {
///     name: String,
///     population: u32,
/// }
///
/// impl Record for City {
///     fn fields() -> Vec<FieldTag> {
///         vec![
///             FieldTag::new("name", FieldKind::String).csv("city,required"),
///             FieldTag::new("population", FieldKind::Uint).csv("pop"),
///         ]
///     }
///
///     fn get(&self, field: &str) -> Option<Value> {
///         match field {
///             "name" => Some(self.name.to_value()),
///             "population" => Some(self.population.to_value()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
///         match field {
///             "name" => self.name = String::from_value(value)?,
///             "population" => self.population = u32::from_value(value)?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let cities: Vec<City> = csvx::CsvReader::default()
///     .read_string("city,pop\nBoston,4628910\n")
///     .unwrap();
/// assert_eq!(cities, vec![City { name: "Boston".into(), population: 4628910 }]);
/// ```
pub trait Record: Default {
    /// Declared fields with their tags, in declaration order.
    fn fields() -> Vec<FieldTag>;

    /// Current value of `field`, or `None` when the record has no such field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Stores `value` into `field`. Unknown fields are ignored.
    fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError>;
}

/// A Rust type usable as a record field.
pub trait FieldType: Sized {
    /// Semantic kind selecting the conversion routine.
    const KIND: FieldKind;

    /// Current value, for writing.
    fn to_value(&self) -> Value;

    /// Converts a parsed value, narrowing integers to the field's width.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: FieldKind, found: &Value) -> ValueError {
    ValueError::Mismatch {
        expected: expected.name(),
        found: found.kind().name(),
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::String;

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

macro_rules! integer_field {
    ($kind:ident, $wide:ty, $($t:ty),*) => {
        $(
            impl FieldType for $t {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_value(&self) -> Value {
                    Value::$kind(*self as $wide)
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$kind(n) => <$t>::try_from(n).map_err(|_| ValueError::OutOfRange {
                            value: n.to_string(),
                            target: stringify!($t),
                        }),
                        other => Err(mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

integer_field!(Int, i64, i8, i16, i32, i64, isize);
integer_field!(Uint, u64, u8, u16, u32, u64, usize);

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::Float;

    // Widen through the shortest decimal form so 0.1f32 is written as 0.1.
    fn to_value(&self) -> Value {
        Value::Float(self.to_string().parse().unwrap_or(f64::from(*self)))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

/// `None` is the zero-value timestamp: it reads from and writes to an empty cell.
impl FieldType for Option<DateTime<FixedOffset>> {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

/// Defines a struct together with its [`Record`] implementation.
///
/// Each field may be followed by a bracketed tag list with any of `csv`,
/// `default` and `format`:
///
/// ```
/// use chrono::{DateTime, FixedOffset};
/// use csvx::csv_record;
///
/// csv_record! {
///     #[derive(Debug, Default, Clone, PartialEq)]
///     pub struct Person {
///         pub name: String [csv = "name,required"],
///         pub age: i32 [csv = "age"],
///         pub occupation: String [csv = "occupation", default = "無職"],
///         pub memo: String [csv = "-"],
///         pub joined: Option<DateTime<FixedOffset>> [csv = "joined", format = "%Y-%m-%d"],
///     }
/// }
///
/// let people: Vec<Person> = csvx::CsvReader::default()
///     .read_string("name,age,occupation,joined\n山田　太郎,20,,2025-03-01\n")
///     .unwrap();
///
/// assert_eq!(people[0].occupation, "無職");
/// assert!(people[0].joined.is_some());
/// ```
#[macro_export]
macro_rules! csv_record {
    (@tag $field:ident, $ty:ty $(, $key:ident = $val:literal)* $(,)?) => {
        $crate::core::field::FieldTag::new(
            ::std::stringify!($field),
            <$ty as $crate::core::record::FieldType>::KIND,
        )
        $( .$key($val) )*
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $([$($tag:tt)*])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::core::record::Record for $name {
            fn fields() -> ::std::vec::Vec<$crate::core::field::FieldTag> {
                ::std::vec![
                    $( $crate::csv_record!(@tag $field, $ty $(, $($tag)*)?) ),*
                ]
            }

            fn get(&self, field: &str) -> ::std::option::Option<$crate::core::value::Value> {
                $(
                    if field == ::std::stringify!($field) {
                        return ::std::option::Option::Some(
                            <$ty as $crate::core::record::FieldType>::to_value(&self.$field),
                        );
                    }
                )*
                ::std::option::Option::None
            }

            fn set(
                &mut self,
                field: &str,
                value: $crate::core::value::Value,
            ) -> ::std::result::Result<(), $crate::error::ValueError> {
                $(
                    if field == ::std::stringify!($field) {
                        self.$field = <$ty as $crate::core::record::FieldType>::from_value(value)?;
                        return ::std::result::Result::Ok(());
                    }
                )*
                ::std::result::Result::Ok(())
            }
        }
    };
}
