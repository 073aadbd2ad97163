use std::{
    error::Error as StdError,
    num::{ParseFloatError, ParseIntError},
};

use thiserror::Error;

/// Result type returned by every read and write operation of this crate.
pub type Result<T> = std::result::Result<T, CsvxError>;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Error, Debug)]
/// Csvx error
pub enum CsvxError {
    /// The target is not a structured record type, or a field's kind cannot be converted.
    #[error("type error: {0}")]
    Type(String),

    /// A required header is absent, or a required field resolved to an empty value.
    #[error("required field is missing: {0}")]
    MissingField(String),

    /// A field value could not be converted between text and its typed form.
    #[error("error converting field {field}: {source}")]
    Conversion {
        field: String,
        #[source]
        source: ValueError,
    },

    /// Malformed delimited text, an encoding failure, or an empty table on write.
    #[error("format error: {message}")]
    Format {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl CsvxError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        CsvxError::Format {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn format_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CsvxError::Format {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Attributes a converter failure to `field`.
    ///
    /// Unsupported kinds surface as [`CsvxError::Type`], every other cause as
    /// [`CsvxError::Conversion`].
    pub(crate) fn conversion(field: &str, source: ValueError) -> Self {
        match source {
            ValueError::UnsupportedKind(kind) => {
                CsvxError::Type(format!("field {field} has unsupported kind {kind}"))
            }
            source => CsvxError::Conversion {
                field: field.to_string(),
                source,
            },
        }
    }
}

impl From<csv::Error> for CsvxError {
    fn from(error: csv::Error) -> Self {
        CsvxError::format_with("malformed delimited text", error)
    }
}

impl From<std::io::Error> for CsvxError {
    fn from(error: std::io::Error) -> Self {
        CsvxError::format_with("stream transformation failed", error)
    }
}

#[derive(Error, Debug)]
/// Failure of a single text to value conversion, or of the reverse direction.
pub enum ValueError {
    #[error(transparent)]
    Int(#[from] ParseIntError),

    #[error(transparent)]
    Float(#[from] ParseFloatError),

    #[error("failed to parse time: {0}")]
    Time(#[from] chrono::ParseError),

    #[error("invalid date/time format: {0}")]
    Layout(String),

    #[error("invalid field type: {0}")]
    UnsupportedKind(String),

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("expected a {expected} value, got {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
}
