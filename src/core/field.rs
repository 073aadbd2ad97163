//! Field descriptors: how each field of a record maps to a text column.

use std::{any::type_name, collections::HashSet};

use crate::{
    core::{record::Record, value::FieldKind},
    error::{CsvxError, Result},
};

/// Tag value marking a field as excluded from the text form.
pub const IGNORE_TAG: &str = "-";

/// Tag token marking a field as required.
pub const REQUIRED_TAG: &str = "required";

/// Declarative metadata attached to one declared field of a record type.
///
/// The `csv` tag takes the form `"header"` or `"header,required"`; a tag of
/// `"-"` excludes the field. An empty header falls back to the field name.
///
/// # Examples
///
/// ```
/// use csvx::core::field::FieldTag;
/// use csvx::core::value::FieldKind;
///
/// let tag = FieldTag::new("occupation", FieldKind::String)
///     .csv("occupation,required")
///     .default("無職");
///
/// assert_eq!(tag.name, "occupation");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag {
    pub name: &'static str,
    pub kind: FieldKind,
    pub csv: &'static str,
    pub default: &'static str,
    pub format: &'static str,
}

impl FieldTag {
    /// Untagged field: header is the field name, nothing required or defaulted.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            csv: "",
            default: "",
            format: "",
        }
    }

    /// Sets the `csv` tag: `"header"`, `"header,required"` or `"-"`.
    pub const fn csv(mut self, tag: &'static str) -> Self {
        self.csv = tag;
        self
    }

    /// Sets the text substituted for an empty value.
    pub const fn default(mut self, value: &'static str) -> Self {
        self.default = value;
        self
    }

    /// Sets the strftime format of a date/time field.
    pub const fn format(mut self, format: &'static str) -> Self {
        self.format = format;
        self
    }
}

/// Resolved mapping of one record field to a text column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name of the field in the record type
    pub name: &'static str,
    /// Column name in the text form
    pub header: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub ignored: bool,
    /// Text substituted when the resolved value is empty
    pub default_value: &'static str,
    /// Date/time format; empty means RFC 3339
    pub format: &'static str,
}

impl FieldDescriptor {
    /// Resolves the tags of a single field.
    pub fn from_tag(tag: &FieldTag) -> Self {
        let mut parts = tag.csv.split(',');
        let header = parts.next().unwrap_or_default();
        let required = parts.next() == Some(REQUIRED_TAG);

        Self {
            name: tag.name,
            header: if header.is_empty() { tag.name } else { header },
            kind: tag.kind,
            required,
            ignored: tag.csv == IGNORE_TAG,
            default_value: tag.default,
            format: tag.format,
        }
    }

    /// Whether a non-empty default value is configured.
    pub fn has_default(&self) -> bool {
        !self.default_value.is_empty()
    }
}

/// Extracts the descriptors of `T`, in declaration order, without the
/// ignored fields.
///
/// Fails with [`CsvxError::Type`] when `T` declares no fields at all or
/// declares the same field twice.
pub fn extract_descriptors<T: Record>() -> Result<Vec<FieldDescriptor>> {
    let tags = T::fields();

    if tags.is_empty() {
        return Err(CsvxError::Type(format!(
            "{} is not a record type: it declares no fields",
            type_name::<T>()
        )));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    let mut descriptors = Vec::with_capacity(tags.len());

    for tag in &tags {
        if !seen.insert(tag.name) {
            return Err(CsvxError::Type(format!(
                "{} declares field {} more than once",
                type_name::<T>(),
                tag.name
            )));
        }

        let descriptor = FieldDescriptor::from_tag(tag);
        if !descriptor.ignored {
            descriptors.push(descriptor);
        }
    }

    Ok(descriptors)
}

/// Header row for a list of descriptors.
pub fn header_row(descriptors: &[FieldDescriptor]) -> Vec<&'static str> {
    descriptors
        .iter()
        .filter(|descriptor| !descriptor.ignored)
        .map(|descriptor| descriptor.header)
        .collect()
}

/// Header row a writer emits for records of type `T`.
///
/// # Examples
///
/// ```
/// use csvx::csv_record;
///
/// csv_record! {
///     #[derive(Debug, Default)]
///     pub struct Person {
///         pub name: String [csv = "name"],
///         pub age: i32 [csv = "-"],
///         pub occupation: String,
///     }
/// }
///
/// assert_eq!(csvx::headers::<Person>().unwrap(), vec!["name", "occupation"]);
/// ```
pub fn headers<T: Record>() -> Result<Vec<String>> {
    let descriptors = extract_descriptors::<T>()?;
    Ok(header_row(&descriptors)
        .into_iter()
        .map(str::to_string)
        .collect())
}
