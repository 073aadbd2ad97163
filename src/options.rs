//! Serializable codec settings.
//!
//! Host applications usually keep delimiter and encoding choices next to
//! the rest of their configuration. These option structs deserialize from
//! any serde format and turn into reader and writer configurations.

use serde::Deserialize;

use crate::{
    encoding::TextEncoding,
    error::Result,
    item::csv::{csv_reader::CsvReader, csv_writer::CsvWriter, delimiter::Delimiter},
};

/// Settings of a [`CsvReader`].
///
/// # Examples
///
/// ```
/// use csvx::options::ReaderOptions;
///
/// let options: ReaderOptions =
///     serde_json::from_str(r#"{ "encoding": "shift_jis", "delimiter": "\t" }"#).unwrap();
/// let reader = options.build().unwrap();
///
/// assert_eq!(reader.encoding().name(), "Shift_JIS");
/// assert!(reader.has_header());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderOptions {
    /// WHATWG encoding label
    pub encoding: String,
    pub delimiter: char,
    pub use_bom: bool,
    pub has_header: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            delimiter: ',',
            use_bom: false,
            has_header: true,
        }
    }
}

impl ReaderOptions {
    /// Fails with a format error on an unknown encoding label or an invalid delimiter.
    pub fn build(&self) -> Result<CsvReader> {
        Ok(CsvReader::builder()
            .encoding(TextEncoding::for_label(&self.encoding)?)
            .delimiter(Delimiter::new(self.delimiter)?)
            .use_bom(self.use_bom)
            .has_header(self.has_header)
            .build())
    }
}

/// Settings of a [`CsvWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterOptions {
    /// WHATWG encoding label
    pub encoding: String,
    pub delimiter: char,
    pub use_bom: bool,
    pub use_crlf: bool,
    pub has_header: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            delimiter: ',',
            use_bom: false,
            use_crlf: false,
            has_header: true,
        }
    }
}

impl WriterOptions {
    /// Fails with a format error on an unknown encoding label or an invalid delimiter.
    pub fn build(&self) -> Result<CsvWriter> {
        Ok(CsvWriter::builder()
            .encoding(TextEncoding::for_label(&self.encoding)?)
            .delimiter(Delimiter::new(self.delimiter)?)
            .use_bom(self.use_bom)
            .use_crlf(self.use_crlf)
            .has_header(self.has_header)
            .build())
    }
}
