use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::Deref,
    path::Path,
};

use csv::{Terminator, WriterBuilder};
use log::debug;

use crate::{
    core::{
        field::{FieldDescriptor, extract_descriptors, header_row},
        record::Record,
        value::{FieldKind, format_value},
    },
    encoding::{EncodePipeline, TextEncoding},
    error::{CsvxError, Result, ValueError},
    item::csv::delimiter::Delimiter,
};

/// Writes records as delimited text.
///
/// Rows are assembled in memory and the sink is only written once every row
/// has been converted, so a failed conversion leaves the sink untouched. A
/// sink that fails midway may still hold the bytes written before the
/// failure; callers writing to persistent storage should treat it as
/// discarded.
///
/// # Examples
///
/// ```
/// use csvx::{csv_record, CsvWriter};
///
/// csv_record! {
///     #[derive(Debug, Default)]
///     struct Person {
///         name: String [csv = "name"],
///         age: u8 [csv = "age"],
///         occupation: String [csv = "occupation", default = "無職"],
///     }
/// }
///
/// let people = vec![
///     Person { name: "山田　太郎".into(), age: 20, occupation: "会社員".into() },
///     Person { name: "小島　直樹".into(), age: 30, occupation: String::new() },
/// ];
///
/// let text = CsvWriter::default().write_string(&people).unwrap();
/// assert_eq!(text, "name,age,occupation\n山田　太郎,20,会社員\n小島　直樹,30,無職\n");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvWriter {
    encoding: TextEncoding,
    delimiter: Delimiter,
    use_crlf: bool,
    use_bom: bool,
    has_header: bool,
}

impl Default for CsvWriter {
    /// UTF-8 without BOM, comma separated, LF line endings, header row written.
    fn default() -> Self {
        CsvWriterBuilder::new().build()
    }
}

impl CsvWriter {
    /// Creates a builder starting from the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvx::{CsvWriter, Delimiter, TextEncoding};
    ///
    /// let writer = CsvWriter::builder()
    ///     .encoding(TextEncoding::shift_jis())
    ///     .delimiter(Delimiter::SEMICOLON)
    ///     .use_crlf(true)
    ///     .build();
    ///
    /// assert!(writer.use_crlf());
    /// assert!(writer.has_header());
    /// ```
    pub fn builder() -> CsvWriterBuilder {
        CsvWriterBuilder::new()
    }

    /// Character encoding of the output.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Field separator.
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Whether rows end with `\r\n` rather than `\n`.
    pub fn use_crlf(&self) -> bool {
        self.use_crlf
    }

    /// Whether the output is forced to start with a byte-order mark.
    pub fn use_bom(&self) -> bool {
        self.use_bom
    }

    /// Whether a header row precedes the data rows.
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Writes `records` to `wtr` in the configured encoding.
    ///
    /// An empty slice is rejected with a [`CsvxError::Format`].
    pub fn write<T: Record, W: Write>(&self, wtr: W, records: &[T]) -> Result<()> {
        let text = self.render(records.iter())?;
        EncodePipeline::new(self.encoding, self.use_bom).write_to(wtr, &text)
    }

    /// Like [`write`](Self::write), for records held through a pointer such
    /// as `&T`, `Box<T>` or `Rc<T>`.
    pub fn write_refs<B, W>(&self, wtr: W, records: &[B]) -> Result<()>
    where
        B: Deref,
        B::Target: Record,
        W: Write,
    {
        let text = self.render(records.iter().map(Deref::deref))?;
        EncodePipeline::new(self.encoding, self.use_bom).write_to(wtr, &text)
    }

    /// Writes `records` into a string.
    ///
    /// Only meaningful for encodings whose output is valid UTF-8; any other
    /// output fails with a [`CsvxError::Format`].
    pub fn write_string<T: Record>(&self, records: &[T]) -> Result<String> {
        let mut bytes = Vec::new();
        self.write(&mut bytes, records)?;

        String::from_utf8(bytes)
            .map_err(|error| CsvxError::format_with("encoded output is not valid UTF-8", error))
    }

    /// Writes `records` to the file at `path`, creating or truncating it.
    ///
    /// The file is only created once every row has been converted.
    pub fn write_path<T: Record, P: AsRef<Path>>(&self, path: P, records: &[T]) -> Result<()> {
        let text = self.render(records.iter())?;

        let path = path.as_ref();
        let file = File::create(path).map_err(|error| {
            CsvxError::format_with(format!("cannot create {}", path.display()), error)
        })?;

        EncodePipeline::new(self.encoding, self.use_bom).write_to(BufWriter::new(file), &text)
    }

    /// Assembles the header and data rows as UTF-8 text.
    fn render<'a, T, I>(&self, records: I) -> Result<String>
    where
        T: Record + 'a,
        I: ExactSizeIterator<Item = &'a T>,
    {
        let count = records.len();
        if count == 0 {
            return Err(CsvxError::format("empty data"));
        }

        let descriptors = extract_descriptors::<T>()?;

        let terminator = if self.use_crlf {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };
        let mut wtr = WriterBuilder::new()
            .delimiter(self.delimiter.as_byte())
            .terminator(terminator)
            .has_headers(false)
            .flexible(false)
            .from_writer(Vec::new());

        if self.has_header {
            wtr.write_record(header_row(&descriptors))?;
        }

        let mut row = Vec::with_capacity(descriptors.len());
        for record in records {
            row.clear();
            for descriptor in &descriptors {
                row.push(cell(record, descriptor)?);
            }
            wtr.write_record(&row)?;
        }

        debug!("Wrote {} records", count);

        let bytes = wtr
            .into_inner()
            .map_err(|error| CsvxError::format_with("failed to flush rows", error.into_error()))?;

        String::from_utf8(bytes)
            .map_err(|error| CsvxError::format_with("assembled rows are not valid UTF-8", error))
    }
}

/// Text of one field of `record`, after default substitution.
fn cell<T: Record>(record: &T, descriptor: &FieldDescriptor) -> Result<String> {
    // No `Value` carries an unsupported kind, so `get` cannot report one.
    if let FieldKind::Unsupported(kind) = descriptor.kind {
        return Err(CsvxError::conversion(
            descriptor.name,
            ValueError::UnsupportedKind(kind.to_string()),
        ));
    }

    let text = match record.get(descriptor.name) {
        Some(value) => format_value(descriptor.kind, &value, descriptor.format)
            .map_err(|error| CsvxError::conversion(descriptor.name, error))?,
        None => String::new(),
    };

    let text = if text.is_empty() && descriptor.has_default() {
        descriptor.default_value.to_string()
    } else {
        text
    };

    if descriptor.required && text.is_empty() {
        return Err(CsvxError::MissingField(descriptor.header.to_string()));
    }

    Ok(text)
}

/// A builder for writer configurations.
///
/// # Default Configuration
///
/// - Encoding: UTF-8
/// - Delimiter: comma (,)
/// - Line endings: LF
/// - BOM: not written
/// - Header row: written
#[derive(Debug, Clone)]
pub struct CsvWriterBuilder {
    encoding: TextEncoding,
    delimiter: Delimiter,
    use_crlf: bool,
    use_bom: bool,
    has_header: bool,
}

impl Default for CsvWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriterBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            encoding: TextEncoding::utf8(),
            delimiter: Delimiter::COMMA,
            use_crlf: false,
            use_bom: false,
            has_header: true,
        }
    }

    /// Sets the character encoding of the output.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the field separator. Defaults to a comma.
    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Terminates rows with `\r\n` instead of `\n`.
    pub fn use_crlf(mut self, yes: bool) -> Self {
        self.use_crlf = yes;
        self
    }

    /// Prefixes the output with the encoding's byte-order mark, if it has one.
    pub fn use_bom(mut self, yes: bool) -> Self {
        self.use_bom = yes;
        self
    }

    /// Sets whether a header row is written before the data rows.
    pub fn has_header(mut self, yes: bool) -> Self {
        self.has_header = yes;
        self
    }

    /// Builds the immutable writer configuration.
    pub fn build(self) -> CsvWriter {
        CsvWriter {
            encoding: self.encoding,
            delimiter: self.delimiter,
            use_crlf: self.use_crlf,
            use_bom: self.use_bom,
            has_header: self.has_header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::csv_record! {
        #[derive(Debug, Default)]
        struct Row {
            city: String [csv = "city,required"],
            country: String,
            population: u64 [csv = "popcount"],
        }
    }

    fn row(city: &str, population: u64) -> Row {
        Row {
            city: city.to_string(),
            country: "United States".to_string(),
            population,
        }
    }

    #[test]
    fn header_and_rows_are_written() {
        let data = CsvWriter::default()
            .write_string(&[row("Boston", 4628910), row("Concord", 42695)])
            .unwrap();

        assert_eq!(
            data,
            "city,country,popcount
Boston,United States,4628910
Concord,United States,42695
"
        );
    }

    #[test]
    fn crlf_and_delimiter_are_honored() {
        let data = CsvWriter::builder()
            .delimiter(Delimiter::TAB)
            .use_crlf(true)
            .has_header(false)
            .build()
            .write_string(&[row("Boston", 1)])
            .unwrap();

        assert_eq!(data, "Boston\tUnited States\t1\r\n");
    }

    #[test]
    fn cells_holding_delimiters_are_quoted() {
        let data = CsvWriter::default()
            .write_string(&[row("Washington, D.C.", 1)])
            .unwrap();

        assert!(data.ends_with("\"Washington, D.C.\",United States,1\n"));
    }

    #[test]
    fn required_cell_must_not_be_empty() {
        let result = CsvWriter::default().write_string(&[row("Boston", 1), row("", 2)]);

        assert!(matches!(result, Err(CsvxError::MissingField(header)) if header == "city"));
    }

    #[test]
    fn empty_slice_is_rejected() {
        let rows: Vec<Row> = Vec::new();
        let result = CsvWriter::default().write_string(&rows);

        assert!(matches!(result, Err(CsvxError::Format { message, .. }) if message == "empty data"));
    }

    #[test]
    fn references_and_boxes_are_accepted() {
        let owned = [row("Boston", 1)];
        let borrowed: Vec<&Row> = owned.iter().collect();
        let boxed: Vec<Box<Row>> = vec![Box::new(row("Boston", 1))];

        let writer = CsvWriter::default();
        let expected = writer.write_string(&owned).unwrap();

        let mut from_refs = Vec::new();
        writer.write_refs(&mut from_refs, &borrowed).unwrap();
        let mut from_boxes = Vec::new();
        writer.write_refs(&mut from_boxes, &boxed).unwrap();

        assert_eq!(String::from_utf8(from_refs).unwrap(), expected);
        assert_eq!(String::from_utf8(from_boxes).unwrap(), expected);
    }
}
