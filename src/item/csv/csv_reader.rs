use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader, Read},
    marker::PhantomData,
    path::Path,
};

use csv::{ReaderBuilder, StringRecord};
use log::debug;

use crate::{
    core::{
        field::{FieldDescriptor, extract_descriptors},
        record::Record,
        value::parse_value,
    },
    encoding::{DecodePipeline, DecodeReader, TextEncoding},
    error::{CsvxError, Result},
    item::csv::delimiter::Delimiter,
};

/// Reads delimited text into records.
///
/// A `CsvReader` is plain configuration: it holds no stream and can be
/// shared and reused for any number of reads against different record
/// types.
///
/// # Examples
///
/// ```
/// use csvx::{csv_record, CsvReader, Delimiter};
///
/// csv_record! {
///     #[derive(Debug, Default, PartialEq)]
///     struct Person {
///         name: String [csv = "name"],
///         age: u8 [csv = "age"],
///     }
/// }
///
/// let reader = CsvReader::builder()
///     .delimiter(Delimiter::SEMICOLON)
///     .build();
///
/// let people: Vec<Person> = reader.read_string("name;age\nAlice;30\nBob;25\n").unwrap();
///
/// assert_eq!(people.len(), 2);
/// assert_eq!(people[1], Person { name: "Bob".into(), age: 25 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvReader {
    encoding: TextEncoding,
    delimiter: Delimiter,
    use_bom: bool,
    has_header: bool,
}

impl Default for CsvReader {
    /// UTF-8, comma separated, header row expected, BOM not interpreted.
    fn default() -> Self {
        CsvReaderBuilder::new().build()
    }
}

impl CsvReader {
    /// Creates a builder starting from the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvx::{BomPolicy, CsvReader, Delimiter, TextEncoding};
    ///
    /// let reader = CsvReader::builder()
    ///     .encoding(TextEncoding::utf16le(BomPolicy::Use))
    ///     .delimiter(Delimiter::TAB)
    ///     .has_header(false)
    ///     .build();
    ///
    /// assert_eq!(reader.delimiter(), Delimiter::TAB);
    /// assert!(!reader.has_header());
    /// ```
    pub fn builder() -> CsvReaderBuilder {
        CsvReaderBuilder::new()
    }

    /// Character encoding the input is decoded from.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Field separator.
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Whether a leading byte-order mark may choose the encoding.
    pub fn use_bom(&self) -> bool {
        self.use_bom
    }

    /// Whether the first row holds column names.
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Reads every record from `rdr`.
    ///
    /// The call is all-or-nothing: the first failure is returned and the
    /// records read before it are dropped.
    pub fn read<T: Record, R: Read>(&self, rdr: R) -> Result<Vec<T>> {
        self.records(rdr)?.collect()
    }

    /// Reads every record from an in-memory string.
    ///
    /// The string goes through the configured decoder like any other input,
    /// so it is only meaningful with a UTF-8 encoding.
    pub fn read_string<T: Record>(&self, data: &str) -> Result<Vec<T>> {
        self.read(data.as_bytes())
    }

    /// Reads every record from the file at `path`. The file is closed on
    /// every exit path.
    pub fn read_path<T: Record, P: AsRef<Path>>(&self, path: P) -> Result<Vec<T>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|error| {
            CsvxError::format_with(format!("cannot open {}", path.display()), error)
        })?;

        self.read(BufReader::new(file))
    }

    /// Resolves the header of `rdr` and returns an iterator over its records.
    ///
    /// Descriptor extraction and header resolution happen here, so a missing
    /// required header fails before any data row is read. After the first
    /// error the iterator is exhausted.
    pub fn records<T: Record, R: Read>(&self, rdr: R) -> Result<RecordIter<T, R>> {
        let descriptors = extract_descriptors::<T>()?;

        let decoded = DecodePipeline::new(self.encoding, self.use_bom).wrap(rdr);
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter.as_byte())
            .has_headers(false)
            .flexible(false)
            .from_reader(QuoteTracker::new(decoded));

        let columns = if self.has_header {
            let mut header = StringRecord::new();
            if !reader.read_record(&mut header)? {
                return Err(CsvxError::format("missing header row"));
            }
            resolve_columns(&descriptors, &header)?
        } else {
            (0..descriptors.len()).map(Some).collect()
        };

        debug!(
            "Resolved {} of {} fields to columns",
            columns.iter().flatten().count(),
            descriptors.len()
        );

        Ok(RecordIter {
            reader,
            descriptors,
            columns,
            record: StringRecord::new(),
            count: 0,
            done: false,
            item: PhantomData,
        })
    }
}

/// Maps each descriptor to the index of its header column.
///
/// The first occurrence of a duplicated header wins. Every required
/// descriptor must find its column.
fn resolve_columns(
    descriptors: &[FieldDescriptor],
    header: &StringRecord,
) -> Result<Vec<Option<usize>>> {
    let mut indices: HashMap<&str, usize> = HashMap::with_capacity(header.len());
    for (index, name) in header.iter().enumerate() {
        indices.entry(name).or_insert(index);
    }

    if let Some(missing) = descriptors
        .iter()
        .find(|descriptor| descriptor.required && !indices.contains_key(descriptor.header))
    {
        return Err(CsvxError::MissingField(missing.header.to_string()));
    }

    Ok(descriptors
        .iter()
        .map(|descriptor| indices.get(descriptor.header).copied())
        .collect())
}

/// Iterator over the records of one stream.
///
/// Created by [`CsvReader::records`].
pub struct RecordIter<T, R> {
    reader: csv::Reader<QuoteTracker<DecodeReader<R>>>,
    descriptors: Vec<FieldDescriptor>,
    /// Column index of each descriptor, `None` when absent from the header
    columns: Vec<Option<usize>>,
    record: StringRecord,
    count: usize,
    done: bool,
    item: PhantomData<fn() -> T>,
}

impl<T: Record, R> RecordIter<T, R> {
    fn populate(&self) -> Result<T> {
        let mut item = T::default();

        for (descriptor, column) in self.descriptors.iter().zip(&self.columns) {
            let text = match column.and_then(|index| self.record.get(index)) {
                Some("") if descriptor.has_default() => descriptor.default_value,
                Some(text) => text,
                None if descriptor.has_default() => descriptor.default_value,
                None if descriptor.required => {
                    return Err(CsvxError::MissingField(descriptor.header.to_string()));
                }
                None => continue,
            };

            let value = parse_value(descriptor.kind, text, descriptor.format)
                .map_err(|error| CsvxError::conversion(descriptor.name, error))?;
            item.set(descriptor.name, value)
                .map_err(|error| CsvxError::conversion(descriptor.name, error))?;
        }

        Ok(item)
    }
}

impl<T: Record, R: Read> Iterator for RecordIter<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = match self.reader.read_record(&mut self.record) {
            Ok(true) => self.populate(),
            Ok(false) => {
                self.done = true;
                if self.reader.get_ref().in_quotes() {
                    return Some(Err(CsvxError::format("unterminated quoted field")));
                }
                debug!("Read {} records", self.count);
                return None;
            }
            Err(error) => Err(error.into()),
        };

        match result {
            Ok(_) => self.count += 1,
            Err(_) => self.done = true,
        }

        Some(result)
    }
}

/// Tracks whether the stream ended inside a quoted field.
///
/// Well-formed quoting always uses quote characters in pairs (opening and
/// closing, or a doubled escape), so an odd count at end of stream means a
/// quote was never closed.
struct QuoteTracker<R> {
    inner: R,
    odd: bool,
}

impl<R> QuoteTracker<R> {
    fn new(inner: R) -> Self {
        Self { inner, odd: false }
    }

    fn in_quotes(&self) -> bool {
        self.odd
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        let quotes = buf[..n].iter().filter(|&&b| b == b'"').count();
        self.odd ^= quotes % 2 == 1;
        Ok(n)
    }
}

/// A builder for reader configurations.
///
/// # Default Configuration
///
/// - Encoding: UTF-8, BOM treated as content
/// - Delimiter: comma (,)
/// - BOM override: disabled
/// - Header row: expected
#[derive(Debug, Clone)]
pub struct CsvReaderBuilder {
    encoding: TextEncoding,
    delimiter: Delimiter,
    use_bom: bool,
    has_header: bool,
}

impl Default for CsvReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReaderBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            encoding: TextEncoding::utf8(),
            delimiter: Delimiter::COMMA,
            use_bom: false,
            has_header: true,
        }
    }

    /// Sets the character encoding of the input.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the field separator. Defaults to a comma.
    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Lets a leading byte-order mark choose the encoding.
    ///
    /// When disabled the configured encoding is authoritative and a BOM it
    /// does not strip is decoded as content.
    pub fn use_bom(mut self, yes: bool) -> Self {
        self.use_bom = yes;
        self
    }

    /// Sets whether the first row holds column names.
    ///
    /// Without a header row, fields map to columns by declaration order.
    pub fn has_header(mut self, yes: bool) -> Self {
        self.has_header = yes;
        self
    }

    /// Builds the immutable reader configuration.
    pub fn build(self) -> CsvReader {
        CsvReader {
            encoding: self.encoding,
            delimiter: self.delimiter,
            use_bom: self.use_bom,
            has_header: self.has_header,
        }
    }
}
