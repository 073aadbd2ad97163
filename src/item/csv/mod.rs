//! CSV support for reading and writing typed records.
//!
//! # Module Architecture
//!
//! 1. **CsvReader**: decodes a byte stream, resolves the header row against
//!    the record type's field descriptors and populates one record per row.
//!
//! 2. **CsvWriter**: renders records as a header row plus data rows and
//!    encodes the result.
//!
//! Both are immutable configurations built with a builder and reusable for
//! any number of calls, against any record type.
//!
//! # Reading and writing the same table
//!
//! ```
//! use csvx::{csv_record, CsvReader, CsvWriter, Delimiter, TextEncoding};
//!
//! csv_record! {
//!     #[derive(Debug, Default, Clone, PartialEq)]
//!     struct Person {
//!         name: String [csv = "名前"],
//!         age: i32 [csv = "年齢"],
//!     }
//! }
//!
//! let people = vec![
//!     Person { name: "山田　太郎".into(), age: 20 },
//!     Person { name: "小島　直樹".into(), age: 30 },
//! ];
//!
//! let writer = CsvWriter::builder()
//!     .encoding(TextEncoding::shift_jis())
//!     .delimiter(Delimiter::TAB)
//!     .use_crlf(true)
//!     .build();
//! let reader = CsvReader::builder()
//!     .encoding(TextEncoding::shift_jis())
//!     .delimiter(Delimiter::TAB)
//!     .build();
//!
//! let mut bytes = Vec::new();
//! writer.write(&mut bytes, &people).unwrap();
//!
//! let read: Vec<Person> = reader.read(bytes.as_slice()).unwrap();
//! assert_eq!(read, people);
//! ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;

/// The field separator type.
pub mod delimiter;
