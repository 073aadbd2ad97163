#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # csvx

 Typed CSV reading and writing driven by per-field metadata, with character
 encoding support for UTF-8, UTF-16 and legacy charsets such as Shift_JIS.

 ## Core Concepts

- **Record:** A struct whose fields map to columns. Each field carries a header name, an optional
  `required` marker, an ignore marker (`-`), a default value and, for timestamps, a format.
- **Field Descriptor:** The resolved mapping of one field to one column, extracted once per call.
- **CsvReader:** Decodes a byte stream, matches the header row against the descriptors and builds
  one record per row.
- **CsvWriter:** Renders records as a header row plus data rows and encodes the result.
- **TextEncoding:** A charset plus its byte-order mark policy, applied between raw bytes and text.

 ## Field kinds

| **Kind**   | **Rust types**                          | **Empty cell reads as** |
|------------|-----------------------------------------|-------------------------|
| string     | `String`                                | `""`                    |
| int        | `i8`, `i16`, `i32`, `i64`, `isize`      | `0`                     |
| uint       | `u8`, `u16`, `u32`, `u64`, `usize`      | `0`                     |
| float      | `f32`, `f64`                            | `0.0`                   |
| bool       | `bool`                                  | `false`                 |
| datetime   | `Option<DateTime<FixedOffset>>`         | `None`                  |

 ## Getting Started

```rust
use chrono::{DateTime, FixedOffset};
use csvx::{csv_record, CsvReader, CsvWriter, CsvxError};

csv_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Person {
        pub name: String [csv = "name,required"],
        pub age: u32 [csv = "age"],
        pub occupation: String [csv = "occupation", default = "無職"],
        pub note: String [csv = "-"],
        pub joined: Option<DateTime<FixedOffset>> [csv = "joined", format = "%Y/%m/%d"],
    }
}

fn main() -> Result<(), CsvxError> {
    let csv = "name,age,occupation,joined
山田　太郎,20,会社員,2024/09/25
小島　直樹,30,,
";

    let people: Vec<Person> = CsvReader::default().read_string(csv)?;

    assert_eq!(people[0].occupation, "会社員");
    assert_eq!(people[1].occupation, "無職");
    assert_eq!(people[1].joined, None);

    let text = CsvWriter::default().write_string(&people)?;
    assert!(text.starts_with("name,age,occupation,joined\n"));

    Ok(())
}
```

 ## Errors

 Every operation returns a [`CsvxError`]:

- `Type`: the target is not a record type, or a field kind cannot be converted.
- `MissingField`: a required header is absent, or a required field is empty.
- `Conversion`: a cell could not be converted, naming the field and the cause.
- `Format`: malformed delimited text, an encoding failure, or an empty table on write.

 Reads are all-or-nothing: on error no records are returned.
 */

/// Core module for record metadata and value conversion
pub mod core;

/// Character encoding transforms
pub mod encoding;

/// Error types for read and write operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// CSV record reader and writer
pub mod item;

/// Serializable reader and writer settings
pub mod options;

pub use crate::core::{
    field::{FieldDescriptor, FieldTag, extract_descriptors, headers},
    record::{FieldType, Record},
    value::{FieldKind, Value},
};
pub use encoding::{BomPolicy, TextEncoding};
pub use item::csv::{
    csv_reader::{CsvReader, CsvReaderBuilder, RecordIter},
    csv_writer::{CsvWriter, CsvWriterBuilder},
    delimiter::Delimiter,
};
