mod common;

use std::io;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use common::{Employee, Person, japanese_people, mocks::MockSink, person, utf16};
use csvx::{
    BomPolicy, CsvReader, CsvWriter, CsvxError, Delimiter, FieldKind, FieldTag, Record,
    TextEncoding, Value, ValueError, csv_record,
};
use encoding_rs::SHIFT_JIS;
use tempfile::NamedTempFile;

fn employees() -> Vec<Employee> {
    vec![
        Employee {
            name: "山田　太郎".into(),
            age: 20,
            occupation: "会社員".into(),
            rate: 1.5,
            active: true,
            memo: "not written".into(),
            joined: DateTime::parse_from_rfc3339("2025-01-01T10:50:11+09:00").ok(),
        },
        Employee {
            name: "小島　直樹".into(),
            age: 30,
            occupation: "無職".into(),
            rate: 0.0,
            active: false,
            memo: String::new(),
            joined: None,
        },
    ]
}

#[test]
fn writes_header_and_rows() {
    common::init_logger();

    let text = CsvWriter::default().write_string(&employees()).unwrap();

    assert_eq!(
        text,
        "name,age,occupation,rate,active,joined
山田　太郎,20,会社員,1.5,true,2025-01-01T10:50:11+09:00
小島　直樹,30,無職,0,false,
"
    );
}

#[test]
fn written_rows_read_back_unchanged() {
    let mut expected = employees();
    expected[0].memo.clear();

    let text = CsvWriter::default().write_string(&employees()).unwrap();
    let read: Vec<Employee> = CsvReader::default().read_string(&text).unwrap();

    assert_eq!(read, expected);
}

#[test]
fn round_trips_through_every_encoding_and_delimiter() {
    let encodings = [
        TextEncoding::utf8(),
        TextEncoding::utf8_bom(),
        TextEncoding::utf16be(BomPolicy::Use),
        TextEncoding::utf16le(BomPolicy::Use),
        TextEncoding::utf16le(BomPolicy::Ignore),
        TextEncoding::shift_jis(),
    ];
    let delimiters = [Delimiter::COMMA, Delimiter::TAB, Delimiter::SEMICOLON];

    for encoding in encodings {
        for delimiter in delimiters {
            for use_crlf in [false, true] {
                let mut bytes = Vec::new();
                CsvWriter::builder()
                    .encoding(encoding)
                    .delimiter(delimiter)
                    .use_crlf(use_crlf)
                    .build()
                    .write(&mut bytes, &japanese_people())
                    .unwrap();

                let people: Vec<Person> = CsvReader::builder()
                    .encoding(encoding)
                    .delimiter(delimiter)
                    .build()
                    .read(bytes.as_slice())
                    .unwrap();

                assert_eq!(
                    people,
                    japanese_people(),
                    "{} {delimiter:?} crlf={use_crlf}",
                    encoding.name()
                );
            }
        }
    }
}

#[test]
fn headerless_output_reads_back_by_position() {
    let writer = CsvWriter::builder().has_header(false).build();
    let text = writer.write_string(&japanese_people()).unwrap();

    assert_eq!(text, "山田　太郎,20\n小島　直樹,30\n");

    let reader = CsvReader::builder().has_header(false).build();
    assert_eq!(reader.read_string::<Person>(&text).unwrap(), japanese_people());
}

#[test]
fn crlf_terminates_every_row() {
    let text = CsvWriter::builder()
        .use_crlf(true)
        .build()
        .write_string(&japanese_people())
        .unwrap();

    assert_eq!(text, "name,age\r\n山田　太郎,20\r\n小島　直樹,30\r\n");
}

#[test]
fn utf16_output_starts_with_its_bom() {
    let expected_text = "name,age\n山田　太郎,20\n小島　直樹,30\n";

    for (encoding, big_endian) in [
        (TextEncoding::utf16be(BomPolicy::Use), true),
        (TextEncoding::utf16le(BomPolicy::Use), false),
    ] {
        let mut bytes = Vec::new();
        CsvWriter::builder()
            .encoding(encoding)
            .build()
            .write(&mut bytes, &japanese_people())
            .unwrap();

        assert_eq!(bytes, utf16(expected_text, big_endian, true), "{}", encoding.name());
    }
}

#[test]
fn bom_flag_prefixes_utf8_output() {
    let mut bytes = Vec::new();
    CsvWriter::builder()
        .use_bom(true)
        .build()
        .write(&mut bytes, &[person("a", 1)])
        .unwrap();

    assert_eq!(bytes, b"\xEF\xBB\xBFname,age\na,1\n");
}

#[test]
fn shift_jis_output_matches_the_charset() {
    let mut bytes = Vec::new();
    CsvWriter::builder()
        .encoding(TextEncoding::shift_jis())
        .delimiter(Delimiter::TAB)
        .use_crlf(true)
        .build()
        .write(&mut bytes, &japanese_people())
        .unwrap();

    let (expected, _, _) = SHIFT_JIS.encode("name\tage\r\n山田　太郎\t20\r\n小島　直樹\t30\r\n");
    assert_eq!(bytes, &*expected);
}

#[test]
fn unrepresentable_text_is_a_format_error() {
    let result = CsvWriter::builder()
        .encoding(TextEncoding::shift_jis())
        .build()
        .write(Vec::new(), &[person("smile 😀", 1)]);

    assert!(matches!(result, Err(CsvxError::Format { .. })));
}

#[test]
fn write_string_rejects_non_utf8_output() {
    let result = CsvWriter::builder()
        .encoding(TextEncoding::utf16le(BomPolicy::Use))
        .build()
        .write_string(&japanese_people());

    assert!(matches!(result, Err(CsvxError::Format { .. })));
}

#[test]
fn default_value_fills_empty_fields() {
    let mut worker = employees().remove(1);
    worker.occupation.clear();

    let text = CsvWriter::default().write_string(&[worker]).unwrap();

    assert!(text.ends_with("小島　直樹,30,無職,0,false,\n"));
}

#[test]
fn datetime_format_is_applied_on_write() {
    csv_record! {
        #[derive(Debug, Default, PartialEq)]
        struct Event {
            title: String [csv = "title"],
            on: Option<DateTime<FixedOffset>> [csv = "on", format = "%Y/%m/%d"],
            at: Option<DateTime<FixedOffset>> [csv = "at", format = "%H%M%S"],
        }
    }

    let moment = Some(Utc.with_ymd_and_hms(2024, 9, 25, 1, 15, 0).unwrap().fixed_offset());
    let events = [Event {
        title: "release".into(),
        on: moment,
        at: moment,
    }];

    let text = CsvWriter::default().write_string(&events).unwrap();

    assert_eq!(text, "title,on,at\nrelease,2024/09/25,011500\n");
}

#[test]
fn empty_required_field_leaves_the_sink_untouched() {
    let mut sink = MockSink::new();
    sink.expect_write().times(0);
    sink.expect_flush().times(0);

    let mut nameless = employees();
    nameless[1].name.clear();

    let result = CsvWriter::default().write(&mut sink, &nameless);

    assert!(matches!(result, Err(CsvxError::MissingField(header)) if header == "name"));
}

#[test]
fn empty_slice_leaves_the_sink_untouched() {
    let mut sink = MockSink::new();
    sink.expect_write().times(0);
    sink.expect_flush().times(0);

    let result = CsvWriter::default().write::<Person, _>(&mut sink, &[]);

    assert!(matches!(result, Err(CsvxError::Format { message, .. }) if message == "empty data"));
}

#[test]
fn sink_failure_is_a_format_error() {
    let mut sink = MockSink::new();
    sink.expect_write()
        .returning(|_| Err(io::Error::other("disk full")));
    sink.expect_flush().returning(|| Ok(()));

    let result = CsvWriter::default().write(&mut sink, &japanese_people());

    assert!(matches!(result, Err(CsvxError::Format { .. })));
}

#[test]
fn sink_receives_the_whole_table_then_a_flush() {
    let mut sink = MockSink::new();
    sink.expect_write()
        .withf(|buf| buf.to_vec() == "name,age\n山田　太郎,20\n小島　直樹,30\n".as_bytes())
        .times(1)
        .returning(|buf| Ok(buf.len()));
    sink.expect_flush().times(1).returning(|| Ok(()));

    CsvWriter::default()
        .write(&mut sink, &japanese_people())
        .unwrap();
}

#[test]
fn write_path_then_read_path() {
    let file = NamedTempFile::new().unwrap();

    let writer = CsvWriter::builder()
        .encoding(TextEncoding::utf16le(BomPolicy::Use))
        .delimiter(Delimiter::SEMICOLON)
        .use_crlf(true)
        .build();
    writer.write_path(file.path(), &japanese_people()).unwrap();

    let reader = CsvReader::builder()
        .encoding(TextEncoding::utf16le(BomPolicy::Use))
        .delimiter(Delimiter::SEMICOLON)
        .build();
    let people: Vec<Person> = reader.read_path(file.path()).unwrap();

    assert_eq!(people, japanese_people());
}

#[test]
fn failed_write_path_does_not_create_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");

    let people: Vec<Person> = Vec::new();
    let result = CsvWriter::default().write_path(&path, &people);

    assert!(result.is_err());
    assert!(!path.exists());
}

#[test]
fn headers_skip_ignored_fields() {
    assert_eq!(
        csvx::headers::<Employee>().unwrap(),
        vec!["name", "age", "occupation", "rate", "active", "joined"]
    );
}

#[test]
fn unsupported_field_kind_is_a_type_error() {
    #[derive(Default)]
    struct Tagged {
        name: String,
    }

    impl Record for Tagged {
        fn fields() -> Vec<FieldTag> {
            vec![
                FieldTag::new("name", FieldKind::String).csv("name"),
                FieldTag::new("tags", FieldKind::Unsupported("slice")).csv("tags"),
            ]
        }

        fn get(&self, field: &str) -> Option<Value> {
            (field == "name").then(|| Value::String(self.name.clone()))
        }

        fn set(&mut self, _field: &str, _value: Value) -> Result<(), ValueError> {
            Ok(())
        }
    }

    let mut sink = MockSink::new();
    sink.expect_write().times(0);
    sink.expect_flush().times(0);

    let rows = [Tagged { name: "a".into() }];
    let result = CsvWriter::default().write(&mut sink, &rows);

    assert!(matches!(result, Err(CsvxError::Type(message)) if message.contains("slice")));
}
