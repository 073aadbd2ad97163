#![allow(dead_code)]

pub mod mocks;

use std::{fs, path::PathBuf};

use chrono::{DateTime, FixedOffset};
use csvx::csv_record;

csv_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Person {
        pub name: String [csv = "name"],
        pub age: i32 [csv = "age"],
    }
}

csv_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Employee {
        pub name: String [csv = "name,required"],
        pub age: u8 [csv = "age"],
        pub occupation: String [csv = "occupation", default = "無職"],
        pub rate: f64 [csv = "rate"],
        pub active: bool [csv = "active"],
        pub memo: String [csv = "-"],
        pub joined: Option<DateTime<FixedOffset>> [csv = "joined"],
    }
}

pub fn person(name: &str, age: i32) -> Person {
    Person {
        name: name.to_string(),
        age,
    }
}

pub fn japanese_people() -> Vec<Person> {
    vec![person("山田　太郎", 20), person("小島　直樹", 30)]
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

pub fn fixture_bytes(name: &str) -> Vec<u8> {
    fs::read(fixture(name)).expect("fixture should exist")
}

/// Encodes `text` as UTF-16, optionally prefixed with a byte-order mark.
pub fn utf16(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
    bom.then_some(0xFEFF_u16)
        .into_iter()
        .chain(text.encode_utf16())
        .flat_map(|unit| {
            if big_endian {
                unit.to_be_bytes()
            } else {
                unit.to_le_bytes()
            }
        })
        .collect()
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
