/// Field descriptors and their extraction from record types
pub mod field;

/// Record and field type traits, and the `csv_record!` macro
pub mod record;

/// Text to value conversion in both directions
pub mod value;
