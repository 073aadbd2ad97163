use std::fmt;

use crate::error::{CsvxError, Result};

/// Single-character field separator.
///
/// The tokenizer works on UTF-8 bytes, so the delimiter must be an ASCII
/// character other than a quote or a line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiter(u8);

impl Delimiter {
    pub const COMMA: Delimiter = Delimiter(b',');
    pub const TAB: Delimiter = Delimiter(b'\t');
    pub const SEMICOLON: Delimiter = Delimiter(b';');

    /// # Examples
    ///
    /// ```
    /// use csvx::Delimiter;
    ///
    /// assert_eq!(Delimiter::new('|').unwrap().as_char(), '|');
    /// assert!(Delimiter::new('"').is_err());
    /// assert!(Delimiter::new('、').is_err());
    /// ```
    pub fn new(c: char) -> Result<Self> {
        match c {
            '"' | '\r' | '\n' => Err(CsvxError::format(format!("invalid delimiter: {c:?}"))),
            c if c.is_ascii() => Ok(Delimiter(c as u8)),
            c => Err(CsvxError::format(format!(
                "delimiter must be an ASCII character, got {c:?}"
            ))),
        }
    }

    /// The separator as the byte the tokenizer splits on.
    pub fn as_byte(&self) -> u8 {
        self.0
    }

    /// The separator as a character.
    pub fn as_char(&self) -> char {
        char::from(self.0)
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::COMMA
    }
}

impl TryFrom<char> for Delimiter {
    type Error = CsvxError;

    fn try_from(c: char) -> Result<Self> {
        Delimiter::new(c)
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_char())
    }
}
