//! Character encoding transforms applied between raw bytes and the UTF-8
//! text the tokenizer works on.
//!
//! A [`TextEncoding`] names a character set together with the way its own
//! byte-order mark is treated. Readers wrap their input in a
//! [`DecodePipeline`], writers run their assembled text through an
//! [`EncodePipeline`]; the codec never needs to know which stages are active.
//!
//! # Examples
//!
//! ```
//! use std::io::Read;
//! use csvx::encoding::{DecodePipeline, EncodePipeline, TextEncoding};
//!
//! let encoding = TextEncoding::shift_jis();
//! let bytes = EncodePipeline::new(encoding, false).encode("山田　太郎").unwrap();
//!
//! let mut text = String::new();
//! DecodePipeline::new(encoding, false)
//!     .wrap(bytes.as_slice())
//!     .read_to_string(&mut text)
//!     .unwrap();
//! assert_eq!(text, "山田　太郎");
//! ```

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::{CsvxError, Result};

mod decode;
mod encode;

pub use decode::{DecodePipeline, DecodeReader};
pub use encode::EncodePipeline;

/// How a character set treats its own byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BomPolicy {
    /// A BOM is ordinary content: decoded as U+FEFF, never written.
    #[default]
    Ignore,
    /// A leading BOM of this charset is removed on read and written on write.
    Use,
}

/// A character set plus its byte-order mark policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    charset: &'static Encoding,
    bom: BomPolicy,
}

impl TextEncoding {
    /// Pairs any `encoding_rs` charset with a BOM policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvx::{BomPolicy, TextEncoding};
    ///
    /// let encoding = TextEncoding::new(encoding_rs::EUC_JP, BomPolicy::Ignore);
    /// assert_eq!(encoding.name(), "EUC-JP");
    /// ```
    pub fn new(charset: &'static Encoding, bom: BomPolicy) -> Self {
        Self { charset, bom }
    }

    /// UTF-8 treating a BOM as content.
    pub fn utf8() -> Self {
        Self::new(UTF_8, BomPolicy::Ignore)
    }

    /// UTF-8 that strips a BOM on read and writes one on write.
    pub fn utf8_bom() -> Self {
        Self::new(UTF_8, BomPolicy::Use)
    }

    /// Big-endian UTF-16.
    pub fn utf16be(bom: BomPolicy) -> Self {
        Self::new(UTF_16BE, bom)
    }

    /// Little-endian UTF-16.
    pub fn utf16le(bom: BomPolicy) -> Self {
        Self::new(UTF_16LE, bom)
    }

    /// Shift_JIS, which has no byte-order mark.
    pub fn shift_jis() -> Self {
        Self::new(SHIFT_JIS, BomPolicy::Ignore)
    }

    /// Looks up a charset by its WHATWG label, e.g. `"utf-16le"` or `"sjis"`.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|charset| Self::new(charset, BomPolicy::Ignore))
            .ok_or_else(|| CsvxError::format(format!("unknown encoding label: {label}")))
    }

    /// Same charset under another BOM policy.
    pub fn with_bom(self, bom: BomPolicy) -> Self {
        Self { bom, ..self }
    }

    /// The underlying `encoding_rs` charset.
    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// How this charset's own byte-order mark is treated.
    pub fn bom(&self) -> BomPolicy {
        self.bom
    }

    /// Canonical WHATWG name of the charset, e.g. `"Shift_JIS"`.
    pub fn name(&self) -> &'static str {
        self.charset.name()
    }

    /// Byte-order mark of the charset; empty for charsets without one.
    pub(crate) fn bom_bytes(&self) -> &'static [u8] {
        if self.charset == UTF_8 {
            b"\xEF\xBB\xBF"
        } else if self.charset == UTF_16BE {
            b"\xFE\xFF"
        } else if self.charset == UTF_16LE {
            b"\xFF\xFE"
        } else {
            b""
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_resolve_to_charsets() {
        assert_eq!(TextEncoding::for_label("sjis").unwrap(), TextEncoding::shift_jis());
        assert_eq!(TextEncoding::for_label(" UTF-8 ").unwrap(), TextEncoding::utf8());
        assert_eq!(TextEncoding::for_label("utf-16be").unwrap().name(), "UTF-16BE");
    }

    #[test]
    fn unknown_label_is_a_format_error() {
        assert!(matches!(
            TextEncoding::for_label("klingon"),
            Err(CsvxError::Format { .. })
        ));
    }

    #[test]
    fn only_unicode_charsets_have_a_bom() {
        assert_eq!(TextEncoding::utf8().bom_bytes(), b"\xEF\xBB\xBF");
        assert_eq!(TextEncoding::utf16le(BomPolicy::Use).bom_bytes(), b"\xFF\xFE");
        assert!(TextEncoding::shift_jis().bom_bytes().is_empty());
    }
}
