use std::io::Write;

use encoding_rs::{UTF_16BE, UTF_16LE};
use log::trace;

use super::{BomPolicy, TextEncoding};
use crate::error::{CsvxError, Result};

/// Write-side stages: optional BOM prefix, then charset encoding.
///
/// The BOM is written when the encoding's policy is [`BomPolicy::Use`] or
/// when `emit_bom` is set. Charsets without a BOM never get one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodePipeline {
    encoding: TextEncoding,
    emit_bom: bool,
}

impl EncodePipeline {
    /// Builds the stages for `encoding`; `emit_bom` forces a BOM prefix.
    pub fn new(encoding: TextEncoding, emit_bom: bool) -> Self {
        Self { encoding, emit_bom }
    }

    /// Target encoding of the output.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    fn writes_bom(&self) -> bool {
        self.emit_bom || self.encoding.bom() == BomPolicy::Use
    }

    /// Encodes `text` into the target charset.
    ///
    /// Fails with [`CsvxError::Format`] when `text` holds a character the
    /// charset cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let charset = self.encoding.charset();
        let mut bytes = Vec::with_capacity(text.len() + 3);

        if self.writes_bom() {
            bytes.extend_from_slice(self.encoding.bom_bytes());
        }

        // encoding_rs only encodes to UTF-8 and legacy charsets.
        if charset == UTF_16BE {
            text.encode_utf16()
                .for_each(|unit| bytes.extend_from_slice(&unit.to_be_bytes()));
        } else if charset == UTF_16LE {
            text.encode_utf16()
                .for_each(|unit| bytes.extend_from_slice(&unit.to_le_bytes()));
        } else {
            let (encoded, _, unmappable) = charset.encode(text);
            if unmappable {
                return Err(CsvxError::format(format!(
                    "text contains characters not representable in {}",
                    charset.name()
                )));
            }
            bytes.extend_from_slice(&encoded);
        }

        Ok(bytes)
    }

    /// Encodes `text` into `wtr` and flushes it.
    pub fn write_to<W: Write>(&self, mut wtr: W, text: &str) -> Result<()> {
        let bytes = self.encode(text)?;
        trace!("Writing {} bytes of {}", bytes.len(), self.encoding.name());

        wtr.write_all(&bytes)?;
        wtr.flush()?;
        Ok(())
    }
}
