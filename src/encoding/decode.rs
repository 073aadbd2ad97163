use std::io::{self, Read};

use encoding_rs::{CoderResult, Decoder};
use log::trace;

use super::{BomPolicy, TextEncoding};

const BUFFER_SIZE: usize = 8 * 1024;

/// Read-side stages, fixed at construction.
///
/// Stages apply in this order:
///
/// 1. BOM override (when enabled): a leading UTF-8 or UTF-16 BOM selects the
///    charset, whatever was declared, and is removed.
/// 2. Charset decoding under the declared [`BomPolicy`].
///
/// A BOM that is not honored by either stage is decoded as content, so a
/// stream carrying a foreign BOM comes out garbled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodePipeline {
    encoding: TextEncoding,
    bom_override: bool,
}

impl DecodePipeline {
    /// Builds the stages for `encoding`; `bom_override` enables the BOM sniffing stage.
    pub fn new(encoding: TextEncoding, bom_override: bool) -> Self {
        Self {
            encoding,
            bom_override,
        }
    }

    /// Declared encoding of the input.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    fn decoder(&self) -> Decoder {
        let charset = self.encoding.charset();

        if self.bom_override {
            charset.new_decoder()
        } else {
            match self.encoding.bom() {
                BomPolicy::Use => charset.new_decoder_with_bom_removal(),
                BomPolicy::Ignore => charset.new_decoder_without_bom_handling(),
            }
        }
    }

    /// Wraps `rdr` so that reading yields UTF-8.
    pub fn wrap<R: Read>(&self, rdr: R) -> DecodeReader<R> {
        trace!(
            "Decoding {} (bom override: {})",
            self.encoding.name(),
            self.bom_override
        );

        DecodeReader {
            inner: rdr,
            decoder: self.decoder(),
            input: vec![0; BUFFER_SIZE].into_boxed_slice(),
            input_start: 0,
            input_end: 0,
            output: vec![0; BUFFER_SIZE].into_boxed_slice(),
            output_start: 0,
            output_end: 0,
            eof: false,
            finished: false,
        }
    }
}

/// A reader producing UTF-8 from bytes in another encoding.
///
/// Malformed input sequences are replaced with U+FFFD.
pub struct DecodeReader<R> {
    inner: R,
    decoder: Decoder,
    input: Box<[u8]>,
    input_start: usize,
    input_end: usize,
    output: Box<[u8]>,
    output_start: usize,
    output_end: usize,
    eof: bool,
    finished: bool,
}

impl<R: Read> DecodeReader<R> {
    /// Unwraps the underlying reader. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Gets a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    fn fill_input(&mut self) -> io::Result<()> {
        if self.input_start < self.input_end || self.eof {
            return Ok(());
        }

        loop {
            match self.inner.read(&mut self.input) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    self.input_start = 0;
                    self.input_end = n;
                    break;
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }

        Ok(())
    }

    fn decode_chunk(&mut self) -> io::Result<()> {
        self.fill_input()?;

        let (result, read, written, _) = self.decoder.decode_to_utf8(
            &self.input[self.input_start..self.input_end],
            &mut self.output,
            self.eof,
        );

        self.input_start += read;
        self.output_start = 0;
        self.output_end = written;

        if self.eof && result == CoderResult::InputEmpty {
            self.finished = true;
        }

        Ok(())
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.output_start < self.output_end {
                let n = buf.len().min(self.output_end - self.output_start);
                buf[..n].copy_from_slice(&self.output[self.output_start..self.output_start + n]);
                self.output_start += n;
                return Ok(n);
            }

            if self.finished {
                return Ok(0);
            }

            self.decode_chunk()?;
        }
    }
}
