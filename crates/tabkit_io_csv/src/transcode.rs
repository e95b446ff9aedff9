//! Character encoding resolution and a UTF-8 to target-encoding writer.

use std::io::{self, Write};

use encoding_rs::{Encoder, EncoderResult, Encoding, UTF_8};
use tabkit_io_table::{Result, TableError};

use crate::conf::{N_LEN_ENCODE_BUFFER, V_UNMAPPABLE_REPLACEMENT};

/// Resolve a WHATWG label to an encoding usable for output.
///
/// Encodings whose encoder writes a different encoding (UTF-16 variants,
/// `replacement`) are rejected.
pub fn resolve_output_encoding(c_label: &str) -> Result<&'static Encoding> {
    let encoding = resolve_input_encoding(c_label)?;
    if encoding.output_encoding() != encoding {
        return Err(TableError::Encoding(format!(
            "{c_label:?} ({}) cannot be used for output.",
            encoding.name()
        )));
    }
    Ok(encoding)
}

/// Resolve a WHATWG label to an encoding usable for input.
pub fn resolve_input_encoding(c_label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(c_label.trim().as_bytes())
        .ok_or_else(|| TableError::Encoding(format!("unknown encoding label {c_label:?}.")))
}

/// Writer that accepts UTF-8 and forwards it encoded in the target encoding.
///
/// Characters the target cannot represent are written as `?`. UTF-8 output is
/// passed through untouched.
pub struct TranscodingWriter<W: Write> {
    inner: W,
    encoder: Option<Encoder>,
    v_pending: Vec<u8>,
    v_out: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    pub fn new(inner: W, encoding: &'static Encoding) -> Self {
        let encoder = (encoding != UTF_8).then(|| encoding.new_encoder());
        let n_len_out = if encoder.is_some() {
            N_LEN_ENCODE_BUFFER
        } else {
            0
        };
        Self {
            inner,
            encoder,
            v_pending: Vec::new(),
            v_out: vec![0; n_len_out],
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Encode everything still pending and hand back the inner writer.
    ///
    /// The inner writer is not flushed.
    pub fn finish(mut self) -> io::Result<W> {
        self.encode_pending(true)?;
        Ok(self.inner)
    }

    fn encode_pending(&mut self, if_last: bool) -> io::Result<()> {
        let Self {
            inner,
            encoder,
            v_pending,
            v_out,
        } = self;
        let Some(encoder) = encoder else {
            return Ok(());
        };

        let n_len_valid = match std::str::from_utf8(&v_pending[..]) {
            Ok(c_text) => c_text.len(),
            Err(err) if err.error_len().is_none() && !if_last => err.valid_up_to(),
            Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        };
        let mut c_rest = std::str::from_utf8(&v_pending[..n_len_valid])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        loop {
            let (result, n_read, n_written) =
                encoder.encode_from_utf8_without_replacement(c_rest, &mut v_out[..], if_last);
            inner.write_all(&v_out[..n_written])?;
            c_rest = &c_rest[n_read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => {}
                EncoderResult::Unmappable(_) => inner.write_all(V_UNMAPPABLE_REPLACEMENT)?,
            }
        }

        v_pending.drain(..n_len_valid);
        Ok(())
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.encoder.is_none() {
            return self.inner.write(buf);
        }
        self.v_pending.extend_from_slice(buf);
        self.encode_pending(false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encode_pending(false)?;
        self.inner.flush()
    }
}
