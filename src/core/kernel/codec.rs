use crate::core::errors::ExchangeError;
use encoding_rs::{CoderResult, Decoder, SHIFT_JIS};
use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::IgnoredAny;

/// Bytes left unescaped in a query value (RFC 3986 unreserved set).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Transcode a request payload to Shift_JIS and escape it for use as the query string.
///
/// Characters with no Shift_JIS mapping fail the whole payload with
/// [`ExchangeError::EncodeError`] naming the first offending character.
pub fn encode_for_wire(text: &str) -> Result<String, ExchangeError> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        let offending = text
            .chars()
            .find(|c| {
                let mut buf = [0u8; 4];
                SHIFT_JIS.encode(c.encode_utf8(&mut buf)).2
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(ExchangeError::EncodeError(offending));
    }

    Ok(percent_encode(&bytes, QUERY_VALUE).to_string())
}

/// Decode a Shift_JIS response body. No unescaping is involved: HTTP hands us raw bytes.
pub fn decode_from_wire(bytes: &[u8]) -> Result<String, ExchangeError> {
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(ExchangeError::DecodeError);
    }
    Ok(text.into_owned())
}

/// Incremental decoder for event-download bodies.
///
/// Chunks are fed as they arrive from the network; a chunk may end in the middle
/// of a double-byte character or in the middle of a record. Complete JSON records
/// are returned in arrival order, partial ones stay buffered.
pub struct RecordSplitter {
    decoder: Decoder,
    buffer: String,
}

impl RecordSplitter {
    pub fn new() -> Self {
        Self {
            decoder: SHIFT_JIS.new_decoder_without_bom_handling(),
            buffer: String::new(),
        }
    }

    /// Feed one network chunk and take every record it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, ExchangeError> {
        self.decode(chunk, false)?;
        self.drain_records()
    }

    /// Flush the decoder at end of body. Anything left that is not a whole record is an error.
    pub fn finish(&mut self) -> Result<Vec<String>, ExchangeError> {
        self.decode(&[], true)?;
        let records = self.drain_records()?;
        if !self.buffer.trim().is_empty() {
            return Err(ExchangeError::NetworkError(
                "Event stream ended in the middle of a record".to_string(),
            ));
        }
        Ok(records)
    }

    fn decode(&mut self, chunk: &[u8], last: bool) -> Result<(), ExchangeError> {
        let mut input = chunk;
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(input.len())
                .unwrap_or_else(|| input.len().saturating_mul(3));
            self.buffer.reserve(needed.max(4));

            let (result, read, had_errors) =
                self.decoder.decode_to_string(input, &mut self.buffer, last);
            if had_errors {
                return Err(ExchangeError::DecodeError);
            }
            input = &input[read..];

            match result {
                CoderResult::InputEmpty => return Ok(()),
                CoderResult::OutputFull => {}
            }
        }
    }

    fn drain_records(&mut self) -> Result<Vec<String>, ExchangeError> {
        let mut records = Vec::new();
        let mut consumed = 0;

        {
            let mut stream =
                serde_json::Deserializer::from_str(&self.buffer).into_iter::<IgnoredAny>();
            loop {
                match stream.next() {
                    Some(Ok(_)) => {
                        let end = stream.byte_offset();
                        records.push(self.buffer[consumed..end].trim().to_string());
                        consumed = end;
                    }
                    Some(Err(e)) if e.is_eof() => break,
                    Some(Err(e)) => return Err(ExchangeError::UnmarshalFailed(e)),
                    None => break,
                }
            }
        }

        self.buffer.drain(..consumed);
        Ok(records)
    }
}

impl Default for RecordSplitter {
    fn default() -> Self {
        Self::new()
    }
}
