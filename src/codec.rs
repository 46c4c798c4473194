//! Newline-delimited JSON frame codec for the panel protocol.
//!
//! Each frame on the wire is one JSON object followed by a single `\n` byte;
//! there is no length prefix and no multiplexing. The decoder reassembles
//! frames out of arbitrary TCP chunking: bytes accumulate in the read buffer
//! until a newline completes a line, and any unterminated tail is retained
//! for the next chunk.
//!
//! A completed line that fails JSON decoding is surfaced as
//! [`DecodedLine::Malformed`] rather than an error, so a corrupt frame never
//! terminates the stream; callers log and skip it. Empty and whitespace-only
//! lines are discarded without producing an item.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::message::PanelMessage;

/// Upper bound on an unterminated line before the stream is considered
/// corrupt. Prevents a peer that never sends a newline from growing the read
/// buffer without limit.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Outcome of decoding one completed line.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedLine {
    /// The line parsed as a well-formed [`PanelMessage`].
    Frame(PanelMessage),
    /// The line was not valid JSON (or not a valid message shape); carries
    /// the raw text for logging.
    Malformed(String),
}

/// Codec splitting a byte stream into [`DecodedLine`] items and encoding
/// outgoing messages as single-line JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanelCodec;

impl Decoder for PanelCodec {
    type Item = DecodedLine;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|b| *b == b'\n') else {
                if src.len() > MAX_LINE_LENGTH {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("unterminated line exceeds {MAX_LINE_LENGTH} bytes"),
                    ));
                }
                return Ok(None);
            };

            let line = src.split_to(pos + 1);
            let text = String::from_utf8_lossy(&line[..pos]);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(match serde_json::from_str::<PanelMessage>(trimmed) {
                Ok(message) => DecodedLine::Frame(message),
                Err(_) => DecodedLine::Malformed(trimmed.to_owned()),
            }));
        }
    }
}

impl Encoder<&PanelMessage> for PanelCodec {
    type Error = io::Error;

    fn encode(&mut self, message: &PanelMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}
