use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use super::line::Line;
use crate::error::TransportError;

/// Longest incoming line accepted by default, terminator included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8192;

/// Newline-delimited IRC framing.
///
/// Incoming lines may end in LF or CRLF and are decoded lossily as UTF-8.
/// Blank, unparsable and overlong lines are skipped. Outgoing lines end in
/// CRLF.
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    /// Bytes already scanned for a terminator.
    scanned: usize,
    /// Dropping an overlong line until its terminator arrives.
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            scanned: 0,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Line>, TransportError> {
        loop {
            let Some(offset) = src[self.scanned..].iter().position(|&b| b == b'\n') else {
                if self.discarding || src.len() > self.max_length {
                    if !self.discarding {
                        warn!(max = self.max_length, "Discarding overlong line");
                        self.discarding = true;
                    }
                    src.clear();
                    self.scanned = 0;
                } else {
                    self.scanned = src.len();
                }
                return Ok(None);
            };

            let end = self.scanned + offset + 1;
            self.scanned = 0;
            let raw = src.split_to(end);

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if end > self.max_length {
                warn!(max = self.max_length, "Discarding overlong line");
                continue;
            }

            let text = String::from_utf8_lossy(&raw);
            let text = text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                continue;
            }

            match text.parse::<Line>() {
                Ok(line) => return Ok(Some(line)),
                Err(e) => warn!(error = %e, "Skipping unparsable line"),
            }
        }
    }
}

impl Encoder<Line> for LineCodec {
    type Error = TransportError;

    fn encode(&mut self, line: Line, dst: &mut BytesMut) -> Result<(), TransportError> {
        let text = line.to_string();
        if text.contains(['\r', '\n', '\0']) {
            return Err(TransportError::InvalidLine(text));
        }
        dst.reserve(text.len() + 2);
        dst.put_slice(text.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
