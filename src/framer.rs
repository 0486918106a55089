use log::{trace, warn};

/// Line terminator for NMEA-0183 sentences.
const NEWLINE: u8 = b'\n';

/// Longest partial sentence kept while waiting for a newline. NMEA-0183
/// sentences are at most 82 characters; anything this long is line noise.
pub const MAX_PENDING: usize = 4096;

/// Reassembles newline-terminated sentences from arbitrarily split chunks.
///
/// The buffer only ever holds the bytes after the last newline seen, i.e. at
/// most one partial sentence. Complete sentences are handed back from
/// [`feed`](Self::feed) in arrival order.
#[derive(Debug, Default)]
pub struct SentenceFramer {
    buf: Vec<u8>,
}

impl SentenceFramer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(256),
        }
    }

    /// Append a chunk and return every sentence it completes.
    ///
    /// Sentences are trimmed of surrounding whitespace (including `\r`);
    /// lines that are empty after trimming are dropped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut sentences = Vec::new();
        let mut consumed = 0;
        while let Some(pos) = self.buf[consumed..].iter().position(|&b| b == NEWLINE) {
            let line = String::from_utf8_lossy(&self.buf[consumed..consumed + pos]);
            let text = line.trim();
            if !text.is_empty() {
                trace!("framed: {text}");
                sentences.push(text.to_string());
            }
            consumed += pos + 1;
        }
        self.buf.drain(..consumed);

        if self.buf.len() > MAX_PENDING {
            warn!("no newline in {} bytes, discarding", self.buf.len());
            self.buf.clear();
        }
        sentences
    }

    /// Bytes received since the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Drop any partial sentence.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}
