use std::io;
use std::time::Duration;

use chrono::FixedOffset;
use log::{debug, trace, warn};

use crate::convert::{self, DEFAULT_UTC_OFFSET_HOURS, DecodeContext};
use crate::decode::{self, DecodeOutcome};
use crate::error::{DecodeError, ReaderError, Result};
use crate::framer::SentenceFramer;
use crate::transport::Transport;
use crate::transport::serial::{self, SerialTransport};

/// Configuration for one reading session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Serial port name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub port_name: String,
    /// Serial baud rate.
    pub baud_rate: u32,
    /// How long a single read waits for data.
    pub read_timeout: Duration,
    /// Local offset applied to sentence times, in hours east of UTC.
    pub utc_offset_hours: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 9600,
            read_timeout: Duration::from_millis(100),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

/// Receives every decode outcome, in stream order.
pub trait FixSink {
    fn deliver(&mut self, outcome: DecodeOutcome);
}

impl FixSink for Vec<DecodeOutcome> {
    fn deliver(&mut self, outcome: DecodeOutcome) {
        self.push(outcome);
    }
}

/// One open stream: a transport plus the framer buffering its partial sentence.
///
/// Dropping the session discards anything not yet terminated by a newline.
pub struct StreamSession<T: Transport> {
    transport: T,
    framer: SentenceFramer,
    offset: FixedOffset,
    read_buf: Vec<u8>,
}

impl StreamSession<SerialTransport> {
    /// Open the configured serial port and start a fresh session.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let transport =
            serial::open_port(&config.port_name, config.baud_rate, config.read_timeout)?;
        Self::new(transport, config)
    }
}

impl<T: Transport> StreamSession<T> {
    pub fn new(mut transport: T, config: &SessionConfig) -> Result<Self> {
        let offset = convert::utc_offset(config.utc_offset_hours)?;
        transport.set_read_timeout(config.read_timeout)?;
        Ok(Self {
            transport,
            framer: SentenceFramer::new(),
            offset,
            read_buf: vec![0u8; 1024],
        })
    }

    /// Read one chunk, decode every sentence it completes and hand each
    /// outcome to `sink`. Returns how many outcomes were delivered.
    ///
    /// A quiet line is not an error. Only transport failures are returned.
    pub fn poll(&mut self, sink: &mut impl FixSink) -> Result<usize> {
        let n = match self.transport.read(&mut self.read_buf) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => 0,
            Err(e) => {
                warn!("read failed: {e}");
                return Err(ReaderError::Io(e));
            }
        };
        trace!("read {} bytes", n);
        let sentences = self.framer.feed(&self.read_buf[..n]);
        Ok(self.decode_all(&sentences, sink))
    }

    /// Frame and decode bytes that arrived by some other route.
    pub fn process(&mut self, chunk: &[u8], sink: &mut impl FixSink) -> usize {
        let sentences = self.framer.feed(chunk);
        self.decode_all(&sentences, sink)
    }

    fn decode_all(&self, sentences: &[String], sink: &mut impl FixSink) -> usize {
        if sentences.is_empty() {
            return 0;
        }

        let ctx = DecodeContext::now(self.offset);
        for sentence in sentences {
            let outcome = decode::decode_sentence(sentence, &ctx);
            match &outcome {
                DecodeOutcome::Failure(failure)
                    if failure.reason != DecodeError::UnsupportedSentenceType =>
                {
                    warn!("{}: {}", failure.reason, sentence)
                }
                other => debug!("decoded: {other:?}"),
            }
            sink.deliver(outcome);
        }
        sentences.len()
    }

    /// Bytes of the partial sentence still waiting for its newline.
    pub fn pending(&self) -> usize {
        self.framer.pending().len()
    }
}
