use std::io;
use std::time::Duration;

pub mod serial;

/// A byte source delivering NMEA text from a receiver.
///
/// The transport is synchronous and blocking, bounded by its read timeout.
pub trait Transport: Send {
    /// Read whatever bytes are available into the buffer.
    /// Should return `Ok(0)` or `Err(TimedOut)` on a quiet line, not block forever.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Set the read timeout for subsequent `read()` calls.
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}
