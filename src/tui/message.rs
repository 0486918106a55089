use crate::decode::DecodeOutcome;

/// Commands sent from the UI to the reader task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    /// Open the port and start a fresh session.
    Start,
    /// Close the port, dropping any partial sentence.
    Stop,
    Quit,
}

/// Events sent from the reader task to the UI.
#[derive(Debug)]
pub enum ReaderEvent {
    Outcome(DecodeOutcome),
    Started { port_name: String, baud_rate: u32 },
    Stopped,
    Error(String),
    Disconnected,
}
