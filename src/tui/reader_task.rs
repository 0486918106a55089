use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc as tokio_mpsc;

use crate::decode::DecodeOutcome;
use crate::error::Result;
use crate::session::{FixSink, SessionConfig, StreamSession};
use crate::transport::Transport;

use super::message::{ReaderCommand, ReaderEvent};

/// Capacity of the reader → UI event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long to wait for a command while no session is open.
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Forwards outcomes to the UI over a bounded channel.
///
/// Blocks the reader thread when the UI falls behind rather than dropping
/// outcomes.
pub struct ChannelSink {
    tx: tokio_mpsc::Sender<ReaderEvent>,
    closed: bool,
}

impl ChannelSink {
    pub fn new(tx: tokio_mpsc::Sender<ReaderEvent>) -> Self {
        Self { tx, closed: false }
    }

    fn send(&mut self, event: ReaderEvent) {
        if self.tx.blocking_send(event).is_err() {
            self.closed = true;
        }
    }

    /// Returns `true` once the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FixSink for ChannelSink {
    fn deliver(&mut self, outcome: DecodeOutcome) {
        self.send(ReaderEvent::Outcome(outcome));
    }
}

/// Run the reader loop on a blocking thread.
///
/// `open` creates a session for `config` on every `Start` command; a `Stop`
/// or a transport error drops it. Returns on `Quit` or when either channel
/// closes.
pub fn reader_loop<T, F>(
    config: SessionConfig,
    mut open: F,
    cmd_rx: std_mpsc::Receiver<ReaderCommand>,
    event_tx: tokio_mpsc::Sender<ReaderEvent>,
) where
    T: Transport,
    F: FnMut(&SessionConfig) -> Result<StreamSession<T>>,
{
    let mut sink = ChannelSink::new(event_tx);
    let mut session: Option<StreamSession<T>> = None;

    loop {
        let command = if session.is_some() {
            cmd_rx.try_recv()
        } else {
            cmd_rx
                .recv_timeout(IDLE_WAIT)
                .map_err(|e| match e {
                    std_mpsc::RecvTimeoutError::Timeout => std_mpsc::TryRecvError::Empty,
                    std_mpsc::RecvTimeoutError::Disconnected => {
                        std_mpsc::TryRecvError::Disconnected
                    }
                })
        };

        match command {
            Ok(ReaderCommand::Start) if session.is_none() => match open(&config) {
                Ok(s) => {
                    session = Some(s);
                    sink.send(ReaderEvent::Started {
                        port_name: config.port_name.clone(),
                        baud_rate: config.baud_rate,
                    });
                }
                Err(e) => {
                    warn!("failed to open {}: {e}", config.port_name);
                    sink.send(ReaderEvent::Error(format!("{e}")));
                }
            },
            Ok(ReaderCommand::Start) => {}
            Ok(ReaderCommand::Stop) => {
                if session.take().is_some() {
                    info!("closed {}", config.port_name);
                    sink.send(ReaderEvent::Stopped);
                }
            }
            Ok(ReaderCommand::Quit) => {
                sink.send(ReaderEvent::Disconnected);
                return;
            }
            Err(std_mpsc::TryRecvError::Empty) => {}
            Err(std_mpsc::TryRecvError::Disconnected) => return,
        }

        let polled = session.as_mut().map(|s| s.poll(&mut sink));
        if let Some(Err(e)) = polled {
            session = None;
            sink.send(ReaderEvent::Error(format!("{e}")));
            sink.send(ReaderEvent::Stopped);
        }

        if sink.is_closed() {
            return;
        }
    }
}
