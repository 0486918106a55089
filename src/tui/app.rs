use std::sync::mpsc as std_mpsc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::decode::DecodeOutcome;
use crate::error::DecodeError;

use super::message::{ReaderCommand, ReaderEvent};

/// Oldest lines are dropped past this many.
const MAX_LOG_LINES: usize = 500;

/// Receiver signal state as last reported by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStatus {
    /// Nothing decoded yet.
    Waiting,
    Valid,
    NoSignal,
}

/// How a log line should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Fix,
    NoSignal,
    Failure,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}

/// Application state.
pub struct App {
    pub port_name: String,
    pub baud_rate: u32,
    pub reading: bool,
    pub signal: SignalStatus,
    /// Last decoded (latitude, longitude).
    pub last_position: Option<(f64, f64)>,
    pub log: Vec<LogLine>,
    pub fix_count: u64,
    pub failure_count: u64,
    pub should_quit: bool,

    cmd_tx: std_mpsc::Sender<ReaderCommand>,
}

impl App {
    pub fn new(cmd_tx: std_mpsc::Sender<ReaderCommand>, port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            reading: false,
            signal: SignalStatus::Waiting,
            last_position: None,
            log: Vec::new(),
            fix_count: 0,
            failure_count: 0,
            should_quit: false,
            cmd_tx,
        }
    }

    /// Handle an event from the reader task.
    pub fn handle_reader_event(&mut self, event: ReaderEvent) {
        match event {
            ReaderEvent::Outcome(outcome) => self.handle_outcome(outcome),
            ReaderEvent::Started {
                port_name,
                baud_rate,
            } => {
                self.reading = true;
                self.push(
                    LineKind::Info,
                    format!(
                        "GPS 데이터 수신을 시작합니다... (포트: {port_name}, 보레이트: {baud_rate})"
                    ),
                );
            }
            ReaderEvent::Stopped => {
                self.reading = false;
                self.push(LineKind::Info, "GPS 데이터 수신을 중지합니다.".to_string());
            }
            ReaderEvent::Error(msg) => {
                self.push(LineKind::Failure, format!("오류: {msg}"));
            }
            ReaderEvent::Disconnected => {
                self.reading = false;
            }
        }
    }

    fn handle_outcome(&mut self, outcome: DecodeOutcome) {
        let text = outcome.to_string();
        let kind = match &outcome {
            DecodeOutcome::Fix(fix) => {
                self.fix_count += 1;
                self.last_position = Some((fix.latitude, fix.longitude));
                self.signal = if fix.valid {
                    SignalStatus::Valid
                } else {
                    SignalStatus::NoSignal
                };
                LineKind::Fix
            }
            DecodeOutcome::NoSignal(_) => {
                self.signal = SignalStatus::NoSignal;
                LineKind::NoSignal
            }
            DecodeOutcome::Failure(failure) => {
                self.failure_count += 1;
                if matches!(failure.reason, DecodeError::InsufficientFields { .. }) {
                    self.signal = SignalStatus::NoSignal;
                }
                LineKind::Failure
            }
        };
        self.push(kind, text);
    }

    fn push(&mut self, kind: LineKind, text: String) {
        self.log.push(LogLine { kind, text });
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
    }

    /// Apply a terminal event. Returns `true` when the screen needs redrawing.
    ///
    /// Only key presses count; some platforms also report releases.
    pub fn handle_terminal_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(key);
                true
            }
            Event::Resize(_, _) => true,
            _ => false,
        }
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('s') | KeyCode::Char('S') if !self.reading => {
                let _ = self.cmd_tx.send(ReaderCommand::Start);
            }
            KeyCode::Char('t') | KeyCode::Char('T') if self.reading => {
                let _ = self.cmd_tx.send(ReaderCommand::Stop);
            }
            _ => {}
        }
    }

    fn quit(&mut self) {
        let _ = self.cmd_tx.send(ReaderCommand::Quit);
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::convert::{DecodeContext, utc_offset};
    use crate::decode::decode_sentence;

    fn app() -> (App, std_mpsc::Receiver<ReaderCommand>) {
        let (tx, rx) = std_mpsc::channel();
        (App::new(tx, "/dev/ttyUSB0".to_string(), 9600), rx)
    }

    fn outcome(sentence: &str) -> ReaderEvent {
        let ctx = DecodeContext::new(
            utc_offset(9).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        );
        ReaderEvent::Outcome(decode_sentence(sentence, &ctx))
    }

    #[test]
    fn test_valid_fix_updates_signal_and_position() {
        let (mut app, _rx) = app();
        app.handle_reader_event(outcome(
            "$GPGGA,123519,3746.123,N,1230.000,E,1,08,0.9,30.0,M,46.9,M,,*47",
        ));
        assert_eq!(app.signal, SignalStatus::Valid);
        let (lat, lon) = app.last_position.unwrap();
        assert!((lat - 37.768717).abs() < 1e-9);
        assert!((lon - 12.5).abs() < 1e-9);
        assert_eq!(app.fix_count, 1);
        assert_eq!(app.log[0].kind, LineKind::Fix);
    }

    #[test]
    fn test_no_signal_keeps_last_position() {
        let (mut app, _rx) = app();
        app.handle_reader_event(outcome(
            "$GPGGA,123519,3746.123,N,1230.000,E,1,08,0.9,30.0,M,46.9,M,,*47",
        ));
        app.handle_reader_event(outcome("$GPGGA,123520,,,,,0,00,99.99,,,,,,*48"));
        assert_eq!(app.signal, SignalStatus::NoSignal);
        assert!(app.last_position.is_some());
        assert_eq!(app.log[1].kind, LineKind::NoSignal);
    }

    #[test]
    fn test_short_sentence_means_no_signal() {
        let (mut app, _rx) = app();
        app.handle_reader_event(outcome("$GPRMC,123519,V"));
        assert_eq!(app.signal, SignalStatus::NoSignal);
        assert_eq!(app.failure_count, 1);
    }

    #[test]
    fn test_unsupported_leaves_signal() {
        let (mut app, _rx) = app();
        app.handle_reader_event(outcome("$GPGSV,3,1,11"));
        assert_eq!(app.signal, SignalStatus::Waiting);
        assert!(app.log[0].text.starts_with("지원되지 않는 문장 유형"));
    }

    #[test]
    fn test_log_is_capped() {
        let (mut app, _rx) = app();
        for _ in 0..MAX_LOG_LINES + 10 {
            app.handle_reader_event(outcome("$GPGSV,3,1,11"));
        }
        assert_eq!(app.log.len(), MAX_LOG_LINES);
    }

    #[test]
    fn test_start_stop_keys() {
        let (mut app, rx) = app();
        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        assert_eq!(rx.try_recv(), Ok(ReaderCommand::Start));

        app.handle_reader_event(ReaderEvent::Started {
            port_name: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
        });
        assert!(app.reading);
        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        assert!(rx.try_recv().is_err());

        app.handle_key(KeyEvent::from(KeyCode::Char('t')));
        assert_eq!(rx.try_recv(), Ok(ReaderCommand::Stop));
    }

    #[test]
    fn test_terminal_events() {
        let (mut app, rx) = app();
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert!(!app.handle_terminal_event(Event::Key(release)));
        assert!(!app.should_quit);
        assert!(rx.try_recv().is_err());

        assert!(app.handle_terminal_event(Event::Resize(80, 24)));
        assert!(!app.handle_terminal_event(Event::FocusGained));

        assert!(app.handle_terminal_event(Event::Key(KeyEvent::from(KeyCode::Char('s')))));
        assert_eq!(rx.try_recv(), Ok(ReaderCommand::Start));
    }

    #[test]
    fn test_quit_key() {
        let (mut app, rx) = app();
        app.handle_key(KeyEvent::from(KeyCode::Char('q')));
        assert!(app.should_quit);
        assert_eq!(rx.try_recv(), Ok(ReaderCommand::Quit));
    }
}
