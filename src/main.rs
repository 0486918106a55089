use std::io::{self, Stdout};
use std::panic;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::EventStream;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use log::warn;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc as tokio_mpsc;

use gps_reader::transport::serial::{self, SerialTransport};
use gps_reader::tui::app::App;
use gps_reader::tui::message::{ReaderCommand, ReaderEvent};
use gps_reader::tui::reader_task::{self, EVENT_CHANNEL_CAPACITY};
use gps_reader::tui::ui;
use gps_reader::{SessionConfig, StreamSession};

#[derive(Parser, Debug)]
#[command(name = "gps-reader", version)]
#[command(about = "Decode NMEA GGA/RMC sentences from a serial GPS receiver")]
struct Cli {
    /// Serial port (defaults to the first one found)
    #[arg(long)]
    port: Option<String>,
    #[arg(long, default_value_t = 9600)]
    baud: u32,
    /// Hours east of UTC for displayed times
    #[arg(long, default_value_t = 9, allow_negative_numbers = true)]
    utc_offset: i32,
    #[arg(long, default_value_t = 100)]
    read_timeout_ms: u64,
    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
    /// Print decoded lines to stdout instead of running the terminal UI
    #[arg(long)]
    plain: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.list_ports {
        match serial::available_ports() {
            Ok(ports) => ports.iter().for_each(|p| println!("{p}")),
            Err(e) => {
                eprintln!("Failed to list ports: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let port_name = match cli.port.clone() {
        Some(p) => p,
        None => match serial::first_port() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("사용 가능한 COM 포트가 없습니다.");
                std::process::exit(1);
            }
        },
    };

    if !serial::BAUD_RATES.contains(&cli.baud) {
        warn!("unusual baud rate {} for an NMEA receiver", cli.baud);
    }

    let config = SessionConfig {
        port_name,
        baud_rate: cli.baud,
        read_timeout: Duration::from_millis(cli.read_timeout_ms),
        utc_offset_hours: cli.utc_offset,
    };

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let code = rt.block_on(async move {
        // UI → reader: std::sync::mpsc (reader thread is blocking).
        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        // Reader → UI: bounded tokio channel.
        let (event_tx, event_rx) = tokio_mpsc::channel::<ReaderEvent>(EVENT_CHANNEL_CAPACITY);

        let port_name = config.port_name.clone();
        let baud_rate = config.baud_rate;
        let reader = tokio::task::spawn_blocking(move || {
            reader_task::reader_loop(
                config,
                StreamSession::<SerialTransport>::open,
                cmd_rx,
                event_tx,
            );
        });

        let _ = cmd_tx.send(ReaderCommand::Start);

        let code = if cli.plain {
            run_plain(&cmd_tx, event_rx).await
        } else {
            match run_tui(cmd_tx.clone(), event_rx, port_name, baud_rate).await {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("TUI error: {e}");
                    1
                }
            }
        };

        let _ = cmd_tx.send(ReaderCommand::Quit);
        drop(cmd_tx);
        let _ = reader.await;
        code
    });
    std::process::exit(code);
}

/// Print every outcome as one line until the session ends or Ctrl+C.
async fn run_plain(
    cmd_tx: &std_mpsc::Sender<ReaderCommand>,
    mut event_rx: tokio_mpsc::Receiver<ReaderEvent>,
) -> i32 {
    let mut started = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                let _ = cmd_tx.send(ReaderCommand::Quit);
                return 0;
            }
            event = event_rx.recv() => match event {
                Some(ReaderEvent::Outcome(outcome)) => println!("{outcome}"),
                Some(ReaderEvent::Started { port_name, baud_rate }) => {
                    started = true;
                    println!("GPS 데이터 수신을 시작합니다... (포트: {port_name}, 보레이트: {baud_rate})");
                }
                Some(ReaderEvent::Error(msg)) => {
                    eprintln!("오류: {msg}");
                    if !started {
                        return 1;
                    }
                }
                Some(ReaderEvent::Stopped) => {
                    println!("GPS 데이터 수신을 중지합니다.");
                    return 1;
                }
                Some(ReaderEvent::Disconnected) | None => return 0,
            }
        }
    }
}

/// Raw-mode alternate screen, restored when dropped or on panic.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Screen {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            hook(info);
        }));

        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, app: &App) -> io::Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        restore_terminal();
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Drive the dashboard until the user quits or the reader goes away.
///
/// The screen is redrawn only after a reader event, a key press or a resize.
async fn run_tui(
    cmd_tx: std_mpsc::Sender<ReaderCommand>,
    mut event_rx: tokio_mpsc::Receiver<ReaderEvent>,
    port_name: String,
    baud_rate: u32,
) -> io::Result<()> {
    let mut screen = Screen::enter()?;
    let mut app = App::new(cmd_tx, port_name, baud_rate);
    let mut keys = EventStream::new();

    screen.draw(&app)?;
    while !app.should_quit {
        let redraw = tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => {
                    app.handle_reader_event(event);
                    true
                }
                None => break,
            },
            event = keys.next() => match event {
                Some(Ok(event)) => app.handle_terminal_event(event),
                Some(Err(e)) => return Err(e),
                None => break,
            },
        };
        if redraw {
            screen.draw(&app)?;
        }
    }
    Ok(())
}
