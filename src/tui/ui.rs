use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::app::{App, LineKind, SignalStatus};

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main border, colored by signal state.
    let status = if app.reading { "Reading" } else { "Stopped" };
    let block = Block::default()
        .title(format!(
            " GPS Reader -- {} @ {} baud ",
            app.port_name, app.baud_rate
        ))
        .title_bottom(format!(" {status} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(signal_color(app.signal)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Layout: signal row, position row, data log, help bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // signal status
            Constraint::Length(1), // last position
            Constraint::Min(0),    // data log
            Constraint::Length(1), // help bar
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(render_signal(app)), chunks[0]);
    frame.render_widget(Paragraph::new(render_position(app)), chunks[1]);
    render_log(frame, app, chunks[2]);

    let help_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(32)])
        .split(chunks[3]);
    frame.render_widget(Paragraph::new(render_help(app)), help_chunks[0]);
    frame.render_widget(Paragraph::new(render_stats(app)), help_chunks[1]);
}

fn signal_color(signal: SignalStatus) -> Color {
    match signal {
        SignalStatus::Waiting => Color::DarkGray,
        SignalStatus::Valid => Color::Green,
        SignalStatus::NoSignal => Color::Red,
    }
}

fn render_signal(app: &App) -> Line<'static> {
    let text = match app.signal {
        SignalStatus::Waiting => "GPS 신호 대기 중",
        SignalStatus::Valid => "GPS 신호 상태: 유효",
        SignalStatus::NoSignal => "GPS 신호 없음",
    };
    Line::from(Span::styled(
        format!(" {text}"),
        Style::default()
            .fg(signal_color(app.signal))
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_position(app: &App) -> Line<'static> {
    let position = match app.last_position {
        Some((lat, lon)) => format!("{lat:.6}°, {lon:.6}°"),
        None => "---".to_string(),
    };
    Line::from(vec![
        Span::styled(" 위치: ", Style::default().fg(Color::White)),
        Span::styled(position, Style::default().fg(Color::Cyan)),
    ])
}

fn render_log(frame: &mut Frame, app: &App, area: Rect) {
    if app.log.is_empty() || area.height == 0 {
        return;
    }

    let visible = area.height as usize;
    let start = app.log.len().saturating_sub(visible);
    let lines: Vec<Line<'static>> = app.log[start..]
        .iter()
        .map(|line| {
            let color = match line.kind {
                LineKind::Fix => Color::White,
                LineKind::NoSignal => Color::Yellow,
                LineKind::Failure => Color::Red,
                LineKind::Info => Color::DarkGray,
            };
            Line::from(Span::styled(
                format!("  {}", line.text),
                Style::default().fg(color),
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_help(app: &App) -> Line<'static> {
    let help_text = if app.reading {
        "  s[T]op  [Q]uit"
    } else {
        "  [S]tart  [Q]uit"
    };
    Line::from(Span::styled(help_text, Style::default().fg(Color::DarkGray)))
}

fn render_stats(app: &App) -> Line<'static> {
    Line::from(Span::styled(
        format!("fixes {:>6}  errors {:>6} ", app.fix_count, app.failure_count),
        Style::default().fg(Color::DarkGray),
    ))
}
