use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::format::format_memory_usage;
use crate::system::Snapshot;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_branding(frame, chunks[0], snapshot, theme);
    render_memory_gauge(frame, chunks[1], snapshot, theme);
    render_cpu_gauge(frame, chunks[2], snapshot, theme);
}

fn bordered(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
}

fn render_branding(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let block = bordered(theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![
        Span::styled(
            " hostpulse ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Procs: {}", snapshot.processes.len()),
            Style::default().fg(theme.text_secondary),
        ),
    ];

    if let Some(pid) = snapshot.focus_pid {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Focus: {pid}"),
            Style::default()
                .fg(theme.accent_mauve)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn gauge_title(title: &'static str, theme: &Theme) -> Span<'static> {
    Span::styled(
        title,
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_memory_gauge(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let system = &snapshot.system;
    let gauge = Gauge::default()
        .block(bordered(theme).title(gauge_title(" Memory ", theme)))
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        .ratio((system.memory_load_percent / 100.0).clamp(0.0, 1.0))
        .label(format_memory_usage(
            system.memory_used,
            system.memory_total,
            system.memory_load_percent,
        ));

    frame.render_widget(gauge, area);
}

fn render_cpu_gauge(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let load = snapshot.system.cpu_load_percent;
    let gauge = Gauge::default()
        .block(bordered(theme).title(gauge_title(" CPU ", theme)))
        .gauge_style(
            Style::default()
                .fg(theme.load_color(load))
                .bg(theme.gauge_unfilled),
        )
        .ratio((load / 100.0).clamp(0.0, 1.0))
        .label(format!("{load:.1}%"));

    frame.render_widget(gauge, area);
}
