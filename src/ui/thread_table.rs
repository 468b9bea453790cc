use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table};

use crate::system::ThreadSample;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    focus_pid: Option<u32>,
    threads: &[ThreadSample],
    theme: &Theme,
) {
    let title = match focus_pid {
        Some(pid) => format!(" Threads of {pid} "),
        None => " Threads ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    if threads.is_empty() {
        let hint = if focus_pid.is_some() {
            " no threads readable"
        } else {
            " press f to sample threads"
        };
        let line = Line::from(Span::styled(hint, Style::default().fg(theme.text_secondary)));
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let header = Row::new(["TID", "CPU %"]).style(
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    );
    let rows = threads.iter().map(|t| {
        Row::new([t.tid.to_string(), format!("{:.1}", t.cpu_percent)])
            .style(Style::default().fg(theme.load_color(t.cpu_percent)))
    });
    let table = Table::new(rows, [Constraint::Length(10), Constraint::Length(7)])
        .header(header)
        .block(block);

    frame.render_widget(table, area);
}
