use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::format::{format_bytes, truncate_unicode};
use crate::system::ProcessSample;
use crate::ui::theme::Theme;

const NAME_WIDTH: usize = 32;

/// Rows of data that fit in `area` once borders and the header are drawn.
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessSample],
    selected_index: usize,
    focus_pid: Option<u32>,
    theme: &Theme,
) {
    let header = Row::new(["PID", "Name", "Memory", "CPU %"])
        .style(
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(0);

    let rows = processes.iter().map(|p| {
        let name_style = if focus_pid == Some(p.pid) {
            Style::default()
                .fg(theme.accent_mauve)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_primary)
        };
        Row::new([
            Cell::from(p.pid.to_string()),
            Cell::from(truncate_unicode(&p.name, NAME_WIDTH)).style(name_style),
            Cell::from(format_bytes(p.memory_bytes)),
            Cell::from(format!("{:.1}", p.cpu_percent))
                .style(Style::default().fg(theme.load_color(p.cpu_percent))),
        ])
    });

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Processes ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .fg(theme.selection_fg)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if !processes.is_empty() {
        state.select(Some(selected_index.min(processes.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
