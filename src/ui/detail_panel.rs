use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::format::format_bytes;
use crate::system::{ExtraProcessDetail, ProcessSample};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    process: &ProcessSample,
    detail: Option<&ExtraProcessDetail>,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Process Detail ",
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let mut lines = vec![
        detail_line("PID", process.pid.to_string(), theme),
        detail_line("Name", process.name.clone(), theme),
        detail_line("Memory", format_bytes(process.memory_bytes), theme),
        detail_line("CPU", format!("{:.1}%", process.cpu_percent), theme),
    ];

    if let Some(detail) = detail {
        lines.push(detail_line("Threads", detail.thread_count.to_string(), theme));
        lines.push(detail_line("Read", format_bytes(detail.io_read_bytes), theme));
        lines.push(detail_line("Written", format_bytes(detail.io_write_bytes), theme));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn detail_line(label: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {label:<9}"),
            Style::default()
                .fg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(theme.text_primary)),
    ])
}
