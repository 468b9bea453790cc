pub mod detail_panel;
pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;
pub mod thread_table;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

const SIDE_PANEL_WIDTH: u16 = 36;
const DETAIL_PANEL_HEIGHT: u16 = 9;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let snapshot = app.snapshot.clone();
    header::render(frame, chunks[0], &snapshot, &app.theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(chunks[1]);

    app.page_size = process_table::visible_rows(columns[0]).max(1);
    process_table::render(
        frame,
        columns[0],
        &snapshot.processes,
        app.selected_index,
        snapshot.focus_pid,
        &app.theme,
    );

    let threads_area = match app.selected_process() {
        Some(process) if app.show_detail_panel => {
            let side = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(DETAIL_PANEL_HEIGHT), Constraint::Min(3)])
                .split(columns[1]);
            let detail = app
                .detail
                .as_ref()
                .filter(|(pid, _)| *pid == process.pid)
                .map(|(_, detail)| detail);
            detail_panel::render(frame, side[0], process, detail, &app.theme);
            side[1]
        }
        _ => columns[1],
    };
    thread_table::render(
        frame,
        threads_area,
        snapshot.focus_pid,
        &snapshot.threads,
        &app.theme,
    );

    statusbar::render(
        frame,
        chunks[2],
        app.status_message.as_ref(),
        &app.keybinds,
        &app.theme,
    );

    // Help overlay goes last so it draws on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}
