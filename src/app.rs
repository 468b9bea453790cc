use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::{ExtraProcessDetail, Monitor, ProcessSample, Snapshot};
use crate::ui::theme::Theme;

const STATUS_TTL_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub kill: KeyCode,
    pub focus: KeyCode,
    pub clear_focus: KeyCode,
    pub toggle_detail: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            kill: parse_key(&kb.kill).unwrap_or(KeyCode::Char('k')),
            focus: parse_key(&kb.focus).unwrap_or(KeyCode::Char('f')),
            clear_focus: parse_key(&kb.clear_focus).unwrap_or(KeyCode::Char('F')),
            toggle_detail: parse_key(&kb.toggle_detail).unwrap_or(KeyCode::Char('d')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.kill), "Terminate process"),
            (key_label(self.focus), "Toggle thread focus"),
            (key_label(self.clear_focus), "Clear thread focus"),
            (key_label(self.toggle_detail), "Toggle detail panel"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓".to_string(), "Select process"));
        entries.push(("PgUp/PgDn".to_string(), "Page"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub monitor: Monitor,
    pub snapshot: Arc<Snapshot>,
    pub selected_index: usize,
    selected_pid: Option<u32>,
    pub input_mode: InputMode,
    pub show_detail_panel: bool,
    pub detail: Option<(u32, ExtraProcessDetail)>,
    pub status_message: Option<(String, Instant)>,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    /// Rows visible in the process table, set by the renderer.
    pub page_size: usize,
}

impl App {
    pub fn new(config: &Config, monitor: Monitor) -> Self {
        let snapshot = monitor.read_latest();
        let mut app = App {
            running: true,
            monitor,
            snapshot,
            selected_index: 0,
            selected_pid: None,
            input_mode: InputMode::Normal,
            show_detail_panel: config.general.show_detail_panel,
            detail: None,
            status_message: None,
            theme: Theme::from_config(&config.colors.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            page_size: 10,
        };
        app.sync_selection();
        app
    }

    /// Pull the latest published snapshot and re-resolve everything that
    /// depends on it. Ticks between two passes only expire the status line.
    pub fn refresh_data(&mut self) {
        let latest = self.monitor.read_latest();
        if latest.sequence != self.snapshot.sequence {
            self.snapshot = latest;
            self.sync_selection();
        }

        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }
    }

    /// Keep the selection on the same pid across re-sorts; fall back to the
    /// nearest row when it is gone.
    fn sync_selection(&mut self) {
        let processes = &self.snapshot.processes;
        if processes.is_empty() {
            self.selected_index = 0;
            self.selected_pid = None;
        } else {
            if let Some(pid) = self.selected_pid
                && let Some(index) = processes.iter().position(|p| p.pid == pid)
            {
                self.selected_index = index;
            }
            self.selected_index = self.selected_index.min(processes.len() - 1);
            self.selected_pid = Some(processes[self.selected_index].pid);
        }
        self.refresh_detail();
    }

    fn refresh_detail(&mut self) {
        self.detail = match (self.show_detail_panel, self.selected_pid) {
            (true, Some(pid)) => Some((pid, self.monitor.fetch_extra_detail(pid))),
            _ => None,
        };
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Navigation keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::PageUp => return Action::Navigate(Direction::PageUp),
            KeyCode::PageDown => return Action::Navigate(Direction::PageDown),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.kill {
            return self.selected_pid().map_or(Action::None, Action::Kill);
        }
        if code == kb.focus {
            return self.selected_pid().map_or(Action::None, Action::Focus);
        }
        if code == kb.clear_focus {
            return Action::ClearFocus;
        }
        if code == kb.toggle_detail {
            return Action::ToggleDetailPanel;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::Kill(pid) => {
                if pid != 0 {
                    self.monitor.terminate(pid);
                    self.set_status(format!("Sent terminate request to PID {pid}"));
                }
            }
            Action::Focus(pid) => {
                if self.monitor.focus() == Some(pid) {
                    self.monitor.set_focus(0);
                    self.set_status("Thread focus cleared".to_string());
                } else {
                    self.monitor.set_focus(pid);
                    self.set_status(format!("Sampling threads of PID {pid}"));
                }
            }
            Action::ClearFocus => {
                self.monitor.set_focus(0);
                self.set_status("Thread focus cleared".to_string());
            }
            Action::ToggleDetailPanel => {
                self.show_detail_panel = !self.show_detail_panel;
                self.refresh_detail();
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        let len = self.snapshot.processes.len();
        if len == 0 {
            return;
        }
        let page = self.page_size.max(1);
        let last = len - 1;
        self.selected_index = match direction {
            Direction::Up => self.selected_index.saturating_sub(1),
            Direction::Down => (self.selected_index + 1).min(last),
            Direction::PageUp => self.selected_index.saturating_sub(page),
            Direction::PageDown => (self.selected_index + page).min(last),
            Direction::Top => 0,
            Direction::Bottom => last,
        };
        let pid = self.snapshot.processes[self.selected_index].pid;
        if self.selected_pid != Some(pid) {
            self.selected_pid = Some(pid);
            self.refresh_detail();
        }
    }

    fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_pid
    }

    pub fn selected_process(&self) -> Option<&ProcessSample> {
        self.snapshot.processes.get(self.selected_index)
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::mock::{MockProcess, MockSystem};
    use crate::system::monitor::MIN_SAMPLE_INTERVAL;
    use crate::system::{ProcessSample, Snapshot};
    use std::time::Duration;

    fn process(pid: u32, name: &str, memory: u64) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            memory_bytes: memory,
            cpu_percent: 0.0,
        }
    }

    fn make_test_app(os: &MockSystem, processes: Vec<ProcessSample>) -> App {
        let monitor = Monitor::new(os.clone(), os.clone(), MIN_SAMPLE_INTERVAL);
        let mut app = App::new(&Config::default(), monitor);
        app.snapshot = Arc::new(Snapshot {
            sequence: 1,
            processes,
            ..Snapshot::default()
        });
        app.sync_selection();
        app
    }

    #[test]
    fn navigation_is_clamped() {
        let os = MockSystem::new();
        let mut app = make_test_app(
            &os,
            vec![process(1, "a", 30), process(2, "b", 20), process(3, "c", 10)],
        );
        assert_eq!(app.selected_pid(), Some(1));

        app.dispatch(Action::Navigate(Direction::Up));
        assert_eq!(app.selected_index, 0);
        app.dispatch(Action::Navigate(Direction::Down));
        app.dispatch(Action::Navigate(Direction::Down));
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_index, 2);
        assert_eq!(app.selected_pid(), Some(3));
        app.dispatch(Action::Navigate(Direction::Top));
        assert_eq!(app.selected_pid(), Some(1));
        app.dispatch(Action::Navigate(Direction::PageDown));
        assert_eq!(app.selected_pid(), Some(3));
    }

    #[test]
    fn selection_follows_pid_across_resort() {
        let os = MockSystem::new();
        let mut app = make_test_app(&os, vec![process(1, "a", 30), process(2, "b", 20)]);
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid(), Some(2));

        app.snapshot = Arc::new(Snapshot {
            sequence: 2,
            processes: vec![process(2, "b", 50), process(1, "a", 30)],
            ..Snapshot::default()
        });
        app.sync_selection();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_pid(), Some(2));
    }

    #[test]
    fn selection_falls_back_when_process_exits() {
        let os = MockSystem::new();
        let mut app = make_test_app(&os, vec![process(1, "a", 30), process(2, "b", 20)]);
        app.dispatch(Action::Navigate(Direction::Down));

        app.snapshot = Arc::new(Snapshot {
            sequence: 2,
            processes: vec![process(1, "a", 30)],
            ..Snapshot::default()
        });
        app.sync_selection();
        assert_eq!(app.selected_pid(), Some(1));
    }

    #[test]
    fn kill_goes_through_monitor() {
        let os = MockSystem::new();
        os.upsert_process(7, MockProcess::new("victim", 100));
        let mut app = make_test_app(&os, vec![process(7, "victim", 100)]);

        let key = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);
        let action = app.map_key(key);
        assert_eq!(action, Action::Kill(7));
        app.dispatch(action);

        assert_eq!(os.terminated(), vec![7]);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("PID 7"));
    }

    #[test]
    fn focus_key_toggles_focus() {
        let os = MockSystem::new();
        let mut app = make_test_app(&os, vec![process(9, "x", 1)]);
        let key = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::NONE);

        app.dispatch(app.map_key(key));
        assert_eq!(app.monitor.focus(), Some(9));
        app.dispatch(app.map_key(key));
        assert_eq!(app.monitor.focus(), None);

        app.dispatch(Action::Focus(9));
        app.dispatch(Action::ClearFocus);
        assert_eq!(app.monitor.focus(), None);
    }

    #[test]
    fn detail_is_fetched_for_selection() {
        let os = MockSystem::new();
        os.upsert_process(
            4,
            MockProcess::new("io", 10)
                .with_thread(40, 0, 0)
                .with_thread(41, 0, 0)
                .with_io(1000, 2000),
        );
        let mut app = make_test_app(&os, vec![process(4, "io", 10)]);
        let (pid, detail) = app.detail.unwrap();
        assert_eq!(pid, 4);
        assert_eq!(detail.thread_count, 2);
        assert_eq!(detail.io_read_bytes, 1000);
        assert_eq!(detail.io_write_bytes, 2000);

        app.dispatch(Action::ToggleDetailPanel);
        assert!(app.detail.is_none());
    }

    #[test]
    fn detail_is_fetched_per_pass_not_per_tick() {
        let os = MockSystem::new();
        os.upsert_process(1, MockProcess::new("big", 200));
        os.upsert_process(2, MockProcess::new("small", 100));
        let mut monitor = Monitor::new(os.clone(), os.clone(), Duration::from_secs(60));
        monitor.start().unwrap();
        monitor
            .wait_for_snapshot(0, Duration::from_secs(5))
            .unwrap();

        let mut app = App::new(&Config::default(), monitor);
        app.refresh_data();
        assert_eq!(app.selected_pid(), Some(1));
        let after_first = os.detail_requests();

        for _ in 0..5 {
            app.refresh_data();
        }
        assert_eq!(os.detail_requests(), after_first);

        app.dispatch(Action::Navigate(Direction::Up));
        assert_eq!(os.detail_requests(), after_first);
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid(), Some(2));
        assert_eq!(os.detail_requests(), after_first + 1);
        app.monitor.stop();
    }

    #[test]
    fn empty_snapshot_has_no_selection() {
        let os = MockSystem::new();
        let mut app = make_test_app(&os, vec![]);
        assert_eq!(app.selected_pid(), None);
        let key = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let os = MockSystem::new();
        let mut app = make_test_app(&os, vec![process(1, "test", 100)]);

        app.dispatch(Action::ToggleHelp);
        assert!(app.show_help());

        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);

        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::ToggleHelp);

        // Ctrl+C still works (safety)
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);

        app.dispatch(Action::ToggleHelp);
        assert!(!app.show_help());
    }

    #[test]
    fn custom_keybind_remap_works() {
        let os = MockSystem::new();
        let mut app = make_test_app(&os, vec![process(1, "test", 100)]);
        app.keybinds.quit = KeyCode::Char('x');

        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::Quit);

        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);
    }
}
