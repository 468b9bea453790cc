use std::io::{Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::KeyEventKind;
use tracing::{debug, info, warn};

use hostpulse::app::App;
use hostpulse::config::{Config, load_config, load_config_from_path};
use hostpulse::event::{Event, EventHandler};
use hostpulse::system::Monitor;
use hostpulse::{logging, ui};

#[derive(Parser)]
#[command(
    name = "hostpulse",
    about = "Host memory and CPU monitor with per-thread drill-down"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds (minimum 100)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Screen refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level or filter directive, e.g. "debug" or "hostpulse=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Print snapshots as JSON lines instead of drawing the terminal UI.
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Stop after this many snapshots in headless mode.
    #[arg(long)]
    samples: Option<u64>,

    /// Sample the threads of this process from the start.
    #[arg(long)]
    focus: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init(&config.log, cli.headless)?;

    let mut monitor = Monitor::os(Duration::from_millis(config.general.sample_interval_ms));
    if let Some(pid) = cli.focus {
        monitor.set_focus(pid);
    }
    monitor.start()?;

    if cli.headless {
        let result = run_headless(&monitor, cli.samples);
        monitor.stop();
        return result;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut app = App::new(&config, monitor);
    let result = run(&mut terminal, &mut app, &config).await;
    app.monitor.stop();

    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    config: &Config,
) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms.max(16));
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, app))?;

    while app.running {
        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let action = app.map_key(key);
                    app.dispatch(action);
                }
                Event::Tick => app.refresh_data(),
                Event::Resize => {}
            }
            terminal.draw(|frame| ui::draw(frame, app))?;
        }
    }

    Ok(())
}

/// Emit every published snapshot as one JSON line on stdout.
///
/// Blocks on the monitor's publish signal rather than polling, so no pass is
/// skipped when sampling is faster than the screen refresh rate.
fn run_headless(monitor: &Monitor, samples: Option<u64>) -> Result<()> {
    let patience = monitor.interval() * 4;
    let mut out = stdout().lock();
    let mut last_sequence = 0;
    let mut emitted = 0u64;

    while samples.is_none_or(|limit| emitted < limit) {
        let Some(snapshot) = monitor.wait_for_snapshot(last_sequence, patience) else {
            debug!(last_sequence, "no snapshot published yet");
            continue;
        };
        if snapshot.sequence > last_sequence + 1 && last_sequence != 0 {
            warn!(
                from = last_sequence,
                to = snapshot.sequence,
                "headless output fell behind"
            );
        }
        last_sequence = snapshot.sequence;
        serde_json::to_writer(&mut out, snapshot.as_ref())?;
        writeln!(out)?;
        out.flush()?;
        emitted += 1;
    }

    info!(emitted, "headless run finished");
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval_ms {
        config.general.sample_interval_ms = interval;
    }
    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(path) = &cli.log_file {
        config.log.file = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    config
}
