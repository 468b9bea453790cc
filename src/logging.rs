use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::LogConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Without a log file, output
/// goes to stderr only when `allow_stderr` is set, since the terminal UI
/// owns the screen.
pub fn init(config: &LogConfig, allow_stderr: bool) -> Result<()> {
    let writer = match &config.file {
        Some(path) => {
            ensure_parent_dir(path)?;
            BoxMakeWriter::new(Arc::new(File::create(path)?))
        }
        None if allow_stderr => BoxMakeWriter::new(std::io::stderr),
        None => return Ok(()),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| eyre!("invalid log level {:?}: {e}", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(writer);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_and_no_stderr_is_a_no_op() {
        let config = LogConfig::default();
        assert!(init(&config, false).is_ok());
    }

    #[test]
    fn parent_dir_is_created() {
        let dir = std::env::temp_dir().join(format!("hostpulse_log_{}", std::process::id()));
        let path = dir.join("nested").join("out.log");
        ensure_parent_dir(&path).unwrap();
        assert!(dir.join("nested").is_dir());
        let _ = fs::remove_dir_all(&dir);
    }
}
