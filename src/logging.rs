use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

/// Log file location: ~/.cache/routetui/routetui.log
pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("routetui/routetui.log"))
}

/// Send logs to the log file, since the TUI owns the terminal.
/// Returns the file path so it can be shown to the user.
pub fn init_file_logging() -> Result<PathBuf> {
    let path = log_path().context("no cache directory for the log file")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(path)
}

/// Log to stderr, for the headless tools
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
