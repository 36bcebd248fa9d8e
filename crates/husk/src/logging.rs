use std::fs::OpenOptions;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset or invalid.  Does nothing if a
/// global subscriber is already installed.
///
/// Do not use this while a terminal session is running: log lines would be
/// written over the UI.  Use [`init_tracing_to_file`] instead.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Install a `tracing` subscriber that appends to the file at `path`.
///
/// The file is created if missing.  Filtering follows [`init_tracing`].
///
/// ```no_run
/// husk::init_tracing_to_file("husk.log").unwrap();
/// tracing::info!("written to husk.log");
/// ```
pub fn init_tracing_to_file(path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();
    Ok(())
}
