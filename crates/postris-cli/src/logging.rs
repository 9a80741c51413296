use std::{fs::File, path::Path, sync::Mutex};

use anyhow::Context as _;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};

pub(crate) enum LogTarget<'a> {
    Stderr,
    /// The terminal is owned by the UI, so logs go to a file instead.
    File(&'a Path),
}

fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `-v`.
pub(crate) fn init(verbose: u8, target: LogTarget<'_>) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbose).into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stderr => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
    }
    Ok(())
}
