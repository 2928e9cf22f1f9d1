//! Tracing subscriber setup.
//!
//! Two sinks: the console (filtered by `RUST_LOG`, `warn` by default,
//! `debug` with `--verbose`) and an append-only error log that receives
//! ERROR events and nothing else.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

fn console_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,sieve=debug,sieve_core=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Install the global subscriber.
///
/// Returns a warning when the error log cannot be opened; console logging
/// still works in that case.
pub fn init(verbose: bool, error_log: &Path) -> Option<String> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(console_filter(verbose));

    let (file_layer, warning) = match OpenOptions::new().create(true).append(true).open(error_log) {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(LevelFilter::ERROR),
            ),
            None,
        ),
        Err(e) => (
            None,
            Some(format!(
                "Cannot open error log {}: {}",
                error_log.display(),
                e
            )),
        ),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    warning
}
