//! # Structured Logging
//!
//! `tracing` subscriber for the `bip75` binary. Stdout carries the JSON
//! documents the subcommands print, so every log line goes to stderr.
//!
//! Verbosity comes from repeated `-v` flags unless `RUST_LOG` is set, in
//! which case `RUST_LOG` wins:
//!
//! ```text
//! (none)  bip75=info,bip75_protocol=warn
//! -v      bip75=debug,bip75_protocol=info
//! -vv     bip75=debug,bip75_protocol=debug
//! -vvv    trace
//! ```

use std::io;

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format, selected with `--log-format` or `BIP75_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Filter directives for a `-v` count.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "bip75=info,bip75_protocol=warn",
        1 => "bip75=debug,bip75_protocol=info",
        2 => "bip75=debug,bip75_protocol=debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(verbosity: u8, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(verbosity > 0),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(false),
            )
            .init(),
    }

    tracing::debug!(?format, verbosity, "logging initialized");
}
