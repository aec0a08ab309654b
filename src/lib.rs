pub mod calculators;
pub mod config;
pub mod error;
pub mod handlers;
pub mod input;
pub mod metrics;
pub mod report;
pub mod server;
pub mod signals;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `default_level`. `format` is `json` for
/// structured output, anything else gives the human-readable formatter.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// Note: This function can only be called once per process.
pub fn init_tracing(default_level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
