use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Noisy HTTP stack modules capped at `warn` unless a full directive is given.
const QUIET_MODULES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,h2=warn,rustls=warn";

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `level`. A bare level such as `debug` gets the quiet
/// module defaults appended; a directive string is used as is.
pub fn setup_logging(level: &str, json: bool) {
    let directives = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => level.trim().to_string(),
    };
    let directives = if directives.contains(',') || directives.contains('=') {
        directives
    } else {
        format!("{directives},{QUIET_MODULES}")
    };
    let filter = EnvFilter::from_str(&directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).compact().with_writer(std::io::stderr))
            .init();
    }
    tracing::debug!(filter = %directives, json, "logging initialized");
}
