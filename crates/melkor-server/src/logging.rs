use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::config::Config;

/// Map a configured level name to a filter. Unknown names fall back to `info`.
///
/// Accepts the `tracing` names plus the aliases `warning`, `fatal` and `panic`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => LevelFilter::WARN,
        "fatal" | "panic" => LevelFilter::ERROR,
        "" => LevelFilter::INFO,
        other => other.parse().unwrap_or(LevelFilter::INFO),
    }
}

/// `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(parse_level(&config.log_level).into()))
}

/// Install the global subscriber. `log_format: json` selects JSON lines.
pub fn init(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(false);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
