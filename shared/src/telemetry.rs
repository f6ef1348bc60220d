//! Tracing subscriber bootstrap

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Returns an error if a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = build_filter(config);

    tracing_subscriber::registry()
        .with(format_layer(config))
        .with(filter)
        .try_init()
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn format_layer(config: &LoggingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_ansi(config.colored)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_an_error() {
        let config = LoggingConfig {
            format: LogFormat::Compact,
            ..Default::default()
        };

        // Another test in this binary may have installed one already
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LoggingConfig {
            level: String::from("=:not a directive"),
            ..Default::default()
        };
        // Must not panic on a bad directive
        let _ = build_filter(&config);
    }
}
