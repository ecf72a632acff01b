//! Global tracing subscriber setup

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, LoggingConfig};

const FALLBACK_LEVEL: &str = "debug";

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&config.level));

    tracing_subscriber::registry()
        .with(format_layer(&config.format))
        .with(filter)
        .init();

    tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");
}

/// Filter for the configured directives; unparsable input falls back to `debug`
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Output layer for the chosen format. Span close events are kept so the
/// request spans report their busy and idle time.
fn format_layer<S>(format: &LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_span_events(FmtSpan::CLOSE);

    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Pretty => layer.pretty().with_target(true).boxed(),
    }
}
