//! Tracing setup.
//!
//! `RUST_LOG` controls the filter (default `info,carebox=debug`); `LOG_FORMAT`
//! picks human-readable or JSON output.

use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,carebox=debug";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Unknown values fall back to [`Pretty`](LogFormat::Pretty) with a warning
    /// on stderr; tracing is not up yet at this point.
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// Installs the global subscriber. Call once, first thing in `main`.
pub fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
