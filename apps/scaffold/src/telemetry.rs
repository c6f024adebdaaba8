//! Process-wide tracing subscriber for the server binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_DIRECTIVES: &str = "info,actix_web=info,sqlx=warn,sea_orm=warn,tiberius=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event (default)
    Json,
    /// Human-readable lines for local runs
    Text,
}

impl LogFormat {
    /// `LOG_FORMAT=text` (or `pretty`) selects text; anything else is JSON.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("text") | Some("pretty") => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let format = LogFormat::parse(std::env::var(LOG_FORMAT).ok().as_deref());

    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(false)
            .with_ansi(false)
    });
    let text = (format == LogFormat::Text).then(|| fmt::layer().compact().with_target(true));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json)
        .with(text)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_defaults_to_json() {
        assert_eq!(LogFormat::parse(None), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("xml")), LogFormat::Json);
    }

    #[test]
    fn test_log_format_text() {
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Text);
        assert_eq!(LogFormat::parse(Some(" Pretty ")), LogFormat::Text);
    }
}
