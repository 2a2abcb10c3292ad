//! Log output for fabula runs.

use derive_getters::Getters;
use fabula_error::{ConfigError, FabulaResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// The `[logging]` section.
///
/// `RUST_LOG`, when set, replaces both filters.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, setter(into))]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives for a normal run
    filter: String,
    /// Filter directives with `--verbose`
    verbose_filter: String,
    /// Emit JSON lines instead of text
    json: bool,
    /// Prefix each line with the emitting module
    show_target: bool,
    /// Export spans to stdout (`observability` builds only)
    export_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            verbose_filter: "debug".to_string(),
            json: false,
            show_target: false,
            export_spans: true,
        }
    }
}

impl LoggingConfig {
    /// Directives used when `RUST_LOG` is unset.
    pub fn default_filter(&self, verbose: bool) -> &str {
        if verbose {
            &self.verbose_filter
        } else {
            &self.filter
        }
    }

    /// Check that both filters parse.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending key.
    pub fn validate(&self) -> FabulaResult<()> {
        for (key, directives) in [
            ("logging.filter", &self.filter),
            ("logging.verbose_filter", &self.verbose_filter),
        ] {
            EnvFilter::try_new(directives).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        }
        Ok(())
    }
}

/// Install the global subscriber.
///
/// `json` forces JSON output regardless of the configuration.
///
/// # Errors
///
/// Returns an error when the active filter does not parse.
pub fn init_logging(
    config: &LoggingConfig,
    verbose: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_filter(verbose)))?;

    let fmt_layer = if json || config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.show_target)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(config.show_target)
            .boxed()
    };

    #[cfg(feature = "observability")]
    let spans = config
        .export_spans
        .then(|| crate::observability::span_layer());
    #[cfg(not(feature = "observability"))]
    let spans: Option<tracing_subscriber::layer::Identity> = None;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(spans)
        .init();

    Ok(())
}
