//! Structured logging setup.
//!
//! Libraries in this workspace only emit `tracing` events. Binaries call
//! [`init_tracing`] once at startup to print them.

#![warn(missing_docs, clippy::pedantic)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// `RUST_LOG` or the configured directive is not a valid filter.
    #[error("invalid log filter `{directive}`: {source}")]
    InvalidFilter {
        /// Directive that failed to parse.
        directive: String,
        /// Source parse error.
        #[source]
        source: ParseError,
    },
    /// Another global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub directive: String,
    /// Include the event target (module path).
    pub with_target: bool,
    /// Emit ANSI colours.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_owned(),
            with_target: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Overrides the fallback directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    /// Builds the effective filter: `RUST_LOG` when set, the configured
    /// directive otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidFilter`] when `RUST_LOG` or the
    /// configured directive is invalid.
    pub fn filter(&self) -> Result<EnvFilter, TelemetryError> {
        let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        self.filter_from(from_env.as_deref())
    }

    fn filter_from(&self, from_env: Option<&str>) -> Result<EnvFilter, TelemetryError> {
        let directive = from_env
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(self.directive.as_str());
        EnvFilter::try_new(directive).map_err(|source| TelemetryError::InvalidFilter {
            directive: directive.to_owned(),
            source,
        })
    }
}

/// Installs a global `fmt` subscriber.
///
/// # Errors
///
/// Fails if the filter is invalid or a global subscriber already exists.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter()?)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_is_info() {
        let config = TelemetryConfig::default();
        assert_eq!(config.directive, DEFAULT_DIRECTIVE);
        assert!(config.ansi);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: TelemetryConfig = serde_json::from_str(r#"{ "withTarget": true }"#).unwrap();
        assert!(config.with_target);
        assert_eq!(config.directive, DEFAULT_DIRECTIVE);
    }

    #[test]
    fn environment_directive_wins_when_set() {
        let config = TelemetryConfig::default().with_directive("decorator_engine=loud");
        assert!(config.filter_from(Some("decorator_engine=debug")).is_ok());

        let err = config.filter_from(Some("  ")).expect_err("blank falls back");
        assert!(matches!(
            err,
            TelemetryError::InvalidFilter { ref directive, .. } if directive == "decorator_engine=loud"
        ));
        assert!(config.with_directive("warn").filter_from(None).is_ok());
    }

    #[test]
    fn invalid_environment_directive_is_reported() {
        let config = TelemetryConfig::default();
        let err = config.filter_from(Some("decorator_engine=loud")).expect_err("bad level");
        assert!(matches!(
            err,
            TelemetryError::InvalidFilter { ref directive, .. } if directive == "decorator_engine=loud"
        ));
    }

    #[test]
    fn second_install_reports_error() {
        let config = TelemetryConfig::default().with_directive("warn");
        init_tracing(&config).unwrap();
        let second = init_tracing(&config);
        assert!(matches!(second, Err(TelemetryError::Install(_))));
    }
}
