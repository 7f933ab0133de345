//! Structured logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the binary. [`init_logging`] installs one that writes to stderr, keeping
//! stdout free for job output.

use tracing::Level;

/// Configuration for the logging subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for everything outside this crate
    pub level: Level,
    /// Log level for `basicstats` itself
    pub crate_level: Level,
    /// Whether to emit JSON lines instead of plain text
    pub json_format: bool,
    /// Environment filter override
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            crate_level: Level::INFO,
            json_format: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration for production use.
    pub fn production() -> Self {
        Self {
            level: Level::WARN,
            crate_level: Level::INFO,
            json_format: true,
            env_filter: None,
        }
    }

    /// Creates a configuration for development use.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            crate_level: Level::DEBUG,
            json_format: false,
            env_filter: None,
        }
    }

    /// Maps a `-v` count onto the crate level: 0 is INFO, 1 DEBUG, 2+ TRACE.
    pub fn with_verbosity(self, verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        self.with_crate_level(level)
    }

    /// Sets the log level outside this crate.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the log level for this crate.
    pub fn with_crate_level(mut self, level: Level) -> Self {
        self.crate_level = level;
        self
    }

    /// Sets whether to use JSON output format.
    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Sets a custom environment filter.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Builds the environment filter string.
    pub fn env_filter(&self) -> String {
        if let Some(ref filter) = self.env_filter {
            filter.clone()
        } else {
            format!(
                "{},basicstats={}",
                self.level.as_str().to_lowercase(),
                self.crate_level.as_str().to_lowercase()
            )
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured filter.
///
/// # Examples
///
/// ```rust,no_run
/// use basicstats::logging::{init_logging, LoggingConfig};
///
/// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
/// ```
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(LoggingConfig::default().env_filter(), "warn,basicstats=info");
    }

    #[test]
    fn test_presets() {
        let production = LoggingConfig::production();
        assert!(production.json_format);
        assert_eq!(production.crate_level, Level::INFO);

        let development = LoggingConfig::development();
        assert!(!development.json_format);
        assert_eq!(development.env_filter(), "debug,basicstats=debug");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LoggingConfig::default().with_verbosity(0).crate_level, Level::INFO);
        assert_eq!(LoggingConfig::default().with_verbosity(1).crate_level, Level::DEBUG);
        assert_eq!(LoggingConfig::default().with_verbosity(5).crate_level, Level::TRACE);
    }

    #[test]
    fn test_env_filter_override() {
        let config = LoggingConfig::default().with_env_filter("basicstats::runtime=trace");
        assert_eq!(config.env_filter(), "basicstats::runtime=trace");
    }
}
