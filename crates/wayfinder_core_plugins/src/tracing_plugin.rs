//! Log output for Wayfinder processes.
//!
//! [`TracingPlugin`] publishes a [`TracingConfig`] global during `build()` and
//! installs the `tracing` subscriber during `ready()`. Add it before
//! `ModelsPlugin`, whose `ready()` starts the background model loader, so the
//! loader's events are captured.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use wayfinder_system::plugin::{Plugin, Version};
use wayfinder_system::resource::GlobalResource;
use wayfinder_system::server::Server;

/// Filter directives, e.g. `wayfinder_models=debug,reqwest=warn`.
const LOG_FILTER_ENV: &str = "WAYFINDER_LOG";

/// One of `pretty`, `compact` or `json`.
const LOG_FORMAT_ENV: &str = "WAYFINDER_LOG_FORMAT";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line, colored output for terminals.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event, for log collectors.
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{other}', expected pretty, compact or json"
            )),
        }
    }
}

/// The logging setup actually in effect, stored as a server global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level used when no filter directives are given.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Filter directives passed to [`EnvFilter`].
    pub filter: String,
}

impl GlobalResource for TracingConfig {}

/// Installs a `tracing-subscriber` registry with an [`EnvFilter`] and a
/// formatting layer.
///
/// | Resource | Scope | Description |
/// |----------|-------|-------------|
/// | [`TracingConfig`] | Global | Effective logging setup |
///
/// ```
/// use tracing::Level;
/// use wayfinder_core_plugins::{TracingFormat, TracingPlugin};
///
/// let plugin = TracingPlugin::default()
///     .with_level(Level::DEBUG)
///     .with_format(TracingFormat::Json)
///     .with_env_filter("wayfinder_models=debug,reqwest=warn");
/// assert_eq!(plugin.config().filter, "wayfinder_models=debug,reqwest=warn");
/// ```
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a plugin logging at `INFO` in the pretty format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `WAYFINDER_LOG` and `WAYFINDER_LOG_FORMAT` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the logging variables through `lookup`.
    ///
    /// Blank values are ignored and an unknown format falls back to pretty.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            env_filter: value(LOG_FILTER_ENV),
            format: value(LOG_FORMAT_ENV)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Sets the level used when no filter directives are given.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives (`target=level,...`), overriding the level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Logs span enter and exit, e.g. around the `model_loader` span.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the setup this plugin will install.
    ///
    /// Directives that [`EnvFilter`] rejects are replaced by the level.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        let filter = self
            .env_filter
            .as_deref()
            .filter(|directives| EnvFilter::try_new(directives).is_ok())
            .map_or_else(|| self.level.as_str().to_ascii_lowercase(), str::to_string);
        TracingConfig {
            level: self.level,
            format: self.format,
            filter,
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };
        let layer = tracing_subscriber::fmt::layer().with_span_events(span_events);
        match self.format {
            TracingFormat::Pretty => layer.pretty().boxed(),
            TracingFormat::Compact => layer.compact().boxed(),
            TracingFormat::Json => layer.json().boxed(),
        }
    }
}

impl Plugin for TracingPlugin {
    const ID: &'static str = "wayfinder::tracing";
    const VERSION: Version = Version::new(0, 0, 1);

    fn build(&self, server: &mut Server) {
        server.insert_global(self.config());
    }

    fn ready(&self, server: &mut Server) {
        let config = server
            .get_global::<TracingConfig>()
            .map_or_else(|| self.config(), |config| (*config).clone());

        // An already installed subscriber (tests, embedding apps) is kept.
        let installed = tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(EnvFilter::new(&config.filter))
            .try_init()
            .is_ok();

        tracing::info!(
            filter = %config.filter,
            format = ?config.format,
            installed,
            "Logging configured"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(ToString::to_string)
    }

    #[test]
    fn defaults_to_info_pretty() {
        let config = TracingPlugin::default().config();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, TracingFormat::Pretty);
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn lookup_reads_filter_and_format() {
        let plugin = TracingPlugin::from_lookup(lookup(&[
            ("WAYFINDER_LOG", "wayfinder_models=debug"),
            ("WAYFINDER_LOG_FORMAT", "JSON"),
        ]));
        let config = plugin.config();
        assert_eq!(config.filter, "wayfinder_models=debug");
        assert_eq!(config.format, TracingFormat::Json);
    }

    #[test]
    fn unknown_format_and_blank_filter_fall_back() {
        let plugin = TracingPlugin::from_lookup(lookup(&[
            ("WAYFINDER_LOG", "  "),
            ("WAYFINDER_LOG_FORMAT", "xml"),
        ]));
        let config = plugin.config();
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, TracingFormat::Pretty);
    }

    #[test]
    fn invalid_directives_use_level() {
        let config = TracingPlugin::new()
            .with_level(Level::WARN)
            .with_env_filter("wayfinder_models=notalevel")
            .config();
        assert_eq!(config.filter, "warn");
    }

    #[test]
    fn format_parse_error_names_choices() {
        let err = "xml".parse::<TracingFormat>().unwrap_err();
        assert!(err.contains("pretty, compact or json"));
    }

    #[test]
    fn config_is_published_as_global() {
        let mut server = Server::new();
        server.add_plugins(TracingPlugin::default().with_format(TracingFormat::Compact));
        server.finish();

        let config = server.get_global::<TracingConfig>().unwrap();
        assert_eq!(config.format, TracingFormat::Compact);
    }
}
