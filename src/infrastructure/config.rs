//! Configuration infrastructure
//!
//! Settings are layered, lowest priority first:
//! 1. Built-in defaults (the `defaults` module)
//! 2. Optional TOML file (`MOVIELEAKS_CONFIG`, `./movieleaks.toml`, or the
//!    user config dir)
//! 3. `MOVIELEAKS_*` environment variables (`__` separates nested keys,
//!    e.g. `MOVIELEAKS_LOGGING__LEVEL=debug`)
//! 4. The bare `PORT` variable most hosting platforms set

use anyhow::{ensure, Context, Result};
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "MOVIELEAKS";

/// Explicit config file path
pub const CONFIG_PATH_ENV: &str = "MOVIELEAKS_CONFIG";

/// How poster URLs are chosen for resolved items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PosterStrategy {
    /// Always build the poster from `poster_template`
    #[default]
    Metahub,
    /// Prefer the resolver's own poster, fall back to the template
    Resolver,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listening port
    pub port: u16,

    /// Listing feed endpoint (reddit JSON listing)
    pub feed_url: String,

    /// Metadata resolver catalog base (Cinemeta)
    pub resolver_url: String,

    /// Poster template, `{id}` is replaced by the canonical id
    pub poster_template: String,

    pub poster_strategy: PosterStrategy,

    /// Enable critic score lookups (needs at least one provider key)
    pub score_enrichment: bool,

    /// Primary score provider (OMDb), keyed by canonical id
    pub omdb_api_key: Option<String>,
    pub omdb_url: String,

    /// Secondary score provider (TMDb), keyed by title search
    pub tmdb_api_key: Option<String>,
    pub tmdb_url: String,

    /// Refresh cadence in minutes
    pub refresh_interval_minutes: u64,

    /// First retry delay after a failed cycle, doubled per consecutive failure
    pub failure_retry_seconds: u64,

    /// Only posts younger than this are read; unset means "top `max_items`"
    pub max_age_hours: Option<u64>,

    /// Posts per feed page (`limit` parameter)
    pub feed_page_size: u32,

    /// Hard cap on feed pages per cycle
    pub max_pages: u32,

    /// Item cap used when no age cutoff is configured
    pub max_items: usize,

    /// Items per catalog response page
    pub catalog_page_size: usize,

    /// Client identifier sent with every upstream request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Delay between successive upstream calls in a loop
    pub request_delay_ms: u64,

    /// Random extra delay added on top of `request_delay_ms`
    pub request_jitter_ms: u64,

    /// Ceiling on outbound requests per second (0 disables the limiter)
    pub max_requests_per_second: u32,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            feed_url: defaults::FEED_URL.to_string(),
            resolver_url: defaults::RESOLVER_URL.to_string(),
            poster_template: defaults::POSTER_TEMPLATE.to_string(),
            poster_strategy: PosterStrategy::default(),
            score_enrichment: defaults::SCORE_ENRICHMENT,
            omdb_api_key: None,
            omdb_url: defaults::OMDB_URL.to_string(),
            tmdb_api_key: None,
            tmdb_url: defaults::TMDB_URL.to_string(),
            refresh_interval_minutes: defaults::REFRESH_INTERVAL_MINUTES,
            failure_retry_seconds: defaults::FAILURE_RETRY_SECONDS,
            max_age_hours: None,
            feed_page_size: defaults::FEED_PAGE_SIZE,
            max_pages: defaults::MAX_PAGES,
            max_items: defaults::MAX_ITEMS,
            catalog_page_size: defaults::CATALOG_PAGE_SIZE,
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            request_jitter_ms: defaults::REQUEST_JITTER_MS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the default file locations and the process environment.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let mut builder = Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                builder = builder.add_source(File::with_name("movieleaks").required(false));
                if let Some(dir) = dirs::config_dir() {
                    builder = builder.add_source(
                        File::from(dir.join("movieleaks-catalog").join("config.toml")).required(false),
                    );
                }
            }
        }

        let builder = builder
            .add_source(Self::environment())
            .set_override_option("port", std::env::var("PORT").ok())
            .context("Failed to apply PORT override")?;

        Self::from_builder(builder)
    }

    /// Load from a single file with no environment layering.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let builder = Config::builder().add_source(File::from(path).required(true));
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        Ok(config.normalized())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Empty API keys from the environment mean "not configured"
    fn normalized(mut self) -> Self {
        self.omdb_api_key = self.omdb_api_key.filter(|key| !key.trim().is_empty());
        self.tmdb_api_key = self.tmdb_api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(self.refresh_interval_minutes > 0, "refresh_interval_minutes must be greater than 0");
        ensure!(self.feed_page_size > 0, "feed_page_size must be greater than 0");
        ensure!(self.max_pages > 0, "max_pages must be greater than 0");
        ensure!(self.max_items > 0, "max_items must be greater than 0");
        ensure!(self.catalog_page_size > 0, "catalog_page_size must be greater than 0");
        ensure!(self.request_timeout_seconds > 0, "request_timeout_seconds must be greater than 0");
        ensure!(
            self.poster_template.contains("{id}"),
            "poster_template must contain an {{id}} placeholder"
        );

        for (name, value) in [
            ("feed_url", &self.feed_url),
            ("resolver_url", &self.resolver_url),
            ("omdb_url", &self.omdb_url),
            ("tmdb_url", &self.tmdb_url),
        ] {
            Url::parse(value).with_context(|| format!("{name} is not a valid URL: {value}"))?;
        }

        Ok(())
    }

    /// Enrichment only runs when enabled and at least one provider has a key
    pub fn enrichment_enabled(&self) -> bool {
        self.score_enrichment && (self.omdb_api_key.is_some() || self.tmdb_api_key.is_some())
    }

    pub fn age_cutoff(&self) -> Option<chrono::Duration> {
        self.max_age_hours
            .and_then(|hours| i64::try_from(hours).ok())
            .map(chrono::Duration::hours)
    }
}

/// Default configuration values
pub mod defaults {
    /// Port the original addon listened on
    pub const PORT: u16 = 7000;

    pub const FEED_URL: &str = "https://www.reddit.com/r/movieleaks/new.json";

    pub const RESOLVER_URL: &str = "https://v3-cinemeta.strem.io/catalog/movie/top";

    pub const POSTER_TEMPLATE: &str = "https://images.metahub.space/poster/medium/{id}/img";

    pub const SCORE_ENRICHMENT: bool = true;

    pub const OMDB_URL: &str = "https://www.omdbapi.com/";

    pub const TMDB_URL: &str = "https://api.themoviedb.org/3";

    pub const REFRESH_INTERVAL_MINUTES: u64 = 15;

    pub const FAILURE_RETRY_SECONDS: u64 = 60;

    /// Reddit caps `limit` at 100
    pub const FEED_PAGE_SIZE: u32 = 100;

    pub const MAX_PAGES: u32 = 10;

    /// "Top 40" posts when no age cutoff is configured
    pub const MAX_ITEMS: usize = 40;

    pub const CATALOG_PAGE_SIZE: usize = 100;

    pub const USER_AGENT: &str = "StremioAddon/3.0";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;

    pub const REQUEST_DELAY_MS: u64 = 150;

    pub const REQUEST_JITTER_MS: u64 = 0;

    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;

    // Logging defaults
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;
}
