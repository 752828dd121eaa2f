//! Layered runtime settings.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config <path>`, or `turbidity-watch.toml` if present)
//! 3. environment variables prefixed `TURBIDITY_WATCH_`, with `__` between
//!    section and key (e.g. `TURBIDITY_WATCH_FEED__INTERVAL=2s`)
//!
//! ```toml
//! [feed]
//! interval = "5s"
//! turbidity_jitter = 0.5
//! temperature_jitter = 0.2
//! seed = 42
//!
//! [export]
//! dir = "exports"
//!
//! [uplink]
//! listen_addr = "0.0.0.0:3001"
//! webhook_url = "http://localhost:3001/api/ttn"
//! application_id = "river-quality-tracker"
//! interval = "10s"
//!
//! [logging]
//! level = "info"
//! file = "turbidity-watch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Deserializer};

use crate::data::duration::parse_duration;
use crate::feed::FeedConfig;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "turbidity-watch.toml";

const ENV_PREFIX: &str = "TURBIDITY_WATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub feed: FeedSettings,
    pub export: ExportSettings,
    pub uplink: UplinkSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSettings {
    #[serde(deserialize_with = "duration_from_str")]
    pub interval: Duration,
    pub turbidity_jitter: f64,
    pub temperature_jitter: f64,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl FeedSettings {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            interval: self.interval,
            turbidity_jitter: self.turbidity_jitter,
            temperature_jitter: self.temperature_jitter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UplinkSettings {
    pub listen_addr: String,
    pub webhook_url: String,
    pub application_id: String,
    /// Delay between simulator rounds with `--repeat`.
    #[serde(deserialize_with = "duration_from_str")]
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Log file used while the TUI owns the terminal.
    pub file: PathBuf,
}

fn duration_from_str<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

impl Settings {
    /// Load settings from defaults, the config file and the process
    /// environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], but reads environment overrides from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config = Config::builder()
            .set_default("feed.interval", "5s")?
            .set_default("feed.turbidity_jitter", 0.5)?
            .set_default("feed.temperature_jitter", 0.2)?
            .set_default("export.dir", ".")?
            .set_default("uplink.listen_addr", "0.0.0.0:3001")?
            .set_default("uplink.webhook_url", "http://localhost:3001/api/ttn")?
            .set_default("uplink.application_id", crate::uplink::DEFAULT_APPLICATION_ID)?
            .set_default("uplink.interval", "10s")?
            .set_default("logging.level", "info")?
            .set_default("logging.file", "turbidity-watch.log")?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed: FeedSettings {
                interval: Duration::from_secs(5),
                turbidity_jitter: 0.5,
                temperature_jitter: 0.2,
                seed: None,
            },
            export: ExportSettings {
                dir: PathBuf::from("."),
            },
            uplink: UplinkSettings {
                listen_addr: "0.0.0.0:3001".to_string(),
                webhook_url: "http://localhost:3001/api/ttn".to_string(),
                application_id: crate::uplink::DEFAULT_APPLICATION_ID.to_string(),
                interval: Duration::from_secs(10),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                file: PathBuf::from("turbidity-watch.log"),
            },
        }
    }
}
