//! Daemon settings.
//!
//! Settings are layered: built-in defaults, then `purahub.toml` from the
//! working directory when it exists, then `PURAHUB_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const CONFIG_FILE: &str = "purahub.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pura: PuraConfig,
}

/// Where the HTTP API listens.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `purad=debug,tower_http=info`.
    pub filter: String,
}

/// Pura cloud access.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PuraConfig {
    /// Seconds between two device polls.
    pub poll_interval_secs: u64,
    /// JSON file with the account served by the virtual cloud. The built-in
    /// demo account is used when unset.
    pub virtual_devices: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "purad=info,purahub=info,tower_http=debug".into(),
        }
    }
}

impl Default for PuraConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            virtual_devices: None,
        }
    }
}

impl Config {
    /// Resolve the settings the daemon runs with.
    ///
    /// # Errors
    ///
    /// Fails when `purahub.toml` exists but cannot be read or parsed, or
    /// when the merged settings are unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::read(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, falling back to defaults when it does not exist.
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// `PURAHUB_BIND` wins over `PURAHUB_HOST`/`PURAHUB_PORT` and `RUST_LOG`
    /// wins over `PURAHUB_LOG`. Numbers that do not parse are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let number = |key: &str| lookup(key).and_then(|raw| raw.trim().parse::<u64>().ok());

        if let Some(host) = lookup("PURAHUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = number("PURAHUB_PORT").and_then(|n| u16::try_from(n).ok()) {
            self.server.port = port;
        }
        if let Some((host, port)) = lookup("PURAHUB_BIND")
            .as_deref()
            .and_then(|bind| bind.rsplit_once(':'))
            .and_then(|(host, port)| Some((host.to_owned(), port.parse::<u16>().ok()?)))
        {
            self.server.host = host;
            self.server.port = port;
        }
        if let Some(filter) = lookup("RUST_LOG").or_else(|| lookup("PURAHUB_LOG")) {
            self.logging.filter = filter;
        }
        if let Some(secs) = number("PURAHUB_POLL_INTERVAL") {
            self.pura.poll_interval_secs = secs;
        }
        if let Some(path) = lookup("PURAHUB_VIRTUAL_DEVICES") {
            self.pura.virtual_devices = Some(path.into());
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port cannot be 0"));
        }
        if self.pura.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("pura.poll_interval_secs cannot be 0"));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.pura.poll_interval_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
