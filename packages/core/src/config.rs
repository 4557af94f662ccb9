//! Connection and namespace settings for a [`RemoteMap`](crate::RemoteMap).

use serde::{Deserialize, Serialize};

use crate::Error;

/// Where the remote store lives and which namespace a map owns in it.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use remotemap_core::Config;
///
/// let config = Config::from_json(r#"{"port": 6380, "prefix": "jobs"}"#).unwrap();
/// assert_eq!(config.host, "localhost");
/// assert_eq!(config.url(), "redis://localhost:6380/0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Numbered logical database on the server.
    pub database: i64,
    /// Namespace segment prepended to every logical key.
    pub prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "localhost".to_string(),
            port: 6379,
            database: 0,
            prefix: "root".to_string(),
        }
    }
}

impl Config {
    /// Parse from JSON, filling omitted fields with defaults, then validate.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(json).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_database(mut self, database: i64) -> Self {
        self.database = database;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Connection URL for the server, `redis://host:port/database`.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.database)
    }

    /// Check that the prefix can namespace keys unambiguously.
    pub fn validate(&self) -> Result<(), Error> {
        if self.prefix.is_empty() {
            return Err(Error::Config {
                message: "prefix must not be empty".to_string(),
            });
        }
        if self.prefix.contains(crate::map::SEPARATOR) {
            return Err(Error::Config {
                message: format!(
                    "prefix {:?} must not contain the separator {:?}",
                    self.prefix,
                    crate::map::SEPARATOR
                ),
            });
        }
        if self.host.is_empty() {
            return Err(Error::Config {
                message: "host must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
