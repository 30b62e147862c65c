//! Runtime configuration read from the environment.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub event_channel_capacity: usize,
    /// SQLite file for decks and cards; in-memory storage when unset.
    pub database_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_filter: "info".to_string(),
            event_channel_capacity: 64,
            database_path: None,
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `RUST_LOG`, `EVENT_CHANNEL_CAPACITY` and `DATABASE_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => parse("PORT", value)?,
            None => defaults.port,
        };
        let event_channel_capacity = match lookup("EVENT_CHANNEL_CAPACITY") {
            Some(value) => {
                let capacity: usize = parse("EVENT_CHANNEL_CAPACITY", value.clone())?;
                if capacity == 0 {
                    return Err(ConfigError::Invalid {
                        name: "EVENT_CHANNEL_CAPACITY",
                        value,
                    });
                }
                capacity
            }
            None => defaults.event_channel_capacity,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
            event_channel_capacity,
            database_path: lookup("DATABASE_PATH").filter(|path| !path.trim().is_empty()),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
