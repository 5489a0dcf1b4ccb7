use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::lock_file::LockOptions;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Runtime configuration, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub state_path: PathBuf,
    pub poll_interval: Duration,
    pub lock: LockOptions,
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(".coordination/state.json"),
            poll_interval: Duration::from_millis(1000),
            lock: LockOptions::default(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Config {
    /// Reads configuration from process environment variables
    ///
    /// Unset variables fall back to defaults. Call `dotenv::dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            state_path: lookup("COORDINATION_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            poll_interval: parse(&lookup, "COORDINATION_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            lock: LockOptions {
                stale_after: parse(&lookup, "COORDINATION_LOCK_STALE_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.lock.stale_after),
                acquire_timeout: parse(&lookup, "COORDINATION_LOCK_TIMEOUT_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.lock.acquire_timeout),
                retry_interval: parse(&lookup, "COORDINATION_LOCK_RETRY_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.lock.retry_interval),
            },
            bind_addr: parse(&lookup, "BIND_ADDR")?.unwrap_or(defaults.bind_addr),
        })
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("COORDINATION_STATE_PATH", "/var/lib/coord/state.json"),
            ("COORDINATION_POLL_INTERVAL_MS", "250"),
            ("COORDINATION_LOCK_STALE_SECS", "30"),
            ("COORDINATION_LOCK_TIMEOUT_MS", "500"),
            ("COORDINATION_LOCK_RETRY_MS", "5"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.state_path, PathBuf::from("/var/lib/coord/state.json"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.lock.stale_after, Duration::from_secs(30));
        assert_eq!(config.lock.acquire_timeout, Duration::from_millis(500));
        assert_eq!(config.lock.retry_interval, Duration::from_millis(5));
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn garbage_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&[("COORDINATION_POLL_INTERVAL_MS", "soon")]))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "COORDINATION_POLL_INTERVAL_MS".to_string(),
                value: "soon".to_string(),
            }
        );
    }
}
