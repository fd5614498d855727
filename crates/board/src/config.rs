use std::str::FromStr;
use std::time::Duration;

use crate::blocker::BlockerConfig;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Blocker lower limit ({lower_ms} ms) exceeds upper limit ({upper_ms} ms)")]
    BlockerBounds { lower_ms: u64, upper_ms: u64 },
}

/// Runtime configuration for the board and its backend client.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Base URL of the points backend.
    pub api_url: String,
    /// Value sent verbatim in the `Authorization` header.
    pub authorization: String,
    /// Lock indicator timing.
    pub blocker: BlockerConfig,
    /// Buffer size of each signal bus.
    pub signal_capacity: usize,
    /// Per-request timeout for backend calls.
    pub request_timeout: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/big-trip".to_string(),
            authorization: "Basic tripboard".to_string(),
            blocker: BlockerConfig::default(),
            signal_capacity: tripboard_events::bus::DEFAULT_CAPACITY,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BoardConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var                           | Default                            |
    /// |-----------------------------------|------------------------------------|
    /// | `TRIPBOARD_API_URL`               | `http://localhost:8080/big-trip`   |
    /// | `TRIPBOARD_AUTHORIZATION`         | `Basic tripboard`                  |
    /// | `TRIPBOARD_BLOCK_LOWER_MS`        | `350`                              |
    /// | `TRIPBOARD_BLOCK_UPPER_MS`        | `1000`                             |
    /// | `TRIPBOARD_SIGNAL_CAPACITY`       | `256`                              |
    /// | `TRIPBOARD_REQUEST_TIMEOUT_SECS`  | `30`                               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("TRIPBOARD_API_URL").unwrap_or(defaults.api_url);
        let authorization = lookup("TRIPBOARD_AUTHORIZATION").unwrap_or(defaults.authorization);

        let lower_ms: u64 = parse_var(
            &lookup,
            "TRIPBOARD_BLOCK_LOWER_MS",
            "a number of milliseconds",
            defaults.blocker.lower_limit.as_millis() as u64,
        )?;
        let upper_ms: u64 = parse_var(
            &lookup,
            "TRIPBOARD_BLOCK_UPPER_MS",
            "a number of milliseconds",
            defaults.blocker.upper_limit.as_millis() as u64,
        )?;
        if lower_ms > upper_ms {
            return Err(ConfigError::BlockerBounds { lower_ms, upper_ms });
        }

        let signal_capacity: usize = parse_var(
            &lookup,
            "TRIPBOARD_SIGNAL_CAPACITY",
            "a positive integer",
            defaults.signal_capacity,
        )?;
        if signal_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "TRIPBOARD_SIGNAL_CAPACITY",
                expected: "a positive integer",
                value: "0".to_string(),
            });
        }

        let timeout_secs: u64 = parse_var(
            &lookup,
            "TRIPBOARD_REQUEST_TIMEOUT_SECS",
            "a number of seconds",
            defaults.request_timeout.as_secs(),
        )?;

        Ok(Self {
            api_url,
            authorization,
            blocker: BlockerConfig {
                lower_limit: Duration::from_millis(lower_ms),
                upper_limit: Duration::from_millis(upper_ms),
            },
            signal_capacity,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = BoardConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/big-trip");
        assert_eq!(config.blocker, BlockerConfig::default());
        assert_eq!(config.signal_capacity, 256);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = BoardConfig::from_lookup(lookup_from(&[
            ("TRIPBOARD_API_URL", "https://trips.example/api"),
            ("TRIPBOARD_AUTHORIZATION", "Basic abc"),
            ("TRIPBOARD_BLOCK_LOWER_MS", "100"),
            ("TRIPBOARD_BLOCK_UPPER_MS", "200"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://trips.example/api");
        assert_eq!(config.authorization, "Basic abc");
        assert_eq!(config.blocker.lower_limit, Duration::from_millis(100));
        assert_eq!(config.blocker.upper_limit, Duration::from_millis(200));
    }

    #[test]
    fn rejects_malformed_numbers_and_inverted_bounds() {
        assert_matches!(
            BoardConfig::from_lookup(lookup_from(&[("TRIPBOARD_BLOCK_LOWER_MS", "soon")])),
            Err(ConfigError::Invalid { var: "TRIPBOARD_BLOCK_LOWER_MS", .. })
        );
        assert_matches!(
            BoardConfig::from_lookup(lookup_from(&[
                ("TRIPBOARD_BLOCK_LOWER_MS", "900"),
                ("TRIPBOARD_BLOCK_UPPER_MS", "100"),
            ])),
            Err(ConfigError::BlockerBounds { lower_ms: 900, upper_ms: 100 })
        );
        assert_matches!(
            BoardConfig::from_lookup(lookup_from(&[("TRIPBOARD_SIGNAL_CAPACITY", "0")])),
            Err(ConfigError::Invalid { .. })
        );
    }
}
