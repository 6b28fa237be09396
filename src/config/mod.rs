use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_STAT_BASE_URL: &str = "https://pfa.wxd.vaisala.com/stat.php";
pub const DEFAULT_STAT_KEY: &str = "gUCUN8klV1IFTvce";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub stat_base_url: String,
    pub stat_key: String,
    pub http_timeout_secs: u64,
    pub fetch_concurrency: usize,
    pub max_range_months: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "::".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            stat_base_url: DEFAULT_STAT_BASE_URL.into(),
            stat_key: DEFAULT_STAT_KEY.into(),
            http_timeout_secs: 30,
            fetch_concurrency: 8,
            max_range_months: 240,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        Ok(Config {
            server_host: string("SERVER_HOST", defaults.server_host),
            server_port: parsed(&lookup, "SERVER_PORT", defaults.server_port)?,
            api_base_uri: string("API_BASE_URI", defaults.api_base_uri),
            stat_base_url: string("STAT_BASE_URL", defaults.stat_base_url),
            stat_key: string("STAT_KEY", defaults.stat_key),
            http_timeout_secs: parsed(&lookup, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            fetch_concurrency: parsed(&lookup, "FETCH_CONCURRENCY", defaults.fetch_concurrency)?,
            max_range_months: parsed(&lookup, "MAX_RANGE_MONTHS", defaults.max_range_months)?,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.api_base_uri, "/api");
        assert_eq!(config.stat_base_url, DEFAULT_STAT_BASE_URL);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "8080"),
            ("FETCH_CONCURRENCY", " 4 "),
            ("STAT_BASE_URL", "http://localhost:9000/stat.php"),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.fetch_concurrency, 4);
        assert_eq!(config.stat_base_url, "http://localhost:9000/stat.php");
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HTTP_TIMEOUT_SECS", .. }));
    }
}
