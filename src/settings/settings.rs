use crate::util::RetryPolicy;
use anyhow::{Result, anyhow};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub log: Log,
    pub store: Store,
    pub identity: Identity,
    #[serde(default)]
    pub graph: Graph,
    #[serde(default)]
    pub retry: Retry,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory"
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub backend: String, // "memory"
}

#[derive(Debug, Deserialize)]
pub struct Graph {
    pub suggestion_limit: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            suggestion_limit: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Retry {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 1000,
        }
    }
}

impl Retry {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let settings = parse_settings_str(
            r#"
[log]
filter = "debug"

[store]
backend = "memory"

[identity]
backend = "memory"
"#,
        )
        .unwrap();

        assert_eq!(settings.graph.suggestion_limit, 10);
        assert_eq!(settings.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let settings = parse_settings_str(
            r#"
[log]
filter = "info"

[store]
backend = "memory"

[identity]
backend = "memory"

[graph]
suggestion_limit = 3

[retry]
max_retries = 5
delay_ms = 50
"#,
        )
        .unwrap();

        assert_eq!(settings.graph.suggestion_limit, 3);
        assert_eq!(settings.retry.policy().max_retries, 5);
        assert_eq!(settings.retry.policy().delay, Duration::from_millis(50));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
