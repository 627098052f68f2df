// src/config.rs
//! Gateway configuration: defaults, JSON config file and environment

use crate::error::{LincotError, Result};
use crate::node::host_node;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Default CoT event type ("marker type")
pub const DEFAULT_COT_TYPE: &str = "a-f-G-E-S";

/// Default CoT stale period in seconds (1 hour)
pub const DEFAULT_COT_STALE: u64 = 3600;

/// Default poll interval in seconds
pub const DEFAULT_POLL_INTERVAL: u64 = 61;

/// Default command to retrieve GPS info
pub const DEFAULT_GPS_INFO_CMD: &str = "gpspipe -w -n 5";

/// Default destination, the TAK situational awareness multicast group
pub const DEFAULT_COT_URL: &str = "udp://239.2.3.1:6969";

/// Prefix for generated callsigns and event UIDs
pub const UID_PREFIX: &str = "LINCOT";

/// Configuration as read from file and environment.
///
/// Every option is optional; accessors apply the defaults. Empty strings
/// count as unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct LincotConfig {
    pub cot_url: Option<String>,
    pub cot_type: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub cot_stale: Option<u64>,
    pub callsign: Option<String>,
    pub cot_host_id: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub poll_interval: Option<u64>,
    pub gps_info_cmd: Option<String>,
}

impl LincotConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicitly given file must exist; a missing default file just
    /// yields an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::get_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        Self::load_from_file(&config_path)
    }

    fn load_from_file(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            LincotError::Config(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            LincotError::Config(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Default config file path, `$HOME/.config/lincot/config.json`
    pub fn get_config_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".config").join("lincot").join("config.json"))
    }

    /// Override options from environment variables of the same name
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strings = [
            ("COT_URL", &mut self.cot_url),
            ("COT_TYPE", &mut self.cot_type),
            ("CALLSIGN", &mut self.callsign),
            ("COT_HOST_ID", &mut self.cot_host_id),
            ("GPS_INFO_CMD", &mut self.gps_info_cmd),
        ];
        for (key, field) in strings {
            if let Some(value) = lookup(key) {
                *field = Some(value);
            }
        }

        let numbers = [
            ("COT_STALE", &mut self.cot_stale),
            ("POLL_INTERVAL", &mut self.poll_interval),
        ];
        for (key, field) in numbers {
            if let Some(value) = lookup(key) {
                *field = parse_seconds(key, &value)?;
            }
        }

        Ok(())
    }

    /// Take every option that is set in `other`, e.g. command line flags
    pub fn apply_overrides(&mut self, other: &LincotConfig) {
        let strings = [
            (&other.cot_url, &mut self.cot_url),
            (&other.cot_type, &mut self.cot_type),
            (&other.callsign, &mut self.callsign),
            (&other.cot_host_id, &mut self.cot_host_id),
            (&other.gps_info_cmd, &mut self.gps_info_cmd),
        ];
        for (value, field) in strings {
            if value.is_some() {
                field.clone_from(value);
            }
        }

        if other.cot_stale.is_some() {
            self.cot_stale = other.cot_stale;
        }
        if other.poll_interval.is_some() {
            self.poll_interval = other.poll_interval;
        }
    }

    pub fn cot_url(&self) -> &str {
        non_empty(&self.cot_url).unwrap_or(DEFAULT_COT_URL)
    }

    pub fn cot_type(&self) -> &str {
        non_empty(&self.cot_type).unwrap_or(DEFAULT_COT_TYPE)
    }

    /// Stale horizon in seconds; zero falls back to the default
    pub fn cot_stale(&self) -> u64 {
        self.cot_stale.filter(|s| *s != 0).unwrap_or(DEFAULT_COT_STALE)
    }

    /// Configured callsign, or one derived from the host identifier
    pub fn callsign(&self) -> String {
        match non_empty(&self.callsign) {
            Some(callsign) => callsign.to_string(),
            None => format!("{}-{}", UID_PREFIX, host_node()),
        }
    }

    pub fn cot_host_id(&self) -> &str {
        self.cot_host_id.as_deref().unwrap_or("")
    }

    /// Poll interval in seconds. An explicit zero is honoured.
    pub fn poll_interval(&self) -> u64 {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn gps_info_cmd(&self) -> &str {
        non_empty(&self.gps_info_cmd).unwrap_or(DEFAULT_GPS_INFO_CMD)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_seconds(key: &str, value: &str) -> Result<Option<u64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<u64>()
        .map(Some)
        .map_err(|e| LincotError::Config(format!("Invalid {} '{}': {}", key, value, e)))
}

/// Accept `3600` as well as `"3600"`, since INI-style tooling writes
/// every value as a string
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(n)) => Ok(Some(n)),
        Some(Seconds::Text(s)) => {
            parse_seconds("value", &s).map_err(serde::de::Error::custom)
        }
    }
}
