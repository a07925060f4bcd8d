use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_DATABASE_PATH, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_REVALUATION_SECS,
};
use crate::errors::Error;

/// The interchangeable backing stores a coordinator can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    InMemoryFixture,
    DirectStore,
    RemoteService,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::InMemoryFixture => "in-memory fixture",
            SourceKind::DirectStore => "direct store",
            SourceKind::RemoteService => "remote service",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "sqlite" | "database" => Ok(SourceKind::DirectStore),
            "remote" | "api" | "http" => Ok(SourceKind::RemoteService),
            "fixture" | "offline" | "memory" => Ok(SourceKind::InMemoryFixture),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown data source '{}'",
                other
            ))),
        }
    }
}

/// Startup configuration for the data source layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSettings {
    /// Skip the preferred store entirely and serve fixture data.
    pub offline_mode: bool,
    /// Store to try first when not in offline mode.
    pub preferred: SourceKind,
    /// SQLite file used by the direct store.
    pub database_path: String,
    /// Collection URL of the remote vehicles API.
    pub api_base_url: String,
    /// Upper bound for a single store call.
    pub request_timeout: Duration,
    /// Period of the background revaluation task.
    pub revaluation_period: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            offline_mode: false,
            preferred: SourceKind::DirectStore,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            revaluation_period: Duration::from_secs(DEFAULT_REVALUATION_SECS),
        }
    }
}

impl SourceSettings {
    pub fn offline() -> Self {
        Self {
            offline_mode: true,
            preferred: SourceKind::InMemoryFixture,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parses_aliases() {
        assert_eq!("direct".parse::<SourceKind>().unwrap(), SourceKind::DirectStore);
        assert_eq!(" API ".parse::<SourceKind>().unwrap(), SourceKind::RemoteService);
        assert_eq!("offline".parse::<SourceKind>().unwrap(), SourceKind::InMemoryFixture);
        assert!("mysql".parse::<SourceKind>().is_err());
    }
}
