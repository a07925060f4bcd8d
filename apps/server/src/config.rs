use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use vehiclemanager_core::constants::{
    DEFAULT_API_URL, DEFAULT_DATABASE_PATH, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_REVALUATION_SECS,
};
use vehiclemanager_core::settings::{SourceKind, SourceSettings};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub offline_mode: bool,
    pub source: SourceKind,
    pub db_path: String,
    pub api_url: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub revaluation_period: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("VM_LISTEN_ADDR", "0.0.0.0:8001")
            .parse()
            .context("Invalid VM_LISTEN_ADDR")?;
        let offline_mode = parse_flag(&env_or("VM_OFFLINE_MODE", "false"))
            .context("Invalid VM_OFFLINE_MODE")?;
        let source: SourceKind = env_or("VM_SOURCE", "direct")
            .parse()
            .context("Invalid VM_SOURCE")?;
        let db_path = env_or("VM_DB_PATH", DEFAULT_DATABASE_PATH);
        let api_url = env_or("VM_API_URL", DEFAULT_API_URL);
        let cors_allow = env_or("VM_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("VM_REQUEST_TIMEOUT_MS", &DEFAULT_REQUEST_TIMEOUT_MS.to_string())
            .parse()
            .context("Invalid VM_REQUEST_TIMEOUT_MS")?;
        let revaluation_secs: u64 =
            env_or("VM_REVALUATION_SECS", &DEFAULT_REVALUATION_SECS.to_string())
                .parse()
                .context("Invalid VM_REVALUATION_SECS")?;
        if revaluation_secs == 0 {
            anyhow::bail!("VM_REVALUATION_SECS must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            offline_mode,
            source,
            db_path,
            api_url,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            revaluation_period: Duration::from_secs(revaluation_secs),
        })
    }

    /// Data source settings handed to the coordinator.
    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            offline_mode: self.offline_mode,
            preferred: self.source,
            database_path: self.db_path.clone(),
            api_base_url: self.api_url.clone(),
            request_timeout: self.request_timeout,
            revaluation_period: self.revaluation_period,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
