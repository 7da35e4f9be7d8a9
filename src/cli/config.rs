use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";

/// Saved session state for the terminal client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    pub server_url: String,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            session: None,
        }
    }
}

impl CliConfig {
    /// Token of the stored session, if it has not yet expired
    pub fn active_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|session| session.expires_at > Utc::now())
            .map(|session| session.token.as_str())
    }
}

impl Session {
    pub fn new(username: String, token: String, expires_in: i64) -> Self {
        Self {
            username,
            token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("LEDGER_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("ledger").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_config() -> anyhow::Result<CliConfig> {
    let config_file = get_config_dir()?.join("config.json");

    if !config_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("config.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_file, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_session_has_no_active_token() {
        let mut config = CliConfig::default();
        assert_eq!(config.active_token(), None);

        config.session = Some(Session::new("alice".into(), "abc".into(), 3600));
        assert_eq!(config.active_token(), Some("abc"));

        config.session = Some(Session::new("alice".into(), "abc".into(), -5));
        assert_eq!(config.active_token(), None);
    }

    #[test]
    fn config_file_shape_is_stable() {
        let config = CliConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["server_url"], DEFAULT_SERVER_URL);
        assert!(json["session"].is_null());
    }
}
