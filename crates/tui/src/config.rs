use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted client state: the server to talk to, a display hint for the
/// credential (never the credential itself), and an optional query to
/// prefill when the next session loads.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub credential_hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
        }
    }
}

// ── File I/O ────────────────────────────────────────────────────────────

pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("ledgerchat"))
}

/// Load config from `~/.config/ledgerchat/config.toml`. A missing or
/// unparsable file yields defaults; `LEDGERCHAT_SERVER_URL` overrides the
/// server URL either way.
pub fn load() -> Config {
    let mut config = config_dir()
        .map(|dir| load_from(&dir.join("config.toml")))
        .unwrap_or_default();
    if let Ok(url) = std::env::var("LEDGERCHAT_SERVER_URL") {
        if !url.trim().is_empty() {
            config.server.url = url.trim().to_string();
        }
    }
    config
}

pub fn load_from(path: &Path) -> Config {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| toml::from_str(&s).ok())
        .unwrap_or_default()
}

/// Save config to `~/.config/ledgerchat/config.toml`.
pub fn save(config: &Config) -> Result<()> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    save_to(config, &dir.join("config.toml"))
}

pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ── Credential hint ─────────────────────────────────────────────────────

/// Derive the display hint stored in place of the credential:
/// first three and last four characters, elided in the middle.
pub fn credential_hint(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let config = Config::default();
        assert_eq!(config.server.url, "http://localhost:8000");
        assert!(config.credential_hint.is_empty());
        assert!(config.suggested_query.is_none());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.url = "http://10.0.0.5:9000".to_string();
        config.credential_hint = "sk-...abcd".to_string();
        config.suggested_query = Some("How much did I spend on bank fees?".to_string());

        save_to(&config, &path).unwrap();
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(&dir.path().join("nope.toml")), Config::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "not { valid = toml").unwrap();
        assert_eq!(load_from(&bad), Config::default());
    }

    #[test]
    fn credential_hint_elides_the_middle() {
        assert_eq!(credential_hint("sk-proj-1234567890wxyz"), "sk-...wxyz");
    }

    #[test]
    fn credential_hint_never_echoes_short_keys() {
        assert_eq!(credential_hint("short"), "***");
        assert_eq!(credential_hint(""), "***");
    }
}
