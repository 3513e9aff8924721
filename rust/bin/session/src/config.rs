//! Client-side context file.
//!
//! Reads/writes `~/.openerp/config.toml`, the same file `openerp login`
//! stores tokens in. An optional `[session]` table configures the monitor.

use std::path::{Path, PathBuf};

use openerp_session::SessionConfig;
use serde::{Deserialize, Serialize};

/// A single context: connection to an openerpd instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "cn-stage").
    pub name: String,

    /// Path to the server-side config file (for local deployments).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub config_path: String,

    /// Server URL (e.g. "http://localhost:8080").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// JWT token (set by `openerp login`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    /// List of configured contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Session monitor settings.
    #[serde(default)]
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Default config file path: ~/.openerp/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    /// Token stored for a context; empty counts as none.
    pub fn token_for(&self, name: &str) -> Option<String> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.token.clone())
            .filter(|t| !t.is_empty())
    }

    /// Clear a context's token. Returns true if a token was removed.
    pub fn clear_token(&mut self, name: &str) -> bool {
        match self.contexts.iter_mut().find(|c| c.name == name) {
            Some(ctx) if !ctx.token.is_empty() => {
                ctx.token.clear();
                true
            }
            _ => false,
        }
    }
}

/// Return the OpenERP config directory (~/.openerp).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".openerp")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientConfig {
        ClientConfig {
            current_context: "stage".to_string(),
            contexts: vec![
                Context {
                    name: "stage".to_string(),
                    config_path: "/etc/openerp/stage.toml".to_string(),
                    server: "http://localhost:8080".to_string(),
                    token: "a.b.c".to_string(),
                },
                Context {
                    name: "prod".to_string(),
                    config_path: String::new(),
                    server: String::new(),
                    token: String::new(),
                },
            ],
            session: SessionConfig::default(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.current_context.is_empty());
        assert!(config.contexts.is_empty());
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_token_for() {
        let config = sample();
        assert_eq!(config.token_for("stage").as_deref(), Some("a.b.c"));
        assert_eq!(config.token_for("prod"), None);
        assert_eq!(config.token_for("missing"), None);
        assert_eq!(config.current().unwrap().name, "stage");
    }

    #[test]
    fn test_clear_token() {
        let mut config = sample();
        assert!(config.clear_token("stage"));
        assert!(!config.clear_token("stage"));
        assert!(!config.clear_token("prod"));
        assert_eq!(config.token_for("stage"), None);
    }

    #[test]
    fn test_roundtrip_with_session_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = sample();
        config.session.check_interval_secs = 30;
        config.save(&path).unwrap();

        let back = ClientConfig::load(&path).unwrap();
        assert_eq!(back.current_context, "stage");
        assert_eq!(back.contexts.len(), 2);
        assert_eq!(back.session.check_interval_secs, 30);
        assert_eq!(back.session.login_path, "/login");
    }

    #[test]
    fn test_load_file_written_by_openerp_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"current-context = "stage"

[[contexts]]
name = "stage"
config_path = "/etc/openerp/stage.toml"
server = "http://localhost:8080"
token = "a.b.c"
"#,
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.token_for("stage").as_deref(), Some("a.b.c"));
        assert_eq!(config.contexts[0].config_path, "/etc/openerp/stage.toml");
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert!(config.contexts.is_empty());
    }
}
