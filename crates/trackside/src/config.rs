//! Configuration management for the Trackside controller.
//!
//! This module handles loading and validation of the controller
//! configuration from TOML files.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use trackside_events::{ChatStyle, Group, PLAYER_MUTE};

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    /// Chat colors and decorations
    #[serde(default)]
    pub chat: ChatStyle,
    #[serde(default)]
    pub mode: ModeSettingsConfig,
    /// Player groups, matched by name when players join
    #[serde(default)]
    pub groups: Vec<GroupSettings>,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Name shown in the startup log
    pub name: String,
}

/// Mode script settings the controller starts with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModeSettingsConfig {
    /// `S_PointsLimit` of the running mode; absent for time attack
    #[serde(default)]
    pub points_limit: Option<i64>,
}

/// A player group and the rights its members hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSettings {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub chat_prefix: Option<String>,
    #[serde(default)]
    pub access_rights: Vec<String>,
    /// Members pass every access check
    #[serde(default)]
    pub unrestricted: bool,
    /// Group given to players that join without one
    #[serde(default)]
    pub default: bool,
}

impl GroupSettings {
    pub fn to_group(&self) -> Group {
        Group {
            name: self.name.clone(),
            color: self.color.clone(),
            chat_prefix: self.chat_prefix.clone(),
            access_rights: self.access_rights.iter().cloned().collect(),
            unrestricted: self.unrestricted,
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                name: "Trackside".to_string(),
            },
            chat: ChatStyle::default(),
            mode: ModeSettingsConfig {
                points_limit: Some(100),
            },
            groups: vec![
                GroupSettings {
                    name: "Masteradmin".to_string(),
                    color: Some("f90".to_string()),
                    chat_prefix: Some("".to_string()),
                    access_rights: vec![],
                    unrestricted: true,
                    default: false,
                },
                GroupSettings {
                    name: "Admin".to_string(),
                    color: Some("0f0".to_string()),
                    chat_prefix: Some("".to_string()),
                    access_rights: vec![PLAYER_MUTE.to_string(), "manipulate_points".to_string()],
                    unrestricted: false,
                    default: false,
                },
                GroupSettings {
                    name: "Player".to_string(),
                    color: None,
                    chat_prefix: None,
                    access_rights: vec![],
                    unrestricted: false,
                    default: true,
                },
            ],
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// The group players fall into unless told otherwise.
    pub fn default_group(&self) -> Group {
        self.groups
            .iter()
            .find(|g| g.default)
            .map(GroupSettings::to_group)
            .unwrap_or_default()
    }

    /// Looks up a configured group by name, ignoring case.
    pub fn group(&self, name: &str) -> Option<Group> {
        self.groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
            .map(GroupSettings::to_group)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.name.trim().is_empty() {
            return Err("Server name cannot be empty".to_string());
        }

        for (setting, color) in [
            ("chat.default_color", &self.chat.default_color),
            ("chat.warning_color", &self.chat.warning_color),
            ("chat.info_color", &self.chat.info_color),
        ] {
            if !is_color(color) {
                return Err(format!("Invalid color for {setting}: {color}"));
            }
        }

        let mut names = HashSet::new();
        for group in &self.groups {
            if !names.insert(group.name.to_lowercase()) {
                return Err(format!("Duplicate group: {}", group.name));
            }
            if let Some(color) = group.color.as_deref() {
                if !is_color(color) {
                    return Err(format!("Invalid color for group {}: {color}", group.name));
                }
            }
        }
        if self.groups.iter().filter(|g| g.default).count() > 1 {
            return Err("Only one group can be the default".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

/// Three hex digits, as used after `$` in chat styling.
fn is_color(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};
    use tokio::fs;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_group().name, "Player");
        assert!(config.group("admin").unwrap().access_rights.contains(PLAYER_MUTE));
        assert!(config.group("masteradmin").unwrap().unrestricted);
    }

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trackside.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();

        assert_eq!(config.server.name, "Trackside");
        assert!(path.exists());
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.groups.len(), config.groups.len());
        assert_eq!(reloaded.chat, config.chat);
    }

    #[tokio::test]
    async fn load_from_existing_file() {
        let toml_content = r#"
[server]
name = "Evening Cup"

[chat]
default_color = "ddd"

[mode]
points_limit = 60

[[groups]]
name = "Referee"
color = "f00"
chat_prefix = "REF"
access_rights = ["player_mute"]

[[groups]]
name = "Player"
default = true

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.server.name, "Evening Cup");
        assert_eq!(config.chat.default_color, "ddd");
        assert_eq!(config.chat.warning_color, "f80");
        assert_eq!(config.mode.points_limit, Some(60));
        let referee = config.group("referee").unwrap();
        assert_eq!(referee.prefix(), Some("REF"));
        assert!(referee.access_rights.contains("player_mute"));
        assert_eq!(config.default_group().name, "Player");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[server\nname = ").await.unwrap();

        assert!(AppConfig::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn invalid_colors_are_rejected() {
        let mut config = AppConfig::default();
        config.chat.default_color = "white".to_string();
        assert!(config.validate().unwrap_err().contains("chat.default_color"));

        let mut config = AppConfig::default();
        config.groups[0].color = Some("12".to_string());
        assert!(config.validate().unwrap_err().contains("Masteradmin"));
    }

    #[test]
    fn group_rules() {
        let mut config = AppConfig::default();
        config.groups[0].default = true;
        assert!(config.validate().unwrap_err().contains("default"));

        let mut config = AppConfig::default();
        config.groups[1].name = "masteradmin".to_string();
        assert!(config.validate().unwrap_err().contains("Duplicate group"));
    }

    #[test]
    fn invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));
    }
}
