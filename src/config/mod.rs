use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::{DEFAULT_HOST, DEFAULT_SHELL, DEFAULT_USER, HOME_DIR};
use crate::terminal::surface::DEFAULT_SCROLLBACK;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
}

/// Local identity of every new session; `exit` returns here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Lines kept per surface before the oldest are dropped
    #[serde(default = "default_scrollback")]
    pub scrollback_lines: usize,

    /// Refuse to close the only remaining session
    #[serde(default = "default_true")]
    pub keep_last_session: bool,

    /// Enable tab keybindings (new/close/next/prev)
    #[serde(default = "default_true")]
    pub enable_tabs: bool,
}

/// Hex colours for each kind of styled segment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub foreground: String,
    pub background: String,
    pub user: String,
    pub host: String,
    pub path: String,
    pub accent: String,
    pub success: String,
    pub error: String,
    pub banner: String,
    pub tab_active: String,
    pub tab_inactive: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub new_tab: String,
    pub close_tab: String,
    pub next_tab: String,
    pub prev_tab: String,
    pub rename_tab: String,
    pub clear: String,
}

// Default value functions
fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

fn default_working_dir() -> String {
    HOME_DIR.to_string()
}

fn default_scrollback() -> usize {
    DEFAULT_SCROLLBACK
}

fn default_true() -> bool {
    true
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            host: default_host(),
            shell: default_shell(),
            working_dir: default_working_dir(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: DEFAULT_SCROLLBACK,
            keep_last_session: true,
            enable_tabs: true,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            foreground: "#F8FAFC".to_string(),
            background: "#0A0F1C".to_string(),
            user: "#10B981".to_string(),
            host: "#3B82F6".to_string(),
            path: "#F59E0B".to_string(),
            accent: "#FBBF24".to_string(),
            success: "#34D399".to_string(),
            error: "#EF4444".to_string(),
            banner: "#10B981".to_string(),
            tab_active: "#B8860B".to_string(),
            tab_inactive: "#94A3B8".to_string(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            new_tab: "Ctrl+T".to_string(),
            close_tab: "Ctrl+W".to_string(),
            next_tab: "Alt+Right".to_string(),
            prev_tab: "Alt+Left".to_string(),
            rename_tab: "F2".to_string(),
            clear: "Ctrl+L".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from default location
    ///
    /// # Errors
    /// Returns an error if the home directory is unknown or an existing file is invalid
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid YAML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path.as_ref(), contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get default configuration path
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home.join(".valtorix").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_environment() {
        let config = Config::default();
        assert_eq!(config.environment.user, "pasante");
        assert_eq!(config.environment.host, "soc-valtorix");
        assert_eq!(config.environment.shell, "bash");
        assert_eq!(config.environment.working_dir, "~");
        assert!(config.terminal.keep_last_session);
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
environment:
  user: trainee
terminal:
  keep_last_session: false
keybindings:
  new_tab: "Ctrl+N"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.environment.user, "trainee");
        assert_eq!(config.environment.host, "soc-valtorix");
        assert!(!config.terminal.keep_last_session);
        assert_eq!(config.terminal.scrollback_lines, 1000);
        assert_eq!(config.keybindings.new_tab, "Ctrl+N");
        assert_eq!(config.keybindings.close_tab, "Ctrl+W");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.theme.error, "#EF4444");
        assert!(config.terminal.enable_tabs);
    }
}
