//! Client configuration management

use anyhow::{Context, Result, anyhow};
use protocol::{DEFAULT_MODULE_DIR, DEFAULT_PERSIST_DIR, ModulePaths};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Number of host rows materialized per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Where the host list is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostSource {
    /// Read a local file (defaults to the module's webroot copy)
    #[default]
    File,
    /// Fetch over HTTP(S)
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub module: ModuleSettings,
    #[serde(default)]
    pub hosts: HostsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    pub log_level: String,
    /// Log file used while the TUI owns the terminal
    ///
    /// If None, uses `<data dir>/bindhosts/bindhosts-tui.log`
    #[serde(default)]
    pub log_file: Option<String>,
    /// TOML file with translated strings
    #[serde(default)]
    pub language_file: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            language_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSettings {
    pub module_dir: String,
    pub persist_dir: String,
    /// Command prefix used to run backend commands, e.g. `su -c`
    pub shell: String,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            module_dir: DEFAULT_MODULE_DIR.to_string(),
            persist_dir: DEFAULT_PERSIST_DIR.to_string(),
            shell: "su -c".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostsSettings {
    #[serde(default)]
    pub source: HostSource,
    /// File path for `source = "file"`; defaults to `<module_dir>/webroot/hosts.txt`
    #[serde(default)]
    pub path: Option<String>,
    /// URL for `source = "http"`
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for HostsSettings {
    fn default() -> Self {
        Self {
            source: HostSource::File,
            path: None,
            url: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from(DEFAULT_PERSIST_DIR).join("client.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: ClientConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        tracing::debug!(
            "Config: module_dir={}, source={:?}, page_size={}",
            config.module.module_dir,
            config.hosts.source,
            config.hosts.page_size
        );
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                // Print to stderr since logging might not be initialized yet
                eprintln!("Config: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("bindhosts").join("client.toml")
        } else {
            PathBuf::from(".config/bindhosts/client.toml")
        }
    }

    /// Module and persist directories for backend commands
    pub fn module_paths(&self) -> ModulePaths {
        ModulePaths {
            module_dir: expand(&self.module.module_dir),
            persist_dir: expand(&self.module.persist_dir),
        }
    }

    /// File the host list is read from when `source = "file"`
    pub fn hosts_path(&self) -> PathBuf {
        match &self.hosts.path {
            Some(path) => PathBuf::from(expand(path)),
            None => PathBuf::from(self.module_paths().hosts_file()),
        }
    }

    /// Resolved log file path
    pub fn log_file(&self) -> PathBuf {
        match &self.client.log_file {
            Some(path) => PathBuf::from(expand(path)),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join("bindhosts")
                .join("bindhosts-tui.log"),
        }
    }

    /// Resolved language file path, if any
    pub fn language_file(&self) -> Option<PathBuf> {
        self.client
            .language_file
            .as_deref()
            .map(|path| PathBuf::from(expand(path)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.client.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.client.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.hosts.page_size == 0 {
            return Err(anyhow!("hosts.page_size must be greater than zero"));
        }

        if self.module.shell.split_whitespace().next().is_none() {
            return Err(anyhow!("module.shell must not be empty"));
        }

        if self.hosts.source == HostSource::Http {
            match self.hosts.url.as_deref() {
                Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
                Some(url) => return Err(anyhow!("Invalid hosts.url '{}'", url)),
                None => return Err(anyhow!("hosts.url is required when hosts.source = \"http\"")),
            }
        }

        Ok(())
    }
}

fn expand(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}
