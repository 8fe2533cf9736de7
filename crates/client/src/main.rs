//! bindhosts-tui
//!
//! Terminal front-end for the bindhosts hosts-file module: browse and search
//! the active host list, whitelist blocked entries and flip module settings.

mod config;
mod hosts;
mod i18n;
mod panel;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use common::setup_logging;
use std::path::PathBuf;
use tracing::{info, warn};

use config::{ClientConfig, HostSource};
use i18n::Translations;

#[derive(Parser, Debug)]
#[command(name = "bindhosts-tui")]
#[command(author, version, about = "Terminal front-end for the bindhosts module")]
#[command(long_about = "
Browse, search and whitelist entries of the bindhosts hosts list, and
toggle module settings, from a terminal on the device.

EXAMPLES:
    # Run with default config
    bindhosts-tui

    # Read the host list from the module's web server
    bindhosts-tui --hosts-url http://127.0.0.1:8080/hosts.txt

    # Run with debug logging
    bindhosts-tui --log-level debug

CONFIGURATION:
    The client looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/bindhosts/client.toml
    3. /data/adb/bindhosts/client.toml
    4. Built-in defaults

Logs are written to a file (client.log_file) so they do not disturb the
terminal UI.
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Read the host list over HTTP from this URL
    #[arg(long, value_name = "URL", conflicts_with = "hosts_file")]
    hosts_url: Option<String>,

    /// Read the host list from this file
    #[arg(long, value_name = "PATH")]
    hosts_file: Option<String>,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(level) = &self.log_level {
            config.client.log_level = level.clone();
        }
        if let Some(url) = &self.hosts_url {
            config.hosts.source = HostSource::Http;
            config.hosts.url = Some(url.clone());
        }
        if let Some(path) = &self.hosts_file {
            config.hosts.source = HostSource::File;
            config.hosts.path = Some(path.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = ClientConfig::default();
        let path = ClientConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config {
        ClientConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        ClientConfig::load_or_default()
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // The terminal belongs to the UI, so logs go to a file
    let log_file = config.log_file();
    setup_logging(&config.client.log_level, Some(&log_file))
        .context("Failed to setup logging")?;

    info!("bindhosts-tui v{}", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", config.client.log_level);

    let translations = match Translations::load(config.language_file().as_deref()) {
        Ok(translations) => translations,
        Err(e) => {
            warn!("Falling back to built-in English strings: {:#}", e);
            Translations::english()
        }
    };

    let result = tui::run(&config, translations).await;
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    info!("Client shutting down...");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_url_switches_source() {
        let args = Args::parse_from(["bindhosts-tui", "--hosts-url", "http://127.0.0.1/hosts.txt"]);
        let mut config = ClientConfig::default();
        args.apply(&mut config);
        assert_eq!(config.hosts.source, HostSource::Http);
        assert_eq!(config.hosts.url.as_deref(), Some("http://127.0.0.1/hosts.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hosts_file_and_log_level() {
        let args = Args::parse_from([
            "bindhosts-tui",
            "--hosts-file",
            "/tmp/hosts",
            "-l",
            "debug",
        ]);
        let mut config = ClientConfig::default();
        args.apply(&mut config);
        assert_eq!(config.hosts.source, HostSource::File);
        assert_eq!(config.hosts_path(), PathBuf::from("/tmp/hosts"));
        assert_eq!(config.client.log_level, "debug");
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let args = Args::parse_from(["bindhosts-tui", "--log-level", "loud"]);
        let mut config = ClientConfig::default();
        args.apply(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_flags_conflict() {
        let result = Args::try_parse_from([
            "bindhosts-tui",
            "--hosts-url",
            "http://x/hosts",
            "--hosts-file",
            "/tmp/hosts",
        ]);
        assert!(result.is_err());
    }
}
