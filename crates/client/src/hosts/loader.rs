//! Host list loading
//!
//! Reads the hosts text from a file or over HTTP. When the source is
//! unavailable the module is asked to re-link its hosts file and the load
//! is retried once.

use std::path::PathBuf;

use common::{Backend, Error, Result};
use protocol::{BackendCommand, HostEntry, parse_hosts};
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, HostSource};

/// Where the raw hosts text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsLocation {
    File(PathBuf),
    Http(String),
}

impl HostsLocation {
    pub fn from_config(config: &ClientConfig) -> Self {
        match (config.hosts.source, config.hosts.url.as_ref()) {
            (HostSource::Http, Some(url)) => HostsLocation::Http(url.clone()),
            _ => HostsLocation::File(config.hosts_path()),
        }
    }
}

impl std::fmt::Display for HostsLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostsLocation::File(path) => write!(f, "{}", path.display()),
            HostsLocation::Http(url) => f.write_str(url),
        }
    }
}

/// Fetches and parses the host list
#[derive(Debug, Clone)]
pub struct HostLoader {
    location: HostsLocation,
    backend: Backend,
    http: reqwest::Client,
}

impl HostLoader {
    pub fn new(location: HostsLocation, backend: Backend) -> Self {
        Self {
            location,
            backend,
            http: reqwest::Client::new(),
        }
    }

    pub fn location(&self) -> &HostsLocation {
        &self.location
    }

    /// Read the raw hosts text once
    pub async fn fetch(&self) -> Result<String> {
        match &self.location {
            HostsLocation::File(path) => Ok(tokio::fs::read_to_string(path).await?),
            HostsLocation::Http(url) => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| Error::Http(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Http(format!("HTTP error! Status: {}", status)));
                }
                response.text().await.map_err(|e| Error::Http(e.to_string()))
            }
        }
    }

    /// Load the list, re-linking the hosts file and retrying once on failure
    pub async fn load(&self) -> Result<Vec<HostEntry>> {
        match self.fetch().await {
            Ok(text) => Ok(self.parse(&text)),
            Err(e) => {
                warn!("Failed to read hosts from {}: {}", self.location, e);
                info!("Linking hosts file and retrying");
                self.backend.run(&BackendCommand::LinkHosts).await?;
                let text = self.fetch().await?;
                Ok(self.parse(&text))
            }
        }
    }

    fn parse(&self, text: &str) -> Vec<HostEntry> {
        let entries = parse_hosts(text);
        debug!("Parsed {} host entries from {}", entries.len(), self.location);
        entries
    }
}
