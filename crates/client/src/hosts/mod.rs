//! Paginated, searchable host list
//!
//! - [`collection`]: the full list and its filtered view
//! - [`view`]: incremental rendering, selection and pending removals
//! - [`loader`]: file/HTTP source with the link-hosts fallback
//!
//! Removal goes through the module's `--whitelist` command; local state is
//! only touched once the command succeeded.

pub mod collection;
pub mod loader;
pub mod view;

use common::{Backend, Result};
use protocol::BackendCommand;
use tracing::info;

pub use collection::HostCollection;
pub use loader::{HostLoader, HostsLocation};
pub use view::{HostListView, HostRow, ListPhase, LoadTicket};

/// Whitelist `domains` through the module backend
pub async fn whitelist(backend: &Backend, domains: Vec<String>) -> Result<()> {
    backend.run(&BackendCommand::Whitelist(domains.clone())).await?;
    info!("Whitelisted {}", domains.join(" "));
    Ok(())
}
