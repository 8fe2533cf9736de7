//! Protocol library for bindhosts-tui
//!
//! This crate defines the text formats shared with the bindhosts module:
//! the hosts-file line syntax, the shell commands its scripts accept, and the
//! `[+]`/`[x]`/`[*]` markers they print.
//!
//! # Example
//!
//! ```
//! use protocol::{BackendCommand, HostTag, ModulePaths, Outcome, parse_hosts};
//!
//! let entries = parse_hosts("0.0.0.0 ads.example.com\n127.0.0.1 custom.local\n");
//! assert_eq!(entries[0].tag(), HostTag::Block);
//! assert_eq!(entries[1].tag(), HostTag::Custom);
//!
//! let cmd = BackendCommand::Whitelist(entries[0].domains().to_vec());
//! assert!(cmd.to_shell(&ModulePaths::default()).ends_with("--whitelist ads.example.com"));
//!
//! assert_eq!(Outcome::scan("[+] done"), vec![Outcome::Success]);
//! ```

pub mod commands;
pub mod error;
pub mod hosts;
pub mod markers;

pub use commands::{
    BackendCommand, COMPANION_APP_PACKAGE, DEFAULT_MODULE_DIR, DEFAULT_PERSIST_DIR, ModeOverride,
    ModulePaths, shell_quote,
};
pub use error::ProtocolError;
pub use hosts::{BLOCK_ADDRESS, HostEntry, HostTag, parse_hosts, serialize_hosts};
pub use markers::{FailureKind, Outcome};
