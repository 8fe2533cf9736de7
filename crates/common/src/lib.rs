//! Common utilities for bindhosts-tui
//!
//! This crate provides the error type, tracing setup and the command channel
//! through which every privileged module operation is executed.

pub mod channel;
pub mod error;
pub mod logging;
pub mod test_utils;

pub use channel::{Backend, CommandChannel, ShellChannel};
pub use error::{Error, Result};
pub use logging::setup_logging;
