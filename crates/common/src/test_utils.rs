//! Test utilities for bindhosts-tui
//!
//! Provides a scripted [`MockChannel`] and timeout helpers for tests across
//! crates.
//!
//! # Example
//!
//! ```
//! use common::CommandChannel;
//! use common::test_utils::MockChannel;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let channel = MockChannel::new();
//! channel.respond("--link-hosts", "[+] linked\n");
//! let out = channel.exec("sh bindhosts.sh --link-hosts").await.unwrap();
//! assert_eq!(out, "[+] linked\n");
//! assert_eq!(channel.calls().len(), 1);
//! # }
//! ```

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::CommandChannel;
use crate::{Error, Result};

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum Reply {
    Output(String),
    Fail { code: i32, stderr: String },
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    reply: Reply,
    /// Remaining uses, `None` for unlimited
    remaining: Option<usize>,
}

/// Scripted command channel
///
/// Replies are matched by substring against the executed command; the first
/// matching rule with uses left wins. Unmatched commands succeed with empty
/// output. Every command is recorded in order.
#[derive(Debug, Default)]
pub struct MockChannel {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<String>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, needle: &str, reply: Reply, remaining: Option<usize>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push(Rule {
                needle: needle.to_string(),
                reply,
                remaining,
            });
        }
    }

    /// Reply with `output` to every command containing `needle`
    pub fn respond(&self, needle: &str, output: &str) {
        self.push(needle, Reply::Output(output.to_string()), None);
    }

    /// Reply with `output` once to a command containing `needle`
    pub fn respond_once(&self, needle: &str, output: &str) {
        self.push(needle, Reply::Output(output.to_string()), Some(1));
    }

    /// Fail every command containing `needle` with exit code 1
    pub fn fail(&self, needle: &str) {
        self.push(
            needle,
            Reply::Fail {
                code: 1,
                stderr: String::new(),
            },
            None,
        );
    }

    /// Fail the next command containing `needle`
    pub fn fail_once(&self, needle: &str, stderr: &str) {
        self.push(
            needle,
            Reply::Fail {
                code: 1,
                stderr: stderr.to_string(),
            },
            Some(1),
        );
    }

    /// Commands executed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Executed commands containing `needle`
    pub fn calls_matching(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(needle))
            .collect()
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn exec(&self, command: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }

        let reply = {
            let mut rules = self
                .rules
                .lock()
                .map_err(|e| Error::Other(e.to_string()))?;
            let mut found = None;
            for rule in rules.iter_mut() {
                if rule.remaining == Some(0) || !command.contains(&rule.needle) {
                    continue;
                }
                if let Some(n) = rule.remaining.as_mut() {
                    *n -= 1;
                }
                found = Some(rule.reply.clone());
                break;
            }
            found
        };

        match reply {
            None => Ok(String::new()),
            Some(Reply::Output(out)) => Ok(out),
            Some(Reply::Fail { code, stderr }) => Err(Error::Exec {
                command: command.to_string(),
                code: Some(code),
                stderr,
            }),
        }
    }
}

/// Run an async test with a timeout
///
/// # Example
/// ```
/// use common::test_utils::{with_timeout, DEFAULT_TEST_TIMEOUT};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = with_timeout(DEFAULT_TEST_TIMEOUT, async { 42 }).await.unwrap();
/// assert_eq!(value, 42);
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> std::result::Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { duration })
}

/// Error returned when a test times out
#[derive(Debug, Clone)]
pub struct TimeoutError {
    /// Duration that was exceeded
    pub duration: Duration,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Test timed out after {:?}", self.duration)
    }
}

impl std::error::Error for TimeoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_rules_in_order() {
        let channel = MockChannel::new();
        channel.fail_once("--whitelist", "busy");
        channel.respond("--whitelist", "[+] done\n");

        assert!(channel.exec("sh x --whitelist a.com").await.is_err());
        assert_eq!(
            channel.exec("sh x --whitelist a.com").await.unwrap(),
            "[+] done\n"
        );
        assert_eq!(channel.exec("unmatched").await.unwrap(), "");
        assert_eq!(channel.calls_matching("--whitelist").len(), 2);
        assert_eq!(channel.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
        })
        .await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
