//! Output markers of the backend scripts
//!
//! The bindhosts scripts report results as free text with bracketed markers:
//!
//! - `[+]` the operation succeeded
//! - `[x]` the operation was refused or failed (`[x] Failed to download`
//!   is reported separately by the app installer)
//! - `[*]` the operation started but did not complete
//!
//! Markers are matched as substrings of each output line, exactly as the
//! scripts print them. Output is scanned once here; callers only ever see
//! [`Outcome`] values.

/// Marker for a successful step
pub const SUCCESS_MARKER: &str = "[+]";
/// Marker for a failed step
pub const FAILURE_MARKER: &str = "[x]";
/// Marker for an incomplete step
pub const INCOMPLETE_MARKER: &str = "[*]";
/// Installer line reporting a failed download
pub const DOWNLOAD_FAILED_LINE: &str = "[x] Failed to download";

/// Why a marked step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// `[x]` lines in general
    Rejected,
    /// `[x] Failed to download`
    DownloadFailed,
    /// `[*]` lines
    Incomplete,
}

/// Result of one marked output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureKind),
}

impl Outcome {
    /// Classify a single output line, `None` when it carries no marker
    pub fn from_line(line: &str) -> Option<Self> {
        if line.contains(SUCCESS_MARKER) {
            Some(Outcome::Success)
        } else if line.contains(DOWNLOAD_FAILED_LINE) {
            Some(Outcome::Failure(FailureKind::DownloadFailed))
        } else if line.contains(FAILURE_MARKER) {
            Some(Outcome::Failure(FailureKind::Rejected))
        } else if line.contains(INCOMPLETE_MARKER) {
            Some(Outcome::Failure(FailureKind::Incomplete))
        } else {
            None
        }
    }

    /// Scan a whole command output, one outcome per marked line, in order
    pub fn scan(output: &str) -> Vec<Self> {
        output.lines().filter_map(Self::from_line).collect()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line() {
        assert_eq!(Outcome::from_line("[+] cron enabled"), Some(Outcome::Success));
        assert_eq!(
            Outcome::from_line("[x] cron disabled"),
            Some(Outcome::Failure(FailureKind::Rejected))
        );
        assert_eq!(
            Outcome::from_line("[x] Failed to download app"),
            Some(Outcome::Failure(FailureKind::DownloadFailed))
        );
        assert_eq!(
            Outcome::from_line("[*] please install manually"),
            Some(Outcome::Failure(FailureKind::Incomplete))
        );
        assert_eq!(Outcome::from_line("plain text"), None);
    }

    #[test]
    fn test_scan_keeps_order_and_skips_unmarked() {
        let output = "starting\n[+] step one\nnoise\n[x] step two\n";
        assert_eq!(
            Outcome::scan(output),
            vec![Outcome::Success, Outcome::Failure(FailureKind::Rejected)]
        );
        assert!(Outcome::scan("").is_empty());
    }
}
