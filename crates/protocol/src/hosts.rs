//! Hosts-file line syntax
//!
//! A hosts file is a sequence of `<address> <domain>[ <domain>...]` lines.
//! Blank lines and lines starting with `#` are ignored, as are lines that do
//! not carry at least one domain after the address.

use std::fmt;

/// Null-route address used by the module for blocked domains
pub const BLOCK_ADDRESS: &str = "0.0.0.0";

/// Classification of a host entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostTag {
    /// Null-routed entry written by the blocklist
    Block,
    /// Anything else (user redirects, localhost aliases)
    Custom,
}

impl HostTag {
    /// Classify an address
    pub fn for_address(address: &str) -> Self {
        if address == BLOCK_ADDRESS {
            HostTag::Block
        } else {
            HostTag::Custom
        }
    }

    /// Short lowercase name, as shown in the list
    pub fn as_str(&self) -> &'static str {
        match self {
            HostTag::Block => "block",
            HostTag::Custom => "custom",
        }
    }
}

impl fmt::Display for HostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One address-to-domains mapping
///
/// Entries are immutable once parsed; the list only ever drops them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    address: String,
    domains: Vec<String>,
}

impl HostEntry {
    /// Build an entry, returning `None` when no domain is given
    pub fn new(address: impl Into<String>, domains: Vec<String>) -> Option<Self> {
        if domains.is_empty() {
            return None;
        }
        Some(Self {
            address: address.into(),
            domains,
        })
    }

    /// Parse a single hosts line
    ///
    /// Returns `None` for blank lines, comments and lines with fewer than two
    /// whitespace-separated tokens.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut tokens = trimmed.split_whitespace();
        let address = tokens.next()?;
        let domains: Vec<String> = tokens.map(str::to_string).collect();
        Self::new(address, domains)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Domains joined by a single space
    pub fn domains_text(&self) -> String {
        self.domains.join(" ")
    }

    pub fn tag(&self) -> HostTag {
        HostTag::for_address(&self.address)
    }

    /// Whether the entry may be whitelisted from the list view
    pub fn is_removable(&self) -> bool {
        self.tag() != HostTag::Custom
    }

    /// Case-insensitive substring match on the address or any domain
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.address.to_lowercase().contains(needle)
            || self
                .domains
                .iter()
                .any(|domain| domain.to_lowercase().contains(needle))
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.domains_text())
    }
}

/// Parse hosts-file text into entries, in file order
pub fn parse_hosts(text: &str) -> Vec<HostEntry> {
    text.lines().filter_map(HostEntry::parse_line).collect()
}

/// Serialize entries back to hosts-file text, one line per entry
pub fn serialize_hosts(entries: &[HostEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_block_and_custom() {
        let block = HostEntry::parse_line("0.0.0.0 ads.example.com").unwrap();
        assert_eq!(block.address(), "0.0.0.0");
        assert_eq!(block.domains(), ["ads.example.com"]);
        assert_eq!(block.tag(), HostTag::Block);
        assert!(block.is_removable());

        let custom = HostEntry::parse_line("127.0.0.1 custom.local extra.local").unwrap();
        assert_eq!(custom.tag(), HostTag::Custom);
        assert_eq!(custom.domains_text(), "custom.local extra.local");
        assert!(!custom.is_removable());
    }

    #[test]
    fn test_parse_line_rejects_noise() {
        assert!(HostEntry::parse_line("").is_none());
        assert!(HostEntry::parse_line("   ").is_none());
        assert!(HostEntry::parse_line("# comment").is_none());
        assert!(HostEntry::parse_line("   # indented comment").is_none());
        assert!(HostEntry::parse_line("0.0.0.0").is_none());
    }

    #[test]
    fn test_parse_line_collapses_whitespace() {
        let entry = HostEntry::parse_line("  0.0.0.0\t a.com   b.com  ").unwrap();
        assert_eq!(entry.domains(), ["a.com", "b.com"]);
        assert_eq!(entry.to_string(), "0.0.0.0 a.com b.com");
    }

    #[test]
    fn test_new_requires_domain() {
        assert!(HostEntry::new("0.0.0.0", Vec::new()).is_none());
    }

    #[test]
    fn test_matches_is_case_insensitive_on_entry() {
        let entry = HostEntry::parse_line("0.0.0.0 Tracker.Example.COM").unwrap();
        assert!(entry.matches("tracker"));
        assert!(entry.matches("example.com"));
        assert!(entry.matches("0.0.0"));
        assert!(!entry.matches("ads"));
    }

    #[test]
    fn test_parse_hosts_keeps_order() {
        let text = "# header\n\n0.0.0.0 a.com\n127.0.0.1 localhost\n0.0.0.0 b.com c.com\n";
        let entries = parse_hosts(text);
        let addresses: Vec<&str> = entries.iter().map(|e| e.address()).collect();
        assert_eq!(addresses, ["0.0.0.0", "127.0.0.1", "0.0.0.0"]);
    }
}
