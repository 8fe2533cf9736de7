//! Translation lookup
//!
//! Strings are addressed by dotted keys (`query.remove_prompt`). The English
//! table is compiled in; a TOML language file can override any subset of it.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const ENGLISH: &str = include_str!("../locales/en.toml");

/// Flat table of dotted keys to strings
#[derive(Debug, Clone, Default)]
pub struct Translations {
    strings: HashMap<String, String>,
}

impl Translations {
    /// The built-in English table
    pub fn english() -> Self {
        let mut translations = Self::default();
        if let Err(e) = translations.merge_str(ENGLISH) {
            warn!("Built-in translations are invalid: {:#}", e);
        }
        translations
    }

    /// English, overridden by `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut translations = Self::english();
        if let Some(path) = path {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read language file: {}", path.display()))?;
            translations
                .merge_str(&content)
                .with_context(|| format!("Failed to parse language file: {}", path.display()))?;
            debug!("Loaded language file: {}", path.display());
        }
        Ok(translations)
    }

    /// Merge a TOML document, later values win
    pub fn merge_str(&mut self, content: &str) -> Result<()> {
        let table: toml::Table = toml::from_str(content)?;
        flatten("", &table, &mut self.strings);
        Ok(())
    }

    /// Look up `key`, falling back to the key itself
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Look up `key` and substitute `arg` for `{}`
    ///
    /// Without a placeholder the argument is appended after a space.
    pub fn format(&self, key: &str, arg: &str) -> String {
        let template = self.get(key);
        if template.contains("{}") {
            template.replacen("{}", arg, 1)
        } else if arg.is_empty() {
            template.to_string()
        } else {
            format!("{} {}", template, arg)
        }
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::String(s) => {
                out.insert(path, s.clone());
            }
            toml::Value::Table(inner) => flatten(&path, inner, out),
            other => {
                out.insert(path, other.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_table_has_prompts() {
        let t = Translations::english();
        assert_eq!(t.get("global.reboot"), "Reboot to take effect");
        assert_eq!(t.get("control_panel.cron_true"), "Cron job enabled");
        assert_ne!(t.get("query.remove_error"), "query.remove_error");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let t = Translations::english();
        assert_eq!(t.get("no.such.key"), "no.such.key");
        assert_eq!(t.format("no.such.key", "a.com"), "no.such.key a.com");
    }

    #[test]
    fn test_placeholder_substitution() {
        let mut t = Translations::english();
        t.merge_str("[query]\nremove_prompt = \"{} whitelisted\"\n").unwrap();
        assert_eq!(
            t.format("query.remove_prompt", "a.com b.com"),
            "a.com b.com whitelisted"
        );
        assert_eq!(t.format("query.remove_error", "a.com"), "Failed to remove: a.com");
        assert_eq!(t.format("global.reboot", ""), "Reboot to take effect");
    }

    #[test]
    fn test_language_file_overrides_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.toml");
        fs::write(&path, "[global]\nreboot = \"Redémarrer\"\n").unwrap();

        let t = Translations::load(Some(&path)).unwrap();
        assert_eq!(t.get("global.reboot"), "Redémarrer");
        assert_eq!(t.get("global.dev_opt"), "Developer option enabled");
    }

    #[test]
    fn test_invalid_language_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(Translations::load(Some(&path)).is_err());
        assert!(Translations::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
