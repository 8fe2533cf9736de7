//! Shell commands understood by the bindhosts module
//!
//! Each [`BackendCommand`] renders to the exact shell string the module
//! scripts expect. Paths come from [`ModulePaths`] so that tests and
//! non-standard installs can relocate them.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Default module install directory
pub const DEFAULT_MODULE_DIR: &str = "/data/adb/modules/bindhosts";
/// Default persistent data directory
pub const DEFAULT_PERSIST_DIR: &str = "/data/adb/bindhosts";
/// Package name of the companion app
pub const COMPANION_APP_PACKAGE: &str = "me.itejo443.bindhosts";

/// Directories the backend commands operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePaths {
    /// Module directory (scripts, module.prop, webroot)
    pub module_dir: String,
    /// Persistent directory (overrides, settings, crontabs)
    pub persist_dir: String,
}

impl Default for ModulePaths {
    fn default() -> Self {
        Self {
            module_dir: DEFAULT_MODULE_DIR.to_string(),
            persist_dir: DEFAULT_PERSIST_DIR.to_string(),
        }
    }
}

impl ModulePaths {
    /// Path of the hosts list exported for the front-end
    pub fn hosts_file(&self) -> String {
        format!("{}/webroot/hosts.txt", self.module_dir)
    }

    fn script(&self) -> String {
        format!("{}/bindhosts.sh", self.module_dir)
    }
}

/// Operating mode written to the override file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeOverride(pub u8);

impl ModeOverride {
    /// Extract the mode from the override file content (`mode=<digits>`)
    pub fn from_file_content(content: &str) -> Option<Self> {
        let start = content.find("mode=")? + "mode=".len();
        let digits: String = content[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

impl FromStr for ModeOverride {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProtocolError::InvalidMode(s.to_string()));
        }
        s.parse()
            .map(ModeOverride)
            .map_err(|_| ProtocolError::InvalidMode(s.to_string()))
    }
}

impl fmt::Display for ModeOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command for the module backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Re-create the hosts.txt link in the webroot
    LinkHosts,
    /// Remove domains from the blocklist
    Whitelist(Vec<String>),
    /// Read `operating_mode` from mode.sh
    ReadMode,
    /// Read `version` from module.prop
    ReadVersion,
    /// Read the status line from module.prop's description
    ReadStatus,
    /// Prints `true` when the mode override file exists
    CheckModeOverride,
    /// Print the mode override file
    ReadModeOverride,
    /// Write a mode override
    WriteModeOverride(ModeOverride),
    /// Delete the mode override
    ResetModeOverride,
    /// Succeeds when update checks are enabled
    CheckUpdateJson,
    /// Flip update checks
    ToggleUpdateJson,
    /// Succeeds when the cron job is installed
    CheckCron,
    /// Install the cron job
    EnableCron,
    /// Remove the cron job
    DisableCron,
    /// Prints `true` when running under Magisk
    CheckMagisk,
    /// Succeeds when the action button redirects to the WebUI
    CheckRedirect,
    /// Set the action redirect flag
    SetRedirect(bool),
    /// Prints `false` when the companion app is missing
    CheckCompanionApp,
    /// Download and install the companion app
    InstallCompanionApp,
}

impl BackendCommand {
    /// Render the shell string for this command
    pub fn to_shell(&self, paths: &ModulePaths) -> String {
        let module = &paths.module_dir;
        let persist = &paths.persist_dir;
        match self {
            BackendCommand::LinkHosts => format!("sh {} --link-hosts", paths.script()),
            BackendCommand::Whitelist(domains) => {
                let quoted: Vec<String> = domains.iter().map(|d| shell_quote(d)).collect();
                format!("sh {} --whitelist {}", paths.script(), quoted.join(" "))
            }
            BackendCommand::ReadMode => {
                format!("grep '^operating_mode=' {module}/mode.sh | cut -d'=' -f2")
            }
            BackendCommand::ReadVersion => {
                format!("grep '^version=' {module}/module.prop | cut -d'=' -f2")
            }
            BackendCommand::ReadStatus => format!(
                "grep '^description=' {module}/module.prop | sed 's/description=status: //'"
            ),
            BackendCommand::CheckModeOverride => format!(
                "[ -f {persist}/mode_override.sh ] && echo 'true' || echo 'false'"
            ),
            BackendCommand::ReadModeOverride => format!("cat {persist}/mode_override.sh"),
            BackendCommand::WriteModeOverride(mode) => {
                format!("echo \"mode={mode}\" > {persist}/mode_override.sh")
            }
            BackendCommand::ResetModeOverride => format!("rm -f {persist}/mode_override.sh"),
            BackendCommand::CheckUpdateJson => {
                format!("grep -q '^updateJson' {module}/module.prop")
            }
            BackendCommand::ToggleUpdateJson => {
                format!("sh {} --toggle-updatejson", paths.script())
            }
            BackendCommand::CheckCron => {
                format!("grep -q \"bindhosts.sh\" {persist}/crontabs/root")
            }
            BackendCommand::EnableCron => format!("sh {} --enable-cron", paths.script()),
            BackendCommand::DisableCron => format!("sh {} --disable-cron", paths.script()),
            BackendCommand::CheckMagisk => {
                "command -v magisk >/dev/null 2>&1 && echo \"true\" || echo \"false\"".to_string()
            }
            BackendCommand::CheckRedirect => format!(
                "[ ! -f {persist}/webui_setting.sh ] || grep -q '^magisk_webui_redirect=1' {persist}/webui_setting.sh"
            ),
            BackendCommand::SetRedirect(enabled) => format!(
                "sed -i \"s/^magisk_webui_redirect=.*/magisk_webui_redirect={}/\" {persist}/webui_setting.sh",
                u8::from(*enabled)
            ),
            BackendCommand::CheckCompanionApp => format!(
                "pm path {COMPANION_APP_PACKAGE} >/dev/null 2>&1 || echo \"false\""
            ),
            BackendCommand::InstallCompanionApp => format!("sh {module}/bindhosts-app.sh"),
        }
    }

    /// Whether the command changes module state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            BackendCommand::LinkHosts
                | BackendCommand::Whitelist(_)
                | BackendCommand::WriteModeOverride(_)
                | BackendCommand::ResetModeOverride
                | BackendCommand::ToggleUpdateJson
                | BackendCommand::EnableCron
                | BackendCommand::DisableCron
                | BackendCommand::SetRedirect(_)
                | BackendCommand::InstallCompanionApp
        )
    }
}

/// Quote a word for `sh`, leaving plain hostnames untouched
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '/' | '='));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_command() {
        let paths = ModulePaths::default();
        let cmd = BackendCommand::Whitelist(vec!["ads.example.com".into(), "t.example.com".into()]);
        assert_eq!(
            cmd.to_shell(&paths),
            "sh /data/adb/modules/bindhosts/bindhosts.sh --whitelist ads.example.com t.example.com"
        );
        assert!(cmd.is_mutating());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("a.example.com"), "a.example.com");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("x;rm -rf /"), "'x;rm -rf /'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_mode_override_parsing() {
        assert_eq!("3".parse::<ModeOverride>().unwrap(), ModeOverride(3));
        assert!("".parse::<ModeOverride>().is_err());
        assert!("a1".parse::<ModeOverride>().is_err());
        assert!("999".parse::<ModeOverride>().is_err());

        assert_eq!(
            ModeOverride::from_file_content("mode=5\n"),
            Some(ModeOverride(5))
        );
        assert_eq!(ModeOverride::from_file_content("nothing here"), None);
    }

    #[test]
    fn test_redirect_flag_value() {
        let paths = ModulePaths::default();
        assert!(BackendCommand::SetRedirect(true)
            .to_shell(&paths)
            .contains("magisk_webui_redirect=1/"));
        assert!(BackendCommand::SetRedirect(false)
            .to_shell(&paths)
            .contains("magisk_webui_redirect=0/"));
    }

    #[test]
    fn test_read_commands_are_not_mutating() {
        assert!(!BackendCommand::ReadMode.is_mutating());
        assert!(!BackendCommand::CheckCron.is_mutating());
        assert!(BackendCommand::EnableCron.is_mutating());
    }
}
