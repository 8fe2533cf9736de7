//! Module status, developer option and control panel
//!
//! All state is read through the backend. Toggles report their result as
//! marker lines which are mapped to translation keys here.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use common::{Backend, Error, Result};
use protocol::{BackendCommand, FailureKind, ModeOverride, Outcome};
use tracing::{debug, warn};

/// Presses of the status key needed to unlock the developer option
pub const DEV_OPTION_PRESSES: usize = 5;
/// Window in which those presses must land
pub const DEV_OPTION_WINDOW: Duration = Duration::from_secs(2);

/// Status header values, `None` when reading failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleStatus {
    pub mode: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
}

/// Read mode, version and status line
pub async fn read_status(backend: &Backend) -> ModuleStatus {
    let mode = read_field(backend, &BackendCommand::ReadMode).await;
    let version = read_field(backend, &BackendCommand::ReadVersion).await;
    let status = read_field(backend, &BackendCommand::ReadStatus).await;
    ModuleStatus {
        mode,
        version,
        status,
    }
}

async fn read_field(backend: &Backend, command: &BackendCommand) -> Option<String> {
    match backend.read(command).await {
        Ok(value) if !value.is_empty() => Some(value),
        Ok(_) => {
            warn!("Empty output for {:?}", command);
            None
        }
        Err(e) => {
            warn!("Failed to read {:?}: {}", command, e);
            None
        }
    }
}

/// Tracks status key presses and the developer option flag
#[derive(Debug, Default)]
pub struct DevOption {
    presses: VecDeque<Instant>,
    enabled: bool,
}

impl DevOption {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Record a press at `now`
    ///
    /// On the fifth press inside the window returns the prompt key to show
    /// and enables the option.
    pub fn press(&mut self, now: Instant) -> Option<&'static str> {
        while let Some(&first) = self.presses.front() {
            if now.duration_since(first) > DEV_OPTION_WINDOW {
                self.presses.pop_front();
            } else {
                break;
            }
        }
        self.presses.push_back(now);
        if self.presses.len() < DEV_OPTION_PRESSES {
            return None;
        }

        self.presses.clear();
        if self.enabled {
            Some("global.dev_opt_true")
        } else {
            self.enabled = true;
            Some("global.dev_opt")
        }
    }
}

/// Whether a mode override file exists
pub async fn has_mode_override(backend: &Backend) -> bool {
    match backend.read(&BackendCommand::CheckModeOverride).await {
        Ok(out) => out == "true",
        Err(e) => {
            warn!("Error checking developer option: {}", e);
            false
        }
    }
}

/// Mode currently written in the override file
pub async fn read_mode_override(backend: &Backend) -> Option<ModeOverride> {
    if !has_mode_override(backend).await {
        return None;
    }
    match backend.read(&BackendCommand::ReadModeOverride).await {
        Ok(content) => ModeOverride::from_file_content(&content),
        Err(e) => {
            warn!("Error reading mode override: {}", e);
            None
        }
    }
}

/// Mode selected by a key in the mode menu
pub fn mode_from_key(key: char) -> Result<ModeOverride> {
    Ok(key.to_string().parse::<ModeOverride>()?)
}

/// Write (`Some`) or reset (`None`) the mode override
pub async fn save_mode_override(backend: &Backend, mode: Option<ModeOverride>) -> Result<()> {
    match mode {
        Some(mode) => backend.run(&BackendCommand::WriteModeOverride(mode)).await?,
        None => backend.run(&BackendCommand::ResetModeOverride).await?,
    };
    Ok(())
}

/// An entry of the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelItem {
    UpdateCheck,
    Cron,
    ActionRedirect,
    CompanionApp,
}

impl PanelItem {
    pub fn label_key(&self) -> &'static str {
        match self {
            PanelItem::UpdateCheck => "control_panel.update",
            PanelItem::Cron => "control_panel.cron",
            PanelItem::ActionRedirect => "control_panel.action_redirect",
            PanelItem::CompanionApp => "control_panel.install_app",
        }
    }
}

/// Toggle states as last read from the module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    pub update_check: bool,
    pub cron: bool,
    /// `None` unless running under Magisk
    pub action_redirect: Option<bool>,
    pub app_missing: bool,
}

impl PanelState {
    /// Items to show, in display order
    pub fn items(&self) -> Vec<PanelItem> {
        let mut items = vec![PanelItem::UpdateCheck, PanelItem::Cron];
        if self.action_redirect.is_some() {
            items.push(PanelItem::ActionRedirect);
        }
        if self.app_missing {
            items.push(PanelItem::CompanionApp);
        }
        items
    }

    /// Switch state of an item, `None` for actions
    pub fn value(&self, item: PanelItem) -> Option<bool> {
        match item {
            PanelItem::UpdateCheck => Some(self.update_check),
            PanelItem::Cron => Some(self.cron),
            PanelItem::ActionRedirect => self.action_redirect,
            PanelItem::CompanionApp => None,
        }
    }
}

/// Read every control panel item
pub async fn read_panel(backend: &Backend) -> PanelState {
    let update_check = probe(backend, &BackendCommand::CheckUpdateJson).await;
    let cron = probe(backend, &BackendCommand::CheckCron).await;

    let magisk = matches!(
        backend.read(&BackendCommand::CheckMagisk).await.as_deref(),
        Ok("true")
    );
    let action_redirect = if magisk {
        Some(probe(backend, &BackendCommand::CheckRedirect).await)
    } else {
        None
    };

    let app_missing = match backend.read(&BackendCommand::CheckCompanionApp).await {
        Ok(out) => out == "false",
        Err(e) => {
            warn!("Error while checking companion app: {}", e);
            false
        }
    };

    PanelState {
        update_check,
        cron,
        action_redirect,
        app_missing,
    }
}

async fn probe(backend: &Backend, command: &BackendCommand) -> bool {
    match backend.probe(command).await {
        Ok(value) => value,
        Err(e) => {
            debug!("Probe {:?} failed: {}", command, e);
            false
        }
    }
}

/// A translated notification produced by a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub key: &'static str,
    pub success: bool,
}

impl Prompt {
    fn ok(key: &'static str) -> Self {
        Self { key, success: true }
    }

    fn err(key: &'static str) -> Self {
        Self {
            key,
            success: false,
        }
    }
}

/// Run the toggle or action for `item` given its last known state
///
/// Returns one prompt per marked output line.
pub async fn toggle(backend: &Backend, item: PanelItem, state: &PanelState) -> Result<Vec<Prompt>> {
    match item {
        PanelItem::UpdateCheck => {
            let outcomes = backend.run_marked(&BackendCommand::ToggleUpdateJson).await?;
            Ok(map_outcomes(
                &outcomes,
                "control_panel.update_true",
                "control_panel.update_false",
            ))
        }
        PanelItem::Cron => {
            let command = if state.cron {
                BackendCommand::DisableCron
            } else {
                BackendCommand::EnableCron
            };
            let outcomes = backend.run_marked(&command).await?;
            Ok(map_outcomes(
                &outcomes,
                "control_panel.cron_true",
                "control_panel.cron_false",
            ))
        }
        PanelItem::ActionRedirect => {
            let current = state
                .action_redirect
                .ok_or_else(|| Error::Other("Action redirect requires Magisk".to_string()))?;
            backend.run(&BackendCommand::SetRedirect(!current)).await?;
            if current {
                Ok(vec![Prompt::err("control_panel.action_prompt_false")])
            } else {
                Ok(vec![Prompt::ok("control_panel.action_prompt_true")])
            }
        }
        PanelItem::CompanionApp => {
            let outcomes = backend
                .run_marked(&BackendCommand::InstallCompanionApp)
                .await?;
            // Plain `[x]` progress lines from the installer carry no prompt
            Ok(outcomes
                .iter()
                .filter_map(|outcome| match outcome {
                    Outcome::Success => Some(Prompt::ok("control_panel.installed")),
                    Outcome::Failure(FailureKind::DownloadFailed) => {
                        Some(Prompt::err("control_panel.download_fail"))
                    }
                    Outcome::Failure(FailureKind::Incomplete) => {
                        Some(Prompt::err("control_panel.install_fail"))
                    }
                    Outcome::Failure(FailureKind::Rejected) => None,
                })
                .collect())
        }
    }
}

/// `[+]` lines map to `on`, `[x]` lines to `off`; other markers are ignored
fn map_outcomes(outcomes: &[Outcome], on: &'static str, off: &'static str) -> Vec<Prompt> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Success => Some(Prompt::ok(on)),
            Outcome::Failure(FailureKind::Rejected) => Some(Prompt::err(off)),
            Outcome::Failure(_) => None,
        })
        .collect()
}
