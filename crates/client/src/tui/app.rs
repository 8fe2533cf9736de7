//! TUI application state
//!
//! Holds the status header, the host list, the control panel and popup
//! dialogs. Results of backend work arrive as [`TuiMessage`]s and may ask
//! the runner for a follow-up [`AppAction`].

use std::time::{Duration, Instant};

use protocol::ModeOverride;

use super::TuiMessage;
use crate::hosts::{HostListView, ListPhase};
use crate::i18n::Translations;
use crate::panel::{self, DevOption, ModuleStatus, PanelItem, PanelState, Prompt};

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Active pane below the status header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    /// Host list (left)
    Hosts,
    /// Control panel (right)
    Panel,
}

/// Input mode for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing a search query
    Search { input: String },
    /// Developer mode override menu
    ModeMenu,
    /// Showing help overlay
    Help,
    /// Confirm quit dialog
    ConfirmQuit,
}

/// User action to be processed by the main loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// No action
    None,
    /// Quit the application
    Quit,
    /// Re-fetch the host list and the status header
    Reload,
    /// Whitelist a domain list
    Remove(Vec<String>),
    /// Re-read the control panel
    RefreshPanel,
    /// Toggle a control panel item
    TogglePanel(PanelItem),
    /// Check the override file, then open the mode menu if allowed
    OpenModeMenu,
    /// Read the current override for the mode menu
    ReadModeOverride,
    /// Write (`Some`) or reset (`None`) the mode override
    SaveMode(Option<ModeOverride>),
}

/// Toast notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    pub created: Instant,
}

/// Main application state
pub struct App {
    /// Status header values, `None` until first read
    pub status: Option<ModuleStatus>,
    /// Paginated host list
    pub hosts: HostListView,
    /// Control panel state, `None` until first read
    pub panel: Option<PanelState>,
    /// Selected control panel item index
    pub selected_item: usize,
    /// Item whose toggle is in flight
    pub panel_busy: Option<PanelItem>,
    /// Currently active pane
    pub active_pane: ActivePane,
    /// Current input mode
    pub input_mode: InputMode,
    /// Developer option unlock state
    pub dev_option: DevOption,
    /// Mode read back from the override file
    pub mode_override: Option<ModeOverride>,
    /// Description of the host list source
    pub source: String,
    /// Translation table
    pub translations: Translations,
    /// Active toasts, oldest first
    pub toasts: Vec<Toast>,
    /// Should quit flag
    pub should_quit: bool,
}

impl App {
    /// Create a new application state
    pub fn new(translations: Translations, page_size: usize, source: String) -> Self {
        Self {
            status: None,
            hosts: HostListView::new(page_size),
            panel: None,
            selected_item: 0,
            panel_busy: None,
            active_pane: ActivePane::Hosts,
            input_mode: InputMode::Normal,
            dev_option: DevOption::default(),
            mode_override: None,
            source,
            translations,
            toasts: Vec::new(),
            should_quit: false,
        }
    }

    /// Apply a message from a background task
    pub fn handle_message(&mut self, msg: TuiMessage) -> AppAction {
        match msg {
            TuiMessage::StatusRead(status) => {
                self.status = Some(status);
                AppAction::None
            }
            TuiMessage::HostsLoaded(ticket, result) => {
                let failed = result.as_ref().err().cloned();
                if self.hosts.apply_load(ticket, result) {
                    if let Some(error) = failed {
                        let message = self.translations.format("query.load_failed", &error);
                        self.add_toast(message, ToastType::Error);
                    }
                }
                AppAction::None
            }
            TuiMessage::RemovalFinished { domains, result } => {
                let joined = domains.join(" ");
                match result {
                    Ok(()) => {
                        self.hosts.finish_removal(&domains, true);
                        let message = self.translations.format("query.remove_prompt", &joined);
                        self.add_toast(message, ToastType::Success);
                    }
                    Err(_) => {
                        self.hosts.finish_removal(&domains, false);
                        let message = self.translations.format("query.remove_error", &joined);
                        self.add_toast(message, ToastType::Error);
                    }
                }
                AppAction::None
            }
            TuiMessage::PanelRead(state) => {
                let len = state.items().len();
                self.panel = Some(state);
                self.selected_item = self.selected_item.min(len.saturating_sub(1));
                AppAction::None
            }
            TuiMessage::PanelToggled(item, result) => {
                if self.panel_busy == Some(item) {
                    self.panel_busy = None;
                }
                match result {
                    Ok(prompts) => {
                        for prompt in prompts {
                            self.prompt(prompt);
                        }
                    }
                    Err(error) => self.add_toast(error, ToastType::Error),
                }
                AppAction::RefreshPanel
            }
            TuiMessage::DevOptionChecked { exists, open_menu } => {
                if exists {
                    self.dev_option.enable();
                }
                if open_menu && self.dev_option.is_enabled() {
                    self.input_mode = InputMode::ModeMenu;
                    return AppAction::ReadModeOverride;
                }
                AppAction::None
            }
            TuiMessage::ModeOverrideRead(mode) => {
                self.mode_override = mode;
                AppAction::None
            }
            TuiMessage::ModeSaved(result) => match result {
                Ok(()) => {
                    let message = self.translations.get("global.reboot").to_string();
                    self.add_toast(message, ToastType::Info);
                    AppAction::ReadModeOverride
                }
                Err(error) => {
                    self.add_toast(error, ToastType::Error);
                    AppAction::None
                }
            },
        }
    }

    fn prompt(&mut self, prompt: Prompt) {
        let message = self.translations.get(prompt.key).to_string();
        let toast_type = if prompt.success {
            ToastType::Success
        } else {
            ToastType::Error
        };
        self.add_toast(message, toast_type);
    }

    /// Switch active pane
    pub fn toggle_pane(&mut self) {
        self.active_pane = match self.active_pane {
            ActivePane::Hosts => ActivePane::Panel,
            ActivePane::Panel => ActivePane::Hosts,
        };
    }

    /// Items currently shown in the control panel
    pub fn panel_items(&self) -> Vec<PanelItem> {
        self.panel.as_ref().map(PanelState::items).unwrap_or_default()
    }

    /// Navigate up in current list
    pub fn navigate_up(&mut self) {
        match self.active_pane {
            ActivePane::Hosts => self.hosts.select_previous(),
            ActivePane::Panel => self.selected_item = self.selected_item.saturating_sub(1),
        }
    }

    /// Navigate down in current list
    pub fn navigate_down(&mut self) {
        match self.active_pane {
            ActivePane::Hosts => self.hosts.select_next(),
            ActivePane::Panel => {
                let len = self.panel_items().len();
                if len > 0 && self.selected_item < len - 1 {
                    self.selected_item += 1;
                }
            }
        }
    }

    /// Handle Enter key press
    pub fn handle_enter(&mut self) -> AppAction {
        match self.active_pane {
            ActivePane::Hosts => AppAction::None,
            ActivePane::Panel => {
                if self.panel_busy.is_some() {
                    return AppAction::None;
                }
                match self.panel_items().get(self.selected_item).copied() {
                    Some(item) => {
                        self.panel_busy = Some(item);
                        if item == PanelItem::CompanionApp {
                            let message = self.translations.get("control_panel.installing").to_string();
                            self.add_toast(message, ToastType::Info);
                        }
                        AppAction::TogglePanel(item)
                    }
                    None => AppAction::None,
                }
            }
        }
    }

    /// Handle 'd' key (whitelist the selected host)
    pub fn handle_remove(&mut self) -> AppAction {
        if self.active_pane != ActivePane::Hosts {
            return AppAction::None;
        }
        match self.hosts.request_removal() {
            Some(domains) => AppAction::Remove(domains),
            None => {
                let pending = self
                    .hosts
                    .selected_row()
                    .filter(|row| self.hosts.is_pending(&row.domains))
                    .map(|row| {
                        self.translations
                            .format("query.remove_pending", &row.domains_text)
                    });
                if let Some(message) = pending {
                    self.add_toast(message, ToastType::Warning);
                }
                AppAction::None
            }
        }
    }

    /// Handle 's' key (status box, unlocks the developer option)
    pub fn handle_status_press(&mut self, now: Instant) {
        if let Some(key) = self.dev_option.press(now) {
            let message = self.translations.get(key).to_string();
            self.add_toast(message, ToastType::Success);
        }
    }

    /// Start typing a search query
    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search {
            input: self.hosts.query().to_string(),
        };
    }

    /// Handle input in Search mode
    pub fn handle_search_input(&mut self, c: char) {
        if let InputMode::Search { input } = &mut self.input_mode {
            input.push(c);
        }
    }

    /// Handle backspace in Search mode
    pub fn handle_search_backspace(&mut self) {
        if let InputMode::Search { input } = &mut self.input_mode {
            input.pop();
        }
    }

    /// Run the typed search
    pub fn confirm_search(&mut self) {
        if let InputMode::Search { input } = &self.input_mode {
            let query = input.clone();
            self.input_mode = InputMode::Normal;
            self.active_pane = ActivePane::Hosts;
            self.hosts.search(&query);
        }
    }

    /// Drop the search filter
    pub fn clear_search(&mut self) {
        if self.hosts.phase() == ListPhase::Filtered || !self.hosts.query().is_empty() {
            self.hosts.clear();
        }
    }

    /// Handle a digit in the mode menu
    pub fn select_mode(&mut self, digit: char) -> AppAction {
        match panel::mode_from_key(digit) {
            Ok(mode) => AppAction::SaveMode(Some(mode)),
            Err(e) => {
                self.add_toast(e.to_string(), ToastType::Error);
                AppAction::None
            }
        }
    }

    /// Handle 'x' in the mode menu, the menu closes afterwards
    pub fn reset_mode(&mut self) -> AppAction {
        self.input_mode = InputMode::Normal;
        AppAction::SaveMode(None)
    }

    /// Cancel current input mode
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Show quit confirmation
    pub fn show_quit_confirm(&mut self) {
        self.input_mode = InputMode::ConfirmQuit;
    }

    /// Confirm quit
    pub fn confirm_quit(&mut self) {
        self.should_quit = true;
    }

    /// Queue a toast
    pub fn add_toast(&mut self, message: String, toast_type: ToastType) {
        self.toasts.push(Toast {
            message,
            toast_type,
            created: Instant::now(),
        });
    }

    /// Drop toasts older than [`TOAST_DURATION`]
    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.duration_since(toast.created) < TOAST_DURATION);
    }

    /// Count toasts of one type
    pub fn toast_count(&self, toast_type: ToastType) -> usize {
        self.toasts
            .iter()
            .filter(|t| t.toast_type == toast_type)
            .count()
    }
}
