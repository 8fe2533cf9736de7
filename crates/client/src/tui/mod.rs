//! Terminal User Interface
//!
//! Interactive front-end for the bindhosts module.
//!
//! # Layout
//!
//! - **Top Panel**: module mode, version and status line
//! - **Center Panel**: host list (left) and control panel (right)
//! - **Bottom Panel**: help bar with context-sensitive keybindings
//!
//! # Keybindings
//!
//! - `Tab`: Switch between host list and control panel
//! - `j/k` or arrow keys: Navigate lists
//! - `/`: Search hosts, `c`: clear the search
//! - `d`: Whitelist the selected blocked host
//! - `Enter`: Toggle the selected control panel item
//! - `r`: Reload hosts and status
//! - `s`: Status box (five quick presses enable the developer option)
//! - `m`: Mode override menu (developer option)
//! - `q`: Quit (with confirmation)
//! - `?`: Show help

pub mod app;
pub mod events;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use protocol::{HostEntry, ModeOverride};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::hosts::{self, HostLoader, HostsLocation, LoadTicket};
use crate::i18n::Translations;
use crate::panel::{self, ModuleStatus, PanelItem, PanelState, Prompt};
use common::{Backend, ShellChannel};

pub use app::{App, AppAction};
pub use events::EventHandler;

/// Messages sent from async tasks to the TUI
#[derive(Debug)]
pub enum TuiMessage {
    /// Status header values read
    StatusRead(ModuleStatus),
    /// Host list fetched (or failed) for a load ticket
    HostsLoaded(LoadTicket, Result<Vec<HostEntry>, String>),
    /// Whitelist command finished
    RemovalFinished {
        domains: Vec<String>,
        result: Result<(), String>,
    },
    /// Control panel states read
    PanelRead(PanelState),
    /// A control panel toggle or action finished
    PanelToggled(PanelItem, Result<Vec<Prompt>, String>),
    /// Mode override file checked
    DevOptionChecked { exists: bool, open_menu: bool },
    /// Current mode override read
    ModeOverrideRead(Option<ModeOverride>),
    /// Mode override written or reset
    ModeSaved(Result<(), String>),
}

/// TUI runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Terminal instance
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    app: App,
    /// Event handler
    event_handler: EventHandler,
    /// Module command backend
    backend: Backend,
    /// Host list source
    loader: HostLoader,
    /// Channel for receiving messages from async tasks
    message_rx: mpsc::Receiver<TuiMessage>,
    /// Channel for sending messages from async tasks
    message_tx: mpsc::Sender<TuiMessage>,
}

impl TuiRunner {
    /// Create a new TUI runner
    pub fn new(config: &ClientConfig, translations: Translations) -> Result<Self> {
        let channel = ShellChannel::from_prefix_str(&config.module.shell)
            .context("Invalid module shell")?;
        let backend = Backend::new(Arc::new(channel), config.module_paths());
        let location = HostsLocation::from_config(config);
        let loader = HostLoader::new(location.clone(), backend.clone());

        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let terminal_backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(terminal_backend).context("Failed to create terminal")?;

        // Create message channel
        let (message_tx, message_rx) = mpsc::channel(100);

        let app = App::new(translations, config.hosts.page_size, location.to_string());

        Ok(Self {
            terminal,
            app,
            event_handler: EventHandler::new(),
            backend,
            loader,
            message_rx,
            message_tx,
        })
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting TUI, hosts from {}", self.app.source);

        self.spawn_read_status();
        self.spawn_read_panel();
        self.spawn_load_hosts();
        self.spawn_check_dev_option(false);

        self.sync_viewport()?;
        self.terminal.draw(|f| ui::render(f, &self.app))?;

        loop {
            // Process any pending messages from async tasks
            while let Ok(msg) = self.message_rx.try_recv() {
                let action = self.app.handle_message(msg);
                self.handle_action(action);
            }
            self.app.prune_toasts(Instant::now());

            // Poll for terminal events
            if let Some(event) = self.event_handler.poll()? {
                let action = match event {
                    Event::Key(key) => self.event_handler.handle_key(&mut self.app, key),
                    Event::Resize(_, _) => AppAction::None,
                    _ => AppAction::None,
                };
                self.handle_action(action);
            }

            // Check if we should quit
            if self.app.should_quit {
                break;
            }

            // Render
            self.sync_viewport()?;
            self.terminal.draw(|f| ui::render(f, &self.app))?;
        }

        info!("TUI shutting down");
        Ok(())
    }

    /// Feed the visible list height to the view, rendering more pages if needed
    fn sync_viewport(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
        self.app.hosts.set_viewport(ui::host_list_viewport(area));
        Ok(())
    }

    /// Handle an application action
    fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::None => {}
            AppAction::Quit => {
                // Cleanup happens in Drop
            }
            AppAction::Reload => {
                self.spawn_load_hosts();
                self.spawn_read_status();
            }
            AppAction::Remove(domains) => self.spawn_remove(domains),
            AppAction::RefreshPanel => self.spawn_read_panel(),
            AppAction::TogglePanel(item) => self.spawn_toggle(item),
            AppAction::OpenModeMenu => self.spawn_check_dev_option(true),
            AppAction::ReadModeOverride => self.spawn_read_mode_override(),
            AppAction::SaveMode(mode) => self.spawn_save_mode(mode),
        }
    }

    /// Spawn async task to read the status header
    fn spawn_read_status(&self) {
        let backend = self.backend.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let status = panel::read_status(&backend).await;
            let _ = tx.send(TuiMessage::StatusRead(status)).await;
        });
    }

    /// Spawn async task to (re)load the host list under a fresh ticket
    fn spawn_load_hosts(&mut self) {
        let ticket = self.app.hosts.begin_load();
        let loader = self.loader.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let result = loader.load().await.map_err(|e| {
                error!("Failed to load hosts: {}", e);
                e.to_string()
            });
            let _ = tx.send(TuiMessage::HostsLoaded(ticket, result)).await;
        });
    }

    /// Spawn async task to whitelist a domain list
    fn spawn_remove(&self, domains: Vec<String>) {
        let backend = self.backend.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let result = hosts::whitelist(&backend, domains.clone())
                .await
                .map_err(|e| {
                    error!("Failed to whitelist {}: {}", domains.join(" "), e);
                    e.to_string()
                });
            let _ = tx
                .send(TuiMessage::RemovalFinished { domains, result })
                .await;
        });
    }

    /// Spawn async task to read the control panel
    fn spawn_read_panel(&self) {
        let backend = self.backend.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let state = panel::read_panel(&backend).await;
            let _ = tx.send(TuiMessage::PanelRead(state)).await;
        });
    }

    /// Spawn async task to toggle a control panel item
    fn spawn_toggle(&self, item: PanelItem) {
        let backend = self.backend.clone();
        let state = self.app.panel.clone().unwrap_or_default();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let result = panel::toggle(&backend, item, &state).await.map_err(|e| {
                error!("Failed to toggle {:?}: {}", item, e);
                e.to_string()
            });
            let _ = tx.send(TuiMessage::PanelToggled(item, result)).await;
        });
    }

    /// Spawn async task to check for the mode override file
    fn spawn_check_dev_option(&self, open_menu: bool) {
        let backend = self.backend.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let exists = panel::has_mode_override(&backend).await;
            debug!("Mode override present: {}", exists);
            let _ = tx
                .send(TuiMessage::DevOptionChecked { exists, open_menu })
                .await;
        });
    }

    /// Spawn async task to read the current mode override
    fn spawn_read_mode_override(&self) {
        let backend = self.backend.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let mode = panel::read_mode_override(&backend).await;
            let _ = tx.send(TuiMessage::ModeOverrideRead(mode)).await;
        });
    }

    /// Spawn async task to write or reset the mode override
    fn spawn_save_mode(&self, mode: Option<ModeOverride>) {
        let backend = self.backend.clone();
        let tx = self.message_tx.clone();

        tokio::spawn(async move {
            let result = panel::save_mode_override(&backend, mode)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(TuiMessage::ModeSaved(result)).await;
        });
    }
}

impl Drop for TuiRunner {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the TUI application
///
/// Creates a [`TuiRunner`] and drives its event loop until the user quits.
pub async fn run(config: &ClientConfig, translations: Translations) -> Result<()> {
    let mut runner = TuiRunner::new(config, translations)?;
    runner.run().await
}
