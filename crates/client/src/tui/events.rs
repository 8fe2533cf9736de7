//! TUI event handling
//!
//! Handles keyboard input using crossterm and dispatches actions to the application.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use super::app::{App, AppAction, InputMode};

/// Event handler for TUI input
pub struct EventHandler {
    /// Tick rate for polling events
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Poll for next event
    ///
    /// Returns Some(Event) if an event occurred, None if tick timeout elapsed.
    pub fn poll(&self) -> Result<Option<Event>> {
        if event::poll(self.tick_rate)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Handle a key event and return the resulting action
    pub fn handle_key(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match &app.input_mode {
            InputMode::Normal => self.handle_normal_mode(app, key),
            InputMode::Search { .. } => self.handle_search_mode(app, key),
            InputMode::ModeMenu => self.handle_mode_menu(app, key),
            InputMode::Help => self.handle_help_mode(app, key),
            InputMode::ConfirmQuit => self.handle_confirm_quit_mode(app, key),
        }
    }

    /// Handle key events in normal navigation mode
    fn handle_normal_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            // Quit
            KeyCode::Char('q') => {
                app.show_quit_confirm();
                AppAction::None
            }
            // Ctrl+C for immediate quit
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => AppAction::Quit,

            // Navigation
            KeyCode::Tab => {
                app.toggle_pane();
                AppAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.navigate_up();
                AppAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.navigate_down();
                AppAction::None
            }
            KeyCode::PageDown => {
                app.hosts.page_down();
                AppAction::None
            }
            KeyCode::PageUp => {
                app.hosts.page_up();
                AppAction::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                app.hosts.select_first();
                AppAction::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                app.hosts.select_last();
                AppAction::None
            }

            // Host list
            KeyCode::Char('/') => {
                app.start_search();
                AppAction::None
            }
            KeyCode::Char('c') => {
                app.clear_search();
                AppAction::None
            }
            KeyCode::Char('d') | KeyCode::Delete => app.handle_remove(),
            KeyCode::Char('r') => AppAction::Reload,

            // Control panel
            KeyCode::Enter | KeyCode::Char(' ') => app.handle_enter(),

            // Status box and developer menu
            KeyCode::Char('s') => {
                app.handle_status_press(Instant::now());
                AppAction::None
            }
            KeyCode::Char('m') => AppAction::OpenModeMenu,

            // Help
            KeyCode::Char('?') => {
                app.show_help();
                AppAction::None
            }

            _ => AppAction::None,
        }
    }

    /// Handle key events while typing a search query
    fn handle_search_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc => {
                app.cancel_input();
                AppAction::None
            }
            KeyCode::Enter => {
                app.confirm_search();
                AppAction::None
            }
            KeyCode::Backspace => {
                app.handle_search_backspace();
                AppAction::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.handle_search_input(c);
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events in the mode override menu
    fn handle_mode_menu(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => app.select_mode(c),
            KeyCode::Char('x') => app.reset_mode(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('m') => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events in help overlay mode
    fn handle_help_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q') => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    /// Handle key events in quit confirmation mode
    fn handle_confirm_quit_mode(&self, app: &mut App, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.confirm_quit();
                AppAction::Quit
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.cancel_input();
                AppAction::None
            }
            _ => AppAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;
    use crate::tui::TuiMessage;
    use crate::tui::app::ActivePane;
    use protocol::{HostEntry, ModeOverride};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn app_with_entries(n: usize) -> App {
        let mut app = App::new(Translations::english(), 50, "test".to_string());
        let entries = (0..n)
            .map(|i| HostEntry::new("0.0.0.0", vec![format!("h{i}.test")]).unwrap())
            .collect();
        let ticket = app.hosts.begin_load();
        app.handle_message(TuiMessage::HostsLoaded(ticket, Ok(entries)));
        app
    }

    #[test]
    fn test_event_handler_creation() {
        let handler = EventHandler::new();
        assert_eq!(handler.tick_rate, Duration::from_millis(100));
    }

    #[test]
    fn test_navigation_keys() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(3);

        let action = handler.handle_key(&mut app, key(KeyCode::Down));
        assert!(matches!(action, AppAction::None));
        assert_eq!(app.hosts.selected(), 1);

        handler.handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.hosts.selected(), 2);

        // Should not go beyond last item
        handler.handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.hosts.selected(), 2);

        handler.handle_key(&mut app, key(KeyCode::Up));
        handler.handle_key(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.hosts.selected(), 0);
    }

    #[test]
    fn test_tab_toggle() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(0);
        assert_eq!(app.active_pane, ActivePane::Hosts);

        handler.handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.active_pane, ActivePane::Panel);

        handler.handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.active_pane, ActivePane::Hosts);
    }

    #[test]
    fn test_remove_and_reload_keys() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(2);

        let action = handler.handle_key(&mut app, key(KeyCode::Char('d')));
        assert_eq!(action, AppAction::Remove(vec!["h0.test".to_string()]));
        assert_eq!(handler.handle_key(&mut app, key(KeyCode::Char('r'))), AppAction::Reload);
    }

    #[test]
    fn test_search_mode_typing() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(20);

        handler.handle_key(&mut app, key(KeyCode::Char('/')));
        assert!(matches!(app.input_mode, InputMode::Search { .. }));

        for c in "h1x".chars() {
            handler.handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handler.handle_key(&mut app, key(KeyCode::Backspace));
        // Keys that act in normal mode only type here
        handler.handle_key(&mut app, key(KeyCode::Char('q')));
        handler.handle_key(&mut app, key(KeyCode::Backspace));

        if let InputMode::Search { input } = &app.input_mode {
            assert_eq!(input, "h1");
        } else {
            panic!("Expected Search mode");
        }

        handler.handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        // h1, h10..h19
        assert_eq!(app.hosts.rows().len(), 11);

        handler.handle_key(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.hosts.rows().len(), 20);
    }

    #[test]
    fn test_search_escape_keeps_list() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(5);

        handler.handle_key(&mut app, key(KeyCode::Char('/')));
        handler.handle_key(&mut app, key(KeyCode::Char('z')));
        handler.handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.hosts.rows().len(), 5);
    }

    #[test]
    fn test_mode_menu_keys() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(0);
        assert_eq!(
            handler.handle_key(&mut app, key(KeyCode::Char('m'))),
            AppAction::OpenModeMenu
        );

        app.input_mode = InputMode::ModeMenu;
        assert_eq!(
            handler.handle_key(&mut app, key(KeyCode::Char('4'))),
            AppAction::SaveMode(Some(ModeOverride(4)))
        );
        assert_eq!(app.input_mode, InputMode::ModeMenu);

        assert_eq!(
            handler.handle_key(&mut app, key(KeyCode::Char('x'))),
            AppAction::SaveMode(None)
        );
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_status_key_unlocks_dev_option() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(0);
        for _ in 0..5 {
            handler.handle_key(&mut app, key(KeyCode::Char('s')));
        }
        assert!(app.dev_option.is_enabled());
    }

    #[test]
    fn test_quit_confirmation() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(0);

        handler.handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(matches!(app.input_mode, InputMode::ConfirmQuit));

        handler.handle_key(&mut app, key(KeyCode::Char('n')));
        assert!(matches!(app.input_mode, InputMode::Normal));
        assert!(!app.should_quit);

        handler.handle_key(&mut app, key(KeyCode::Char('q')));
        let action = handler.handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(matches!(action, AppAction::Quit));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_mode() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(0);

        handler.handle_key(&mut app, key(KeyCode::Char('?')));
        assert!(matches!(app.input_mode, InputMode::Help));

        handler.handle_key(&mut app, key(KeyCode::Char('?')));
        assert!(matches!(app.input_mode, InputMode::Normal));
    }

    #[test]
    fn test_ctrl_c_immediate_quit() {
        let handler = EventHandler::new();
        let mut app = app_with_entries(0);

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let action = handler.handle_key(&mut app, key);
        assert!(matches!(action, AppAction::Quit));
    }
}
