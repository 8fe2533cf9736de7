//! TUI rendering with ratatui
//!
//! Renders the terminal user interface using ratatui widgets and layouts.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
    },
};

use super::app::{ActivePane, App, InputMode, ToastType};
use crate::hosts::ListPhase;
use crate::panel::PanelItem;
use protocol::HostTag;

/// Colors used in the UI
mod colors {
    use ratatui::style::Color;

    pub const BLOCK: Color = Color::Red;
    pub const CUSTOM: Color = Color::Cyan;
    pub const PENDING: Color = Color::Yellow;

    pub const ON: Color = Color::Green;
    pub const OFF: Color = Color::Red;

    pub const ACTIVE_BORDER: Color = Color::Cyan;
    pub const INACTIVE_BORDER: Color = Color::Gray;

    pub const HIGHLIGHT_BG: Color = Color::DarkGray;
    pub const STATUS_BAR_BG: Color = Color::Blue;
    pub const HELP_BAR_BG: Color = Color::DarkGray;

    // Toast notification colors
    pub const TOAST_INFO_BG: Color = Color::Blue;
    pub const TOAST_SUCCESS_BG: Color = Color::Green;
    pub const TOAST_WARNING_BG: Color = Color::Yellow;
    pub const TOAST_ERROR_BG: Color = Color::Red;
}

const STATUS_HEIGHT: u16 = 5;
const HELP_HEIGHT: u16 = 1;
const HOSTS_WIDTH_PERCENT: u16 = 65;

/// Main layout: status header, content, help bar
fn main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT), // Status header
            Constraint::Min(5),                // Host list + control panel
            Constraint::Length(HELP_HEIGHT),   // Help bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn content_chunks(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(HOSTS_WIDTH_PERCENT),
            Constraint::Percentage(100 - HOSTS_WIDTH_PERCENT),
        ])
        .split(area);
    [chunks[0], chunks[1]]
}

/// Number of host rows visible for a terminal of the given size
pub fn host_list_viewport(area: Rect) -> usize {
    let [_, content, _] = main_chunks(area);
    let [hosts, _] = content_chunks(content);
    // Borders plus the column header line
    hosts.height.saturating_sub(3) as usize
}

/// Render the whole UI
pub fn render(frame: &mut Frame, app: &App) {
    let [status, content, help] = main_chunks(frame.area());

    render_status_bar(frame, app, status);
    render_main_content(frame, app, content);
    render_help_bar(frame, app, help);

    // Render overlays based on input mode
    match &app.input_mode {
        InputMode::Search { input } => {
            render_search_dialog(frame, app, input);
        }
        InputMode::ModeMenu => {
            render_mode_menu(frame, app);
        }
        InputMode::Help => {
            render_help_overlay(frame);
        }
        InputMode::ConfirmQuit => {
            render_quit_dialog(frame);
        }
        InputMode::Normal => {}
    }

    // Render toast notifications (in top-right corner)
    render_toasts(frame, app);
}

/// Render the status header (mode, version, status line)
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let t = &app.translations;
    let error = t.get("global.error");

    let field = |value: Option<&String>| -> String {
        match &app.status {
            None => "...".to_string(),
            Some(_) => value.cloned().unwrap_or_else(|| error.to_string()),
        }
    };
    let mode = field(app.status.as_ref().and_then(|s| s.mode.as_ref()));
    let version = field(app.status.as_ref().and_then(|s| s.version.as_ref()));
    let status = field(app.status.as_ref().and_then(|s| s.status.as_ref()));

    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(vec![
        Span::styled(format!(" {} ", t.get("status.version")), label),
        Span::styled(version, value),
        Span::raw("   "),
        Span::styled(format!("{} ", t.get("status.mode")), label),
        Span::styled(mode, value),
    ])];
    for (i, part) in status.split('\n').enumerate() {
        let prefix = if i == 0 {
            format!(" {} ", t.get("status.status"))
        } else {
            " ".repeat(t.get("status.status").chars().count() + 2)
        };
        lines.push(Line::from(vec![
            Span::styled(prefix, label),
            Span::styled(part.to_string(), Style::default().fg(Color::Yellow)),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(colors::STATUS_BAR_BG))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", t.get("status.title")))
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        );

    frame.render_widget(paragraph, area);
}

/// Render the host list and control panel side by side
fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let [hosts, panel] = content_chunks(area);
    render_host_list(frame, app, hosts);
    render_control_panel(frame, app, panel);
}

fn pane_block(title: String, is_active: bool) -> Block<'static> {
    let border_color = if is_active {
        colors::ACTIVE_BORDER
    } else {
        colors::INACTIVE_BORDER
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(if is_active {
            Style::default()
                .fg(colors::ACTIVE_BORDER)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        })
}

/// Render the host list pane
fn render_host_list(frame: &mut Frame, app: &App, area: Rect) {
    let t = &app.translations;
    let view = &app.hosts;
    let is_active = app.active_pane == ActivePane::Hosts;

    let mut title = format!(
        " {} ({}/{}) ",
        t.get("query.title"),
        view.rows().len(),
        view.total()
    );
    if !view.query().is_empty() {
        title = format!("{}[{}: {}] ", title, t.get("query.search"), view.query());
    }
    let block = pane_block(title, is_active);

    let placeholder = match view.phase() {
        ListPhase::Unloaded | ListPhase::Loading => Some(t.get("query.loading").to_string()),
        ListPhase::Empty => Some(t.format("query.load_failed", view.error().unwrap_or_default())),
        ListPhase::Loaded | ListPhase::Filtered if view.rows().is_empty() => {
            Some(t.get("query.empty").to_string())
        }
        _ => None,
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let address_width = view
        .rows()
        .iter()
        .map(|row| row.address.len())
        .max()
        .unwrap_or(0)
        .max(7);

    let header = Paragraph::new(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{:<width$} ", "address", width = address_width),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("domains", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = view
        .rows()
        .iter()
        .map(|row| {
            let tag_color = match row.tag {
                HostTag::Block => colors::BLOCK,
                HostTag::Custom => colors::CUSTOM,
            };
            let marker = if view.is_pending(&row.domains) {
                Span::styled("~ ", Style::default().fg(colors::PENDING))
            } else if row.removable {
                Span::styled("x ", Style::default().fg(Color::DarkGray))
            } else {
                Span::raw("  ")
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<width$} ", row.address, width = address_width),
                    Style::default().fg(tag_color),
                ),
                Span::raw(row.domains_text.clone()),
                Span::raw(" "),
                marker,
            ]))
        })
        .collect();

    // Rows keep the symbol column while the other pane is active
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(colors::HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
        .highlight_spacing(HighlightSpacing::Always);

    let mut state = ListState::default()
        .with_offset(view.offset())
        .with_selected(if is_active { Some(view.selected()) } else { None });

    frame.render_stateful_widget(list, chunks[1], &mut state);
}

/// Render the control panel pane
fn render_control_panel(frame: &mut Frame, app: &App, area: Rect) {
    let t = &app.translations;
    let is_active = app.active_pane == ActivePane::Panel;
    let block = pane_block(format!(" {} ", t.get("control_panel.title")), is_active);

    let Some(state) = &app.panel else {
        let paragraph = Paragraph::new("...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let items: Vec<ListItem> = state
        .items()
        .into_iter()
        .map(|item| {
            let (value, color) = match state.value(item) {
                Some(true) => (t.get("control_panel.on"), colors::ON),
                Some(false) => (t.get("control_panel.off"), colors::OFF),
                None => ("", Color::White),
            };
            let value = if app.panel_busy == Some(item) {
                Span::styled("[~] ", Style::default().fg(colors::PENDING))
            } else if item == PanelItem::CompanionApp {
                Span::styled("[>] ", Style::default().fg(Color::Cyan))
            } else {
                Span::styled(format!("[{}] ", value), Style::default().fg(color))
            };
            ListItem::new(Line::from(vec![value, Span::raw(t.get(item.label_key()).to_string())]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors::HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if is_active {
        list_state.select(Some(app.selected_item));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Render the bottom help bar
fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.input_mode {
        InputMode::Normal => {
            if app.active_pane == ActivePane::Hosts {
                "Tab: Switch | j/k: Navigate | /: Search | c: Clear | d: Whitelist | r: Reload | q: Quit | ?: Help"
            } else {
                "Tab: Switch | j/k: Navigate | Enter: Toggle | r: Reload | q: Quit | ?: Help"
            }
        }
        InputMode::Search { .. } => "Enter: Search | Esc: Cancel",
        InputMode::ModeMenu => app.translations.get("mode.hint"),
        InputMode::Help => "Press Esc or ? to close",
        InputMode::ConfirmQuit => "y: Quit | n: Cancel",
    };

    let paragraph = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White).bg(colors::HELP_BAR_BG))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render the search input dialog
fn render_search_dialog(frame: &mut Frame, app: &App, input: &str) {
    let area = centered_rect(60, 20, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", app.translations.get("query.search")))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::ACTIVE_BORDER));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Min(0),    // Spacing
        ])
        .split(inner);

    let input_text = format!("{}_", input); // Show cursor
    let input_widget = Paragraph::new(input_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(input_widget, chunks[0]);
}

/// Render the developer mode override menu
fn render_mode_menu(frame: &mut Frame, app: &App) {
    let t = &app.translations;
    let area = centered_rect(50, 30, frame.area());

    frame.render_widget(Clear, area);

    let current = app
        .mode_override
        .map(|mode| mode.to_string())
        .unwrap_or_else(|| t.get("mode.none").to_string());

    let mut digits = Vec::new();
    for d in 0..10u8 {
        let style = if app.mode_override.map(|m| m.0) == Some(d) {
            Style::default()
                .fg(Color::Black)
                .bg(colors::ON)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        digits.push(Span::styled(format!(" {} ", d), style));
    }

    let text = Text::from(vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{} ", t.get("mode.current"))),
            Span::styled(current, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(digits),
        Line::from(""),
        Line::from(Span::styled(
            t.get("mode.hint"),
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", t.get("mode.title")))
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render the help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = Text::from(vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
        section("Navigation"),
        Line::from("  Tab          Switch between host list and control panel"),
        Line::from("  Up / k       Move selection up"),
        Line::from("  Down / j     Move selection down"),
        Line::from("  PgUp / PgDn  Move one screen"),
        Line::from("  g / G        First / last loaded host"),
        Line::from(""),
        section("Hosts"),
        Line::from("  /            Search address or domain"),
        Line::from("  c            Clear search"),
        Line::from("  d / Del      Whitelist selected blocked host"),
        Line::from("  r            Reload hosts and status"),
        Line::from(""),
        section("Control Panel"),
        Line::from("  Enter        Toggle selected item"),
        Line::from(""),
        section("General"),
        Line::from("  m            Mode override menu (developer option)"),
        Line::from("  ?            Show this help"),
        Line::from("  q            Quit (with confirmation)"),
        Line::from("  Ctrl+C       Quit immediately"),
    ]);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::ACTIVE_BORDER)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

/// Render the quit confirmation dialog
fn render_quit_dialog(frame: &mut Frame) {
    let area = centered_rect(40, 15, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Are you sure you want to quit?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [Y]es  ", Style::default().fg(Color::Green)),
            Span::styled("  [N]o  ", Style::default().fg(Color::Red)),
        ]),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(" Quit ")
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render toast notifications in the top-right corner
fn render_toasts(frame: &mut Frame, app: &App) {
    if app.toasts.is_empty() {
        return;
    }

    let area = frame.area();
    let toast_width = 48u16.min(area.width.saturating_sub(4));
    let toast_height = 1u16;
    let margin = 2u16;

    let start_x = area.width.saturating_sub(toast_width + margin);
    let start_y = STATUS_HEIGHT + 1;

    // Newest first
    for (i, toast) in app.toasts.iter().rev().enumerate().take(5) {
        let y = start_y + (i as u16) * (toast_height + 1);
        if y + toast_height > area.height.saturating_sub(2) {
            break; // No room for more toasts
        }

        let toast_area = Rect::new(start_x, y, toast_width, toast_height);

        let (bg_color, fg_color) = match toast.toast_type {
            ToastType::Info => (colors::TOAST_INFO_BG, Color::White),
            ToastType::Success => (colors::TOAST_SUCCESS_BG, Color::Black),
            ToastType::Warning => (colors::TOAST_WARNING_BG, Color::Black),
            ToastType::Error => (colors::TOAST_ERROR_BG, Color::White),
        };

        let icon = match toast.toast_type {
            ToastType::Info => "i",
            ToastType::Success => "+",
            ToastType::Warning => "!",
            ToastType::Error => "x",
        };

        // Truncate message if too long
        let max_msg_len = toast_width.saturating_sub(4) as usize;
        let msg = if toast.message.chars().count() > max_msg_len {
            let cut: String = toast
                .message
                .chars()
                .take(max_msg_len.saturating_sub(3))
                .collect();
            format!("{}...", cut)
        } else {
            toast.message.clone()
        };

        let line = Line::from(vec![
            Span::styled(
                format!("[{}] ", icon),
                Style::default().fg(fg_color).bg(bg_color),
            ),
            Span::styled(msg, Style::default().fg(fg_color).bg(bg_color)),
        ]);

        let paragraph = Paragraph::new(line).style(Style::default().bg(bg_color));

        frame.render_widget(Clear, toast_area);
        frame.render_widget(paragraph, toast_area);
    }
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;
    use crate::panel::{ModuleStatus, PanelState};
    use crate::tui::TuiMessage;
    use protocol::parse_hosts;
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);

        // Should be centered
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.x + centered.width < area.width);
        assert!(centered.y + centered.height < area.height);
    }

    #[test]
    fn test_host_list_viewport() {
        let area = Rect::new(0, 0, 100, 40);
        // 40 - status - help - borders - header
        assert_eq!(host_list_viewport(area), 40 - 5 - 1 - 3);
        assert_eq!(host_list_viewport(Rect::new(0, 0, 10, 3)), 0);
    }

    #[test]
    fn test_render_loaded_list() {
        let mut app = App::new(Translations::english(), 50, "test".to_string());
        app.handle_message(TuiMessage::StatusRead(ModuleStatus {
            mode: Some("0".to_string()),
            version: Some("v1.0".to_string()),
            status: None,
        }));
        app.handle_message(TuiMessage::PanelRead(PanelState::default()));
        let ticket = app.hosts.begin_load();
        app.handle_message(TuiMessage::HostsLoaded(
            ticket,
            Ok(parse_hosts("0.0.0.0 ads.example.com\n127.0.0.1 custom.local\n")),
        ));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("ads.example.com"));
        assert!(text.contains("custom.local"));
        assert!(text.contains("v1.0"));
        assert!(text.contains("Error"));
        assert!(text.contains("Hosts (2/2)"));
        assert!(text.contains("Daily hosts update"));
    }

    #[test]
    fn test_rows_stay_aligned_with_header_in_either_pane() {
        let mut app = App::new(Translations::english(), 50, "test".to_string());
        let ticket = app.hosts.begin_load();
        app.hosts
            .apply_load(ticket, Ok(parse_hosts("0.0.0.0 ads.example.com\n")));

        for pane in [ActivePane::Hosts, ActivePane::Panel] {
            app.active_pane = pane;
            let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
            terminal.draw(|f| render(f, &app)).unwrap();
            let text = buffer_text(&terminal);

            let header = text.lines().find(|l| l.contains("address")).unwrap();
            let row = text.lines().find(|l| l.contains("ads.example.com")).unwrap();
            assert_eq!(
                header.find("address"),
                row.find("0.0.0.0"),
                "misaligned with {:?} active",
                pane
            );
        }
    }

    #[test]
    fn test_render_empty_state() {
        let mut app = App::new(Translations::english(), 50, "test".to_string());
        let ticket = app.hosts.begin_load();
        app.hosts.apply_load(ticket, Err("gone".to_string()));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Failed to load hosts: gone"));
    }
}
