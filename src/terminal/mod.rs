//! Terminal module for the Valtorix training terminal
//!
//! Submodules make up the emulation core:
//! - `input`: line buffer and key decoder
//! - `prompt`: `user@host:dir$ ` rendering
//! - `commands`: built-in command table and dispatcher
//! - `surface`: per-session styled output sink
//!
//! [`Terminal`] itself is the interactive front end: it owns the
//! [`SessionManager`], turns crossterm events into session input and draws
//! the focused surface with ratatui.

pub mod commands;
pub mod input;
pub mod prompt;
pub mod surface;

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal as RatatuiTerminal,
};
use std::io;
use tokio::time::{interval, Duration};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::colors::Palette;
use crate::config::Config;
use crate::keybindings::{Action, KeybindingManager};
use crate::session::{SessionId, SessionManager};

use self::input::InputEvent;
use self::surface::SurfaceLine;

/// Redraw rate; the core is synchronous so this only paces the UI
const TARGET_FPS: u64 = 60;

/// Pending tab rename started with the rename keybinding
#[derive(Debug)]
struct RenameState {
    id: SessionId,
    buffer: String,
}

/// Interactive multi-tab terminal
pub struct Terminal {
    config: Config,
    manager: SessionManager,
    keybindings: KeybindingManager,
    palette: Palette,
    rename: Option<RenameState>,
    should_quit: bool,
    dirty: bool,
    frame_count: u64,
}

impl Terminal {
    /// Create the terminal with its first session already open
    ///
    /// # Errors
    /// Does not fail with the current configuration options
    pub fn new(config: Config) -> Result<Self> {
        info!(
            "Initializing terminal as {}@{} (scrollback {}, tabs {})",
            config.environment.user,
            config.environment.host,
            config.terminal.scrollback_lines,
            config.terminal.enable_tabs
        );

        let mut manager = SessionManager::from_config(&config);
        manager.create_session();

        Ok(Self {
            keybindings: KeybindingManager::from_config(&config.keybindings),
            palette: Palette::from_theme(&config.theme),
            manager,
            config,
            rename: None,
            should_quit: false,
            dirty: true,
            frame_count: 0,
        })
    }

    #[must_use]
    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn is_renaming(&self) -> bool {
        self.rename.is_some()
    }

    /// Run the event loop until the user quits
    ///
    /// # Errors
    /// Returns an error if the host terminal cannot be set up, drawn to or restored
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context(
            "Failed to enable raw mode. Ensure you're running in a proper terminal emulator.",
        )?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            crossterm::event::EnableBracketedPaste,
            Show
        )
        .context("Failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal =
            RatatuiTerminal::new(backend).context("Failed to create terminal backend")?;

        let result = self.event_loop(&mut terminal).await;

        // Restore the host terminal even when the loop failed
        execute!(
            terminal.backend_mut(),
            crossterm::event::DisableBracketedPaste,
            LeaveAlternateScreen,
            Show
        )?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        info!("Terminal shutdown complete after {} frames", self.frame_count);
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut RatatuiTerminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let frame_duration = Duration::from_micros(1_000_000 / TARGET_FPS);
        let mut render_interval = interval(frame_duration);
        render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while !self.should_quit {
            tokio::select! {
                Ok(Ok(has_event)) = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(5))) => {
                    if has_event {
                        match event::read().context("Failed to read terminal event")? {
                            Event::Key(key) => self.handle_key_event(key),
                            Event::Paste(text) => self.handle_paste(&text),
                            Event::Resize(..) => self.dirty = true,
                            _ => {}
                        }
                    }
                }

                _ = render_interval.tick() => {
                    if self.dirty {
                        terminal.draw(|f| self.render(f))?;
                        self.dirty = false;
                        self.frame_count += 1;
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle one key press: rename mode, then tab actions, then session input
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.dirty = true;

        if self.rename.is_some() {
            self.handle_rename_key(key);
            return;
        }

        if let Some(action) = self.keybindings.get_action(key.code, key.modifiers) {
            if self.apply_action(action) {
                return;
            }
        }

        match (key.code, key.modifiers) {
            // Quit (Ctrl+C or Ctrl+D) - not in keybindings to avoid accidental rebinding
            (KeyCode::Char('c' | 'd'), KeyModifiers::CONTROL) => {
                debug!("Quit signal received");
                self.should_quit = true;
            }
            _ => self.manager.handle_input(InputEvent::from_key(&key)),
        }
    }

    /// Bracketed paste goes through the decoder character by character
    pub fn handle_paste(&mut self, text: &str) {
        if self.rename.is_none() {
            self.manager.handle_data(text);
            self.dirty = true;
        }
    }

    /// Returns `true` if the action was consumed
    fn apply_action(&mut self, action: Action) -> bool {
        let tabs = self.config.terminal.enable_tabs;
        match action {
            Action::NewTab if tabs => {
                self.manager.create_session();
            }
            Action::CloseTab if tabs => {
                if let Some(id) = self.manager.focused_id() {
                    self.manager.close_session(id);
                }
            }
            Action::NextTab if tabs => self.manager.focus_next(),
            Action::PrevTab if tabs => self.manager.focus_prev(),
            Action::RenameTab => {
                if let Some(session) = self.manager.focused() {
                    self.rename = Some(RenameState {
                        id: session.id(),
                        buffer: session.name().to_string(),
                    });
                }
            }
            Action::Clear => self.manager.clear_focused(),
            _ => return false,
        }
        true
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(state) = self.rename.take() {
                    let name = state.buffer.trim();
                    if !name.is_empty() {
                        self.manager.rename_session(state.id, name);
                    }
                }
            }
            KeyCode::Esc => self.rename = None,
            KeyCode::Backspace => {
                if let Some(state) = self.rename.as_mut() {
                    state.buffer.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(state) = self.rename.as_mut() {
                    state.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn render(&self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.size());

        self.render_tabs(f, chunks[0]);
        self.render_surface(f, chunks[1]);
        self.render_status(f, chunks[2]);
    }

    fn render_tabs(&self, f: &mut ratatui::Frame, area: Rect) {
        let titles: Vec<Line> = self
            .manager
            .sessions()
            .map(|s| Line::from(format!(" {} ", s.name())))
            .collect();

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::BOTTOM))
            .select(self.manager.focused_index().unwrap_or(0))
            .style(Style::default().fg(self.palette.tab_inactive.into()))
            .highlight_style(
                Style::default()
                    .fg(self.palette.tab_active.into())
                    .add_modifier(Modifier::BOLD),
            );

        f.render_widget(tabs, area);
    }

    fn render_surface(&self, f: &mut ratatui::Frame, area: Rect) {
        let Some(session) = self.manager.focused() else {
            return;
        };

        // Bottom-anchored: show only the last `area.height` lines, padding
        // above when there are fewer
        let lines: Vec<&SurfaceLine> = session.surface().lines().collect();
        let visible = usize::from(area.height);
        let skip = lines.len().saturating_sub(visible);
        let shown = lines.len() - skip;
        let pad = visible - shown;

        let text: Vec<Line> = std::iter::repeat_with(Line::default)
            .take(pad)
            .chain(lines[skip..].iter().map(|line| {
                Line::from(
                    line.iter()
                        .map(|seg| Span::styled(seg.text.clone(), self.palette.style(seg.style)))
                        .collect::<Vec<_>>(),
                )
            }))
            .collect();

        let paragraph =
            Paragraph::new(text).style(Style::default().bg(self.palette.background.into()));
        f.render_widget(paragraph, area);

        if self.rename.is_none() && shown > 0 {
            let row = pad + shown - 1;
            let col = UnicodeWidthStr::width(session.surface().current_line_text().as_str());
            let x = area.x + u16::try_from(col).unwrap_or(u16::MAX).min(area.width.saturating_sub(1));
            let y = area.y + u16::try_from(row).unwrap_or(0);
            f.set_cursor(x, y);
        }
    }

    fn render_status(&self, f: &mut ratatui::Frame, area: Rect) {
        let text = if let Some(state) = &self.rename {
            format!(" Rename tab: {}_  (Enter to apply, Esc to cancel)", state.buffer)
        } else {
            let kb = &self.config.keybindings;
            format!(
                " {} new | {} close | {}/{} switch | {} rename | Ctrl+C quit",
                kb.new_tab, kb.close_tab, kb.prev_tab, kb.next_tab, kb.rename_tab
            )
        };

        let status = Paragraph::new(text).style(
            Style::default()
                .fg(self.palette.accent.into())
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(status, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn type_text(terminal: &mut Terminal, text: &str) {
        for c in text.chars() {
            terminal.handle_key_event(key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_terminal_starts_with_one_session() {
        let terminal = Terminal::new(Config::default()).unwrap();
        assert_eq!(terminal.manager().len(), 1);
        assert!(terminal.manager().focused().is_some());
    }

    #[test]
    fn test_keys_reach_focused_session() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        type_text(&mut terminal, "ping 10.0.0.5");
        terminal.handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE));

        let session = terminal.manager().focused().unwrap();
        assert_eq!(session.history()[0].command, "ping 10.0.0.5");
    }

    #[test]
    fn test_tab_actions() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        terminal.handle_key_event(key(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert_eq!(terminal.manager().len(), 2);
        assert_eq!(terminal.manager().focused_index(), Some(1));

        terminal.handle_key_event(key(KeyCode::Right, KeyModifiers::ALT));
        assert_eq!(terminal.manager().focused_index(), Some(0));

        terminal.handle_key_event(key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(terminal.manager().len(), 1);

        // The last tab stays open under the default policy
        terminal.handle_key_event(key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(terminal.manager().len(), 1);
    }

    #[test]
    fn test_tabs_disabled_ignores_new_tab() {
        let mut config = Config::default();
        config.terminal.enable_tabs = false;
        let mut terminal = Terminal::new(config).unwrap();

        terminal.handle_key_event(key(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert_eq!(terminal.manager().len(), 1);
    }

    #[test]
    fn test_rename_mode() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        terminal.handle_key_event(key(KeyCode::F(2), KeyModifiers::NONE));
        assert!(terminal.is_renaming());

        for _ in 0.."Terminal 1".len() {
            terminal.handle_key_event(key(KeyCode::Backspace, KeyModifiers::NONE));
        }
        type_text(&mut terminal, "Recon");
        terminal.handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE));

        let session = terminal.manager().focused().unwrap();
        assert_eq!(session.name(), "Recon");
        assert!(session.history().is_empty());
        assert!(!terminal.is_renaming());
    }

    #[test]
    fn test_rename_cancel() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        terminal.handle_key_event(key(KeyCode::F(2), KeyModifiers::NONE));
        type_text(&mut terminal, "xyz");
        terminal.handle_key_event(key(KeyCode::Esc, KeyModifiers::NONE));

        assert_eq!(terminal.manager().focused().unwrap().name(), "Terminal 1");
    }

    #[test]
    fn test_altgr_at_sign_reaches_ssh() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        type_text(&mut terminal, "ssh alice");
        terminal.handle_key_event(key(
            KeyCode::Char('@'),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        ));
        type_text(&mut terminal, "bravo");
        terminal.handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE));

        let session = terminal.manager().focused().unwrap();
        assert_eq!(session.history()[0].command, "ssh alice@bravo");
        assert_eq!(session.environment().host, "bravo");
    }

    #[test]
    fn test_clear_keybinding_keeps_prompt_line() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        type_text(&mut terminal, "pin");
        terminal.handle_key_event(key(KeyCode::Char('l'), KeyModifiers::CONTROL));

        let session = terminal.manager().focused().unwrap();
        assert_eq!(session.surface().line_count(), 1);
        assert_eq!(
            session.surface().current_line_text(),
            "pasante@soc-valtorix:~$ pin"
        );
    }

    fn render_rows(terminal: &Terminal, width: u16, height: u16) -> Vec<String> {
        use ratatui::backend::TestBackend;
        let mut screen = RatatuiTerminal::new(TestBackend::new(width, height)).unwrap();
        screen.draw(|f| terminal.render(f)).unwrap();

        let buf = screen.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.get(x, y).symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_short_output_is_drawn_at_the_bottom() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        terminal.handle_key_event(key(KeyCode::Char('l'), KeyModifiers::CONTROL));

        // 2 tab rows, 7 surface rows, 1 status row
        let rows = render_rows(&terminal, 40, 10);
        assert_eq!(rows[8], "pasante@soc-valtorix:~$");
        assert!(rows[2..8].iter().all(String::is_empty));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        terminal.handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(terminal.should_quit());
    }

    #[test]
    fn test_paste_is_decoded() {
        let mut terminal = Terminal::new(Config::default()).unwrap();
        terminal.handle_paste("ssh alice@bravo\r");

        let session = terminal.manager().focused().unwrap();
        assert_eq!(session.environment().host, "bravo");
    }
}
