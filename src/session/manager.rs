//! Session manager - owns every open terminal tab and the focus pointer

use tracing::{debug, info};

use super::{Session, SessionDefaults, SessionId};
use crate::config::Config;
use crate::terminal::input::{self, InputEvent};

/// Owns the open sessions, in tab order, and routes input to the focused one
#[derive(Debug)]
pub struct SessionManager {
    sessions: Vec<Session>,
    focused: Option<SessionId>,
    /// Sessions created over the manager's lifetime, used for default names
    created: usize,
    defaults: SessionDefaults,
    keep_last_session: bool,
}

impl SessionManager {
    /// Create an empty manager. No session exists until [`Self::create_session`].
    #[must_use]
    pub fn new(defaults: SessionDefaults, keep_last_session: bool) -> Self {
        Self {
            sessions: Vec::with_capacity(8),
            focused: None,
            created: 0,
            defaults,
            keep_last_session,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SessionDefaults::from_config(config),
            config.terminal.keep_last_session,
        )
    }

    /// Open a new tab: banner and first prompt are written, and it takes focus
    pub fn create_session(&mut self) -> SessionId {
        self.created += 1;
        let mut session = Session::new(format!("Terminal {}", self.created), &self.defaults);
        session.start();

        let id = session.id();
        info!("Created session {} ({})", session.name(), id);

        self.sessions.push(session);
        self.focused = Some(id);
        id
    }

    /// Close a tab and release its surface.
    ///
    /// Returns `false` if the id is unknown, or if it is the only session and
    /// the manager is configured to keep one open.
    pub fn close_session(&mut self, id: SessionId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        if self.keep_last_session && self.sessions.len() == 1 {
            debug!("Refusing to close the last session {}", id);
            return false;
        }

        let mut session = self.sessions.remove(index);
        session.release();
        info!("Closed session {} ({})", session.name(), id);

        if self.focused == Some(id) {
            self.focused = self.sessions.first().map(Session::id);
            debug!("Focus moved to {:?}", self.focused);
        }
        true
    }

    /// Give focus to `id`. Unknown ids leave focus untouched.
    pub fn focus_session(&mut self, id: SessionId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        if self.focused != Some(id) {
            self.focused = Some(id);
            debug!("Focused session {}", id);
        }
        true
    }

    /// Change a tab's display name only
    pub fn rename_session(&mut self, id: SessionId, name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(session) => {
                let name = name.into();
                debug!("Renamed session {} to '{}'", id, name);
                session.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Focus the next tab, wrapping around
    pub fn focus_next(&mut self) {
        self.cycle_focus(true);
    }

    /// Focus the previous tab, wrapping around
    pub fn focus_prev(&mut self) {
        self.cycle_focus(false);
    }

    fn cycle_focus(&mut self, forward: bool) {
        let len = self.sessions.len();
        if len == 0 {
            return;
        }

        let current = self.focused_index().unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focused = Some(self.sessions[next].id());
        debug!("Switched to tab {}", next + 1);
    }

    /// Deliver one input unit to the focused session
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(session) = self.focused_mut() {
            session.handle_input(event);
        }
    }

    /// Deliver a chunk of raw input to the focused session
    pub fn handle_data(&mut self, data: &str) {
        for event in input::decode(data) {
            self.handle_input(event);
        }
    }

    /// Clear the focused session's screen without touching its history.
    /// The prompt and any half-typed line are written back.
    pub fn clear_focused(&mut self) {
        if let Some(session) = self.focused_mut() {
            session.clear_screen();
        }
    }

    #[must_use]
    pub fn focused_id(&self) -> Option<SessionId> {
        self.focused
    }

    /// Position of the focused session in tab order
    #[must_use]
    pub fn focused_index(&self) -> Option<usize> {
        self.focused.and_then(|id| self.position(id))
    }

    #[must_use]
    pub fn focused(&self) -> Option<&Session> {
        self.focused.and_then(|id| self.get(id))
    }

    pub fn focused_mut(&mut self) -> Option<&mut Session> {
        let id = self.focused?;
        self.get_mut(id)
    }

    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    /// Sessions in tab order
    pub fn sessions(&self) -> impl Iterator<Item = &Session> + '_ {
        self.sessions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionDefaults::default(), true)
    }
}
