//! Terminal sessions
//!
//! A [`Session`] is one isolated terminal instance: its own line buffer,
//! simulated environment, command history and render surface. Sessions are
//! owned by the [`SessionManager`], which hands input to the focused one.

pub mod manager;

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::config::Config;
use crate::terminal::commands;
use crate::terminal::input::{InputEvent, LineBuffer, LineOutcome};
use crate::terminal::prompt;
use crate::terminal::surface::{RenderSurface, SegmentStyle, DEFAULT_SCROLLBACK};

pub use manager::SessionManager;

/// Local identity every session starts in and `exit` returns to
pub const DEFAULT_USER: &str = "pasante";
pub const DEFAULT_HOST: &str = "soc-valtorix";
pub const DEFAULT_SHELL: &str = "bash";
pub const HOME_DIR: &str = "~";

const BANNER: [&str; 4] = [
    "╔══════════════════════════════════════════════════╗",
    "║  CYBER VALTORIX - SOC Training Platform         ║",
    "║  Terminal Emulator v2.0                          ║",
    "╚══════════════════════════════════════════════════╝",
];

/// Opaque session identifier, unique for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminal-{}", self.0.simple())
    }
}

/// Simulated identity shown in the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub user: String,
    pub host: String,
    pub shell: String,
}

impl Environment {
    pub fn new(user: impl Into<String>, host: impl Into<String>, shell: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            shell: shell.into(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_USER, DEFAULT_HOST, DEFAULT_SHELL)
    }
}

/// One executed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub command: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
    pub exit_code: i32,
}

/// Values every new session is created with
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub environment: Environment,
    pub working_directory: String,
    pub scrollback: usize,
}

impl SessionDefaults {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let env = &config.environment;
        Self {
            environment: Environment::new(env.user.as_str(), env.host.as_str(), env.shell.as_str()),
            working_directory: env.working_dir.clone(),
            scrollback: config.terminal.scrollback_lines,
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            working_directory: HOME_DIR.to_string(),
            scrollback: DEFAULT_SCROLLBACK,
        }
    }
}

/// One logical terminal instance
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    name: String,
    working_directory: String,
    environment: Environment,
    local_environment: Environment,
    history: Vec<HistoryEntry>,
    active: bool,
    line_buffer: LineBuffer,
    surface: RenderSurface,
}

impl Session {
    /// Create an empty session with a fresh surface. Nothing is written yet.
    pub fn new(name: impl Into<String>, defaults: &SessionDefaults) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            working_directory: defaults.working_directory.clone(),
            environment: defaults.environment.clone(),
            local_environment: defaults.environment.clone(),
            history: Vec::new(),
            active: true,
            line_buffer: LineBuffer::new(),
            surface: RenderSurface::new(defaults.scrollback),
        }
    }

    /// Write the welcome banner and the first prompt
    pub fn start(&mut self) {
        for line in BANNER {
            self.surface.writeln(line, SegmentStyle::Banner);
        }
        self.surface.newline();
        self.surface.write("Type ", SegmentStyle::Plain);
        self.surface.write("help", SegmentStyle::Accent);
        self.surface.writeln(" to see available commands.", SegmentStyle::Plain);
        self.surface.newline();
        self.write_prompt();
    }

    /// Feed one input unit to this session
    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.active {
            return;
        }

        if let LineOutcome::Submitted(line) = self.line_buffer.apply(event, &mut self.surface) {
            if let Some(line) = line {
                commands::dispatch(self, &line);
            }
            self.write_prompt();
        }
    }

    /// Feed a chunk of raw input, one character at a time
    pub fn handle_data(&mut self, data: &str) {
        for event in crate::terminal::input::decode(data) {
            self.handle_input(event);
        }
    }

    fn write_prompt(&mut self) {
        prompt::write_prompt(&mut self.surface, &self.environment, &self.working_directory);
    }

    /// Wipe the surface, leaving only the prompt and the line being typed
    pub fn clear_screen(&mut self) {
        self.surface.clear();
        self.write_prompt();
        self.surface
            .write(self.line_buffer.as_str(), SegmentStyle::Plain);
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    #[must_use]
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Move the simulated working directory; takes effect from the next prompt
    pub fn set_working_directory(&mut self, dir: impl Into<String>) {
        self.working_directory = dir.into();
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Whether a simulated remote login is in effect
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.environment.user != self.local_environment.user
            || self.environment.host != self.local_environment.host
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The uncommitted input line
    #[must_use]
    pub fn pending_input(&self) -> &str {
        self.line_buffer.as_str()
    }

    #[must_use]
    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub(crate) fn surface_mut(&mut self) -> &mut RenderSurface {
        &mut self.surface
    }

    /// Overwrite user and host, as a simulated login does
    pub(crate) fn login(&mut self, user: &str, host: &str) {
        self.environment.user = user.to_string();
        self.environment.host = host.to_string();
    }

    /// Restore the local user and host; idempotent
    pub(crate) fn logout(&mut self) {
        self.environment.user.clone_from(&self.local_environment.user);
        self.environment.host.clone_from(&self.local_environment.host);
    }

    pub(crate) fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Mark inactive and detach the surface. Called once, on close.
    pub(crate) fn release(&mut self) {
        self.active = false;
        self.line_buffer = LineBuffer::new();
        self.surface.release();
    }
}
