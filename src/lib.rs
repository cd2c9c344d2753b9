//! Valtorix - a mock multi-tab terminal for SOC training
//!
//! Every command is simulated with canned output: nothing is executed and no
//! network traffic is generated. The library exposes the emulation core so it
//! can be driven by the bundled TUI or by any other front end.
//!
//! # Modules
//!
//! - [`session`]: sessions and the tab manager that owns them
//! - [`terminal`]: line buffer, prompt, command dispatcher, render surface and
//!   the interactive front end
//! - [`config`]: YAML configuration
//! - [`keybindings`]: tab-level keyboard shortcuts
//! - [`colors`]: theme colour parsing and segment styles
//! - [`error`]: command error taxonomy and exit codes

pub mod colors;
pub mod config;
pub mod error;
pub mod keybindings;
pub mod session;
pub mod terminal;
