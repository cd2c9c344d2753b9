//! Line buffer and key decoder
//!
//! Turns raw input units into completed command lines. Only three units mean
//! anything: printable characters, backspace (127) and carriage return (13).
//! Every other control code, including the escape sequences sent by arrow
//! keys, is dropped without echo.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::surface::{RenderSurface, SegmentStyle};

/// Carriage return, sent by Enter
pub const KEY_SUBMIT: u32 = 13;

/// DEL, sent by Backspace
pub const KEY_BACKSPACE: u32 = 127;

/// First printable code point
const FIRST_PRINTABLE: u32 = 32;

/// A decoded input unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Printable(char),
    Backspace,
    Submit,
    Ignored,
}

impl InputEvent {
    /// Classify a single character by its code point
    #[must_use]
    pub fn from_char(c: char) -> Self {
        match u32::from(c) {
            KEY_SUBMIT => Self::Submit,
            KEY_BACKSPACE => Self::Backspace,
            code if code >= FIRST_PRINTABLE => Self::Printable(c),
            _ => Self::Ignored,
        }
    }

    /// Map a host terminal key press onto the same units
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return Self::Ignored;
        }

        match key.code {
            KeyCode::Enter => Self::Submit,
            KeyCode::Backspace => Self::Backspace,
            // AltGr arrives as CONTROL|ALT, so only letters count as chords
            KeyCode::Char(c)
                if c.is_ascii_alphabetic()
                    && key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Self::Ignored
            }
            KeyCode::Char(c) => Self::from_char(c),
            _ => Self::Ignored,
        }
    }
}

/// Decode a chunk of input (e.g. a paste) into units, in order
pub fn decode(data: &str) -> impl Iterator<Item = InputEvent> + '_ {
    data.chars().map(InputEvent::from_char)
}

/// Result of feeding one unit to a [`LineBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line is still being edited
    Editing,
    /// Enter was pressed. Holds the trimmed line, or `None` if it was blank.
    Submitted(Option<String>),
}

/// In-progress command line of one session
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    content: String,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one unit, echoing its visual effect on `surface`
    pub fn apply(&mut self, event: InputEvent, surface: &mut RenderSurface) -> LineOutcome {
        match event {
            InputEvent::Printable(c) => {
                self.content.push(c);
                let mut buf = [0u8; 4];
                surface.write(c.encode_utf8(&mut buf), SegmentStyle::Plain);
                LineOutcome::Editing
            }
            InputEvent::Backspace => {
                if self.content.pop().is_some() {
                    surface.erase_char();
                }
                LineOutcome::Editing
            }
            InputEvent::Submit => {
                surface.newline();
                let line = std::mem::take(&mut self.content);
                let trimmed = line.trim();
                LineOutcome::Submitted((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            InputEvent::Ignored => LineOutcome::Editing,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
