//! Render surface owned by a single session
//!
//! A surface is an append-only list of lines made of styled segments, plus a
//! `clear` operation. It never interprets escape sequences: styling travels as
//! a [`SegmentStyle`] tag and is resolved to real colours by the front end.

use std::collections::VecDeque;
use tracing::warn;

/// Default scrollback bound, matching the browser terminal this replaces
pub const DEFAULT_SCROLLBACK: usize = 1000;

/// Visual role of a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentStyle {
    Plain,
    User,
    Host,
    Path,
    Accent,
    Success,
    Error,
    Banner,
}

/// A run of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: SegmentStyle,
}

impl Segment {
    pub fn new(text: impl Into<String>, style: SegmentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SegmentStyle::Plain)
    }
}

/// One rendered row of the surface
pub type SurfaceLine = Vec<Segment>;

/// Append-only styled text sink bound one-to-one with a session
#[derive(Debug)]
pub struct RenderSurface {
    lines: VecDeque<SurfaceLine>,
    scrollback: usize,
    released: bool,
}

impl RenderSurface {
    /// Create a surface holding at most `scrollback` lines (minimum one)
    #[must_use]
    pub fn new(scrollback: usize) -> Self {
        let scrollback = scrollback.max(1);
        let mut lines = VecDeque::with_capacity(scrollback.min(256));
        lines.push_back(Vec::new());
        Self {
            lines,
            scrollback,
            released: false,
        }
    }

    /// Append text to the current line without breaking it
    pub fn write(&mut self, text: &str, style: SegmentStyle) {
        if !self.accepts_writes() || text.is_empty() {
            return;
        }

        let line = self.current_line_mut();
        match line.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => line.push(Segment::new(text, style)),
        }
    }

    /// Append a sequence of segments to the current line
    pub fn write_segments(&mut self, segments: &[Segment]) {
        for segment in segments {
            self.write(&segment.text, segment.style);
        }
    }

    /// Write text and terminate the line
    pub fn writeln(&mut self, text: &str, style: SegmentStyle) {
        self.write(text, style);
        self.newline();
    }

    /// Start a new line, dropping the oldest when scrollback is full
    pub fn newline(&mut self) {
        if !self.accepts_writes() {
            return;
        }

        self.lines.push_back(Vec::new());
        while self.lines.len() > self.scrollback {
            self.lines.pop_front();
        }
    }

    /// Remove the last character of the current line.
    ///
    /// Returns `false` when the current line is empty.
    pub fn erase_char(&mut self) -> bool {
        if !self.accepts_writes() {
            return false;
        }

        let line = self.current_line_mut();
        while let Some(last) = line.last_mut() {
            if last.text.pop().is_some() {
                if last.text.is_empty() {
                    line.pop();
                }
                return true;
            }
            line.pop();
        }
        false
    }

    /// Wipe everything shown so far
    pub fn clear(&mut self) {
        if !self.accepts_writes() {
            return;
        }
        self.lines.clear();
        self.lines.push_back(Vec::new());
    }

    /// Detach the surface from its session; later writes are discarded
    pub fn release(&mut self) {
        self.released = true;
        self.lines.clear();
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// All lines, oldest first. The last entry is the line being written.
    pub fn lines(&self) -> impl Iterator<Item = &SurfaceLine> + '_ {
        self.lines.iter()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of the line currently being written
    #[must_use]
    pub fn current_line_text(&self) -> String {
        self.lines.back().map(|l| line_text(l)).unwrap_or_default()
    }

    /// Whole surface as plain text, one `\n` per line break
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| line_text(l))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn accepts_writes(&self) -> bool {
        if self.released {
            warn!("Dropping write to a released render surface");
        }
        !self.released
    }

    fn current_line_mut(&mut self) -> &mut SurfaceLine {
        if self.lines.is_empty() {
            self.lines.push_back(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK)
    }
}

/// Concatenate the text of a line's segments
#[must_use]
pub fn line_text(line: &[Segment]) -> String {
    line.iter().map(|s| s.text.as_str()).collect()
}
