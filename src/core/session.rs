//! Session management
//!
//! Holds everything one run of the terminal accumulates: the output log, the
//! input line and the overlay, if one is up. Only the UI thread touches it.

use std::time::Instant;

use tracing::debug;

use super::overlay::{Overlay, CLOSING_MESSAGE};
use crate::history::InputHistory;

/// Stable handle to a printed line
pub type LineId = u64;

/// How a line is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The user's input echoed behind the prompt
    Echo,
    /// Regular output
    Output,
    /// Transient "working" line, removed once the work finishes
    Placeholder,
    /// Failure message
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub id: LineId,
    pub kind: LineKind,
    pub text: String,
}

/// Terminal session state
pub struct TerminalSession {
    /// Printed lines, oldest first
    lines: Vec<OutputLine>,
    next_id: LineId,
    /// Text being typed
    input: String,
    /// Submitted lines for Up/Down recall
    history: InputHistory,
    /// Whether the prompt row is shown
    input_visible: bool,
    /// Present while the `matrix` overlay is up
    overlay: Option<Overlay>,
}

impl Default for TerminalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSession {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_id: 1,
            input: String::new(),
            history: InputHistory::new(),
            input_visible: true,
            overlay: None,
        }
    }

    // ---- Output log ----

    /// Append a line of regular output
    pub fn print(&mut self, text: impl Into<String>) -> LineId {
        self.push(LineKind::Output, text.into())
    }

    pub fn print_error(&mut self, text: impl Into<String>) -> LineId {
        self.push(LineKind::Error, text.into())
    }

    pub fn print_placeholder(&mut self, text: impl Into<String>) -> LineId {
        self.push(LineKind::Placeholder, text.into())
    }

    pub fn echo(&mut self, text: impl Into<String>) -> LineId {
        self.push(LineKind::Echo, text.into())
    }

    fn push(&mut self, kind: LineKind, text: String) -> LineId {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(OutputLine { id, kind, text });
        id
    }

    /// Remove a line; false if it is already gone (e.g. after `clear`)
    pub fn remove_line(&mut self, id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    pub fn clear_output(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// Output text, one entry per printed line (tests and debug)
    #[allow(dead_code)]
    pub fn transcript(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[allow(dead_code)]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.text.contains(needle))
    }

    // ---- Input line ----

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn insert_char(&mut self, c: char) {
        self.history.reset_walk();
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.history.reset_walk();
        self.input.pop();
    }

    /// Hand the input buffer over, leaving it empty
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn history_mut(&mut self) -> &mut InputHistory {
        &mut self.history
    }

    /// Replace the input with an older history entry
    pub fn recall_older(&mut self) {
        if let Some(line) = self.history.older(&self.input) {
            self.input = line;
        }
    }

    /// Replace the input with a newer history entry (or the draft)
    pub fn recall_newer(&mut self) {
        if let Some(line) = self.history.newer() {
            self.input = line;
        }
    }

    pub fn is_input_visible(&self) -> bool {
        self.input_visible
    }

    // ---- Overlay ----

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut Overlay> {
        self.overlay.as_mut()
    }

    pub fn is_overlay_active(&self) -> bool {
        self.overlay.is_some()
    }

    /// Put an overlay up and hide the prompt; refused while one is up
    pub fn launch_overlay(&mut self, overlay: Overlay) -> bool {
        if self.overlay.is_some() {
            debug!("Overlay already active, ignoring launch");
            return false;
        }
        self.overlay = Some(overlay);
        self.input_visible = false;
        true
    }

    /// End the overlay early. Returns false when none was up.
    pub fn dismiss_overlay(&mut self) -> bool {
        match self.overlay.take() {
            Some(overlay) => {
                debug!("Overlay dismissed after {} frames", overlay.frames());
                self.input_visible = true;
                true
            }
            None => false,
        }
    }

    /// End the overlay if its time is up, printing the closing message once
    pub fn expire_overlay(&mut self, now: Instant) -> bool {
        if !self.overlay.as_ref().is_some_and(|o| o.is_expired(now)) {
            return false;
        }
        if let Some(overlay) = self.overlay.take() {
            debug!("Overlay finished after {} frames", overlay.frames());
        }
        self.print(CLOSING_MESSAGE);
        self.input_visible = true;
        true
    }
}
