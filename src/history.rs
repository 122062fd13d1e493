//! Input history for folio
//!
//! Remembers submitted lines so Up/Down can bring them back to the prompt.
//! History lives for one run only.

/// Maximum number of history entries
const HISTORY_LIMIT: usize = 1000;

/// Submitted lines plus the position of an in-progress Up/Down walk
pub struct InputHistory {
    /// All entries (newest last)
    entries: Vec<String>,
    /// Maximum entries
    max_entries: usize,
    /// Index being shown while walking, `None` when not walking
    cursor: Option<usize>,
    /// What was typed before the walk started
    draft: String,
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: HISTORY_LIMIT,
            cursor: None,
            draft: String::new(),
        }
    }

    /// Record a submitted line
    pub fn add(&mut self, line: &str) {
        self.reset_walk();

        // Skip empty or whitespace-only lines
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        // Skip if same as last line (dedup consecutive)
        if self.entries.last().is_some_and(|last| last == trimmed) {
            return;
        }

        self.entries.push(trimmed.to_string());

        // Trim if exceeding limit
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    /// Step to an older entry. `current` is kept as the draft when the walk starts.
    pub fn older(&mut self, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        let index = match self.cursor {
            None => {
                self.draft = current.to_string();
                self.entries.len() - 1
            }
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(index);
        self.entries.get(index).cloned()
    }

    /// Step to a newer entry; walking past the newest restores the draft
    pub fn newer(&mut self) -> Option<String> {
        let index = self.cursor?;
        if index + 1 < self.entries.len() {
            self.cursor = Some(index + 1);
            self.entries.get(index + 1).cloned()
        } else {
            self.cursor = None;
            Some(std::mem::take(&mut self.draft))
        }
    }

    /// Forget the walk position (on edit or submit)
    pub fn reset_walk(&mut self) {
        self.cursor = None;
        self.draft.clear();
    }

    /// Get entry count
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
