//! Typing banner shown in the header.
//!
//! What is on screen depends only on the time since start, so the render
//! loop can ask for the current frame without keeping any animation state.

use std::time::Duration;

/// Wait before the first character appears
pub const TYPING_DELAY: Duration = Duration::from_millis(500);
/// Time per typed character
pub const TYPING_INTERVAL: Duration = Duration::from_millis(120);
/// Half period of the cursor blink
const BLINK_HALF_PERIOD: Duration = Duration::from_millis(500);

pub struct TypingBanner {
    text: String,
}

impl TypingBanner {
    pub fn for_owner(owner: &str) -> Self {
        Self {
            text: format!("Heya, {} here!", owner),
        }
    }

    #[allow(dead_code)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters typed after `elapsed`
    pub fn typed_chars(&self, elapsed: Duration) -> usize {
        let total = self.text.chars().count();
        let Some(typing) = elapsed.checked_sub(TYPING_DELAY) else {
            return 0;
        };
        let steps = typing.as_millis() / TYPING_INTERVAL.as_millis() + 1;
        usize::try_from(steps).map_or(total, |s| s.min(total))
    }

    /// Text visible after `elapsed`, without the cursor
    pub fn visible(&self, elapsed: Duration) -> &str {
        let n = self.typed_chars(elapsed);
        match self.text.char_indices().nth(n) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    /// Whether the `|` cursor is lit
    pub fn cursor_on(elapsed: Duration) -> bool {
        (elapsed.as_millis() / BLINK_HALF_PERIOD.as_millis()) % 2 == 0
    }

    /// Whole header line for `elapsed`
    pub fn frame(&self, elapsed: Duration) -> String {
        let cursor = if Self::cursor_on(elapsed) { '|' } else { ' ' };
        format!("{}{}", self.visible(elapsed), cursor)
    }
}
