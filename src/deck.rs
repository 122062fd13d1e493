//! Experience deck
//!
//! A small carousel of work-experience cards shown above the terminal. One
//! card sits in the center with its neighbours on either side; the rest are
//! hidden. Moves are throttled so holding a key does not spin the deck.

use std::time::{Duration, Instant};

use tracing::debug;

/// Minimum time between two moves
pub const NAVIGATE_THROTTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub place: String,
    pub period: String,
}

impl Card {
    fn new(title: &str, place: &str, period: &str) -> Self {
        Self {
            title: title.to_string(),
            place: place.to_string(),
            period: period.to_string(),
        }
    }
}

/// Where a card is drawn relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Left,
    Center,
    Right,
    Hidden,
}

pub struct ExperienceDeck {
    cards: Vec<Card>,
    current: usize,
    last_move: Option<Instant>,
}

impl Default for ExperienceDeck {
    fn default() -> Self {
        Self::new(vec![
            Card::new("API Development Intern", "Pair Bytes", "Jun–Aug 2023"),
            Card::new(
                "Research Assistant, Quantum Computing & AI",
                "Adelphi University",
                "Summer–Fall, Current",
            ),
            Card::new("B.S. Computer Science", "Adelphi University", "Current"),
        ])
    }
}

impl ExperienceDeck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            current: 0,
            last_move: None,
        }
    }

    #[allow(dead_code)]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[allow(dead_code)]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Step by `direction` (+1 next, -1 previous), wrapping around.
    ///
    /// Returns false when throttled or when there is nothing to move.
    pub fn navigate(&mut self, direction: isize, now: Instant) -> bool {
        if self.cards.is_empty() {
            return false;
        }
        if let Some(last) = self.last_move {
            if now.saturating_duration_since(last) < NAVIGATE_THROTTLE {
                return false;
            }
        }

        let n = self.cards.len() as isize;
        self.current = (self.current as isize + direction).rem_euclid(n) as usize;
        self.last_move = Some(now);
        debug!("Deck moved to card {}", self.current);
        true
    }

    /// Placement of the card at `index`
    pub fn placement(&self, index: usize) -> Placement {
        let n = self.cards.len() as isize;
        let offset = index as isize - self.current as isize;

        if offset == 0 {
            Placement::Center
        } else if offset == 1 || offset == -(n - 1) {
            Placement::Right
        } else if offset == -1 || offset == n - 1 {
            Placement::Left
        } else {
            Placement::Hidden
        }
    }

    /// Card at a given placement, if any
    pub fn card_at(&self, placement: Placement) -> Option<&Card> {
        (0..self.cards.len())
            .find(|&i| self.placement(i) == placement)
            .and_then(|i| self.cards.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(n: usize) -> ExperienceDeck {
        ExperienceDeck::new(
            (0..n)
                .map(|i| Card::new(&format!("Card {}", i), "Somewhere", "Now"))
                .collect(),
        )
    }

    #[test]
    fn test_wraps_both_ways() {
        let start = Instant::now();
        let mut d = deck(4);

        assert!(d.navigate(-1, start));
        assert_eq!(d.current(), 3);

        let later = start + NAVIGATE_THROTTLE;
        assert!(d.navigate(1, later));
        assert_eq!(d.current(), 0);
    }

    #[test]
    fn test_throttle() {
        let start = Instant::now();
        let mut d = deck(4);

        assert!(d.navigate(1, start));
        assert!(!d.navigate(1, start + Duration::from_millis(499)));
        assert_eq!(d.current(), 1);
        assert!(d.navigate(1, start + Duration::from_millis(500)));
        assert_eq!(d.current(), 2);
    }

    #[test]
    fn test_placement() {
        let mut d = deck(5);
        let start = Instant::now();
        let placements: Vec<_> = (0..5).map(|i| d.placement(i)).collect();
        assert_eq!(
            placements,
            vec![
                Placement::Center,
                Placement::Right,
                Placement::Hidden,
                Placement::Hidden,
                Placement::Left,
            ]
        );

        d.navigate(-1, start);
        assert_eq!(d.placement(4), Placement::Center);
        assert_eq!(d.placement(0), Placement::Right);
        assert_eq!(d.placement(3), Placement::Left);
        assert_eq!(d.card_at(Placement::Right).map(|c| c.title.as_str()), Some("Card 0"));
    }

    #[test]
    fn test_two_cards_prefer_right() {
        let d = deck(2);
        assert_eq!(d.placement(1), Placement::Right);
        assert_eq!(d.card_at(Placement::Left), None);
    }

    #[test]
    fn test_empty_deck() {
        let mut d = deck(0);
        assert!(!d.navigate(1, Instant::now()));
        assert_eq!(d.card_at(Placement::Center), None);
    }

    #[test]
    fn test_default_deck() {
        let d = ExperienceDeck::default();
        assert_eq!(d.cards().len(), 3);
        assert_eq!(d.card_at(Placement::Center).map(|c| c.place.as_str()), Some("Pair Bytes"));
    }
}
