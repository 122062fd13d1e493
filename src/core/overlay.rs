//! Full-screen `matrix` overlay.
//!
//! The overlay owns its rain state and its deadline. The session holds it as
//! an `Option`: present while the overlay is on screen, absent otherwise. The
//! frame loop only steps an overlay the session still owns, so dropping it
//! both removes the surface and stops the drawing.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::ui::matrix::MatrixRain;

/// How long the overlay stays up unless `clear` ends it first
pub const OVERLAY_DURATION: Duration = Duration::from_secs(5);

/// Printed when the overlay ends by itself
pub const CLOSING_MESSAGE: &str = "Wake up, Neo...";

pub struct Overlay {
    rain: MatrixRain,
    deadline: Instant,
    frames: u64,
}

impl Overlay {
    /// Create an overlay covering a `cols` x `rows` viewport
    pub fn new(cols: u16, rows: u16, now: Instant) -> Self {
        Self {
            rain: MatrixRain::new(cols, rows),
            deadline: now + OVERLAY_DURATION,
            frames: 0,
        }
    }

    pub fn rain(&self) -> &MatrixRain {
        &self.rain
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draw one frame
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.rain.step(rng);
        self.frames += 1;
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.rain.resize(cols, rows);
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline() {
        let start = Instant::now();
        let overlay = Overlay::new(10, 5, start);
        assert!(!overlay.is_expired(start));
        assert!(!overlay.is_expired(start + Duration::from_millis(4999)));
        assert!(overlay.is_expired(start + OVERLAY_DURATION));
    }

    #[test]
    fn test_advance_counts_frames() {
        let mut rng = rand::rng();
        let mut overlay = Overlay::new(4, 4, Instant::now());
        overlay.advance(&mut rng);
        overlay.advance(&mut rng);
        assert_eq!(overlay.frames(), 2);
        assert_eq!(overlay.rain().drops(), &[3, 3, 3, 3]);
    }
}
