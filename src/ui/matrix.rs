//! Falling-glyph rain drawn by the `matrix` overlay.
//!
//! One terminal cell holds one glyph. Every column carries a drop position
//! that advances one row per step; once a drop has passed the bottom edge it
//! restarts from the top with a small chance per step, so columns drift out
//! of phase. Drawn cells fade a little every step, leaving trails.

use rand::Rng;

/// Half-width katakana (single cell wide), then Latin capitals and digits
pub const GLYPHS: &[char] = &[
    'ｦ', 'ｧ', 'ｨ', 'ｩ', 'ｪ', 'ｫ', 'ｬ', 'ｭ', 'ｮ', 'ｯ', 'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ',
    'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ', 'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ',
    'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ', 'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ', 'ﾓ', 'ﾔ', 'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ',
    'ﾝ', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q',
    'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8',
    '9',
];

/// Probability per step that a drop past the bottom restarts
pub const RESET_CHANCE: f64 = 0.025;

/// Brightness kept per step
const FADE: f32 = 0.88;

/// Cells dimmer than this are drawn blank
pub const VISIBLE_THRESHOLD: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainCell {
    pub glyph: char,
    /// 255 for a fresh glyph, decaying towards 0
    pub brightness: u8,
}

impl Default for RainCell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            brightness: 0,
        }
    }
}

/// Rain state for a `cols` x `rows` surface
#[derive(Debug, Clone)]
pub struct MatrixRain {
    cols: u16,
    rows: u16,
    /// 1-based row of the next glyph per column
    drops: Vec<u32>,
    cells: Vec<RainCell>,
}

impl MatrixRain {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            drops: vec![1; cols as usize],
            cells: vec![RainCell::default(); cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[allow(dead_code)]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[allow(dead_code)]
    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&RainCell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.cols as usize + col as usize)
    }

    /// Advance every column by one row
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            cell.brightness = (cell.brightness as f32 * FADE) as u8;
        }

        let cols = self.cols as usize;
        for (col, drop) in self.drops.iter_mut().enumerate() {
            let glyph = GLYPHS[rng.random_range(0..GLYPHS.len())];
            let row = *drop as usize;
            if row >= 1 && row <= self.rows as usize {
                self.cells[(row - 1) * cols + col] = RainCell {
                    glyph,
                    brightness: u8::MAX,
                };
            }

            if *drop > self.rows as u32 && rng.random::<f64>() < RESET_CHANCE {
                *drop = 0;
            }
            *drop += 1;
        }
    }

    /// Follow a viewport change; surviving columns keep their drops
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == self.cols && rows == self.rows {
            return;
        }

        let mut cells = vec![RainCell::default(); cols as usize * rows as usize];
        for row in 0..rows.min(self.rows) {
            for col in 0..cols.min(self.cols) {
                if let Some(cell) = self.cell(col, row) {
                    cells[row as usize * cols as usize + col as usize] = *cell;
                }
            }
        }

        self.drops.resize(cols as usize, 1);
        self.cells = cells;
        self.cols = cols;
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_glyphs_are_single_width() {
        use unicode_width::UnicodeWidthChar;
        for g in GLYPHS {
            assert_eq!(g.width(), Some(1), "{:?} is not single width", g);
        }
    }

    #[test]
    fn test_each_column_advances_one_row() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut rain = MatrixRain::new(12, 10);

        rain.step(&mut rng);
        assert!(rain.drops().iter().all(|&d| d == 2));

        // First step draws at the top row of every column
        for col in 0..12 {
            let cell = rain.cell(col, 0).unwrap();
            assert_eq!(cell.brightness, u8::MAX);
            assert!(GLYPHS.contains(&cell.glyph));
        }

        rain.step(&mut rng);
        assert!(rain.drops().iter().all(|&d| d == 3));
        // The earlier row has started to fade
        assert!(rain.cell(0, 0).unwrap().brightness < u8::MAX);
        assert_eq!(rain.cell(0, 1).unwrap().brightness, u8::MAX);
    }

    #[test]
    fn test_drops_past_bottom_eventually_reset() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rain = MatrixRain::new(20, 5);

        let mut saw_reset = false;
        for _ in 0..400 {
            rain.step(&mut rng);
            if rain.drops().iter().any(|&d| d == 1) {
                saw_reset = true;
                break;
            }
        }
        assert!(saw_reset);
    }

    #[test]
    fn test_resize_matches_viewport() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut rain = MatrixRain::new(8, 4);
        rain.step(&mut rng);

        rain.resize(12, 6);
        assert_eq!(rain.cols(), 12);
        assert_eq!(rain.rows(), 6);
        assert_eq!(rain.drops().len(), 12);
        assert_eq!(rain.cell(0, 0).unwrap().brightness, u8::MAX);
        assert_eq!(rain.cell(11, 0).unwrap().brightness, 0);

        rain.resize(3, 2);
        assert_eq!(rain.drops().len(), 3);
        assert!(rain.cell(3, 0).is_none());
    }
}
