//! Falling glyph columns over a fading veil.
//!
//! This effect never clears the canvas: each frame paints a low-alpha
//! rectangle first, so older glyphs fade out instead of vanishing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Effect, EffectName};
use crate::input::MouseState;
use crate::surface::{Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

pub const FONT_PX: f64 = 14.0;
/// Chance per frame that a drop past the bottom restarts at the top.
const RESET_CHANCE: f64 = 0.025;
/// Rows a drop may start above the canvas, and may overshoot below it before
/// it is forced back to the top.
const SLACK_ROWS: f64 = 100.0;

const SYMBOLS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    '@', '#', '$', '%', '^', '&', '*', '(', ')', 'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク',
    'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ', 'チ', 'ツ', 'テ', 'ト',
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Row of the head glyph; negative while still above the canvas.
    pub row: f64,
    pub glyph: char,
}

#[derive(Debug)]
pub struct MatrixEffect {
    viewport: Viewport,
    rng: ChaCha8Rng,
    columns: Vec<Column>,
}

impl MatrixEffect {
    pub fn new(seed: u64) -> Self {
        Self {
            viewport: Viewport::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            columns: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn column_count(&self) -> usize {
        (self.viewport.width / FONT_PX).floor().max(0.0) as usize
    }

    fn random_glyph(rng: &mut ChaCha8Rng) -> char {
        SYMBOLS[rng.gen_range(0..SYMBOLS.len())]
    }
}

impl Effect for MatrixEffect {
    fn name(&self) -> EffectName {
        EffectName::Matrix
    }

    fn bind(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_particles(&mut self) {
        let columns = self.column_count();
        let rng = &mut self.rng;
        self.columns = (0..columns)
            .map(|_| Column {
                row: rng.gen::<f64>() * -SLACK_ROWS,
                glyph: Self::random_glyph(rng),
            })
            .collect();
    }

    fn update(&mut self, _mouse: &MouseState) {
        let bottom = self.viewport.height;
        for drop in &mut self.columns {
            drop.row += 1.0;
            let y = drop.row * FONT_PX;
            if (y > bottom && self.rng.gen::<f64>() < RESET_CHANCE)
                || y > bottom + SLACK_ROWS * FONT_PX
            {
                drop.row = 0.0;
            }
            drop.glyph = Self::random_glyph(&mut self.rng);
        }
    }

    fn draw(&self, surface: &mut dyn Surface, theme: Theme) {
        let (veil, ink) = if theme.is_dark() {
            (Rgba::new(10, 10, 10, 0.05), Rgba::new(0, 255, 65, 0.8))
        } else {
            (Rgba::new(245, 245, 245, 0.05), Rgba::new(0, 153, 38, 0.9))
        };
        surface.veil(veil);

        for (column, drop) in self.columns.iter().enumerate() {
            let at = Point::new(column as f64 * FONT_PX, drop.row * FONT_PX);
            surface.fill_glyph(drop.glyph, at, FONT_PX, ink);
        }
    }

    fn destroy(&mut self) {
        self.columns.clear();
    }

    fn len(&self) -> usize {
        self.columns.len()
    }

    fn positions(&self) -> Vec<Point> {
        self.columns
            .iter()
            .enumerate()
            .map(|(column, drop)| Point::new(column as f64 * FONT_PX, drop.row * FONT_PX))
            .collect()
    }

    fn margin(&self) -> f64 {
        (SLACK_ROWS + 1.0) * FONT_PX
    }

    fn clears_each_frame(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_drop_per_column() {
        let mut fx = MatrixEffect::new(1);
        fx.bind(Viewport::new(500.0, 300.0));
        fx.create_particles();
        assert_eq!(fx.len(), 35);
        assert!(fx.columns().iter().all(|d| d.row <= 0.0 && d.row > -SLACK_ROWS));
    }

    #[test]
    fn drops_fall_one_row_per_frame() {
        let mut fx = MatrixEffect::new(1);
        fx.bind(Viewport::new(140.0, 1000.0));
        fx.create_particles();
        let before: Vec<f64> = fx.columns().iter().map(|d| d.row).collect();
        fx.update(&MouseState::new(150.0));
        for (old, new) in before.iter().zip(fx.columns()) {
            assert_eq!(new.row, old + 1.0);
        }
    }

    #[test]
    fn overshooting_drop_is_forced_back_to_top() {
        let mut fx = MatrixEffect::new(1);
        fx.bind(Viewport::new(14.0, 140.0));
        fx.create_particles();
        fx.columns[0].row = 10.0 + SLACK_ROWS;
        fx.update(&MouseState::new(150.0));
        assert_eq!(fx.columns()[0].row, 0.0);
    }

    #[test]
    fn opts_out_of_shared_clear() {
        assert!(!MatrixEffect::new(1).clears_each_frame());
    }

    #[test]
    fn drop_past_bottom_resets_only_occasionally() {
        let mut fx = MatrixEffect::new(3);
        fx.bind(Viewport::new(14.0, 140.0));
        fx.create_particles();
        let mouse = MouseState::new(150.0);

        let trials = 4_000;
        let mut resets = 0;
        for _ in 0..trials {
            // Row 20 sits below the 10-row canvas but well inside the slack.
            fx.columns[0].row = 20.0;
            fx.update(&mouse);
            match fx.columns()[0].row {
                row if row == 0.0 => resets += 1,
                row => assert_eq!(row, 21.0),
            }
        }
        // About 2.5% of frames: expected 100.
        assert!((50..=160).contains(&resets), "resets {resets}");
    }

    #[test]
    fn drop_above_bottom_never_resets() {
        let mut fx = MatrixEffect::new(3);
        fx.bind(Viewport::new(14.0, 140.0));
        fx.create_particles();
        let mouse = MouseState::new(150.0);
        for _ in 0..1_000 {
            fx.columns[0].row = 5.0;
            fx.update(&mouse);
            assert_eq!(fx.columns()[0].row, 6.0);
        }
    }
}
