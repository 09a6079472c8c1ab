use crossterm::style::Color;
use palette_core::{Host, Sound, Surface, CELL_COUNT};
use std::time::{Duration, Instant};

/// How long a pressed cell stays visibly pushed in
const PUNCH_DURATION: Duration = Duration::from_millis(150);

/// Counts the lifecycle signals the puzzle sends
#[derive(Debug, Clone, Default)]
pub struct StatusHost {
    pub passes: usize,
    pub strikes: usize,
}

impl Host for StatusHost {
    fn handle_pass(&mut self) {
        self.passes += 1;
    }

    fn handle_strike(&mut self) {
        self.strikes += 1;
    }
}

/// Visual state of one grid cell
#[derive(Debug, Clone, Copy)]
pub struct CellView {
    pub primary: Color,
    pub indicator: Color,
    pub dot: bool,
    pub border: bool,
    pub label: Option<char>,
}

impl Default for CellView {
    fn default() -> Self {
        Self {
            primary: Color::Black,
            indicator: Color::White,
            dot: false,
            border: false,
            label: None,
        }
    }
}

/// Everything the puzzle has asked the terminal to show
#[derive(Debug, Clone)]
pub struct BoardView {
    pub cells: [CellView; CELL_COUNT],
    pub solved: bool,
    pub incorrect: bool,
    /// Most recent press and when it lands back up
    pub punch: Option<(usize, Instant)>,
    /// Ring the terminal bell on the next frame
    pub bell: bool,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cells: [CellView::default(); CELL_COUNT],
            solved: false,
            incorrect: false,
            punch: None,
            bell: false,
        }
    }
}

impl BoardView {
    /// Whether `cell` should be drawn pushed in at `now`
    pub fn is_punched(&self, cell: usize, now: Instant) -> bool {
        matches!(self.punch, Some((c, until)) if c == cell && now < until)
    }
}

fn to_terminal(color: palette_core::Color) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::Rgb { r, g, b }
}

impl Surface for BoardView {
    fn play_sound(&mut self, sound: Sound, _cell: Option<usize>) {
        // The terminal only has a bell; save it for the solve
        if sound == Sound::Solve {
            self.bell = true;
        }
    }

    fn punch(&mut self, cell: usize, strength: f32) {
        let hold = PUNCH_DURATION.mul_f32(strength.max(0.2) / 0.2);
        self.punch = Some((cell, Instant::now() + hold));
    }

    fn set_cell_colors(
        &mut self,
        cell: usize,
        primary: palette_core::Color,
        indicator: palette_core::Color,
    ) {
        self.cells[cell].primary = to_terminal(primary);
        self.cells[cell].indicator = to_terminal(indicator);
    }

    fn set_dot(&mut self, cell: usize, on: bool) {
        self.cells[cell].dot = on;
    }

    fn set_border(&mut self, cell: usize, on: bool) {
        self.cells[cell].border = on;
    }

    fn set_label(&mut self, cell: usize, label: Option<char>) {
        self.cells[cell].label = label;
    }

    fn set_solved_indicator(&mut self, on: bool) {
        self.solved = on;
    }

    fn set_incorrect_indicator(&mut self, on: bool) {
        self.incorrect = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_convert_to_rgb() {
        let mut board = BoardView::default();
        board.set_cell_colors(
            3,
            palette_core::Color::rgb(1.0, 0.0, 0.0),
            palette_core::Color::rgb(0.0, 0.0, 1.0),
        );
        assert_eq!(board.cells[3].primary, Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(board.cells[3].indicator, Color::Rgb { r: 0, g: 0, b: 255 });
    }

    #[test]
    fn test_strong_punch_lasts_longer() {
        let mut board = BoardView::default();
        let start = Instant::now();
        board.punch(7, 1.0);
        assert!(board.is_punched(7, start));
        assert!(!board.is_punched(8, start));
        assert!(board.is_punched(7, start + PUNCH_DURATION * 2));
        assert!(!board.is_punched(7, start + PUNCH_DURATION * 10));
    }

    #[test]
    fn test_only_solve_rings_bell() {
        let mut board = BoardView::default();
        board.play_sound(Sound::Press, Some(0));
        assert!(!board.bell);
        board.play_sound(Sound::Solve, None);
        assert!(board.bell);
    }
}
