//! Seams between the puzzle and whatever embeds it.
//!
//! The core never draws, plays audio or talks to the surrounding game on its
//! own; it calls into a [`Host`] for lifecycle signals and a [`Surface`] for
//! everything the player sees, hears or feels.

use crate::color::Color;

/// Punch strength for ordinary presses
pub const LIGHT_PUNCH: f32 = 0.2;

/// Punch strength for an incorrect pick
pub const STRONG_PUNCH: f32 = 1.0;

/// Sounds the puzzle asks the host to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Press,
    Solve,
}

impl Sound {
    pub fn name(self) -> &'static str {
        match self {
            Sound::Press => "press",
            Sound::Solve => "solve",
        }
    }
}

/// Lifecycle notifications, fire and forget
pub trait Host {
    /// The puzzle is solved (or was given up on, see `FailurePolicy`)
    fn handle_pass(&mut self);
    /// The player picked a wrong cell
    fn handle_strike(&mut self);
}

/// Everything visual, audible and tactile
pub trait Surface {
    fn play_sound(&mut self, sound: Sound, cell: Option<usize>);
    fn punch(&mut self, cell: usize, strength: f32);
    fn set_cell_colors(&mut self, cell: usize, primary: Color, indicator: Color);
    /// Selection dot on a cell
    fn set_dot(&mut self, cell: usize, on: bool);
    /// Highlight border on a cell
    fn set_border(&mut self, cell: usize, on: bool);
    /// Colorblind label; `None` hides it
    fn set_label(&mut self, cell: usize, label: Option<char>);
    fn set_solved_indicator(&mut self, on: bool);
    fn set_incorrect_indicator(&mut self, on: bool);

    /// Turn off the dot and border of a cell
    fn clear_decals(&mut self, cell: usize) {
        self.set_dot(cell, false);
        self.set_border(cell, false);
    }
}

/// Host that ignores every signal
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn handle_pass(&mut self) {}
    fn handle_strike(&mut self) {}
}

/// Surface that renders nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn play_sound(&mut self, _sound: Sound, _cell: Option<usize>) {}
    fn punch(&mut self, _cell: usize, _strength: f32) {}
    fn set_cell_colors(&mut self, _cell: usize, _primary: Color, _indicator: Color) {}
    fn set_dot(&mut self, _cell: usize, _on: bool) {}
    fn set_border(&mut self, _cell: usize, _on: bool) {}
    fn set_label(&mut self, _cell: usize, _label: Option<char>) {}
    fn set_solved_indicator(&mut self, _on: bool) {}
    fn set_incorrect_indicator(&mut self, _on: bool) {}
}
