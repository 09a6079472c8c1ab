//! Core engine for the Palette Identification grid puzzle.
//!
//! A rule seed deterministically yields sixteen candidate bitmaps over an 8×8
//! grid. One of them is hidden behind a four-color palette chosen so that no
//! other candidate renders to the same picture, and the player proves they can
//! see through the palette by picking, stage after stage, the cells that share
//! the highlighted cell's hidden value.

pub mod bitmap;
pub mod color;
pub mod error;
pub mod host;
pub mod log;
pub mod module;
pub mod palette;
pub mod rule_seed;
pub mod stage;

pub use bitmap::Bitmap;
pub use color::{Color, DisplayColors};
pub use error::{CommandError, GenerationError};
pub use host::{Host, NullHost, NullSurface, Sound, Surface};
pub use log::{ModuleIdCounter, ModuleLog};
pub use module::{CellHandle, FailurePolicy, ModuleConfig, PaletteModule, PuzzleSummary};
pub use palette::{Palette, PaletteSynthesizer, Synthesis, SynthesisConfig};
pub use rule_seed::RuleSeedRng;
pub use stage::{FlashTimer, PickOutcome, StageEngine};

/// Cells along one side of the grid
pub const GRID_SIZE: usize = 8;
/// Cells in the grid
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;
/// Distinct symbolic values in a bitmap
pub const SYMBOL_COUNT: usize = 16;
/// Occurrences of each symbolic value in a bitmap
pub const COPIES_PER_SYMBOL: usize = CELL_COUNT / SYMBOL_COUNT;
/// Candidate bitmaps derived from a rule seed
pub const BITMAP_COUNT: usize = 16;
/// Color groups a palette maps onto
pub const GROUP_COUNT: usize = 4;
/// Correct picks that finish a stage
pub const PICKS_PER_STAGE: usize = COPIES_PER_SYMBOL;
/// Stages needed to solve the puzzle
pub const STAGE_COUNT: usize = 4;
