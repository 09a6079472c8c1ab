use crate::bitmap::{hex_digit, Bitmap};
use crate::host::{Host, Sound, Surface, LIGHT_PUNCH, STRONG_PUNCH};
use crate::log::ModuleLog;
use crate::palette::Palette;
use crate::{CELL_COUNT, PICKS_PER_STAGE, STAGE_COUNT};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::{Duration, Instant};

/// Default time the incorrect indicator stays lit after a strike
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_secs(1);

/// Result of a single press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// No highlight yet, or the cell was already picked this stage
    Ignored { selected: bool },
    /// Correct pick, stage still in progress
    Correct,
    /// Correct pick that finished the stage; a new highlight is up
    StageComplete,
    /// Correct pick that finished the last stage
    Solved,
    /// Wrong pick; a strike was issued and the stage restarted
    Incorrect,
}

impl PickOutcome {
    /// Whether the pressed cell's dot should stay lit afterwards
    pub fn keeps_dot(self) -> bool {
        matches!(self, PickOutcome::Ignored { selected: true } | PickOutcome::Correct)
    }

    /// Whether this press was a new correct pick
    pub fn is_newly_correct(self) -> bool {
        matches!(
            self,
            PickOutcome::Correct | PickOutcome::StageComplete | PickOutcome::Solved
        )
    }
}

/// One-shot deadline for the strike indicator; starting it again replaces the
/// pending deadline
#[derive(Debug, Clone)]
pub struct FlashTimer {
    duration: Duration,
    deadline: Option<Instant>,
}

impl FlashTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    /// Start the flash, returning true if a pending one was replaced
    pub fn start(&mut self, now: Instant) -> bool {
        self.deadline.replace(now + self.duration).is_some()
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clear the deadline if it has passed, returning true when it did
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Runtime state machine: one highlight per stage, four matching picks per
/// stage, four stages to solve
#[derive(Debug, Clone)]
pub struct StageEngine {
    bitmap: Bitmap,
    palette: Palette,
    rng: StdRng,
    log: ModuleLog,
    highlighted: Option<usize>,
    selected: Vec<usize>,
    used_highlights: Vec<usize>,
    solved: bool,
    colorblind: bool,
    flash: FlashTimer,
}

impl StageEngine {
    pub fn new(bitmap: Bitmap, palette: Palette, rng: StdRng, log: ModuleLog) -> Self {
        Self {
            bitmap,
            palette,
            rng,
            log,
            highlighted: None,
            selected: Vec::with_capacity(PICKS_PER_STAGE),
            used_highlights: Vec::with_capacity(STAGE_COUNT),
            solved: false,
            colorblind: false,
            flash: FlashTimer::new(DEFAULT_FLASH_DURATION),
        }
    }

    pub fn with_flash_duration(mut self, duration: Duration) -> Self {
        self.flash = FlashTimer::new(duration);
        self
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn used_highlights(&self) -> &[usize] {
        &self.used_highlights
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_colorblind(&self) -> bool {
        self.colorblind
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_active()
    }

    /// Color group shown on a cell
    pub fn group_of(&self, cell: usize) -> u8 {
        self.palette.group(self.bitmap.get(cell))
    }

    /// Pick a fresh highlight that is neither the current one nor already used,
    /// and reset the stage
    pub fn generate(&mut self, surface: &mut impl Surface) {
        self.selected.clear();

        let current = self.highlighted;
        let cell = loop {
            let draw = self.rng.gen_range(0..CELL_COUNT);
            if current != Some(draw) && !self.used_highlights.contains(&draw) {
                break draw;
            }
        };
        self.highlighted = Some(cell);

        for px in 0..CELL_COUNT {
            surface.clear_decals(px);
        }
        surface.set_border(cell, true);

        self.log.info(format_args!(
            "Pixel {} is now highlighted. (Raw form {})",
            cell + 1,
            hex_digit(self.bitmap.get(cell))
        ));
    }

    /// Grade one press
    pub fn handle_pick(
        &mut self,
        cell: usize,
        host: &mut impl Host,
        surface: &mut impl Surface,
    ) -> PickOutcome {
        if cell >= CELL_COUNT {
            return PickOutcome::Ignored { selected: false };
        }
        surface.play_sound(Sound::Press, Some(cell));

        let highlighted = match self.highlighted {
            Some(h) if !self.selected.contains(&cell) => h,
            _ => {
                surface.punch(cell, LIGHT_PUNCH);
                return PickOutcome::Ignored {
                    selected: self.selected.contains(&cell),
                };
            }
        };

        if self.bitmap.get(cell) == self.bitmap.get(highlighted) {
            self.log
                .info(format_args!("You correctly selected pixel {}.", cell + 1));
            surface.punch(cell, LIGHT_PUNCH);
            self.selected.push(cell);
            surface.set_dot(cell, true);
            return self.check_stage_complete(host, surface);
        }

        self.log.info(format_args!(
            "You incorrectly selected pixel {}. Strike!",
            cell + 1
        ));
        surface.punch(cell, STRONG_PUNCH);
        self.strike(host, surface);
        PickOutcome::Incorrect
    }

    fn check_stage_complete(
        &mut self,
        host: &mut impl Host,
        surface: &mut impl Surface,
    ) -> PickOutcome {
        if self.selected.len() < PICKS_PER_STAGE {
            return PickOutcome::Correct;
        }

        if let Some(h) = self.highlighted {
            self.used_highlights.push(h);
        }
        let done = self.used_highlights.len();
        self.log.info(format_args!(
            "That's {} stage{} done.",
            done,
            if done == 1 { "" } else { "s" }
        ));

        if done >= STAGE_COUNT {
            self.log.info(format_args!("Good job! That's a solve."));
            surface.play_sound(Sound::Solve, None);
            host.handle_pass();
            self.highlighted = None;
            for px in 0..CELL_COUNT {
                surface.clear_decals(px);
            }
            self.selected.clear();
            self.solved = true;
            surface.set_solved_indicator(true);
            return PickOutcome::Solved;
        }

        self.generate(surface);
        PickOutcome::StageComplete
    }

    fn strike(&mut self, host: &mut impl Host, surface: &mut impl Surface) {
        host.handle_strike();
        self.flash.start(Instant::now());
        surface.set_incorrect_indicator(true);
        self.generate(surface);
    }

    /// Advance timers; turns the incorrect indicator off once its time is up
    pub fn tick(&mut self, now: Instant, surface: &mut impl Surface) {
        if self.flash.expire(now) {
            surface.set_incorrect_indicator(false);
        }
    }

    /// Show or hide the color-group numeral on every cell
    pub fn set_colorblind(&mut self, on: bool, surface: &mut impl Surface) {
        self.colorblind = on;
        for cell in 0..CELL_COUNT {
            let label = on.then(|| char::from(b'0' + self.group_of(cell)));
            surface.set_label(cell, label);
        }
    }
}
