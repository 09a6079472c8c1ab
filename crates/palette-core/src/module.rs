use crate::bitmap::{self, Bitmap};
use crate::color::DisplayColors;
use crate::error::{CommandError, GenerationError};
use crate::host::{Host, Surface};
use crate::log::ModuleLog;
use crate::palette::{describe_pattern, Palette, PaletteSynthesizer, SynthesisConfig};
use crate::stage::{PickOutcome, StageEngine, DEFAULT_FLASH_DURATION};
use crate::{BITMAP_COUNT, CELL_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Help text for the automation command interface
pub const HELP_MESSAGE: &str = "Use \"cb\" or \"colorblind\" to toggle colorblind mode.";

/// What to do when a rule seed yields no usable palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Log, report a pass to the host and leave the puzzle inert
    #[default]
    ForcePass,
    /// Return the error from construction
    Propagate,
}

/// Configuration for one puzzle instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub synthesis: SynthesisConfig,
    pub failure_policy: FailurePolicy,
    /// How long the incorrect indicator stays lit after a strike
    pub flash_duration: Duration,
    /// Initial accessibility setting provided by the host
    pub colorblind: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            synthesis: SynthesisConfig::default(),
            failure_policy: FailurePolicy::default(),
            flash_duration: DEFAULT_FLASH_DURATION,
            colorblind: false,
        }
    }
}

/// Identity of one grid cell in the press dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellHandle(usize);

impl CellHandle {
    pub fn cell(self) -> usize {
        self.0
    }
}

/// Serializable snapshot of a generated puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleSummary {
    pub module_id: u32,
    pub rule_seed: i32,
    /// Zero-based index of the hidden bitmap
    pub chosen_bitmap: usize,
    pub palette: Palette,
    pub colors: DisplayColors,
    /// Color group of every cell, row-major
    pub grid: Vec<u8>,
    /// Symbolic value of every cell, row-major
    pub bitmap: Vec<u8>,
    pub attempts: usize,
}

#[derive(Debug, Clone)]
struct Puzzle {
    chosen: usize,
    attempts: usize,
    colors: DisplayColors,
    engine: StageEngine,
}

/// A complete puzzle instance wired to its host and surface
pub struct PaletteModule<H: Host, S: Surface> {
    log: ModuleLog,
    rule_seed: i32,
    bitmaps: [Bitmap; BITMAP_COUNT],
    puzzle: Option<Puzzle>,
    failure: Option<GenerationError>,
    colorblind: bool,
    activated: bool,
    host: H,
    surface: S,
}

impl<H: Host, S: Surface> PaletteModule<H, S> {
    /// Generate a puzzle for `rule_seed` and paint it onto `surface`.
    ///
    /// `rng` drives everything that is not tied to the rule seed: the chosen
    /// bitmap, the palette, the display colors and the highlights.
    pub fn new<R: Rng + ?Sized>(
        module_id: u32,
        rule_seed: i32,
        config: ModuleConfig,
        mut host: H,
        mut surface: S,
        rng: &mut R,
    ) -> Result<Self, GenerationError> {
        let log = ModuleLog::new(module_id);
        log.info(format_args!("Using ruleseed {}.", rule_seed));
        let bitmaps = bitmap::generate(rule_seed);

        let synthesizer = PaletteSynthesizer::with_config(config.synthesis);
        let synthesis = match synthesizer.synthesize(rule_seed, &bitmaps, rng) {
            Ok(synthesis) => synthesis,
            Err(err) => {
                log.warn(format_args!(
                    "This ruleseed appears to have no solutions ({}). Please report seed {}.",
                    err, rule_seed
                ));
                if config.failure_policy == FailurePolicy::Propagate {
                    return Err(err);
                }
                host.handle_pass();
                return Ok(Self {
                    log,
                    rule_seed,
                    bitmaps,
                    puzzle: None,
                    failure: Some(err),
                    colorblind: config.colorblind,
                    activated: false,
                    host,
                    surface,
                });
            }
        };

        let colors = DisplayColors::assign(rng);
        let chosen = &bitmaps[synthesis.chosen];
        let palette = synthesis.palette;

        log.info(format_args!(
            "Using bitmap {}. (Starting row {})",
            synthesis.chosen + 1,
            chosen.row_hex(0)
        ));
        log.info(format_args!("Palette assignments: {}", palette.describe()));
        log.info(format_args!("Palette colors: {}", colors.describe()));
        log.info(format_args!(
            "Displayed grid: {}",
            describe_pattern(&palette.apply(chosen))
        ));

        for cell in 0..CELL_COUNT {
            let group = palette.group(chosen.get(cell)) as usize;
            surface.clear_decals(cell);
            surface.set_cell_colors(cell, colors.primary[group], colors.indicator[group]);
        }

        let engine_rng = StdRng::seed_from_u64(rng.gen());
        let mut engine = StageEngine::new(*chosen, palette, engine_rng, log)
            .with_flash_duration(config.flash_duration);
        engine.set_colorblind(config.colorblind, &mut surface);
        surface.set_solved_indicator(false);
        surface.set_incorrect_indicator(false);

        Ok(Self {
            log,
            rule_seed,
            bitmaps,
            puzzle: Some(Puzzle {
                chosen: synthesis.chosen,
                attempts: synthesis.attempts,
                colors,
                engine,
            }),
            failure: None,
            colorblind: config.colorblind,
            activated: false,
            host,
            surface,
        })
    }

    /// Host activation: puts up the first highlight
    pub fn activate(&mut self) {
        if self.activated {
            return;
        }
        self.activated = true;
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.engine.generate(&mut self.surface);
        }
    }

    /// One handle per cell, in cell order
    pub fn press_handlers(&self) -> [CellHandle; CELL_COUNT] {
        std::array::from_fn(CellHandle)
    }

    /// Dispatch a press; the return value says whether the cell's dot stays lit
    pub fn press(&mut self, handle: CellHandle) -> bool {
        self.pick(handle.cell()).keeps_dot()
    }

    /// Grade a press on `cell`
    pub fn pick(&mut self, cell: usize) -> PickOutcome {
        match self.puzzle.as_mut() {
            Some(puzzle) => puzzle
                .engine
                .handle_pick(cell, &mut self.host, &mut self.surface),
            None => PickOutcome::Ignored { selected: false },
        }
    }

    /// Advance timers
    pub fn tick(&mut self, now: Instant) {
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.engine.tick(now, &mut self.surface);
        }
    }

    /// Handle a text command from the automation interface
    pub fn process_command(&mut self, command: &str) -> Result<(), CommandError> {
        let normalized = command.trim().to_lowercase();
        match normalized.as_str() {
            "cb" | "colorblind" => {
                self.toggle_colorblind();
                Ok(())
            }
            _ => Err(CommandError::Unsupported(command.to_string())),
        }
    }

    /// Automated solving is not offered
    pub fn forced_solve(&mut self) -> Result<(), CommandError> {
        Err(CommandError::ForcedSolveUnsupported)
    }

    pub fn toggle_colorblind(&mut self) {
        self.colorblind = !self.colorblind;
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.engine.set_colorblind(self.colorblind, &mut self.surface);
        }
    }

    pub fn is_colorblind(&self) -> bool {
        self.colorblind
    }

    pub fn module_id(&self) -> u32 {
        self.log.id()
    }

    pub fn rule_seed(&self) -> i32 {
        self.rule_seed
    }

    pub fn bitmaps(&self) -> &[Bitmap; BITMAP_COUNT] {
        &self.bitmaps
    }

    /// Zero-based index of the hidden bitmap, if generation succeeded
    pub fn chosen_bitmap(&self) -> Option<usize> {
        self.puzzle.as_ref().map(|p| p.chosen)
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.puzzle.as_ref().map(|p| p.engine.palette())
    }

    pub fn colors(&self) -> Option<&DisplayColors> {
        self.puzzle.as_ref().map(|p| &p.colors)
    }

    pub fn engine(&self) -> Option<&StageEngine> {
        self.puzzle.as_ref().map(|p| &p.engine)
    }

    /// The generation error, when the module failed open
    pub fn failure(&self) -> Option<&GenerationError> {
        self.failure.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.puzzle.is_none()
    }

    pub fn is_solved(&self) -> bool {
        self.puzzle.as_ref().is_some_and(|p| p.engine.is_solved())
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn summary(&self) -> Option<PuzzleSummary> {
        let puzzle = self.puzzle.as_ref()?;
        let bitmap = puzzle.engine.bitmap();
        Some(PuzzleSummary {
            module_id: self.log.id(),
            rule_seed: self.rule_seed,
            chosen_bitmap: puzzle.chosen,
            palette: *puzzle.engine.palette(),
            colors: puzzle.colors,
            grid: puzzle.engine.palette().apply(bitmap).to_vec(),
            bitmap: bitmap.cells().to_vec(),
            attempts: puzzle.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{NullHost, NullSurface};

    #[derive(Default)]
    struct Counts {
        passes: usize,
        strikes: usize,
    }

    impl Host for Counts {
        fn handle_pass(&mut self) {
            self.passes += 1;
        }
        fn handle_strike(&mut self) {
            self.strikes += 1;
        }
    }

    fn module(seed: u64) -> PaletteModule<Counts, NullSurface> {
        let mut rng = StdRng::seed_from_u64(seed);
        PaletteModule::new(
            1,
            1,
            ModuleConfig::default(),
            Counts::default(),
            NullSurface,
            &mut rng,
        )
        .expect("seed 1 is solvable")
    }

    fn unsolvable() -> ModuleConfig {
        ModuleConfig {
            synthesis: SynthesisConfig {
                max_attempts: 1,
                rotate_every: 100,
            },
            ..ModuleConfig::default()
        }
    }

    #[test]
    fn test_new_module_waits_for_activation() {
        let mut module = module(1);
        assert!(!module.is_halted());
        assert!(module.engine().unwrap().highlighted().is_none());

        module.activate();
        assert!(module.engine().unwrap().highlighted().is_some());
        let first = module.engine().unwrap().highlighted();

        // Activation happens once
        module.activate();
        assert_eq!(module.engine().unwrap().highlighted(), first);
    }

    #[test]
    fn test_press_handlers_cover_grid() {
        let module = module(2);
        let handlers = module.press_handlers();
        assert_eq!(handlers.len(), CELL_COUNT);
        for (i, handle) in handlers.iter().enumerate() {
            assert_eq!(handle.cell(), i);
        }
    }

    #[test]
    fn test_press_reports_dot_state() {
        let mut module = module(3);
        let handlers = module.press_handlers();
        assert!(!module.press(handlers[0]));

        module.activate();
        let engine = module.engine().unwrap();
        let h = engine.highlighted().unwrap();
        let target = engine.bitmap().cells_matching(h).next().unwrap();

        assert!(module.press(handlers[target]));
        assert!(module.press(handlers[target]));
        assert_eq!(module.host().strikes, 0);
    }

    #[test]
    fn test_out_of_range_pick_is_ignored() {
        let mut module = module(4);
        module.activate();
        assert_eq!(module.pick(CELL_COUNT), PickOutcome::Ignored { selected: false });
    }

    #[test]
    fn test_commands() {
        let mut module = module(5);
        assert!(!module.is_colorblind());

        module.process_command("  CB ").unwrap();
        assert!(module.is_colorblind());
        module.process_command("colorblind").unwrap();
        assert!(!module.is_colorblind());

        assert_eq!(
            module.process_command("press a1"),
            Err(CommandError::Unsupported("press a1".to_string()))
        );
        assert!(!module.is_colorblind());
        assert_eq!(module.forced_solve(), Err(CommandError::ForcedSolveUnsupported));
        assert!(!module.is_solved());
    }

    #[test]
    fn test_initial_colorblind_setting() {
        let mut rng = StdRng::seed_from_u64(6);
        let config = ModuleConfig {
            colorblind: true,
            ..ModuleConfig::default()
        };
        let module = PaletteModule::new(1, 1, config, NullHost, NullSurface, &mut rng).unwrap();
        assert!(module.is_colorblind());
        assert!(module.engine().unwrap().is_colorblind());
    }

    #[test]
    fn test_fail_open_forces_single_pass() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut module =
            PaletteModule::new(1, 77, unsolvable(), Counts::default(), NullSurface, &mut rng)
                .expect("force pass swallows the error");

        assert!(module.is_halted());
        assert_eq!(module.host().passes, 1);
        assert!(matches!(
            module.failure(),
            Some(GenerationError::Exhausted { rule_seed: 77, .. })
        ));

        module.activate();
        assert_eq!(module.pick(0), PickOutcome::Ignored { selected: false });
        assert_eq!(module.host().passes, 1);
        assert_eq!(module.host().strikes, 0);
        assert!(module.summary().is_none());
    }

    #[test]
    fn test_propagate_policy_returns_error() {
        let mut rng = StdRng::seed_from_u64(8);
        let config = ModuleConfig {
            failure_policy: FailurePolicy::Propagate,
            ..unsolvable()
        };
        let result = PaletteModule::new(1, 5, config, NullHost, NullSurface, &mut rng);
        assert!(matches!(
            result,
            Err(GenerationError::Exhausted { rule_seed: 5, attempts: 1 })
        ));
    }

    #[test]
    fn test_summary_matches_bitmaps() {
        let module = module(9);
        let summary = module.summary().unwrap();
        let chosen = &module.bitmaps()[summary.chosen_bitmap];

        assert_eq!(summary.rule_seed, 1);
        assert_eq!(summary.bitmap, chosen.cells().to_vec());
        assert_eq!(summary.grid, summary.palette.apply(chosen).to_vec());
        assert!(summary.palette.is_unique_for(module.bitmaps(), summary.chosen_bitmap));

        let json = serde_json::to_string(&summary).unwrap();
        let back: PuzzleSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chosen_bitmap, summary.chosen_bitmap);
        assert_eq!(back.grid, summary.grid);
    }
}
