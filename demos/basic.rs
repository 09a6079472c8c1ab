//! Basic example of using the Palette Identification engine

use palette_core::{
    bitmap, ModuleConfig, ModuleIdCounter, NullHost, NullSurface, PaletteModule, PickOutcome,
    GRID_SIZE,
};

fn main() {
    // Every copy of the puzzle derives the same candidates from a rule seed
    let rule_seed = 1;
    let bitmaps = bitmap::generate(rule_seed);
    println!("Rule seed {} bitmap 1:\n{}\n", rule_seed, bitmaps[0]);

    // Build a puzzle; generation picks the hidden bitmap and the palette
    let ids = ModuleIdCounter::new();
    let mut rng = rand::thread_rng();
    let mut module = match PaletteModule::new(
        ids.next_id(),
        rule_seed,
        ModuleConfig::default(),
        NullHost,
        NullSurface,
        &mut rng,
    ) {
        Ok(module) => module,
        Err(err) => {
            println!("Generation failed: {}", err);
            return;
        }
    };

    if let Some(summary) = module.summary() {
        println!("Hidden bitmap: {}", summary.chosen_bitmap + 1);
        println!("Palette: {}", summary.palette.describe());
        println!("Displayed grid:");
        for row in summary.grid.chunks(GRID_SIZE) {
            let line: String = row.iter().map(|g| char::from(b'0' + g)).collect();
            println!("  {}", line);
        }
    }

    // Play perfectly: always pick the cells sharing the highlight's value
    module.activate();
    while !module.is_solved() {
        let Some(engine) = module.engine() else { break };
        let Some(highlight) = engine.highlighted() else { break };
        let picks: Vec<usize> = engine.bitmap().cells_matching(highlight).collect();
        println!("\nHighlighted pixel {}", highlight + 1);
        for cell in picks {
            let outcome = module.pick(cell);
            println!("  pick {:>2} -> {:?}", cell + 1, outcome);
            if outcome == PickOutcome::Solved {
                println!("\nSolved!");
            }
        }
    }
}
