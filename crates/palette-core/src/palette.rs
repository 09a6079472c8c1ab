use crate::bitmap::{hex_digit, Bitmap};
use crate::error::GenerationError;
use crate::{BITMAP_COUNT, CELL_COUNT, GRID_SIZE, GROUP_COUNT, SYMBOL_COUNT};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default number of palette draws before a rule seed is declared unsolvable
pub const DEFAULT_MAX_ATTEMPTS: usize = 1600;

/// Default number of failed draws between advancing the chosen bitmap
pub const DEFAULT_ROTATE_EVERY: usize = 100;

/// Mapping from each symbolic value to one of the four color groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPalette")]
pub struct Palette {
    groups: [u8; SYMBOL_COUNT],
}

#[derive(Deserialize)]
struct RawPalette {
    groups: [u8; SYMBOL_COUNT],
}

impl TryFrom<RawPalette> for Palette {
    type Error = String;

    fn try_from(raw: RawPalette) -> Result<Self, Self::Error> {
        Palette::new(raw.groups)
            .ok_or_else(|| format!("color groups must be below {}", GROUP_COUNT))
    }
}

impl Palette {
    /// Build a palette from raw groups, checking that every group is in range
    pub fn new(groups: [u8; SYMBOL_COUNT]) -> Option<Self> {
        groups
            .iter()
            .all(|&g| (g as usize) < GROUP_COUNT)
            .then_some(Self { groups })
    }

    /// Draw every entry independently and uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            groups: std::array::from_fn(|_| rng.gen_range(0..GROUP_COUNT as u8)),
        }
    }

    /// Color group of a symbolic value
    pub fn group(&self, symbol: u8) -> u8 {
        self.groups[symbol as usize]
    }

    pub fn groups(&self) -> &[u8; SYMBOL_COUNT] {
        &self.groups
    }

    /// Every color group is used by at least one symbol
    pub fn is_surjective(&self) -> bool {
        (0..GROUP_COUNT as u8).all(|g| self.groups.contains(&g))
    }

    /// Per-cell color groups produced by rendering `bitmap` with this palette
    pub fn apply(&self, bitmap: &Bitmap) -> [u8; CELL_COUNT] {
        std::array::from_fn(|i| self.group(bitmap.get(i)))
    }

    /// No other bitmap renders to the same color pattern as `bitmaps[chosen]`
    pub fn is_unique_for(&self, bitmaps: &[Bitmap], chosen: usize) -> bool {
        let pattern = self.apply(&bitmaps[chosen]);
        bitmaps
            .iter()
            .enumerate()
            .filter(|&(ix, _)| ix != chosen)
            .all(|(_, other)| self.apply(other) != pattern)
    }

    /// Log form: `(0: 2) (1: 0) ... (F: 3)`
    pub fn describe(&self) -> String {
        self.groups
            .iter()
            .enumerate()
            .map(|(symbol, group)| format!("({}: {})", hex_digit(symbol as u8), group))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Render a color-group pattern as eight digits per row separated by `/`
pub fn describe_pattern(pattern: &[u8; CELL_COUNT]) -> String {
    pattern
        .chunks(GRID_SIZE)
        .map(|row| row.iter().map(|g| char::from(b'0' + g)).collect::<String>())
        .collect::<Vec<_>>()
        .join("/")
}

/// Limits on the palette search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Draw count at which the search gives up
    pub max_attempts: usize,
    /// Advance the chosen bitmap every this many draws
    pub rotate_every: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rotate_every: DEFAULT_ROTATE_EVERY,
        }
    }
}

/// An accepted palette and the bitmap it was accepted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synthesis {
    pub chosen: usize,
    pub palette: Palette,
    pub attempts: usize,
}

/// Randomized search for a palette under which one bitmap is identifiable
#[derive(Debug, Clone, Default)]
pub struct PaletteSynthesizer {
    config: SynthesisConfig,
}

impl PaletteSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Pick a bitmap at random and search for a surjective palette that
    /// identifies it among all 16 candidates.
    ///
    /// The draw that reaches `max_attempts` is not evaluated; hitting the cap
    /// is reported as [`GenerationError::Exhausted`].
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        rule_seed: i32,
        bitmaps: &[Bitmap; BITMAP_COUNT],
        rng: &mut R,
    ) -> Result<Synthesis, GenerationError> {
        let mut chosen = rng.gen_range(0..BITMAP_COUNT);
        let mut attempts = 0;

        loop {
            let palette = Palette::random(rng);
            attempts += 1;

            if attempts >= self.config.max_attempts {
                return Err(GenerationError::Exhausted { rule_seed, attempts });
            }
            if self.config.rotate_every > 0 && attempts % self.config.rotate_every == 0 {
                chosen = (chosen + 1) % BITMAP_COUNT;
            }

            if palette.is_surjective() && palette.is_unique_for(bitmaps, chosen) {
                return Ok(Synthesis {
                    chosen,
                    palette,
                    attempts,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_accepted_palette_invariants() {
        let synthesizer = PaletteSynthesizer::new();
        for seed in 1..6 {
            let bitmaps = bitmap::generate(seed);
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let synthesis = synthesizer
                .synthesize(seed, &bitmaps, &mut rng)
                .expect("default seeds are solvable");

            assert!(synthesis.chosen < BITMAP_COUNT);
            assert!(synthesis.palette.is_surjective());

            let mut used: Vec<u8> = synthesis.palette.groups().to_vec();
            used.sort_unstable();
            used.dedup();
            assert_eq!(used, vec![0, 1, 2, 3]);

            let pattern = synthesis.palette.apply(&bitmaps[synthesis.chosen]);
            for (j, other) in bitmaps.iter().enumerate() {
                if j != synthesis.chosen {
                    assert_ne!(synthesis.palette.apply(other), pattern);
                }
            }
        }
    }

    #[test]
    fn test_exhaustion_is_reported() {
        // Sixteen identical bitmaps can never be told apart
        let bitmaps = [Bitmap::base(); BITMAP_COUNT];
        let synthesizer = PaletteSynthesizer::new();
        let mut rng = StdRng::seed_from_u64(7);

        let err = synthesizer.synthesize(99, &bitmaps, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Exhausted {
                rule_seed: 99,
                attempts: DEFAULT_MAX_ATTEMPTS
            }
        );
    }

    #[test]
    fn test_small_cap_gives_up_early() {
        let bitmaps = [Bitmap::base(); BITMAP_COUNT];
        let synthesizer = PaletteSynthesizer::with_config(SynthesisConfig {
            max_attempts: 5,
            rotate_every: 2,
        });
        let mut rng = StdRng::seed_from_u64(1);

        match synthesizer.synthesize(3, &bitmaps, &mut rng) {
            Err(GenerationError::Exhausted { attempts, .. }) => assert_eq!(attempts, 5),
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_surjectivity() {
        assert!(Palette::new([0, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap().is_surjective());
        assert!(!Palette::new([0, 1, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap().is_surjective());
    }

    #[test]
    fn test_uniqueness_detects_collisions() {
        let base = Bitmap::base();
        // Swapping symbols 0 and 1 is invisible when both share a group
        let mut swapped = *base.cells();
        for v in swapped.iter_mut() {
            *v = match *v {
                0 => 1,
                1 => 0,
                other => other,
            };
        }
        let swapped = Bitmap::from_cells(swapped).unwrap();
        let bitmaps = [base, swapped];

        let same_group = Palette::new([0, 0, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert!(!same_group.is_unique_for(&bitmaps, 0));

        let split = Palette::new([0, 1, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert!(split.is_unique_for(&bitmaps, 0));
        assert!(split.is_unique_for(&bitmaps, 1));
    }

    #[test]
    fn test_describe() {
        let palette = Palette::new([0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3]).unwrap();
        let text = palette.describe();
        assert!(text.starts_with("(0: 0) (1: 1) (2: 2) (3: 3)"));
        assert!(text.ends_with("(F: 3)"));

        let pattern = palette.apply(&Bitmap::base());
        let grid = describe_pattern(&pattern);
        assert_eq!(grid.split('/').count(), GRID_SIZE);
        assert!(grid.starts_with("01230123/01230123/"));
    }

    #[test]
    fn test_out_of_range_groups_are_rejected() {
        let mut groups = [0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3];
        assert!(Palette::new(groups).is_some());
        groups[9] = GROUP_COUNT as u8;
        assert!(Palette::new(groups).is_none());

        let json = r#"{"groups":[0,1,2,3,0,1,2,3,0,1,2,3,0,1,2,7]}"#;
        assert!(serde_json::from_str::<Palette>(json).is_err());

        let palette = Palette::new([3, 2, 1, 0, 3, 2, 1, 0, 3, 2, 1, 0, 3, 2, 1, 0]).unwrap();
        let json = serde_json::to_string(&palette).unwrap();
        assert_eq!(serde_json::from_str::<Palette>(&json).unwrap(), palette);
    }

    #[test]
    fn test_rotation_reaches_the_only_solvable_bitmap() {
        // Fifteen copies of the base never differ from each other, so only the
        // relabelled bitmap at `target` can be identified
        let base = Bitmap::base();
        let relabelled = Bitmap::from_cells(std::array::from_fn(|i| {
            (base.get(i) + 1) % SYMBOL_COUNT as u8
        }))
        .unwrap();
        let synthesizer = PaletteSynthesizer::new();

        for target in [0, 7, 15] {
            let mut bitmaps = [base; BITMAP_COUNT];
            bitmaps[target] = relabelled;

            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let start = rng.clone().gen_range(0..BITMAP_COUNT);
                let synthesis = synthesizer
                    .synthesize(1, &bitmaps, &mut rng)
                    .expect("the relabelled bitmap is reachable");

                assert_eq!(synthesis.chosen, target);
                let steps = (target + BITMAP_COUNT - start) % BITMAP_COUNT;
                let window = steps * DEFAULT_ROTATE_EVERY..(steps + 1) * DEFAULT_ROTATE_EVERY;
                assert!(
                    window.contains(&synthesis.attempts),
                    "seed {} target {} start {}: {} attempts",
                    seed,
                    target,
                    start,
                    synthesis.attempts
                );
            }
        }
    }
}
