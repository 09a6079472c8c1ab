use crate::rule_seed::RuleSeedRng;
use crate::{BITMAP_COUNT, CELL_COUNT, COPIES_PER_SYMBOL, GRID_SIZE, SYMBOL_COUNT};
use std::fmt;

/// Assignment of every grid cell to one of the 16 symbolic values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmap {
    cells: [u8; CELL_COUNT],
}

impl Bitmap {
    /// Build a bitmap from raw cells, checking that every symbol appears exactly
    /// four times
    pub fn from_cells(cells: [u8; CELL_COUNT]) -> Option<Self> {
        let bitmap = Self { cells };
        bitmap.is_balanced().then_some(bitmap)
    }

    /// The canonical sequence every bitmap is a permutation of: four copies of
    /// 0..16 laid end to end
    pub fn base() -> Self {
        Self {
            cells: std::array::from_fn(|i| (i % SYMBOL_COUNT) as u8),
        }
    }

    /// Symbolic value of a cell
    pub fn get(&self, cell: usize) -> u8 {
        self.cells[cell]
    }

    pub fn cells(&self) -> &[u8; CELL_COUNT] {
        &self.cells
    }

    /// Count how often each symbol appears
    pub fn symbol_counts(&self) -> [usize; SYMBOL_COUNT] {
        let mut counts = [0usize; SYMBOL_COUNT];
        for &v in &self.cells {
            counts[v as usize] += 1;
        }
        counts
    }

    /// Check that every symbol appears exactly four times
    pub fn is_balanced(&self) -> bool {
        self.cells.iter().all(|&v| (v as usize) < SYMBOL_COUNT)
            && self.symbol_counts().iter().all(|&c| c == COPIES_PER_SYMBOL)
    }

    /// Cells sharing the symbolic value of `cell` (including `cell` itself)
    pub fn cells_matching(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        let value = self.cells[cell];
        (0..CELL_COUNT).filter(move |&i| self.cells[i] == value)
    }

    /// One row formatted as uppercase hex digits, e.g. `1155D4E4`
    pub fn row_hex(&self, row: usize) -> String {
        self.cells[row * GRID_SIZE..(row + 1) * GRID_SIZE]
            .iter()
            .map(|&v| hex_digit(v))
            .collect()
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            if row > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", self.row_hex(row))?;
        }
        Ok(())
    }
}

/// Uppercase hex digit for a symbol, as used in the diagnostic log
pub fn hex_digit(value: u8) -> char {
    char::from_digit(u32::from(value), 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

/// Derive the 16 candidate bitmaps for a rule seed.
///
/// Each bitmap draws 64 keys from the stream, one per element of the base
/// sequence, and stably sorts the base sequence by them. Duplicate bitmaps are
/// not rejected.
pub fn generate(seed: i32) -> [Bitmap; BITMAP_COUNT] {
    let mut rng = RuleSeedRng::new(seed);
    let base = Bitmap::base();
    std::array::from_fn(|_| shuffle_by_keys(&base, &mut rng))
}

fn shuffle_by_keys(base: &Bitmap, rng: &mut RuleSeedRng) -> Bitmap {
    let mut keyed: Vec<(f64, u8)> = base
        .cells
        .iter()
        .map(|&v| (rng.next_double(), v))
        .collect();
    // sort_by is stable, so tied keys keep base order
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut cells = [0u8; CELL_COUNT];
    for (slot, (_, v)) in cells.iter_mut().zip(keyed) {
        *slot = v;
    }
    Bitmap { cells }
}
