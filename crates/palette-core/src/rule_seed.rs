//! Seeded random stream shared by every copy of the puzzle.
//!
//! Rule seeds are traded between players, so the stream has to be reproduced
//! bit for bit. This is Knuth's subtractive generator with a 55-entry state
//! table and the second tap running 31 entries ahead.

const MBIG: i32 = i32::MAX;
const MSEED: i64 = 161_803_398;
const TABLE_LEN: usize = 56;

/// Deterministic subtractive generator keyed by a rule seed
#[derive(Debug, Clone)]
pub struct RuleSeedRng {
    seed: i32,
    table: [i32; TABLE_LEN],
    inext: usize,
    inextp: usize,
}

impl RuleSeedRng {
    /// Create a generator for the given rule seed
    pub fn new(seed: i32) -> Self {
        let mut table = [0i32; TABLE_LEN];

        // i32::MIN has no positive counterpart; unsigned_abs keeps it in range
        let mut mj = (MSEED - i64::from(seed.unsigned_abs())) as i32;
        table[55] = mj;
        let mut mk: i32 = 1;
        for i in 1..55 {
            let ii = (21 * i) % 55;
            table[ii] = mk;
            mk = mj.wrapping_sub(mk);
            if mk < 0 {
                mk = mk.wrapping_add(MBIG);
            }
            mj = table[ii];
        }

        for _ in 1..5 {
            for i in 1..TABLE_LEN {
                table[i] = table[i].wrapping_sub(table[1 + (i + 30) % 55]);
                if table[i] < 0 {
                    table[i] = table[i].wrapping_add(MBIG);
                }
            }
        }

        Self {
            seed,
            table,
            inext: 0,
            inextp: 31,
        }
    }

    /// The rule seed this stream was built from
    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Next raw sample in [0, i32::MAX)
    pub fn next_sample(&mut self) -> i32 {
        self.inext += 1;
        if self.inext >= TABLE_LEN {
            self.inext = 1;
        }
        self.inextp += 1;
        if self.inextp >= TABLE_LEN {
            self.inextp = 1;
        }

        let mut sample = self.table[self.inext].wrapping_sub(self.table[self.inextp]);
        if sample < 0 {
            sample = sample.wrapping_add(MBIG);
        }
        self.table[self.inext] = sample;
        sample
    }

    /// Next double in [0, 1)
    pub fn next_double(&mut self) -> f64 {
        f64::from(self.next_sample()) * (1.0 / f64::from(MBIG))
    }
}
