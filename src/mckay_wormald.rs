//! McKay-Wormald generation of Latin rectangles.
//!
//! The method first draws a `k x n` array whose rows are independent random
//! permutations, recording every column repetition as a conflict. Candidates
//! with overlapping conflicts (a symbol three or more times in one column) or
//! more than `n^2` conflicts are rebuilt outright. Remaining conflicts are
//! then repaired one at a time with a random 3-cycle switch inside the
//! conflicting row; if the drawn switch is illegal the whole candidate is
//! rejected and construction restarts. A candidate is accepted only once its
//! conflict list is empty.
//!
//! Reference: McKay, B. D., & Wormald, N. C. (1991). "Uniform generation of
//! random Latin rectangles." Journal of Combinatorial Mathematics and
//! Combinatorial Computing, 9, 179-186. The Metropolis-style probabilistic
//! rejection of legal switches is intentionally replaced by always-accept,
//! which trades distribution fidelity for simplicity.

use rand::Rng;
use tracing::{debug, info};

use crate::choice;
use crate::error::GenError;
use crate::generator::{LatinRectangleGenerator, LatinSquareGenerator};
use crate::square::{LatinRectangle, LatinSquare};
use crate::symbols::SymbolSet;

/// Parameters for [`McKayWormaldGenerator`].
#[derive(Debug, Clone)]
pub struct McKayWormaldParams {
    /// Upper bound on candidate rejections within one generation call.
    ///
    /// Every discarded candidate counts, whether it was unrepairable up
    /// front or a switch later proved illegal. Rejection is normal control
    /// flow, but acceptance probability falls with size, so a limit turns a
    /// runaway loop into a recoverable [`GenError::TooManyRestarts`].
    /// `None` removes the bound.
    pub max_restarts: Option<u64>,
}

impl Default for McKayWormaldParams {
    fn default() -> Self {
        Self {
            max_restarts: Some(1_000_000),
        }
    }
}

/// A recorded column repetition: rows `earlier` and `later` hold the same
/// symbol in column `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conflict {
    earlier: usize,
    later: usize,
    col: usize,
}

/// McKay-Wormald generator of `k x n` Latin rectangles.
///
/// All per-candidate scratch (occurrence counters, conflict list) is owned by
/// the instance and reset on every attempt; a `generate_*` call returns only
/// a complete, valid rectangle.
pub struct McKayWormaldGenerator<R> {
    k: usize,
    n: usize,
    rng: R,
    params: McKayWormaldParams,
    verbose: bool,
    /// Count per (symbol, column) over the rows of the current candidate,
    /// indexed `symbol * n + col`. Rebuilt per candidate and kept current
    /// across applied switches; the legality tests depend on it.
    occurrences: Vec<u32>,
    conflicts: Vec<Conflict>,
    overlapping: bool,
}

impl<R: Rng> McKayWormaldGenerator<R> {
    /// Creates a generator of `k x n` rectangles drawing from `rng`.
    ///
    /// Requires `1 <= k <= n <= 255`, and `n >= 3` whenever `k >= 2`: the
    /// switch repair draws three distinct columns, and a single-row
    /// rectangle is the only shape that cannot produce conflicts.
    pub fn new(k: usize, n: usize, rng: R) -> Result<Self, GenError> {
        Self::with_params(k, n, rng, McKayWormaldParams::default())
    }

    /// Creates a generator with explicit parameters.
    pub fn with_params(
        k: usize,
        n: usize,
        rng: R,
        params: McKayWormaldParams,
    ) -> Result<Self, GenError> {
        if !(1..=255).contains(&n) {
            return Err(GenError::InvalidOrder(n));
        }
        if k < 1 || k > n {
            return Err(GenError::InvalidShape { rows: k, cols: n });
        }
        if k >= 2 && n < 3 {
            return Err(GenError::TooFewColumns { rows: k, cols: n });
        }
        Ok(Self {
            k,
            n,
            rng,
            params,
            verbose: false,
            occurrences: vec![0; n * n],
            conflicts: Vec::new(),
            overlapping: false,
        })
    }

    /// Creates a generator of order-`n` squares (`k == n`).
    pub fn square(n: usize, rng: R) -> Result<Self, GenError> {
        Self::new(n, n, rng)
    }

    #[inline]
    fn occ(&self, symbol: u8, col: usize) -> u32 {
        self.occurrences[symbol as usize * self.n + col]
    }

    /// Draws a random member of M(k,n): rows are independent permutations,
    /// column repetitions are recorded as conflicts as they appear.
    fn build_candidate(&mut self) -> LatinRectangle {
        self.occurrences.fill(0);
        self.conflicts.clear();
        self.overlapping = false;

        let mut lr = LatinRectangle::new_empty(self.k, self.n);
        for row in 0..self.k {
            self.fill_row(row, &mut lr);
        }
        lr
    }

    fn fill_row(&mut self, row: usize, lr: &mut LatinRectangle) {
        let n = self.n;
        let mut available: Vec<u8> = (0..n as u8).collect();
        for col in 0..n {
            let pick = choice::choose_index(&mut self.rng, available.len());
            let symbol = available.swap_remove(pick);

            let slot = symbol as usize * n + col;
            self.occurrences[slot] += 1;
            if self.occurrences[slot] > 1 {
                let earlier = last_row_with(lr, symbol, row, col);
                self.conflicts.push(Conflict {
                    earlier,
                    later: row,
                    col,
                });
                if self.occurrences[slot] > 2 {
                    self.overlapping = true;
                }
            }
            lr.set(row, col, symbol);
        }
    }

    /// Processes one random conflict. Returns false when the drawn switch is
    /// illegal, which rejects the whole candidate.
    fn try_switch(&mut self, a: &mut LatinRectangle) -> bool {
        let pick = choice::choose_index(&mut self.rng, self.conflicts.len());
        // Remove by index so structurally identical triples cannot alias.
        let conflict = self.conflicts.swap_remove(pick);
        let (i1, i2, j1) = (conflict.earlier, conflict.later, conflict.col);

        let mut cols = SymbolSet::full(self.n);
        cols.remove(j1 as u8);
        let j2 = choice::choose(&mut self.rng, &cols) as usize;
        cols.remove(j2 as u8);
        let j3 = choice::choose(&mut self.rng, &cols) as usize;

        let y = a.get(i1, j1);
        let u = a.get(i1, j2);
        let v = a.get(i1, j3);

        // The switch (i1,i2,j1,j2,j3) is legal iff the conflict is still
        // current and the cycled symbols leave all three columns repeat-free.
        let legal = a.get(i2, j1) == y
            && self.occ(u, j2) == 1
            && self.occ(v, j3) == 1
            && self.occ(y, j2) == 0
            && self.occ(u, j3) == 0
            && self.occ(v, j1) == 0;

        if legal {
            a.set(i1, j1, v);
            a.set(i1, j2, y);
            a.set(i1, j3, u);
            self.bump(y, j1, -1);
            self.bump(v, j1, 1);
            self.bump(u, j2, -1);
            self.bump(y, j2, 1);
            self.bump(v, j3, -1);
            self.bump(u, j3, 1);
        }
        legal
    }

    #[inline]
    fn bump(&mut self, symbol: u8, col: usize, delta: i32) {
        let slot = symbol as usize * self.n + col;
        self.occurrences[slot] = (self.occurrences[slot] as i32 + delta) as u32;
    }
}

impl<R: Rng> LatinRectangleGenerator for McKayWormaldGenerator<R> {
    fn generate_rectangle(&mut self) -> Result<LatinRectangle, GenError> {
        let conflict_limit = self.n * self.n;
        let mut restarts: u64 = 0;

        loop {
            let mut a = self.build_candidate();

            // A candidate is rejected either up front, when the switch repair
            // cannot apply at all, or later, when a drawn switch is illegal.
            // Both are full restarts and both count toward the limit.
            let mut rejected = self.overlapping || self.conflicts.len() > conflict_limit;
            if rejected {
                debug!(
                    conflicts = self.conflicts.len(),
                    overlapping = self.overlapping,
                    "candidate unrepairable, rejecting"
                );
            }
            while !self.conflicts.is_empty() && !rejected {
                rejected = !self.try_switch(&mut a);
            }

            if !rejected {
                debug_assert!(self.conflicts.is_empty() && !self.overlapping);
                debug_assert!(a.is_latin_rectangle());
                return Ok(a);
            }

            restarts += 1;
            if restarts % 1000 == 0 {
                if self.verbose {
                    info!(restarts, "still rejecting candidates");
                } else {
                    debug!(restarts, "still rejecting candidates");
                }
            }
            if let Some(limit) = self.params.max_restarts {
                if restarts >= limit {
                    return Err(GenError::TooManyRestarts { restarts });
                }
            }
        }
    }
}

impl<R: Rng> LatinSquareGenerator for McKayWormaldGenerator<R> {
    fn generate_square(&mut self) -> Result<LatinSquare, GenError> {
        if self.k != self.n {
            return Err(GenError::NotSquare {
                rows: self.k,
                cols: self.n,
            });
        }
        Ok(self.generate_rectangle()?.into_square())
    }

    fn method_name(&self) -> &'static str {
        "McKay-Wormald generation of Latin rectangles"
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}

/// The most recent row above `row` holding `symbol` in `col`.
fn last_row_with(lr: &LatinRectangle, symbol: u8, row: usize, col: usize) -> usize {
    (0..row)
        .rev()
        .find(|&r| lr.get(r, col) == symbol)
        .expect("a recorded conflict has an earlier occurrence")
}
