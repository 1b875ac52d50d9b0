//! Sequential row-by-row generation.
//!
//! Both generators here fill a square one row at a time, left to right. The
//! naive base ignores column conflicts entirely and only guarantees that each
//! row is a permutation. The replacement-graph variant tracks per-column
//! availability; when a column blocks, it builds a replacement graph over the
//! columns filled so far and walks a chain of in-row substitutions until the
//! blocked column gains a legal symbol. Any `k x n` Latin rectangle extends
//! to an order-`n` square, so the row-by-row construction never dead-ends at
//! the row level.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::choice;
use crate::error::GenError;
use crate::generator::LatinSquareGenerator;
use crate::square::LatinSquare;
use crate::symbols::SymbolSet;

/// Parameters for [`ReplacementGraphGenerator`].
#[derive(Debug, Clone)]
pub struct SequentialParams {
    /// Upper bound on substitution steps within a single repair walk.
    ///
    /// The walk terminates with probability 1 but has no inherent bound, so
    /// a limit turns a pathological stall into a recoverable
    /// [`GenError::RepairStalled`]. `None` removes the bound.
    pub max_repair_steps: Option<u64>,
}

impl Default for SequentialParams {
    fn default() -> Self {
        Self {
            max_repair_steps: Some(10_000_000),
        }
    }
}

/// The naive sequential baseline: every row is an independent uniform random
/// permutation of `{0..n-1}`.
///
/// Column conflicts are not resolved, so the output is a row-Latin array but
/// usually not a Latin square. Useful as a worst-case reference distribution
/// for the uniformity driver.
pub struct SequentialGenerator<R> {
    n: usize,
    rng: R,
    verbose: bool,
}

impl<R: Rng> SequentialGenerator<R> {
    /// Creates a generator of order `n` arrays drawing from `rng`.
    pub fn new(n: usize, rng: R) -> Result<Self, GenError> {
        if !(1..=255).contains(&n) {
            return Err(GenError::InvalidOrder(n));
        }
        Ok(Self {
            n,
            rng,
            verbose: false,
        })
    }
}

impl<R: Rng> LatinSquareGenerator for SequentialGenerator<R> {
    fn generate_square(&mut self) -> Result<LatinSquare, GenError> {
        let mut ls = LatinSquare::new_empty(self.n);
        let mut row: Vec<u8> = (0..self.n as u8).collect();
        for r in 0..self.n {
            row.shuffle(&mut self.rng);
            ls.set_row(r, &row);
            if self.verbose {
                info!(row = r, "row generated");
            }
        }
        Ok(ls)
    }

    fn method_name(&self) -> &'static str {
        "sequential row-by-row (no column repair)"
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}

/// Candidate substitution sets for the columns of a partially built row.
///
/// Node `j` holds the symbols that could legally replace whatever currently
/// sits in column `j`, taken from the column availability as of the start of
/// the row. Rebuilt for every collision.
struct ReplacementGraph {
    candidates: Vec<SymbolSet>,
}

impl ReplacementGraph {
    /// Builds the graph over columns `0..=col` from the row-start snapshot.
    ///
    /// While a row remains to be placed, every column's snapshot still holds
    /// at least one symbol, so every node is populated.
    fn build(snapshot: &[SymbolSet], col: usize) -> Self {
        let candidates: Vec<SymbolSet> = snapshot[..=col].to_vec();
        debug_assert!(candidates.iter().all(|s| !s.is_empty()));
        Self { candidates }
    }

    fn at(&self, idx: usize) -> SymbolSet {
        self.candidates[idx]
    }

    /// Removes a symbol from every node, so the walk never re-places the
    /// symbol it is trying to free.
    fn erase(&mut self, symbol: u8) {
        for set in &mut self.candidates {
            set.remove(symbol);
        }
    }
}

/// Sequential generation with replacement-graph conflict repair.
///
/// Rows are filled left to right, picking uniformly among the symbols still
/// unused in both the row and the column. When that intersection is empty,
/// a symbol still legal for the blocked column is freed by chasing a cycle
/// of substitutions through the already-placed cells of the row.
pub struct ReplacementGraphGenerator<R> {
    n: usize,
    rng: R,
    params: SequentialParams,
    verbose: bool,
    /// Symbols not yet used per column, reset at the start of each generation.
    avail_in_col: Vec<SymbolSet>,
    /// Collisions repaired during the most recent generation.
    collisions: u64,
}

impl<R: Rng> ReplacementGraphGenerator<R> {
    /// Creates a generator of order-`n` squares drawing from `rng`.
    pub fn new(n: usize, rng: R) -> Result<Self, GenError> {
        Self::with_params(n, rng, SequentialParams::default())
    }

    /// Creates a generator with explicit parameters.
    pub fn with_params(n: usize, rng: R, params: SequentialParams) -> Result<Self, GenError> {
        if !(1..=255).contains(&n) {
            return Err(GenError::InvalidOrder(n));
        }
        Ok(Self {
            n,
            rng,
            params,
            verbose: false,
            avail_in_col: vec![SymbolSet::full(n); n],
            collisions: 0,
        })
    }

    /// Number of collisions repaired by the most recent generation call.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Generates row `i_row`, consuming column availability as symbols commit.
    fn generate_row(&mut self) -> Result<Vec<u8>, GenError> {
        let n = self.n;
        let mut avail_in_row = SymbolSet::full(n);
        // Column availability as of the start of this row; the replacement
        // graph is built from this snapshot, not the live sets.
        let snapshot = self.avail_in_col.clone();

        let mut row: Vec<u8> = Vec::with_capacity(n);
        let mut i_col = 0;
        while i_col < n {
            let available = self.avail_in_col[i_col].intersection(&avail_in_row);
            if !available.is_empty() {
                let symbol = choice::choose(&mut self.rng, &available);
                self.avail_in_col[i_col].remove(symbol);
                avail_in_row.remove(symbol);
                row.push(symbol);
                i_col += 1;
            } else {
                // Collision: everything legal for this column already sits
                // earlier in the row. Free one such symbol by substitution.
                self.collisions += 1;
                let mut graph = ReplacementGraph::build(&snapshot, i_col);
                let elem = choice::choose(&mut self.rng, &self.avail_in_col[i_col]);
                self.make_elem_available(elem, &mut graph, &mut row, &mut avail_in_row)?;
            }
            debug_assert_eq!(
                avail_in_row.len() + row.len(),
                n,
                "row/availability conservation broken at column {}",
                i_col
            );
        }
        Ok(row)
    }

    /// Frees `first` for the blocked column by walking a substitution chain
    /// through the already-placed cells of `row`.
    ///
    /// Each step displaces the symbol at the current position with a graph
    /// candidate; if the replacement was itself already placed, the walk
    /// moves to its old position and displaces it in turn. The walk ends
    /// when a replacement came from outside the row, leaving no cascade.
    fn make_elem_available(
        &mut self,
        first: u8,
        graph: &mut ReplacementGraph,
        row: &mut [u8],
        avail_in_row: &mut SymbolSet,
    ) -> Result<(), GenError> {
        graph.erase(first);

        let mut old = first;
        let mut idx_old = position_of(row, old)
            .expect("a column-available but row-unavailable symbol occupies an earlier column");
        let mut path = SymbolSet::empty();
        let mut steps: u64 = 0;

        loop {
            let mut candidates = graph.at(idx_old).difference(&path);
            if candidates.is_empty() {
                // This path led nowhere; start over with the full node set.
                path = SymbolSet::empty();
                candidates = graph.at(idx_old);
            }
            let new_elem = choice::choose(&mut self.rng, &candidates);
            // Position before replacement, because the replacement may
            // duplicate it within the row.
            let idx_new = position_of(row, new_elem);

            row[idx_old] = new_elem;
            path.insert(new_elem);

            if position_of(row, old).is_none() {
                avail_in_row.insert(old);
            }
            avail_in_row.remove(new_elem);
            self.avail_in_col[idx_old].insert(old);
            self.avail_in_col[idx_old].remove(new_elem);

            if avail_in_row.contains(first) && idx_new.is_none() {
                return Ok(());
            }
            idx_old = idx_new
                .expect("displaced symbol must remain in the row while the walk continues");
            old = new_elem;

            steps += 1;
            if steps % 100_000 == 0 {
                debug!(steps, first, "repair walk still running");
            }
            if let Some(limit) = self.params.max_repair_steps {
                if steps >= limit {
                    return Err(GenError::RepairStalled { steps });
                }
            }
        }
    }
}

impl<R: Rng> LatinSquareGenerator for ReplacementGraphGenerator<R> {
    fn generate_square(&mut self) -> Result<LatinSquare, GenError> {
        for set in &mut self.avail_in_col {
            *set = SymbolSet::full(self.n);
        }
        self.collisions = 0;
        let mut ls = LatinSquare::new_empty(self.n);
        for i in 0..self.n {
            let row = self.generate_row()?;
            ls.set_row(i, &row);
            if self.verbose {
                info!(row = i, "row completed");
            }
        }
        debug_assert!(ls.is_latin());
        Ok(ls)
    }

    fn method_name(&self) -> &'static str {
        "sequential with replacement graph"
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}

fn position_of(row: &[u8], symbol: u8) -> Option<usize> {
    row.iter().position(|&v| v == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn order_zero_is_rejected() {
        let rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            ReplacementGraphGenerator::new(0, rng),
            Err(GenError::InvalidOrder(0))
        ));
        let rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            SequentialGenerator::new(256, rng),
            Err(GenError::InvalidOrder(256))
        ));
    }

    #[test]
    fn order_one_always_yields_the_single_cell_square() {
        let rng = ChaCha20Rng::seed_from_u64(9);
        let mut generator = ReplacementGraphGenerator::new(1, rng).unwrap();
        for _ in 0..20 {
            let sq = generator.generate_square().unwrap();
            assert_eq!(sq.cells(), &[0]);
        }
    }

    #[test]
    fn generated_squares_are_latin() {
        for n in 2..=12 {
            let rng = ChaCha20Rng::seed_from_u64(n as u64);
            let mut generator = ReplacementGraphGenerator::new(n, rng).unwrap();
            for round in 0..30 {
                let sq = generator.generate_square().unwrap();
                assert!(
                    sq.is_latin(),
                    "non-Latin output for n={} round={}",
                    n,
                    round
                );
            }
        }
    }

    #[test]
    fn fixed_seed_reproduces_the_same_sequence() {
        let mut gen1 =
            ReplacementGraphGenerator::new(8, ChaCha20Rng::seed_from_u64(123)).unwrap();
        let mut gen2 =
            ReplacementGraphGenerator::new(8, ChaCha20Rng::seed_from_u64(123)).unwrap();
        for _ in 0..10 {
            assert_eq!(
                gen1.generate_square().unwrap(),
                gen2.generate_square().unwrap()
            );
        }
    }

    #[test]
    fn different_seeds_diverge_smoke() {
        let mut gen1 =
            ReplacementGraphGenerator::new(8, ChaCha20Rng::seed_from_u64(1)).unwrap();
        let mut gen2 =
            ReplacementGraphGenerator::new(8, ChaCha20Rng::seed_from_u64(2)).unwrap();
        let any_diff = (0..5)
            .any(|_| gen1.generate_square().unwrap() != gen2.generate_square().unwrap());
        assert!(any_diff, "distinct seeds should not track each other");
    }

    #[test]
    fn naive_rows_are_permutations() {
        let rng = ChaCha20Rng::seed_from_u64(7);
        let mut generator = SequentialGenerator::new(9, rng).unwrap();
        let sq = generator.generate_square().unwrap();
        let mut seen = [false; 9];
        for r in 0..9 {
            seen.fill(false);
            for c in 0..9 {
                let v = sq.get(r, c) as usize;
                assert!(!seen[v], "row {} repeats symbol {}", r, v);
                seen[v] = true;
            }
        }
    }

    #[test]
    fn naive_is_deterministic_for_a_seed() {
        let mut gen1 = SequentialGenerator::new(6, ChaCha20Rng::seed_from_u64(5)).unwrap();
        let mut gen2 = SequentialGenerator::new(6, ChaCha20Rng::seed_from_u64(5)).unwrap();
        assert_eq!(
            gen1.generate_square().unwrap(),
            gen2.generate_square().unwrap()
        );
    }

    #[test]
    fn replacement_graph_spans_all_columns_up_to_the_collision() {
        // Snapshot as at the start of the third row of an order-4 square:
        // each column has already consumed two symbols.
        let snapshot = vec![
            {
                let mut s = SymbolSet::full(4);
                s.remove(0);
                s.remove(1);
                s
            },
            {
                let mut s = SymbolSet::full(4);
                s.remove(1);
                s.remove(2);
                s
            },
            {
                let mut s = SymbolSet::full(4);
                s.remove(2);
                s.remove(3);
                s
            },
            SymbolSet::full(4),
        ];

        let graph = ReplacementGraph::build(&snapshot, 2);
        assert_eq!(graph.candidates.len(), 3, "nodes for columns 0..=2 only");
        for (j, node) in graph.candidates.iter().enumerate() {
            assert!(!node.is_empty(), "node {} must have candidates", j);
            assert_eq!(*node, snapshot[j]);
        }
    }

    #[test]
    fn erasing_the_target_removes_it_from_every_node() {
        let snapshot = vec![SymbolSet::full(5); 5];
        let mut graph = ReplacementGraph::build(&snapshot, 3);
        graph.erase(2);
        for node in &graph.candidates {
            assert!(!node.contains(2));
            assert_eq!(node.len(), 4);
        }
    }

    #[test]
    fn order_three_collisions_are_repaired_without_row_duplicates() {
        // Start each attempt from the state after a first row of [0, 1, 2].
        // A second row that opens with 1, 0 finds column 2 blocked: the only
        // symbol the row still needs, 2, is already spent in that column.
        // About a quarter of seeds take that path, so a short scan is all
        // but certain to exercise the repair.
        let start: Vec<SymbolSet> = (0..3u8)
            .map(|c| {
                let mut s = SymbolSet::full(3);
                s.remove(c);
                s
            })
            .collect();
        let mut repaired = 0;
        for seed in 0..64 {
            let rng = ChaCha20Rng::seed_from_u64(seed);
            let mut generator = ReplacementGraphGenerator::new(3, rng).unwrap();
            generator.avail_in_col.clone_from(&start);
            let row = generator.generate_row().unwrap();
            let mut seen = [false; 3];
            for (c, &v) in row.iter().enumerate() {
                assert!(!seen[v as usize], "seed {} repeats symbol {}", seed, v);
                seen[v as usize] = true;
                assert_ne!(v, c as u8, "seed {} reuses column {}'s spent symbol", seed, c);
            }
            if generator.collisions() > 0 {
                repaired += 1;
            }
        }
        assert!(repaired > 0, "the seed scan must hit the collision branch");
    }

    #[test]
    fn blocked_last_column_frees_its_symbol_by_substitution() {
        // Order 3, first row [0, 1, 2], second row begun as [1, 0]: the row
        // still needs 2, but column 2 only offers 0 and 1. The walk must
        // swap one of those out of the row to unblock the column.
        let rng = ChaCha20Rng::seed_from_u64(0);
        let mut generator = ReplacementGraphGenerator::new(3, rng).unwrap();
        let without = |symbols: &[u8]| {
            let mut s = SymbolSet::full(3);
            for &v in symbols {
                s.remove(v);
            }
            s
        };
        generator.avail_in_col = vec![without(&[0, 1]), without(&[1, 0]), without(&[2])];
        let snapshot = vec![without(&[0]), without(&[1]), without(&[2])];
        let mut row = vec![1u8, 0];
        let mut avail_in_row = without(&[0, 1]);

        let mut graph = ReplacementGraph::build(&snapshot, 2);
        generator
            .make_elem_available(0, &mut graph, &mut row, &mut avail_in_row)
            .unwrap();

        assert!(avail_in_row.contains(0), "the target symbol must be freed");
        assert_ne!(row[0], row[1]);
        assert_eq!(avail_in_row.len() + row.len(), 3);
        // The blocked column can now be filled.
        assert!(!generator.avail_in_col[2].intersection(&avail_in_row).is_empty());
    }

    #[test]
    fn repair_step_limit_surfaces_as_an_error_shape() {
        // A one-step limit only trips on a cascading walk, which a given
        // seed may or may not produce; accept either outcome but pin the
        // reported step count when it does trip.
        let params = SequentialParams {
            max_repair_steps: Some(1),
        };
        let rng = ChaCha20Rng::seed_from_u64(11);
        let mut generator = ReplacementGraphGenerator::with_params(10, rng, params).unwrap();
        // Either outcome is acceptable: a square, or a stall at the limit.
        match generator.generate_square() {
            Ok(sq) => assert!(sq.is_latin()),
            Err(GenError::RepairStalled { steps }) => assert_eq!(steps, 1),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}
