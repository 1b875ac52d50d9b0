use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A Latin square of order `n`.
///
/// A Latin square is an `n x n` array with symbols `{0..n-1}` such that
/// each row and each column is a permutation of `{0..n-1}`.
///
/// Equality is cell-wise; two squares are equal exactly when every position
/// holds the same symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatinSquare {
    n: usize,
    cells: Vec<u8>,
}

impl LatinSquare {
    /// Creates an all-zero square of order `n`, to be filled by a generator.
    ///
    /// # Panics
    /// Panics if `n < 1` or `n > 255`.
    pub fn new_empty(n: usize) -> Self {
        assert!((1..=255).contains(&n), "n must be in range 1..=255");
        Self {
            n,
            cells: vec![0; n * n],
        }
    }

    /// Returns the order of the Latin square.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns the value at position `(r, c)`.
    ///
    /// # Panics
    /// Panics if `r >= n` or `c >= n`.
    pub fn get(&self, r: usize, c: usize) -> u8 {
        assert!(r < self.n && c < self.n, "index out of bounds");
        self.cells[r * self.n + c]
    }

    /// Sets the value at position `(r, c)` without checking the Latin property.
    pub fn set(&mut self, r: usize, c: usize, v: u8) {
        assert!(r < self.n && c < self.n, "index out of bounds");
        self.cells[r * self.n + c] = v;
    }

    /// Overwrites row `r` with the given symbols.
    ///
    /// # Panics
    /// Panics if `r >= n` or `row.len() != n`.
    pub fn set_row(&mut self, r: usize, row: &[u8]) {
        assert!(r < self.n, "row index out of bounds");
        assert_eq!(row.len(), self.n, "row length must equal the order");
        self.cells[r * self.n..(r + 1) * self.n].copy_from_slice(row);
    }

    /// Returns the cells as a flat slice in row-major order.
    ///
    /// The cell at position (r, c) is at index `r * n + c`.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// An order-dependent digest of the full cell contents.
    ///
    /// Squares that compare equal hash equally; the uniformity driver uses
    /// this to bucket generated squares.
    pub fn structural_hash(&self) -> u64 {
        hash_cells(self.n, self.n, &self.cells)
    }

    /// Returns true if this is a valid Latin square.
    pub fn is_latin(&self) -> bool {
        let n = self.n;
        let mut seen = vec![false; n];
        // Check rows
        for r in 0..n {
            seen.fill(false);
            for c in 0..n {
                let v = self.get(r, c) as usize;
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        // Check columns
        for c in 0..n {
            seen.fill(false);
            for r in 0..n {
                let v = self.get(r, c) as usize;
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        true
    }
}

impl fmt::Display for LatinSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Latin square of order {}:", self.n)?;
        write_grid(f, self.n, self.n, &self.cells)
    }
}

/// A `k x n` Latin rectangle, `k <= n`.
///
/// Every row is a permutation of a size-`n` subset of `{0..n-1}` and no
/// symbol repeats within a column. A `k x n` rectangle is always extendable
/// to a full order-`n` Latin square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatinRectangle {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl LatinRectangle {
    /// Creates an all-zero `k x n` rectangle, to be filled by a generator.
    ///
    /// # Panics
    /// Panics if `cols < 1`, `cols > 255`, `rows < 1` or `rows > cols`.
    pub fn new_empty(rows: usize, cols: usize) -> Self {
        assert!((1..=255).contains(&cols), "cols must be in range 1..=255");
        assert!((1..=cols).contains(&rows), "rows must be in range 1..=cols");
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Returns the number of rows `k`.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns `n`.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the value at position `(r, c)`.
    ///
    /// # Panics
    /// Panics if `r >= rows` or `c >= cols`.
    pub fn get(&self, r: usize, c: usize) -> u8 {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        self.cells[r * self.cols + c]
    }

    /// Sets the value at position `(r, c)` without checking the Latin property.
    pub fn set(&mut self, r: usize, c: usize, v: u8) {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        self.cells[r * self.cols + c] = v;
    }

    /// Overwrites row `r` with the given symbols.
    ///
    /// # Panics
    /// Panics if `r >= rows` or `row.len() != cols`.
    pub fn set_row(&mut self, r: usize, row: &[u8]) {
        assert!(r < self.rows, "row index out of bounds");
        assert_eq!(row.len(), self.cols, "row length must equal cols");
        self.cells[r * self.cols..(r + 1) * self.cols].copy_from_slice(row);
    }

    /// Returns the cells as a flat slice in row-major order.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// An order-dependent digest of the full cell contents.
    pub fn structural_hash(&self) -> u64 {
        hash_cells(self.rows, self.cols, &self.cells)
    }

    /// Returns true if no row and no column repeats a symbol.
    pub fn is_latin_rectangle(&self) -> bool {
        let n = self.cols;
        let mut seen = vec![false; n];
        for r in 0..self.rows {
            seen.fill(false);
            for c in 0..n {
                let v = self.get(r, c) as usize;
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        for c in 0..n {
            seen.fill(false);
            for r in 0..self.rows {
                let v = self.get(r, c) as usize;
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        true
    }

    /// Converts into a [`LatinSquare`] when `rows == cols`.
    ///
    /// # Panics
    /// Panics if the rectangle is not square.
    pub fn into_square(self) -> LatinSquare {
        assert_eq!(self.rows, self.cols, "rectangle is not square");
        LatinSquare {
            n: self.cols,
            cells: self.cells,
        }
    }
}

impl fmt::Display for LatinRectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Latin rectangle of {} rows by {} columns:",
            self.rows, self.cols
        )?;
        write_grid(f, self.rows, self.cols, &self.cells)
    }
}

fn write_grid(f: &mut fmt::Formatter<'_>, rows: usize, cols: usize, cells: &[u8]) -> fmt::Result {
    for r in 0..rows {
        for c in 0..cols {
            write!(f, "{:<4}", cells[r * cols + c])?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn hash_cells(rows: usize, cols: usize, cells: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    rows.hash(&mut hasher);
    cols.hash(&mut hasher);
    cells.hash(&mut hasher);
    hasher.finish()
}
