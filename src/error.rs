use thiserror::Error;

/// Errors reported by the generators.
///
/// Configuration errors surface from constructors before any generation work.
/// The stall variants are safety limits over loops the underlying algorithms
/// leave unbounded; they are recoverable, a fresh `generate_*` call simply
/// tries again.
#[derive(Debug, Error)]
pub enum GenError {
    /// Order outside the supported range.
    #[error("order must be in 1..=255, got {0}")]
    InvalidOrder(usize),

    /// Rectangle with more rows than columns.
    #[error("rectangle must have rows <= cols, got {rows}x{cols}")]
    InvalidShape { rows: usize, cols: usize },

    /// Switch repair draws three distinct columns, so multi-row rectangles
    /// need at least three columns.
    #[error("conflict switching needs at least 3 columns for {rows} rows, got {cols}")]
    TooFewColumns { rows: usize, cols: usize },

    /// Square requested from a generator configured for a proper rectangle.
    #[error("generator produces {rows}x{cols} rectangles, not squares")]
    NotSquare { rows: usize, cols: usize },

    /// The replacement-graph repair walk hit its step limit.
    #[error("generation stalled: repair walk exceeded {steps} steps")]
    RepairStalled { steps: u64 },

    /// The candidate rejection loop hit its restart limit.
    #[error("generation stalled: candidate rejected {restarts} times")]
    TooManyRestarts { restarts: u64 },
}
