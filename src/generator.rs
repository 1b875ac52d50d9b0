use crate::error::GenError;
use crate::square::{LatinRectangle, LatinSquare};

/// A random Latin square generation method.
///
/// A generator owns its RNG and any per-attempt scratch state; each call to
/// [`generate_square`](Self::generate_square) resets that state and returns
/// either a complete square or an error, never a partial result.
pub trait LatinSquareGenerator {
    /// Generates one `n x n` square.
    fn generate_square(&mut self) -> Result<LatinSquare, GenError>;

    /// A short descriptive label of the method.
    fn method_name(&self) -> &'static str;

    /// Toggles periodic progress logging inside long retry loops.
    ///
    /// Has no effect on the generated output.
    fn set_verbose(&mut self, verbose: bool);
}

/// A random Latin rectangle generation method.
pub trait LatinRectangleGenerator {
    /// Generates one `k x n` rectangle, `k <= n`.
    fn generate_rectangle(&mut self) -> Result<LatinRectangle, GenError>;
}
