#![doc = include_str!("../README.md")]

mod choice;
mod error;
mod generator;
mod mckay_wormald;
mod sequential;
mod square;
mod symbols;

pub use error::GenError;
pub use generator::{LatinRectangleGenerator, LatinSquareGenerator};
pub use mckay_wormald::{McKayWormaldGenerator, McKayWormaldParams};
pub use sequential::{ReplacementGraphGenerator, SequentialGenerator, SequentialParams};
pub use square::{LatinRectangle, LatinSquare};
