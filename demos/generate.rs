//! Generate a random Latin square with a chosen method, size and seed.
//!
//! Usage: cargo run --release --example generate -- <method> <n> [seed]
//!
//! Methods: seq (naive baseline), graph (replacement graph), mckay
//!
//! Example:
//!   cargo run --release --example generate -- graph 8 42

use latin_gen::{
    LatinSquareGenerator, McKayWormaldGenerator, ReplacementGraphGenerator, SequentialGenerator,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::env;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <seq|graph|mckay> <n> [seed]", program);
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = env::args().collect();

    let method = args.get(1).cloned().unwrap_or_else(|| usage(&args[0]));
    let n: usize = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| usage(&args[0]));
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0);

    let rng = ChaCha20Rng::seed_from_u64(seed);
    let mut generator: Box<dyn LatinSquareGenerator> = match method.as_str() {
        "seq" => Box::new(SequentialGenerator::new(n, rng).expect("bad order")),
        "graph" => Box::new(ReplacementGraphGenerator::new(n, rng).expect("bad order")),
        "mckay" => Box::new(McKayWormaldGenerator::square(n, rng).expect("bad order")),
        _ => usage(&args[0]),
    };
    generator.set_verbose(true);

    println!("Method: {}", generator.method_name());
    match generator.generate_square() {
        Ok(sq) => print!("{}", sq),
        Err(err) => {
            eprintln!("generation failed: {}", err);
            std::process::exit(2);
        }
    }
}
