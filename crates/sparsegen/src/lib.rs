#![deny(clippy::correctness)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic,
    clippy::nursery,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![doc = include_str!("../README.md")]

mod fill;
pub mod generator;
pub mod regime;
pub mod sampling;
pub mod sparse_vector;
pub mod utils;

pub use generator::{draw_samples, generate, partition_ranges, GeneratorConfig, Sample, SampleGenerator, Samples};
pub use regime::{Contamination, Regime, Task};
pub use sparse_vector::SparseVector;

/// The version of the crate.
pub const VERSION: &str = "0.1.0";
