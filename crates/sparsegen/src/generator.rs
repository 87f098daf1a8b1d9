//! Seeded streams of labeled sparse samples.

use core::iter::FusedIterator;
use core::ops::Range;

use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fill::fill;
use crate::regime::{Noise, DEFAULT_SPARSITY};
use crate::sampling::{init_engine, SkipDistribution};
use crate::{Contamination, Regime, SparseVector, Task};

/// A labeled feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The label. Its meaning depends on the regime.
    pub label: f64,
    /// The features. Index 0 holds the primary feature.
    pub features: SparseVector,
}

impl From<Sample> for (f64, SparseVector) {
    fn from(sample: Sample) -> Self {
        (sample.label, sample.features)
    }
}

/// The parameters of a `SampleGenerator`, in a form that can be read from
/// and written to configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// The distributional regime.
    pub regime: Regime,
    /// The user seed.
    pub seed: u64,
    /// The probability that a non-primary position is non-zero.
    pub sparsity: f64,
    /// The logical length of every feature vector.
    pub dimensionality: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            regime: Regime::new(Task::BinaryClassifier, Contamination::Benign),
            seed: 42,
            sparsity: DEFAULT_SPARSITY,
            dimensionality: 100,
        }
    }
}

/// Generates labeled sparse samples for one regime.
///
/// A generator holds no random state. Every call to `partition` or `samples`
/// builds a fresh engine from the seed and the partition index, so the same
/// arguments always reproduce the same samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGenerator {
    /// The distributional regime.
    regime: Regime,
    /// The user seed.
    seed: u64,
    /// The probability that a non-primary position is non-zero.
    sparsity: f64,
    /// The logical length of every feature vector.
    dimensionality: usize,
}

impl SampleGenerator {
    /// Creates a new generator.
    ///
    /// # Arguments
    ///
    /// * `regime`: The distributional regime.
    /// * `seed`: The user seed.
    /// * `sparsity`: The probability that a non-primary position is non-zero.
    /// * `dimensionality`: The logical length of every feature vector.
    ///
    /// # Errors
    ///
    /// * If `sparsity` is not in `(0, 1]`.
    /// * If `dimensionality` is smaller than the regime's minimum, i.e. `4` for
    ///   invalid-value contamination and `1` otherwise.
    pub fn new(regime: Regime, seed: u64, sparsity: f64, dimensionality: usize) -> Result<Self, String> {
        SkipDistribution::new(sparsity)?;

        let min_dimensionality = regime.min_dimensionality();
        if dimensionality < min_dimensionality {
            return Err(format!(
                "Regime {regime} needs a dimensionality of at least {min_dimensionality}. Got {dimensionality}."
            ));
        }

        Ok(Self {
            regime,
            seed,
            sparsity,
            dimensionality,
        })
    }

    /// Creates a new generator from a configuration.
    ///
    /// # Errors
    ///
    /// See `SampleGenerator::new`.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, String> {
        Self::new(config.regime, config.seed, config.sparsity, config.dimensionality)
    }

    /// The distributional regime.
    #[must_use]
    pub const fn regime(&self) -> Regime {
        self.regime
    }

    /// The user seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The probability that a non-primary position is non-zero.
    #[must_use]
    pub const fn sparsity(&self) -> f64 {
        self.sparsity
    }

    /// The logical length of every feature vector.
    #[must_use]
    pub const fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    /// Generates the samples of one partition.
    ///
    /// One sample is produced per item of `local_indices`; the items
    /// themselves are not inspected. The engine is seeded from the user seed
    /// and `partition_index`, so partitions generated independently compose
    /// into a deterministic dataset.
    pub fn partition<I: IntoIterator>(&self, partition_index: u64, local_indices: I) -> Samples<I::IntoIter> {
        let (rng, skip) = init_engine(self.seed, partition_index, self.sparsity)
            .unwrap_or_else(|e| unreachable!("Sparsity is checked on construction: {e}"));

        Samples {
            generator: *self,
            rng,
            skip,
            noise: Noise::new(),
            indices: local_indices.into_iter(),
        }
    }

    /// Generates `count` samples as a single partition with index `0`.
    pub fn samples(&self, count: usize) -> Samples<Range<usize>> {
        self.partition(0, 0..count)
    }

    /// Generates `count` samples split into `num_partitions` contiguous
    /// partitions, generating the partitions in parallel.
    ///
    /// The result depends only on the generator, `count` and
    /// `num_partitions`, never on thread scheduling.
    ///
    /// # Panics
    ///
    /// * If `num_partitions` is zero.
    #[must_use]
    pub fn generate_partitioned(&self, count: usize, num_partitions: usize) -> Vec<Sample> {
        ftlog::debug!(
            "Generating {count} samples for {} in {num_partitions} partitions with seed {}...",
            self.regime,
            self.seed
        );

        partition_ranges(count, num_partitions)
            .into_par_iter()
            .enumerate()
            .map(|(i, indices)| self.partition(i as u64, indices).collect::<Vec<_>>())
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }
}

/// A lazy stream of samples, one per item of the wrapped index iterator.
///
/// Cloning a stream clones its engine, so the clone replays the remaining
/// samples exactly.
#[derive(Debug, Clone)]
pub struct Samples<I> {
    /// The generator that created this stream.
    generator: SampleGenerator,
    /// The random engine for this stream.
    rng: ChaCha8Rng,
    /// The distribution of gaps between non-zero positions.
    skip: SkipDistribution,
    /// The Gaussian noise sources.
    noise: Noise,
    /// One item per sample still to be produced.
    indices: I,
}

impl<I: Iterator> Iterator for Samples<I> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next()?;

        let SampleGenerator {
            regime, dimensionality, ..
        } = self.generator;
        let (label, primary) = regime.draw_label_and_primary(&mut self.rng, &self.noise);
        let features = fill(
            regime.contamination(),
            &mut self.rng,
            &self.skip,
            &self.noise,
            primary,
            dimensionality,
        );

        Some(Sample { label, features })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<I: ExactSizeIterator> ExactSizeIterator for Samples<I> {}

impl<I: FusedIterator> FusedIterator for Samples<I> {}

/// Splits `0..count` into `num_partitions` contiguous ranges, the way a
/// parallel collection slices its input. Partition `i` covers
/// `i * count / num_partitions .. (i + 1) * count / num_partitions`.
///
/// # Panics
///
/// * If `num_partitions` is zero.
#[must_use]
pub fn partition_ranges(count: usize, num_partitions: usize) -> Vec<Range<usize>> {
    assert!(num_partitions > 0, "The number of partitions must be positive.");

    let boundary = |i: usize| {
        let b = (i as u128) * (count as u128) / (num_partitions as u128);
        usize::try_from(b).unwrap_or_else(|e| unreachable!("Boundary never exceeds count: {e}"))
    };

    (0..num_partitions).map(|i| boundary(i)..boundary(i + 1)).collect()
}

/// Generates `count` samples for a regime.
///
/// # Arguments
///
/// * `regime`: The distributional regime.
/// * `seed`: The user seed.
/// * `sparsity`: The probability that a non-primary position is non-zero.
/// * `dimensionality`: The logical length of every feature vector.
/// * `count`: The number of samples.
///
/// # Panics
///
/// * If `sparsity` is not in `(0, 1]`.
/// * If `dimensionality` is too small for the regime.
pub fn generate(
    regime: Regime,
    seed: u64,
    sparsity: f64,
    dimensionality: usize,
    count: usize,
) -> Samples<Range<usize>> {
    ftlog::debug!("Generating {count} samples for {regime} with seed {seed}...");
    SampleGenerator::new(regime, seed, sparsity, dimensionality)
        .unwrap_or_else(|e| panic!("{e}"))
        .samples(count)
}

/// Generates `count` samples for a regime with the default sparsity.
///
/// # Panics
///
/// * If `dimensionality` is too small for the regime.
pub fn draw_samples(regime: Regime, seed: u64, count: usize, dimensionality: usize) -> Samples<Range<usize>> {
    generate(regime, seed, DEFAULT_SPARSITY, dimensionality, count)
}
