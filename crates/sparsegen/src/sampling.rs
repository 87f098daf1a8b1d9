//! Seeding of the random engine and the skip distribution for the sparse fill.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Geometric};

/// The stride between the engine seeds of consecutive user seeds.
///
/// Distinct `(seed, index)` pairs only collide when `index` reaches this
/// stride.
pub const ENGINE_SEED_STRIDE: u64 = 5000;

/// Derives the engine seed for a `(seed, index)` pair as
/// `ENGINE_SEED_STRIDE * seed + index`, wrapping on overflow.
#[must_use]
pub const fn engine_seed(seed: u64, index: u64) -> u64 {
    ENGINE_SEED_STRIDE.wrapping_mul(seed).wrapping_add(index)
}

/// Creates the random engine and skip distribution for one generator
/// invocation.
///
/// # Arguments
///
/// * `seed`: The user seed.
/// * `index`: The partition index, or `0` for local generation.
/// * `sparsity`: The probability that a non-primary position is non-zero.
///
/// # Errors
///
/// * If `sparsity` is not in `(0, 1]`.
pub fn init_engine(seed: u64, index: u64, sparsity: f64) -> Result<(ChaCha8Rng, SkipDistribution), String> {
    let skip = SkipDistribution::new(sparsity)?;
    let rng = ChaCha8Rng::seed_from_u64(engine_seed(seed, index));
    Ok((rng, skip))
}

/// A negative-binomial distribution with one success and success
/// probability `p`, i.e. the number of failures before the first success.
///
/// Sampling it gives the number of zero positions to skip before the next
/// non-zero entry, which is equivalent to flipping a `p`-biased coin at
/// every position.
#[derive(Debug, Clone)]
pub struct SkipDistribution {
    /// The success probability.
    p: f64,
    /// The underlying geometric distribution.
    inner: Geometric,
}

impl SkipDistribution {
    /// Creates a skip distribution with success probability `p`.
    ///
    /// # Errors
    ///
    /// * If `p` is not in `(0, 1]`.
    pub fn new(p: f64) -> Result<Self, String> {
        if !(p > 0.0 && p <= 1.0) {
            return Err(format!("Sparsity must be in (0, 1]. Got {p}."));
        }
        let inner = Geometric::new(p).map_err(|e| e.to_string())?;
        Ok(Self { p, inner })
    }

    /// The success probability.
    #[must_use]
    pub const fn p(&self) -> f64 {
        self.p
    }

    /// The expected gap, `(1 - p) / p`.
    #[must_use]
    pub fn mean(&self) -> f64 {
        (1.0 - self.p) / self.p
    }

    /// Draws one gap, saturating at `usize::MAX`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        usize::try_from(self.inner.sample(rng)).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds() {
        assert_eq!(engine_seed(0, 0), 0);
        assert_eq!(engine_seed(1, 0), 5000);
        assert_eq!(engine_seed(1, 7), 5007);
        assert_ne!(engine_seed(1, 0), engine_seed(0, 1));
        assert_eq!(engine_seed(u64::MAX, 1), 5000_u64.wrapping_mul(u64::MAX).wrapping_add(1));
    }

    #[test]
    fn invalid_sparsity() {
        for p in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(SkipDistribution::new(p).is_err(), "{p} should be rejected");
        }
        assert!(SkipDistribution::new(1.0).is_ok());
    }

    #[test]
    fn certain_success_never_skips() {
        let (mut rng, skip) = init_engine(42, 0, 1.0).unwrap_or_else(|e| unreachable!("{e}"));
        assert!((0..1000).all(|_| skip.sample(&mut rng) == 0));
    }

    #[test]
    fn mean_gap() {
        let (mut rng, skip) = init_engine(42, 0, 0.25).unwrap_or_else(|e| unreachable!("{e}"));
        assert!(float_cmp::approx_eq!(f64, skip.mean(), 3.0, ulps = 2));

        let n = 200_000;
        let total = (0..n).map(|_| skip.sample(&mut rng)).sum::<usize>();
        let empirical = total as f64 / f64::from(n);
        assert!((empirical - 3.0).abs() < 0.05, "empirical mean gap {empirical}");
    }
}
