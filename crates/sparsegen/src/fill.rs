//! Fill strategies for the non-primary sparse entries.

use rand::Rng;
use rand_distr::Distribution;

use crate::regime::{Contamination, Noise, INLIER_PROBABILITY, NON_FINITE};
use crate::sampling::SkipDistribution;
use crate::SparseVector;

/// Builds the feature vector for one sample under the given contamination.
///
/// Index 0 always holds `primary`. The caller guarantees that
/// `dimensionality` is large enough for the contamination.
pub fn fill<R: Rng>(
    contamination: Contamination,
    rng: &mut R,
    skip: &SkipDistribution,
    noise: &Noise,
    primary: f64,
    dimensionality: usize,
) -> SparseVector {
    let entries = match contamination {
        Contamination::Benign => skip_walk(rng, skip, primary, dimensionality, |rng| {
            2.0 * (rng.gen::<f64>() - 0.5)
        }),
        Contamination::Outlier => skip_walk(rng, skip, primary, dimensionality, |rng| {
            if rng.gen::<f64>() < INLIER_PROBABILITY {
                noise.inlier.sample(rng)
            } else if rng.gen_bool(0.5) {
                1.0
            } else {
                -1.0
            }
        }),
        Contamination::Invalid => {
            let bound = dimensionality - NON_FINITE.len();
            let mut entries = skip_walk(rng, skip, primary, bound, |rng| {
                if rng.gen::<f64>() < INLIER_PROBABILITY {
                    noise.inlier.sample(rng)
                } else {
                    NON_FINITE[rng.gen_range(0..NON_FINITE.len())]
                }
            });
            entries.extend(NON_FINITE.iter().enumerate().map(|(k, &v)| (bound + k, v)));
            entries
        }
    };

    SparseVector::from_ascending_entries(dimensionality, entries)
}

/// Walks the positions `[1, bound)`, landing on each one independently with
/// the skip distribution's success probability, and draws a value for every
/// position landed on.
///
/// The returned entries start with `(0, primary)` and are strictly
/// increasing by construction.
fn skip_walk<R: Rng, F: FnMut(&mut R) -> f64>(
    rng: &mut R,
    skip: &SkipDistribution,
    primary: f64,
    bound: usize,
    mut value: F,
) -> Vec<(usize, f64)> {
    let mut entries = vec![(0, primary)];

    let mut index = 1_usize.saturating_add(skip.sample(rng));
    while index < bound {
        entries.push((index, value(rng)));
        index = index.saturating_add(1).saturating_add(skip.sample(rng));
    }

    entries
}
