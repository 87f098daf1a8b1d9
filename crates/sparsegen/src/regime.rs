//! The label-generation regimes and their primary-feature rules.

use core::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// The label of a positive example for binary classification.
pub const POSITIVE_LABEL: f64 = 1.0;

/// The label of a negative example for binary classification.
pub const NEGATIVE_LABEL: f64 = 0.0;

/// The probability that a contaminated feature is an inlier.
pub const INLIER_PROBABILITY: f64 = 0.90;

/// The standard deviation of inlier noise.
pub const INLIER_STANDARD_DEVIATION: f64 = 1e-3;

/// The standard deviation of outlier noise.
pub const OUTLIER_STANDARD_DEVIATION: f64 = 1.0;

/// The fraction of non-primary positions that are non-zero when no sparsity
/// is given.
pub const DEFAULT_SPARSITY: f64 = 0.1;

/// The three values used to corrupt labels and features.
pub(crate) const NON_FINITE: [f64; 3] = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY];

/// The learning task that decides how labels are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    /// Labels in `{0, 1}` that are linearly separable on the primary feature.
    BinaryClassifier,
    /// Labels are Poisson rates in `[1, 11)`.
    PoissonRegression,
    /// Labels are real-valued targets.
    LinearRegression,
}

/// How the non-primary sparse entries are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Contamination {
    /// Uniform values in `[-1, 1]`.
    Benign,
    /// Mostly tiny Gaussian noise with rare `±1` gross outliers.
    Outlier,
    /// Tiny Gaussian noise with injected NaN and infinities.
    Invalid,
}

/// A distributional regime for generated samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    /// A task under one of the contamination modes.
    Standard {
        /// The task deciding the label rule.
        task: Task,
        /// The contamination deciding the fill strategy.
        contamination: Contamination,
    },
    /// Non-finite labels with benign features.
    InvalidLabel,
}

impl Regime {
    /// Every regime, in a fixed order.
    pub const ALL: [Self; 10] = [
        Self::new(Task::BinaryClassifier, Contamination::Benign),
        Self::new(Task::BinaryClassifier, Contamination::Outlier),
        Self::new(Task::BinaryClassifier, Contamination::Invalid),
        Self::new(Task::PoissonRegression, Contamination::Benign),
        Self::new(Task::PoissonRegression, Contamination::Outlier),
        Self::new(Task::PoissonRegression, Contamination::Invalid),
        Self::new(Task::LinearRegression, Contamination::Benign),
        Self::new(Task::LinearRegression, Contamination::Outlier),
        Self::new(Task::LinearRegression, Contamination::Invalid),
        Self::InvalidLabel,
    ];

    /// Creates a standard regime.
    #[must_use]
    pub const fn new(task: Task, contamination: Contamination) -> Self {
        Self::Standard { task, contamination }
    }

    /// The contamination mode used for the non-primary features.
    #[must_use]
    pub const fn contamination(self) -> Contamination {
        match self {
            Self::Standard { contamination, .. } => contamination,
            Self::InvalidLabel => Contamination::Benign,
        }
    }

    /// The smallest dimensionality this regime can produce.
    ///
    /// The invalid-value fill reserves the last three positions, and index 0
    /// always holds the primary feature.
    #[must_use]
    pub const fn min_dimensionality(self) -> usize {
        match self.contamination() {
            Contamination::Invalid => 4,
            Contamination::Benign | Contamination::Outlier => 1,
        }
    }

    /// Draws the label and the primary feature (index 0) for one sample.
    ///
    /// The label is always drawn before the primary feature.
    pub(crate) fn draw_label_and_primary<R: Rng>(self, rng: &mut R, noise: &Noise) -> (f64, f64) {
        match self {
            Self::Standard {
                task: Task::BinaryClassifier,
                ..
            } => {
                let positive = rng.gen_bool(0.5);
                let magnitude = 0.1 + 0.9 * rng.gen::<f64>();
                if positive {
                    (POSITIVE_LABEL, magnitude)
                } else {
                    (NEGATIVE_LABEL, -magnitude)
                }
            }
            Self::Standard {
                task: Task::PoissonRegression,
                ..
            } => {
                let label = 1.0 + 10.0 * rng.gen::<f64>();
                let primary = (label.ln() + noise.inlier.sample(rng)) / 11_f64.ln();
                (label, primary)
            }
            Self::Standard {
                task: Task::LinearRegression,
                contamination: Contamination::Outlier,
            } => {
                let label = 1.0 + rng.gen::<f64>();
                let primary = label - 1.0 + noise.outlier.sample(rng);
                (label, primary)
            }
            // The invalid variant keeps the benign primary rule; only the
            // tail features are contaminated.
            Self::Standard {
                task: Task::LinearRegression,
                ..
            } => {
                let label = 2.0 * rng.gen::<f64>() - 1.0;
                let primary = label + noise.inlier.sample(rng);
                (label, primary)
            }
            Self::InvalidLabel => {
                let label = NON_FINITE[rng.gen_range(0..NON_FINITE.len())];
                let primary = 0.1 + 0.9 * rng.gen::<f64>();
                (label, primary)
            }
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BinaryClassifier => "binary-classifier",
            Self::PoissonRegression => "poisson-regression",
            Self::LinearRegression => "linear-regression",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Contamination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Benign => "benign",
            Self::Outlier => "outlier",
            Self::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard { task, contamination } => write!(f, "{task}/{contamination}"),
            Self::InvalidLabel => f.write_str("invalid-label"),
        }
    }
}

/// The Gaussian noise sources shared by the label rules and fill strategies.
#[derive(Debug, Clone)]
pub(crate) struct Noise {
    /// `N(0, INLIER_STANDARD_DEVIATION)`.
    pub inlier: Normal<f64>,
    /// `N(0, OUTLIER_STANDARD_DEVIATION)`.
    pub outlier: Normal<f64>,
}

impl Noise {
    /// Creates the noise sources with the fixed standard deviations.
    pub fn new() -> Self {
        Self {
            inlier: Normal::new(0.0, INLIER_STANDARD_DEVIATION)
                .unwrap_or_else(|e| unreachable!("Constant standard deviation is valid: {e}")),
            outlier: Normal::new(0.0, OUTLIER_STANDARD_DEVIATION)
                .unwrap_or_else(|e| unreachable!("Constant standard deviation is valid: {e}")),
        }
    }
}
