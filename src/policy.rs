use rand::seq::SliceRandom;
use rand::Rng;

use crate::keyboard::{self, ALPHABET, HOME_ROW};
use crate::profile::{ClusterWeights, CorrectionStyle, Profile};

/// Weights are floored here so that no outcome is structurally impossible.
/// An all-zero distribution therefore degrades to a uniform choice.
const MIN_CATEGORY_WEIGHT: f64 = 1e-6;

const DEFAULT_IMMEDIATE_PROBABILITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorShape {
    /// Key typed twice.
    Double,
    /// A wrong key typed in place of the intended one.
    Inserted,
    /// Key skipped; the following key is typed early.
    Missed,
    /// Key and its successor typed in swapped order.
    Reversed,
}

impl ErrorShape {
    pub const ALL: [ErrorShape; 4] = [
        ErrorShape::Double,
        ErrorShape::Inserted,
        ErrorShape::Missed,
        ErrorShape::Reversed,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cluster {
    HomeRow,
    AdjacentKeys,
    SameHand,
    Other,
}

impl Cluster {
    pub const ALL: [Cluster; 4] = [
        Cluster::HomeRow,
        Cluster::AdjacentKeys,
        Cluster::SameHand,
        Cluster::Other,
    ];
}

/// Rescale weights into `[0, 1]` by the largest finite weight, so summing
/// them can never overflow. NaN and non-positive weights become 0, `+inf`
/// becomes 1.
fn scale_to_unit<const N: usize>(weights: [f64; N]) -> [f64; N] {
    let max = weights
        .iter()
        .copied()
        .filter(|w| w.is_finite() && *w > 0.0)
        .fold(0.0, f64::max);

    weights.map(|w| {
        if w.is_nan() || w <= 0.0 {
            0.0
        } else if w.is_infinite() {
            1.0
        } else {
            w / max
        }
    })
}

fn weighted_choice<T: Copy, const N: usize>(options: &[(T, f64); N], rng: &mut impl Rng) -> T {
    let scaled = scale_to_unit(options.map(|(_, w)| w));
    let floored: Vec<(T, f64)> = options
        .iter()
        .zip(scaled)
        .map(|((value, _), w)| (*value, w.max(MIN_CATEGORY_WEIGHT)))
        .collect();

    match floored.choose_weighted(rng, |(_, w)| *w) {
        Ok((value, _)) => *value,
        Err(_) => options[rng.gen_range(0..N)].0,
    }
}

/// Decides where errors happen and what they look like. Holds no state between
/// positions; every call is an independent draw.
#[derive(Debug, Clone)]
pub struct ErrorPolicy {
    error_rate: f64,
    shape_weights: [(ErrorShape, f64); 4],
    cluster_weights: [(Cluster, f64); 4],
    immediate_probability: f64,
}

impl ErrorPolicy {
    pub fn new(profile: &Profile) -> Self {
        let shape_weights = [
            (
                ErrorShape::Double,
                profile.double_letter_error_rate.unwrap_or(0.4),
            ),
            (
                ErrorShape::Inserted,
                profile.inserted_letter_rate.unwrap_or(0.3),
            ),
            (ErrorShape::Missed, profile.missed_letter_rate.unwrap_or(0.2)),
            (
                ErrorShape::Reversed,
                profile.reversed_letters_rate.unwrap_or(0.1),
            ),
        ];

        let clusters = profile.typo_clusters.unwrap_or_default();
        let cluster_weights = cluster_table(&clusters);

        let style = profile.correction_style.unwrap_or_default();

        Self {
            error_rate: profile.error_rate(),
            shape_weights,
            cluster_weights,
            immediate_probability: immediate_probability(&style),
        }
    }

    pub fn should_error(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.error_rate)
    }

    pub fn choose_shape(&self, rng: &mut impl Rng) -> ErrorShape {
        weighted_choice(&self.shape_weights, rng)
    }

    pub fn choose_cluster(&self, rng: &mut impl Rng) -> Cluster {
        weighted_choice(&self.cluster_weights, rng)
    }

    /// Pick the wrong key typed instead of `correct`.
    ///
    /// The correct key is excluded from the pool whenever something else is
    /// available. Letters keep their case.
    pub fn choose_substitute(&self, correct: char, cluster: Cluster, rng: &mut impl Rng) -> char {
        let base = correct.to_ascii_lowercase();
        let pool: Vec<char> = match cluster {
            Cluster::HomeRow => HOME_ROW.chars().collect(),
            Cluster::AdjacentKeys => keyboard::adjacent(base),
            Cluster::SameHand => keyboard::hand(base).letters().chars().collect(),
            Cluster::Other => ALPHABET.chars().collect(),
        };

        let candidates: Vec<char> = pool.iter().copied().filter(|c| *c != base).collect();
        let chosen = candidates
            .choose(rng)
            .or_else(|| pool.choose(rng))
            .copied()
            .unwrap_or(base);

        if correct.is_ascii_uppercase() {
            chosen.to_ascii_uppercase()
        } else {
            chosen
        }
    }

    pub fn immediate_correction_probability(&self) -> f64 {
        self.immediate_probability
    }

    pub fn correct_immediately(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.immediate_probability)
    }
}

fn cluster_table(w: &ClusterWeights) -> [(Cluster, f64); 4] {
    [
        (Cluster::HomeRow, w.home_row),
        (Cluster::AdjacentKeys, w.adjacent_keys),
        (Cluster::SameHand, w.same_hand),
        (Cluster::Other, w.other),
    ]
}

fn immediate_probability(style: &CorrectionStyle) -> f64 {
    let [immediate, delayed] = scale_to_unit([style.immediate, style.delayed]);
    let total = immediate + delayed;
    if total <= 0.0 {
        return DEFAULT_IMMEDIATE_PROBABILITY;
    }
    (immediate / total).clamp(0.0, 1.0)
}
