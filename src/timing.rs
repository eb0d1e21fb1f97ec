use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::model::Key;
use crate::profile::{pair_name, Profile};

/// Shortest hold a physical key press can have, in ms.
pub const HOLD_FLOOR_MS: f64 = 8.0;
/// Shortest gap between two key presses, in ms.
pub const TRANSITION_FLOOR_MS: f64 = 3.0;

const HOLD_FALLBACK_STD_FRACTION: f64 = 0.10;
const TRANSITION_FALLBACK_STD_FRACTION: f64 = 0.15;

const DEFAULT_HOLD_RANGE_MS: RangeInclusive<f64> = 70.0..=130.0;
const DEFAULT_TRANSITION_RANGE_MS: RangeInclusive<f64> = 80.0..=220.0;

/// Per-family sampler: the profile's entries plus the fallback used for keys
/// the profile has never seen.
#[derive(Debug, Clone)]
struct Family<'a> {
    means: &'a BTreeMap<String, f64>,
    stds: &'a BTreeMap<String, f64>,
    std_fraction: f64,
    floor: f64,
    // Mean of all known means; `None` when the family is empty.
    fallback_mean: Option<f64>,
    default_range: RangeInclusive<f64>,
}

impl<'a> Family<'a> {
    fn new(
        means: &'a BTreeMap<String, f64>,
        stds: &'a BTreeMap<String, f64>,
        std_fraction: f64,
        floor: f64,
        default_range: RangeInclusive<f64>,
    ) -> Self {
        let finite: Vec<f64> = means.values().copied().filter(|m| m.is_finite()).collect();
        let fallback_mean = if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        };

        Self {
            means,
            stds,
            std_fraction,
            floor,
            fallback_mean,
            default_range,
        }
    }

    fn sample(&self, name: &str, rng: &mut impl Rng) -> f64 {
        let known = self.means.get(name).copied().filter(|m| m.is_finite());

        let raw = match (known, self.fallback_mean) {
            (Some(mean), _) => {
                let std = self
                    .stds
                    .get(name)
                    .copied()
                    .unwrap_or(mean * self.std_fraction);
                normal_sample(mean, std, rng)
            }
            (None, Some(mean)) => normal_sample(mean, mean * self.std_fraction, rng),
            (None, None) => rng.gen_range(self.default_range.clone()),
        };

        raw.max(self.floor)
    }
}

fn normal_sample(mean: f64, std: f64, rng: &mut impl Rng) -> f64 {
    match Normal::new(mean, std.abs()) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}

/// Samples hold and transition durations from a profile.
#[derive(Debug, Clone)]
pub struct TimingModel<'a> {
    hold: Family<'a>,
    transition: Family<'a>,
}

impl<'a> TimingModel<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self {
            hold: Family::new(
                &profile.mean_dwell_times,
                &profile.std_dwell_times,
                HOLD_FALLBACK_STD_FRACTION,
                HOLD_FLOOR_MS,
                DEFAULT_HOLD_RANGE_MS,
            ),
            transition: Family::new(
                &profile.mean_flight_times,
                &profile.std_flight_times,
                TRANSITION_FALLBACK_STD_FRACTION,
                TRANSITION_FLOOR_MS,
                DEFAULT_TRANSITION_RANGE_MS,
            ),
        }
    }

    pub fn hold(&self, key: Key, rng: &mut impl Rng) -> f64 {
        self.hold.sample(&key.stat_name(), rng)
    }

    pub fn transition(&self, prev: Key, key: Key, rng: &mut impl Rng) -> f64 {
        self.transition.sample(&pair_name(prev, key), rng)
    }
}
