use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::model::Key;

/// Separator between the two key names of a transition statistic.
pub const PAIR_SEPARATOR: char = '→';

pub const DEFAULT_ERROR_RATE: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionStyle {
    pub immediate: f64,
    pub delayed: f64,
}

impl Default for CorrectionStyle {
    fn default() -> Self {
        Self {
            immediate: 4.0,
            delayed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterWeights {
    #[serde(default = "unit_weight")]
    pub home_row: f64,
    #[serde(default = "unit_weight")]
    pub adjacent_keys: f64,
    #[serde(default = "unit_weight")]
    pub same_hand: f64,
    #[serde(default = "unit_weight")]
    pub other: f64,
}

fn unit_weight() -> f64 {
    1.0
}

impl Default for ClusterWeights {
    fn default() -> Self {
        Self {
            home_row: 1.0,
            adjacent_keys: 1.0,
            same_hand: 1.0,
            other: 1.0,
        }
    }
}

/// Read-only snapshot of one user's typing biometrics.
///
/// Field names match the JSON profile record written by the recorder. Every
/// optional field has a documented default; only `mean_dwell_times` is
/// required (see [`Profile::validate`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub mean_dwell_times: BTreeMap<String, f64>,
    #[serde(default)]
    pub std_dwell_times: BTreeMap<String, f64>,
    #[serde(default)]
    pub mean_flight_times: BTreeMap<String, f64>,
    #[serde(default)]
    pub std_flight_times: BTreeMap<String, f64>,
    #[serde(default)]
    pub session_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typo_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_letter_error_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_letter_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missed_letter_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed_letters_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_style: Option<CorrectionStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typo_clusters: Option<ClusterWeights>,

    #[serde(default)]
    pub common_typo_patterns: BTreeMap<String, u64>,
}

pub fn pair_name(prev: Key, curr: Key) -> String {
    format!("{}{PAIR_SEPARATOR}{}", prev.stat_name(), curr.stat_name())
}

impl Profile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Minimum-completeness check run before any sampling.
    pub fn validate(&self) -> Result<()> {
        if self.mean_dwell_times.is_empty() {
            return Err(Error::ProfileIncomplete(
                "no per-key hold statistics".to_string(),
            ));
        }
        Ok(())
    }

    pub fn error_rate(&self) -> f64 {
        match self.typo_rate {
            Some(rate) if rate.is_finite() => rate.clamp(0.0, 1.0),
            _ => DEFAULT_ERROR_RATE,
        }
    }

    /// Set a key's mean/std hold time. Convenience for building profiles in code.
    pub fn with_hold(mut self, key: &str, mean: f64, std: f64) -> Self {
        self.mean_dwell_times.insert(key.to_string(), mean);
        self.std_dwell_times.insert(key.to_string(), std);
        self
    }

    pub fn with_transition(mut self, prev: &str, curr: &str, mean: f64, std: f64) -> Self {
        let pair = format!("{prev}{PAIR_SEPARATOR}{curr}");
        self.mean_flight_times.insert(pair.clone(), mean);
        self.std_flight_times.insert(pair, std);
        self
    }

    /// Fold one recorded session into the running statistics.
    ///
    /// Every statistic is a session-count weighted running average, so the new
    /// session weighs `1 / (session_count + 1)`. Key names are stored
    /// lowercased, the form the timing model looks them up by.
    pub fn absorb_session(&mut self, session: &[RecordedKeystroke]) {
        if session.is_empty() {
            return;
        }

        let n_sessions = self.session_count + 1;
        let w_old = self.session_count as f64 / n_sessions as f64;
        let w_new = 1.0 / n_sessions as f64;

        let mut corrections = 0usize;
        let mut immediate = 0usize;
        let mut delayed = 0usize;

        let keys: Vec<String> = session.iter().map(|s| s.key.to_lowercase()).collect();

        for (idx, stroke) in session.iter().enumerate() {
            update_running(
                &mut self.mean_dwell_times,
                &mut self.std_dwell_times,
                &keys[idx],
                stroke.dwell_time,
                w_old,
                w_new,
            );

            if idx > 0 {
                let pair = format!("{}{PAIR_SEPARATOR}{}", keys[idx - 1], keys[idx]);
                update_running(
                    &mut self.mean_flight_times,
                    &mut self.std_flight_times,
                    &pair,
                    stroke.flight_time.max(0.0),
                    w_old,
                    w_new,
                );
            }

            if stroke.is_correction {
                corrections += 1;
                if idx > 0 && !session[idx - 1].is_correction {
                    immediate += 1;
                } else {
                    delayed += 1;
                }
            }
        }

        let correction_ratio = corrections as f64 / session.len() as f64;
        self.typo_rate = Some(self.typo_rate.unwrap_or(0.0) * w_old + correction_ratio * w_new);

        let style = self.correction_style.get_or_insert(CorrectionStyle {
            immediate: 0.0,
            delayed: 0.0,
        });
        style.immediate = style.immediate * w_old + immediate as f64 * w_new;
        style.delayed = style.delayed * w_old + delayed as f64 * w_new;

        // Backspaces alone cannot tell error shapes apart; attribute them to
        // insertions and let the other shapes decay.
        self.inserted_letter_rate =
            Some(self.inserted_letter_rate.unwrap_or(0.0) * w_old + correction_ratio * w_new);
        for rate in [
            &mut self.double_letter_error_rate,
            &mut self.missed_letter_rate,
            &mut self.reversed_letters_rate,
        ] {
            *rate = Some(rate.unwrap_or(0.0) * w_old);
        }

        self.session_count = n_sessions;
    }
}

fn update_running(
    means: &mut BTreeMap<String, f64>,
    stds: &mut BTreeMap<String, f64>,
    key: &str,
    value: f64,
    w_old: f64,
    w_new: f64,
) {
    let mean_old = means.get(key).copied().unwrap_or(value);
    let mean = mean_old * w_old + value * w_new;
    means.insert(key.to_string(), mean);

    let deviation = (value - mean).abs();
    let std = match stds.get(key) {
        Some(std_old) => std_old * w_old + deviation * w_new,
        None => deviation,
    };
    stds.insert(key.to_string(), std);
}

/// One captured keystroke as the recorder persists it in a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedKeystroke {
    pub key: String,
    pub dwell_time: f64,
    pub flight_time: f64,
    #[serde(deserialize_with = "flag_from_bool_or_int")]
    pub is_correction: bool,
}

pub fn load_session(path: impl AsRef<Path>) -> Result<Vec<RecordedKeystroke>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

// Session files store the flag as 0/1.
fn flag_from_bool_or_int<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}
