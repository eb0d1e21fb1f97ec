use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::builder::EventBuilder;
use crate::error::{Error, Result};
use crate::model::{Event, Sequence};
use crate::policy::{ErrorPolicy, ErrorShape};
use crate::profile::Profile;
use crate::repair::repair;
use crate::sim::replay_events;
use crate::timing::TimingModel;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub inject_errors: bool,
    /// Characters typed past a double, inserted or missed key before it is noticed.
    pub delayed_window: RangeInclusive<usize>,
    /// Same, for a reversed pair. Transpositions are noticed sooner.
    pub reversal_window: RangeInclusive<usize>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            inject_errors: true,
            delayed_window: 1..=3,
            reversal_window: 1..=2,
        }
    }
}

impl SynthConfig {
    pub fn without_errors() -> Self {
        Self {
            inject_errors: false,
            ..Default::default()
        }
    }
}

fn validate_config(cfg: &SynthConfig) -> Result<()> {
    for (name, window) in [
        ("delayed_window", &cfg.delayed_window),
        ("reversal_window", &cfg.reversal_window),
    ] {
        if window.is_empty() {
            return Err(Error::InvalidConfig(format!("{name} must not be empty")));
        }
        if *window.start() == 0 {
            return Err(Error::InvalidConfig(format!("{name} must start at 1 or more")));
        }
    }
    Ok(())
}

/// Walks the text left to right, emitting each position (or error block) as
/// one atomic chunk. Nothing already emitted is ever revisited.
struct Synthesizer<'a, 't, 'p> {
    builder: EventBuilder<'t, 'p>,
    policy: &'a ErrorPolicy,
    cfg: &'a SynthConfig,
    chars: &'a [char],
}

impl<'a, 't, 'p> Synthesizer<'a, 't, 'p> {
    fn run(mut self, rng: &mut impl Rng) -> Vec<Event> {
        let mut i = 0usize;
        while i < self.chars.len() {
            i += self.step(i, rng);
        }
        self.builder.into_events()
    }

    /// Emit position `i` and return how many positions were consumed.
    fn step(&mut self, i: usize, rng: &mut impl Rng) -> usize {
        let c = self.chars[i];

        if self.cfg.inject_errors && c.is_ascii_alphabetic() && self.policy.should_error(rng) {
            let shape = self.policy.choose_shape(rng);
            if let Some(consumed) = self.inject(shape, i, rng) {
                return consumed;
            }
        }

        self.builder.type_char(c, rng);
        1
    }

    /// How many further characters get typed before the error is corrected.
    ///
    /// Zero means an immediate correction. A delay that would run past the end
    /// of the text also falls back to zero.
    fn correction_delay(
        &self,
        window: &RangeInclusive<usize>,
        available: usize,
        rng: &mut impl Rng,
    ) -> usize {
        if self.policy.correct_immediately(rng) {
            return 0;
        }
        let delay = rng.gen_range(window.clone());
        if delay > available {
            0
        } else {
            delay
        }
    }

    fn inject(&mut self, shape: ErrorShape, i: usize, rng: &mut impl Rng) -> Option<usize> {
        let chars = self.chars;
        let c = chars[i];
        let after = chars.len() - i - 1;

        let consumed = match shape {
            ErrorShape::Double => {
                let delay = self.correction_delay(&self.cfg.delayed_window, after, rng);
                let tail = &chars[i + 1..i + 1 + delay];

                self.builder.type_char(c, rng);
                self.builder.type_char(c, rng);
                self.builder.type_chars(tail, rng);
                self.builder.backspaces(delay + 1, rng);
                self.builder.type_chars(tail, rng);

                debug!(position = i, ?shape, delay, "injected error");
                1 + delay
            }
            ErrorShape::Inserted => {
                let cluster = self.policy.choose_cluster(rng);
                let wrong = self.policy.choose_substitute(c, cluster, rng);
                let delay = self.correction_delay(&self.cfg.delayed_window, after, rng);
                let tail = &chars[i + 1..i + 1 + delay];

                self.builder.type_char(wrong, rng);
                self.builder.type_chars(tail, rng);
                self.builder.backspaces(delay + 1, rng);
                self.builder.type_char(c, rng);
                self.builder.type_chars(tail, rng);

                debug!(position = i, ?shape, ?cluster, %wrong, delay, "injected error");
                1 + delay
            }
            ErrorShape::Missed => {
                if after == 0 {
                    return None;
                }
                let next = chars[i + 1];
                let delay = self.correction_delay(&self.cfg.delayed_window, after - 1, rng);
                let tail = &chars[i + 2..i + 2 + delay];

                self.builder.type_char(next, rng);
                self.builder.type_chars(tail, rng);
                self.builder.backspaces(delay + 1, rng);
                self.builder.type_char(c, rng);
                self.builder.type_char(next, rng);
                self.builder.type_chars(tail, rng);

                debug!(position = i, ?shape, delay, "injected error");
                2 + delay
            }
            ErrorShape::Reversed => {
                if after == 0 {
                    return None;
                }
                let next = chars[i + 1];
                let delay = self.correction_delay(&self.cfg.reversal_window, after - 1, rng);
                let tail = &chars[i + 2..i + 2 + delay];

                self.builder.type_char(next, rng);
                self.builder.type_char(c, rng);
                self.builder.type_chars(tail, rng);
                self.builder.backspaces(delay + 2, rng);
                self.builder.type_char(c, rng);
                self.builder.type_char(next, rng);
                self.builder.type_chars(tail, rng);

                debug!(position = i, ?shape, delay, "injected error");
                2 + delay
            }
        };

        Some(consumed)
    }
}

/// Synthesize a keystroke sequence that types `text` with `profile`'s rhythm
/// and error habits.
///
/// The only expected failure is an incomplete profile. The result always
/// replays to exactly `text`; if the raw synthesis does not, the tail is
/// repaired before returning.
pub fn synthesize(
    text: &str,
    profile: &Profile,
    cfg: &SynthConfig,
    rng: &mut impl Rng,
) -> Result<Sequence> {
    validate_config(cfg)?;
    profile.validate()?;

    let timing = TimingModel::new(profile);
    let policy = ErrorPolicy::new(profile);
    let chars: Vec<char> = text.chars().collect();

    let synth = Synthesizer {
        builder: EventBuilder::new(&timing),
        policy: &policy,
        cfg,
        chars: &chars,
    };
    let mut events = synth.run(rng);

    if replay_events(&events) != text {
        events = repair(events, text, &timing, rng)?;
    }

    Ok(Sequence::new(events))
}
