use rand::Rng;
use tracing::warn;

use crate::builder::EventBuilder;
use crate::error::{Error, Result};
use crate::model::Event;
use crate::sim::replay_events;
use crate::timing::TimingModel;

/// Length, in chars, of the longest common prefix of `a` and `b`.
pub fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Force `replay(events) == target` by appending to the tail.
///
/// Everything past the longest common prefix is backspaced away, then the rest
/// of `target` is typed on the correct path. Already-emitted events are never
/// touched.
pub fn repair(
    events: Vec<Event>,
    target: &str,
    timing: &TimingModel<'_>,
    rng: &mut impl Rng,
) -> Result<Vec<Event>> {
    let current: Vec<char> = replay_events(&events).chars().collect();
    let wanted: Vec<char> = target.chars().collect();

    let prefix = common_prefix_len(&current, &wanted);
    let surplus = current.len() - prefix;
    warn!(
        prefix,
        surplus,
        missing = wanted.len() - prefix,
        "replay diverged from target text; repairing tail"
    );

    let mut builder = EventBuilder::resume(timing, events);
    builder.backspaces(surplus, rng);
    builder.type_chars(&wanted[prefix..], rng);
    let events = builder.into_events();

    let actual = replay_events(&events);
    if actual != target {
        return Err(Error::ReplayMismatch {
            expected: target.to_string(),
            actual,
        });
    }

    Ok(events)
}
