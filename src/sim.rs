use crate::model::{Event, Key, NamedKey, Sequence};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SequenceStats {
    pub events: usize,
    pub key_events: usize,
    pub shift_events: usize,
    pub corrections: usize,
    pub total_ms: f64,
}

pub fn stats(seq: &Sequence) -> SequenceStats {
    let mut out = SequenceStats {
        events: seq.events.len(),
        ..Default::default()
    };

    for e in &seq.events {
        match e.key {
            Key::Named(NamedKey::Shift) => out.shift_events += 1,
            Key::Named(NamedKey::Backspace) => out.corrections += 1,
            _ => out.key_events += 1,
        }
        out.total_ms += e.hold_ms + e.transition_ms;
    }

    out
}

#[derive(Debug, Default, Clone)]
struct ReplayState {
    buf: Vec<char>,
    shift_armed: bool,
    awaiting_shift_release: bool,
}

impl ReplayState {
    fn apply(&mut self, key: Key) {
        match key {
            Key::Named(NamedKey::Shift) => {
                if self.awaiting_shift_release {
                    // Release; the armed flag stays until a letter consumes it.
                    self.awaiting_shift_release = false;
                } else {
                    self.shift_armed = true;
                    self.awaiting_shift_release = true;
                }
            }
            Key::Named(NamedKey::Backspace) => {
                self.buf.pop();
            }
            Key::Named(NamedKey::Enter) => self.buf.push('\n'),
            Key::Named(NamedKey::Space) => self.buf.push(' '),
            Key::Named(NamedKey::Tab) => self.buf.push('\t'),
            Key::Char(c) => {
                if self.shift_armed {
                    self.buf.extend(c.to_uppercase());
                    self.shift_armed = false;
                } else {
                    self.buf.push(c);
                }
            }
        }
    }
}

/// Reconstruct the logical text an event list produces when typed.
pub fn replay_events(events: &[Event]) -> String {
    let mut state = ReplayState::default();
    for e in events {
        state.apply(e.key);
    }
    state.buf.into_iter().collect()
}

pub fn replay(seq: &Sequence) -> String {
    replay_events(&seq.events)
}
