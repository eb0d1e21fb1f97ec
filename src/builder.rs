use rand::Rng;

use crate::keyboard::key_for_text_char;
use crate::model::{Event, Key};
use crate::timing::TimingModel;

/// Append-only event list that chains each transition to the key emitted
/// immediately before it.
#[derive(Debug, Clone)]
pub struct EventBuilder<'t, 'p> {
    timing: &'t TimingModel<'p>,
    events: Vec<Event>,
    prev: Option<Key>,
}

impl<'t, 'p> EventBuilder<'t, 'p> {
    pub fn new(timing: &'t TimingModel<'p>) -> Self {
        Self::resume(timing, Vec::new())
    }

    /// Continue appending after an existing event list.
    pub fn resume(timing: &'t TimingModel<'p>, events: Vec<Event>) -> Self {
        let prev = events.last().map(|e| e.key);
        Self {
            timing,
            events,
            prev,
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    fn emit(&mut self, key: Key, is_correction: bool, rng: &mut impl Rng) {
        let hold_ms = self.timing.hold(key, rng);
        let transition_ms = match self.prev {
            Some(prev) => self.timing.transition(prev, key, rng),
            None => 0.0,
        };
        self.events.push(Event {
            key,
            hold_ms,
            transition_ms,
            is_correction,
        });
        self.prev = Some(key);
    }

    /// Type one key. An uppercase letter becomes shift press, the lowercase
    /// letter, and shift release, so shift never spans more than one letter.
    pub fn type_key(&mut self, key: Key, rng: &mut impl Rng) {
        match key {
            Key::Char(c) if c.is_ascii_uppercase() => {
                self.emit(Key::SHIFT, false, rng);
                self.emit(Key::Char(c.to_ascii_lowercase()), false, rng);
                self.emit(Key::SHIFT, false, rng);
            }
            key => self.emit(key, false, rng),
        }
    }

    pub fn type_char(&mut self, c: char, rng: &mut impl Rng) {
        self.type_key(key_for_text_char(c), rng);
    }

    pub fn type_chars(&mut self, chars: &[char], rng: &mut impl Rng) {
        for &c in chars {
            self.type_char(c, rng);
        }
    }

    pub fn backspace(&mut self, rng: &mut impl Rng) {
        self.emit(Key::BACKSPACE, true, rng);
    }

    pub fn backspaces(&mut self, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            self.backspace(rng);
        }
    }
}
