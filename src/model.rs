use std::fmt;

use serde::{Deserialize, Serialize};

pub const SEQUENCE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Backspace,
    Shift,
}

impl NamedKey {
    pub fn name(self) -> &'static str {
        match self {
            NamedKey::Space => "space",
            NamedKey::Enter => "enter",
            NamedKey::Tab => "tab",
            NamedKey::Backspace => "backspace",
            NamedKey::Shift => "shift",
        }
    }
}

/// Symbolic key identity: either a printable character or a named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

impl Key {
    pub const SPACE: Key = Key::Named(NamedKey::Space);
    pub const ENTER: Key = Key::Named(NamedKey::Enter);
    pub const TAB: Key = Key::Named(NamedKey::Tab);
    pub const BACKSPACE: Key = Key::Named(NamedKey::Backspace);
    pub const SHIFT: Key = Key::Named(NamedKey::Shift);

    /// Name under which the profile stores statistics for this key.
    ///
    /// Letters are folded to lowercase: the profile was learned from physical
    /// keys, so `G` and `g` share one entry.
    pub fn stat_name(self) -> String {
        match self {
            Key::Char(c) => c.to_lowercase().collect(),
            Key::Named(named) => named.name().to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Named(named) => f.write_str(named.name()),
        }
    }
}

/// One timed keystroke. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub key: Key,
    pub hold_ms: f64,
    /// Time from the previous key's release to this key's press.
    pub transition_ms: f64,
    pub is_correction: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    pub version: u32,
    pub events: Vec<Event>,
}

impl Sequence {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            version: SEQUENCE_VERSION,
            events,
        }
    }

    pub fn keys(&self) -> Vec<Key> {
        self.events.iter().map(|e| e.key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
