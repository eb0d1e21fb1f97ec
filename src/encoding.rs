//! Pipe-separated text encoding consumed by downstream key injectors.
//!
//! ```text
//! key|dwell|flight
//! {Shift}|52|0
//! g|97|31
//! {Shift}|49|18
//! o|88|140
//! ```
//!
//! Named keys are written in braces. Literal characters that injectors treat
//! as modifiers or brace syntax (`+ ^ ! # { }`) are braced too, so `{{}` is the
//! character `{` and `{Enter}` is the Enter key. Durations are truncated to
//! whole milliseconds.

use crate::error::{Error, Result};
use crate::model::{Event, Key, NamedKey, Sequence};

pub const HEADER: &str = "key|dwell|flight";

const BRACED_LITERALS: &str = "+^!#{}";

fn named_token(named: NamedKey) -> &'static str {
    match named {
        NamedKey::Space => "{Space}",
        NamedKey::Enter => "{Enter}",
        NamedKey::Tab => "{Tab}",
        NamedKey::Backspace => "{Backspace}",
        NamedKey::Shift => "{Shift}",
    }
}

pub fn encode_key(key: Key) -> String {
    match key {
        Key::Named(named) => named_token(named).to_string(),
        Key::Char(c) if BRACED_LITERALS.contains(c) => format!("{{{c}}}"),
        Key::Char(c) => c.to_string(),
    }
}

pub fn decode_key(token: &str) -> Option<Key> {
    let named = match token {
        "{Space}" => Some(NamedKey::Space),
        "{Enter}" => Some(NamedKey::Enter),
        "{Tab}" => Some(NamedKey::Tab),
        "{Backspace}" => Some(NamedKey::Backspace),
        "{Shift}" => Some(NamedKey::Shift),
        _ => None,
    };
    if let Some(named) = named {
        return Some(Key::Named(named));
    }

    let inner = token
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|inner| !inner.is_empty());
    let literal = inner.unwrap_or(token);

    let mut chars = literal.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Key::Char(c)),
        _ => None,
    }
}

pub fn encode(seq: &Sequence) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + seq.events.len() * 12);
    out.push_str(HEADER);
    out.push('\n');
    for e in &seq.events {
        out.push_str(&encode_key(e.key));
        out.push('|');
        out.push_str(&(e.hold_ms.trunc() as u64).to_string());
        out.push('|');
        out.push_str(&(e.transition_ms.trunc() as u64).to_string());
        out.push('\n');
    }
    out
}

fn parse_duration(field: &str, line: usize, what: &str) -> Result<f64> {
    field.trim().parse::<u64>().map(|v| v as f64).map_err(|_| Error::Decode {
        line,
        reason: format!("invalid {what} duration {field:?}"),
    })
}

/// Parse the encoded form back into events.
///
/// The key field is everything before the last two `|`, so a literal `|` key
/// survives. Backspaces are marked as corrections.
pub fn decode(input: &str) -> Result<Sequence> {
    let mut lines = input.lines().enumerate();

    match lines.next() {
        Some((_, first)) if first.trim_end() == HEADER => {}
        Some((_, first)) => {
            return Err(Error::Decode {
                line: 1,
                reason: format!("expected header {HEADER:?}, got {first:?}"),
            })
        }
        None => {
            return Err(Error::Decode {
                line: 1,
                reason: "missing header".to_string(),
            })
        }
    }

    let mut events = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        if line.is_empty() {
            continue;
        }

        let mut fields = line.rsplitn(3, '|');
        let (Some(flight), Some(dwell), Some(token)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::Decode {
                line: line_no,
                reason: "expected key|dwell|flight".to_string(),
            });
        };

        let key = decode_key(token).ok_or_else(|| Error::Decode {
            line: line_no,
            reason: format!("unknown key {token:?}"),
        })?;

        events.push(Event {
            key,
            hold_ms: parse_duration(dwell, line_no, "dwell")?,
            transition_ms: parse_duration(flight, line_no, "flight")?,
            is_correction: key == Key::BACKSPACE,
        });
    }

    Ok(Sequence::new(events))
}
