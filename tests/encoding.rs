use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use keyprint::encoding::{decode, decode_key, encode, encode_key, HEADER};
use keyprint::model::{Event, Key, Sequence};
use keyprint::profile::Profile;
use keyprint::sim::replay;
use keyprint::{synthesize, Error, SynthConfig};

fn event(key: Key, hold_ms: f64, transition_ms: f64) -> Event {
    Event {
        key,
        hold_ms,
        transition_ms,
        is_correction: key == Key::BACKSPACE,
    }
}

#[test]
fn encodes_header_named_keys_and_truncated_durations() {
    let seq = Sequence::new(vec![
        event(Key::SHIFT, 52.9, 0.0),
        event(Key::Char('g'), 97.2, 31.99),
        event(Key::SHIFT, 49.0, 18.5),
        event(Key::SPACE, 80.0, 140.0),
        event(Key::Char('{'), 75.0, 120.0),
        event(Key::BACKSPACE, 60.7, 200.1),
        event(Key::ENTER, 90.0, 300.0),
    ]);

    let expected = "\
key|dwell|flight
{Shift}|52|0
g|97|31
{Shift}|49|18
{Space}|80|140
{{}|75|120
{Backspace}|60|200
{Enter}|90|300
";
    assert_eq!(encode(&seq), expected);
}

#[test]
fn injector_syntax_characters_are_braced() {
    for c in ['+', '^', '!', '#', '{', '}'] {
        assert_eq!(encode_key(Key::Char(c)), format!("{{{c}}}"));
    }
    assert_eq!(encode_key(Key::Char('a')), "a");
    assert_eq!(encode_key(Key::TAB), "{Tab}");
}

#[test]
fn decodes_braced_and_bare_tokens() {
    assert_eq!(decode_key("{Enter}"), Some(Key::ENTER));
    assert_eq!(decode_key("{{}"), Some(Key::Char('{')));
    assert_eq!(decode_key("{}}"), Some(Key::Char('}')));
    assert_eq!(decode_key("}"), Some(Key::Char('}')));
    assert_eq!(decode_key("x"), Some(Key::Char('x')));
    assert_eq!(decode_key("{Escape}"), None);
    assert_eq!(decode_key("ab"), None);
}

#[test]
fn decodes_literal_pipe_key() {
    let seq = decode("key|dwell|flight\n||100|20\n").expect("decode");
    assert_eq!(seq.keys(), vec![Key::Char('|')]);
    assert_eq!(seq.events[0].hold_ms, 100.0);
    assert_eq!(seq.events[0].transition_ms, 20.0);
}

#[test]
fn decoded_synthesis_replays_to_the_same_text() {
    let profile = Profile {
        typo_rate: Some(0.4),
        ..Profile::default().with_hold("e", 90.0, 12.0)
    };
    let text = "Pipes | braces {} and #hash + caret ^!\nDone.";

    let mut rng = StdRng::seed_from_u64(21);
    let seq = synthesize(text, &profile, &SynthConfig::default(), &mut rng).expect("synthesize");
    let encoded = encode(&seq);
    assert!(encoded.starts_with(HEADER));

    let decoded = decode(&encoded).expect("decode");
    assert_eq!(decoded.len(), seq.len());
    assert_eq!(replay(&decoded), text);
    assert!(decoded
        .events
        .iter()
        .all(|e| e.is_correction == (e.key == Key::BACKSPACE)));
}

#[test]
fn rejects_missing_header_and_bad_lines() {
    assert!(matches!(
        decode("a|1|2\n"),
        Err(Error::Decode { line: 1, .. })
    ));
    assert!(matches!(decode(""), Err(Error::Decode { line: 1, .. })));
    assert!(matches!(
        decode("key|dwell|flight\na|1\n"),
        Err(Error::Decode { line: 2, .. })
    ));
    assert!(matches!(
        decode("key|dwell|flight\na|1|2\nb|x|2\n"),
        Err(Error::Decode { line: 3, .. })
    ));
}
