use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use keyprint::profile::{CorrectionStyle, Profile};
use keyprint::sim::replay;
use keyprint::timing::{HOLD_FLOOR_MS, TRANSITION_FLOOR_MS};
use keyprint::{synthesize, Error, Key, Sequence, SynthConfig};

fn base_profile() -> Profile {
    Profile::default()
        .with_hold("a", 100.0, 12.0)
        .with_hold("b", 120.0, 15.0)
        .with_hold("shift", 90.0, 10.0)
        .with_transition("a", "b", 140.0, 30.0)
        .with_transition("shift", "g", 60.0, 8.0)
}

fn error_heavy_profile() -> Profile {
    Profile {
        typo_rate: Some(0.6),
        ..base_profile()
    }
}

fn double_only(immediate: f64, delayed: f64) -> Profile {
    Profile {
        typo_rate: Some(1.0),
        double_letter_error_rate: Some(1.0),
        inserted_letter_rate: Some(0.0),
        missed_letter_rate: Some(0.0),
        reversed_letters_rate: Some(0.0),
        correction_style: Some(CorrectionStyle { immediate, delayed }),
        ..base_profile()
    }
}

const TEXTS: &[&str] = &[
    "",
    "a",
    "Z",
    " ",
    "\t\n ",
    "ab",
    "Go",
    "hello world",
    "The Quick Brown Fox jumps over the lazy dog.\nSecond line\twith a tab!",
    "ALL CAPS SHOUTING",
    "mixed 123 digits, punctuation {braces} + pipes | and #tags",
    "xy",
];

#[test]
fn two_keys_without_errors() {
    let profile = Profile::default()
        .with_hold("a", 100.0, 10.0)
        .with_hold("b", 120.0, 10.0);

    let mut rng = StdRng::seed_from_u64(1);
    let seq = synthesize("ab", &profile, &SynthConfig::without_errors(), &mut rng)
        .expect("synthesis should succeed");

    assert_eq!(seq.keys(), vec![Key::Char('a'), Key::Char('b')]);
    assert_eq!(seq.events[0].transition_ms, 0.0);
    assert_eq!(replay(&seq), "ab");
}

#[test]
fn replay_matches_text_with_and_without_errors() {
    for seed in 0..40u64 {
        for text in TEXTS {
            for cfg in [SynthConfig::default(), SynthConfig::without_errors()] {
                let mut rng = StdRng::seed_from_u64(seed);
                let seq = synthesize(text, &error_heavy_profile(), &cfg, &mut rng)
                    .expect("synthesis should succeed");
                assert_eq!(replay(&seq), text.to_string(), "seed {seed}");
            }
        }
    }
}

#[test]
fn every_error_shape_and_delay_round_trips() {
    let shapes = [
        (1.0, 0.0, 0.0, 0.0),
        (0.0, 1.0, 0.0, 0.0),
        (0.0, 0.0, 1.0, 0.0),
        (0.0, 0.0, 0.0, 1.0),
    ];
    let text = "Typing Every Shape of error, Twice over.";

    for (double, inserted, missed, reversed) in shapes {
        for (immediate, delayed) in [(1.0, 0.0), (0.0, 1.0)] {
            let profile = Profile {
                typo_rate: Some(1.0),
                double_letter_error_rate: Some(double),
                inserted_letter_rate: Some(inserted),
                missed_letter_rate: Some(missed),
                reversed_letters_rate: Some(reversed),
                correction_style: Some(CorrectionStyle { immediate, delayed }),
                ..base_profile()
            };

            for seed in 0..10u64 {
                let mut rng = StdRng::seed_from_u64(seed);
                let seq = synthesize(text, &profile, &SynthConfig::default(), &mut rng)
                    .expect("synthesis should succeed");
                assert_eq!(replay(&seq), text);
            }
        }
    }
}

#[test]
fn durations_respect_floors() {
    // Tiny means with huge spread push many raw samples below the floors.
    let profile = Profile {
        typo_rate: Some(0.5),
        ..Profile::default()
            .with_hold("a", 1.0, 50.0)
            .with_transition("a", "a", 1.0, 50.0)
    };

    let mut rng = StdRng::seed_from_u64(9);
    let seq = synthesize(
        "aaaa Aaaa aaaa bbbb",
        &profile,
        &SynthConfig::default(),
        &mut rng,
    )
    .expect("synthesis should succeed");

    assert_eq!(seq.events[0].transition_ms, 0.0);
    for e in &seq.events {
        assert!(e.hold_ms >= HOLD_FLOOR_MS, "hold {} below floor", e.hold_ms);
    }
    for e in &seq.events[1..] {
        assert!(
            e.transition_ms >= TRANSITION_FLOOR_MS,
            "transition {} below floor",
            e.transition_ms
        );
    }
}

#[test]
fn double_error_with_immediate_correction() {
    let mut rng = StdRng::seed_from_u64(5);
    let seq = synthesize(
        "hi",
        &double_only(1.0, 0.0),
        &SynthConfig::default(),
        &mut rng,
    )
    .expect("synthesis should succeed");

    assert_eq!(
        seq.keys(),
        vec![
            Key::Char('h'),
            Key::Char('h'),
            Key::BACKSPACE,
            Key::Char('i'),
            Key::Char('i'),
            Key::BACKSPACE,
        ]
    );
    assert!(seq
        .events
        .iter()
        .all(|e| e.is_correction == (e.key == Key::BACKSPACE)));
    assert_eq!(replay(&seq), "hi");
}

fn max_backspace_run(seq: &Sequence) -> usize {
    let mut best = 0;
    let mut run = 0;
    for e in &seq.events {
        if e.key == Key::BACKSPACE {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

#[test]
fn delayed_correction_backspaces_over_extra_characters() {
    let text = "delayed corrections happen later";
    let mut rng = StdRng::seed_from_u64(3);
    let seq = synthesize(
        text,
        &double_only(0.0, 1.0),
        &SynthConfig::default(),
        &mut rng,
    )
    .expect("synthesis should succeed");

    assert!(
        max_backspace_run(&seq) >= 2,
        "expected a delayed correction to remove more than one character"
    );
    assert_eq!(replay(&seq), text);
}

#[test]
fn delayed_window_past_end_falls_back_to_immediate() {
    // Only one character exists, so any delay is impossible.
    let mut rng = StdRng::seed_from_u64(11);
    let seq = synthesize(
        "q",
        &double_only(0.0, 1.0),
        &SynthConfig::default(),
        &mut rng,
    )
    .expect("synthesis should succeed");

    assert_eq!(
        seq.keys(),
        vec![Key::Char('q'), Key::Char('q'), Key::BACKSPACE]
    );
}

#[test]
fn shifted_letter_is_wrapped_in_shift_pulses() {
    let mut rng = StdRng::seed_from_u64(2);
    let seq = synthesize(
        "Go",
        &base_profile(),
        &SynthConfig::without_errors(),
        &mut rng,
    )
    .expect("synthesis should succeed");

    assert_eq!(
        seq.keys(),
        vec![Key::SHIFT, Key::Char('g'), Key::SHIFT, Key::Char('o')]
    );
    assert_eq!(replay(&seq), "Go");
}

#[test]
fn shift_pulses_pair_up_around_one_letter() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = synthesize(
            "Every Capital Letter Gets Its Own Shift, OK?",
            &error_heavy_profile(),
            &SynthConfig::default(),
            &mut rng,
        )
        .expect("synthesis should succeed");

        let keys = seq.keys();
        let mut idx = 0;
        while idx < keys.len() {
            if keys[idx] == Key::SHIFT {
                let Some(Key::Char(letter)) = keys.get(idx + 1).copied() else {
                    panic!("shift press at {idx} not followed by a letter");
                };
                assert!(letter.is_ascii_lowercase());
                assert_eq!(keys.get(idx + 2), Some(&Key::SHIFT), "missing release");
                idx += 3;
            } else {
                idx += 1;
            }
        }
    }
}

#[test]
fn empty_text_yields_empty_sequence() {
    let mut rng = StdRng::seed_from_u64(0);
    let seq = synthesize("", &error_heavy_profile(), &SynthConfig::default(), &mut rng)
        .expect("synthesis should succeed");
    assert!(seq.is_empty());
}

#[test]
fn non_alphabetic_text_is_never_error_injected() {
    let text = "123 456,.!?\n\t-=[]";
    let profile = Profile {
        typo_rate: Some(1.0),
        ..base_profile()
    };

    for seed in 0..10u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = synthesize(text, &profile, &SynthConfig::default(), &mut rng)
            .expect("synthesis should succeed");
        assert_eq!(seq.len(), text.chars().count());
        assert!(seq.events.iter().all(|e| !e.is_correction));
    }
}

#[test]
fn incomplete_profile_fails_before_sampling() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = synthesize("abc", &Profile::default(), &SynthConfig::default(), &mut rng)
        .expect_err("empty profile must be rejected");
    assert!(matches!(err, Error::ProfileIncomplete(_)));
    assert!(err.to_string().contains("record more typing data"));
}

#[test]
fn zero_delay_window_is_rejected() {
    let cfg = SynthConfig {
        delayed_window: 0..=2,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let err = synthesize("abc", &base_profile(), &cfg, &mut rng)
        .expect_err("zero-length delay must be rejected");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn all_zero_weights_still_synthesize() {
    let profile = Profile {
        typo_rate: Some(1.0),
        double_letter_error_rate: Some(0.0),
        inserted_letter_rate: Some(0.0),
        missed_letter_rate: Some(0.0),
        reversed_letters_rate: Some(0.0),
        typo_clusters: Some(keyprint::profile::ClusterWeights {
            home_row: 0.0,
            adjacent_keys: 0.0,
            same_hand: 0.0,
            other: 0.0,
        }),
        correction_style: Some(CorrectionStyle {
            immediate: 0.0,
            delayed: 0.0,
        }),
        ..base_profile()
    };

    for seed in 0..10u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = synthesize(
            "Zero weights fall back to Uniform choices",
            &profile,
            &SynthConfig::default(),
            &mut rng,
        )
        .expect("synthesis should succeed");
        assert!(seq.events.iter().any(|e| e.is_correction));
        assert_eq!(replay(&seq), "Zero weights fall back to Uniform choices");
    }
}

/// Every key pair gets its own fixed flight time, so each event's transition
/// shows which key it was chained to.
fn chained_profile(shapes: (f64, f64, f64, f64), immediate: f64, delayed: f64) -> Profile {
    let (double, inserted, missed, reversed) = shapes;
    let profile = [
        ("a", "a", 11.0),
        ("a", "backspace", 22.0),
        ("backspace", "b", 33.0),
        ("b", "b", 44.0),
        ("b", "backspace", 55.0),
        ("a", "b", 66.0),
        ("backspace", "backspace", 77.0),
        ("b", "c", 88.0),
        ("c", "c", 99.0),
        ("c", "backspace", 110.0),
        ("backspace", "a", 121.0),
    ]
    .into_iter()
    .fold(
        Profile::default()
            .with_hold("a", 100.0, 0.0)
            .with_hold("b", 100.0, 0.0)
            .with_hold("c", 100.0, 0.0)
            .with_hold("backspace", 100.0, 0.0),
        |p, (prev, curr, mean)| p.with_transition(prev, curr, mean, 0.0),
    );

    Profile {
        typo_rate: Some(1.0),
        double_letter_error_rate: Some(double),
        inserted_letter_rate: Some(inserted),
        missed_letter_rate: Some(missed),
        reversed_letters_rate: Some(reversed),
        correction_style: Some(CorrectionStyle { immediate, delayed }),
        ..profile
    }
}

fn keyed_transitions(seq: &Sequence) -> Vec<(Key, f64)> {
    seq.events.iter().map(|e| (e.key, e.transition_ms)).collect()
}

fn one_char_delay() -> SynthConfig {
    SynthConfig {
        delayed_window: 1..=1,
        reversal_window: 1..=1,
        ..Default::default()
    }
}

#[test]
fn immediate_double_chains_transitions_to_the_previous_key() {
    let profile = chained_profile((1.0, 0.0, 0.0, 0.0), 1.0, 0.0);
    let mut rng = StdRng::seed_from_u64(6);
    let seq = synthesize("ab", &profile, &SynthConfig::default(), &mut rng)
        .expect("synthesis should succeed");

    assert_eq!(
        keyed_transitions(&seq),
        vec![
            (Key::Char('a'), 0.0),
            (Key::Char('a'), 11.0),
            (Key::BACKSPACE, 22.0),
            (Key::Char('b'), 33.0),
            (Key::Char('b'), 44.0),
            (Key::BACKSPACE, 55.0),
        ]
    );
}

#[test]
fn delayed_double_chains_transitions_through_the_correction() {
    let profile = chained_profile((1.0, 0.0, 0.0, 0.0), 0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(7);
    let seq = synthesize("abc", &profile, &one_char_delay(), &mut rng)
        .expect("synthesis should succeed");

    assert_eq!(
        keyed_transitions(&seq),
        vec![
            (Key::Char('a'), 0.0),
            (Key::Char('a'), 11.0),
            (Key::Char('b'), 66.0),
            (Key::BACKSPACE, 55.0),
            (Key::BACKSPACE, 77.0),
            (Key::Char('b'), 33.0),
            (Key::Char('c'), 88.0),
            (Key::Char('c'), 99.0),
            (Key::BACKSPACE, 110.0),
        ]
    );
    assert_eq!(replay(&seq), "abc");
}

#[test]
fn delayed_missed_key_chains_transitions_through_the_correction() {
    let profile = chained_profile((0.0, 0.0, 1.0, 0.0), 0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(8);
    let seq = synthesize("abc", &profile, &one_char_delay(), &mut rng)
        .expect("synthesis should succeed");

    assert_eq!(
        keyed_transitions(&seq),
        vec![
            (Key::Char('b'), 0.0),
            (Key::Char('c'), 88.0),
            (Key::BACKSPACE, 110.0),
            (Key::BACKSPACE, 77.0),
            (Key::Char('a'), 121.0),
            (Key::Char('b'), 66.0),
            (Key::Char('c'), 88.0),
        ]
    );
    assert_eq!(replay(&seq), "abc");
}

#[test]
fn huge_profile_weights_still_synthesize() {
    let profile = Profile {
        typo_rate: Some(1.0),
        double_letter_error_rate: Some(1e308),
        inserted_letter_rate: Some(1e308),
        missed_letter_rate: Some(f64::MAX),
        reversed_letters_rate: Some(0.0),
        correction_style: Some(CorrectionStyle {
            immediate: 1e308,
            delayed: 1e308,
        }),
        ..base_profile()
    };
    let text = "Huge weights must not overflow";

    for seed in 0..10u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = synthesize(text, &profile, &SynthConfig::default(), &mut rng)
            .expect("synthesis should succeed");
        assert_eq!(replay(&seq), text);
    }
}
