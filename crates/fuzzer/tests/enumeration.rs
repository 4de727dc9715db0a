//! Behaviour of the individual enumeration tiers

mod common;

use cardfuzz::{
    ClassEnumerator, Enumerator, InstructionEnumerator, ParameterEnumerator, Prober, StatusTables,
};
use cardfuzz_apdu_core::{Command, TransportError};
use common::{Reply, ScriptedCard, sw};

fn prober(script: impl FnMut(Command) -> Reply + Send + 'static) -> Prober<ScriptedCard> {
    Prober::new(ScriptedCard::new(script), StatusTables::default())
}

#[test]
fn test_classes_skip_unsupported_marker() {
    let mut prober = prober(|cmd| match cmd.class() {
        0x42 => Err(TransportError::Transmission),
        // Near misses of the marker still count as recognized
        0x6F => sw(0x6E, 0x01),
        c if c % 3 == 0 => sw(0x6E, 0x00),
        _ => sw(0x6D, 0x00),
    });

    let classes: Vec<u8> = ClassEnumerator::new().iter(&mut prober).collect();

    let expected: Vec<u8> = (0x00..=0xFFu8)
        .filter(|c| *c == 0x6F || (c % 3 != 0 && *c != 0x42))
        .collect();
    assert_eq!(classes, expected);

    // One probe per class, ascending, always with INS P1 P2 = 00
    let sent = prober.transport().sent();
    assert_eq!(sent.len(), 256);
    for (i, cmd) in sent.iter().enumerate() {
        assert_eq!(*cmd, Command::new(i as u8, 0x00, 0x00, 0x00));
    }
}

#[test]
fn test_class_enumerator_position() {
    let mut prober = prober(|cmd| match cmd.class() {
        0x10 => sw(0x90, 0x00),
        _ => sw(0x6E, 0x00),
    });

    let mut classes = ClassEnumerator::new();
    assert_eq!(classes.current(), None);
    assert_eq!(classes.next_with(&mut prober), Some(0x10));
    assert_eq!(classes.current(), Some(0x10));
    assert_eq!(classes.next_with(&mut prober), None);
    assert!(classes.is_exhausted());
    assert_eq!(classes.next_with(&mut prober), None);
    assert_eq!(prober.transport().sent().len(), 256);
}

#[test]
fn test_blacklisted_instructions_never_sent() {
    let tables = StatusTables::new().with_blacklisted_instruction(0xE6);
    let mut prober = Prober::new(ScriptedCard::new(|_| sw(0x90, 0x00)), tables);

    let found: Vec<_> = InstructionEnumerator::new(0x00).iter(&mut prober).collect();
    assert_eq!(found.len(), 253);

    let sent = prober.transport().sent();
    assert_eq!(sent.len(), 253);
    assert!(
        sent.iter()
            .all(|cmd| ![0x20, 0x24, 0xE6].contains(&cmd.instruction()))
    );
    assert!(sent.windows(2).all(|w| w[0].instruction() < w[1].instruction()));
}

#[test]
fn test_param_failure_replaces_zero_parameter_form() {
    let mut prober = prober(|cmd| match (cmd.instruction(), cmd.p1(), cmd.p2()) {
        (0x01, _, _) => sw(0x90, 0x00),
        (0x02, 0x00, 0x00) => sw(0x6A, 0x86),
        (0x02, 0x7F, 0x00) | (0x02, 0x7F, 0x01) => sw(0x6C, 0x10),
        (0x02, _, _) => sw(0x6B, 0x00),
        (0x03, _, _) => sw(0x90, 0x00),
        _ => sw(0x6D, 0x00),
    });

    let found: Vec<_> = InstructionEnumerator::new(0x80).iter(&mut prober).collect();
    assert_eq!(
        found,
        vec![
            Command::new(0x80, 0x01, 0x00, 0x00),
            Command::new(0x80, 0x02, 0x7F, 0x00),
            Command::new(0x80, 0x02, 0x7F, 0x01),
            Command::new(0x80, 0x03, 0x00, 0x00),
        ]
    );
    assert_eq!(prober.stats().escalations, 1);
}

#[test]
fn test_parameter_sweep_covers_every_pair_in_order() {
    let mut prober = prober(|_| sw(0x6B, 0x00));

    let found: Vec<_> = ParameterEnumerator::new(0x80, 0xCA)
        .iter(&mut prober)
        .collect();
    assert!(found.is_empty());

    let sent = prober.transport().sent();
    assert_eq!(sent.len(), 65_536);
    for (i, cmd) in sent.iter().enumerate() {
        assert_eq!(*cmd, Command::new(0x80, 0xCA, (i >> 8) as u8, i as u8));
    }
}

#[test]
fn test_parameter_sweep_does_not_escalate_again() {
    let mut prober = prober(|_| sw(0x6A, 0x86));

    let mut sweep = ParameterEnumerator::new(0x00, 0xB0);
    assert_eq!(sweep.next_with(&mut prober), None);
    assert!(sweep.is_exhausted());
    assert_eq!(sweep.current(), Some((0xFF, 0xFF)));

    assert_eq!(prober.stats().escalations, 0);
    assert_eq!(prober.transport().sent().len(), 65_536);
}

#[test]
fn test_parameter_sweep_resumes_after_discovery() {
    let mut prober = prober(|cmd| match (cmd.p1(), cmd.p2()) {
        (0x00, 0x05) | (0x01, 0x00) => sw(0x90, 0x00),
        _ => sw(0x6A, 0x81),
    });

    let mut sweep = ParameterEnumerator::new(0x00, 0xB0);
    assert_eq!(sweep.current(), None);
    assert_eq!(
        sweep.next_with(&mut prober),
        Some(Command::new(0x00, 0xB0, 0x00, 0x05))
    );
    assert_eq!(sweep.current(), Some((0x00, 0x05)));
    assert_eq!(prober.transport().sent().len(), 6);

    assert_eq!(
        sweep.next_with(&mut prober),
        Some(Command::new(0x00, 0xB0, 0x01, 0x00))
    );
    assert_eq!(prober.transport().sent().len(), 257);
}
