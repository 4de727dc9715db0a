//! The audit trail written while probing

mod common;

use std::io;
use std::sync::{Arc, Mutex};

use cardfuzz::{Fuzzer, StatusTables};
use cardfuzz_apdu_core::{Command, TransportError};
use common::{ScriptedCard, sw};
use tracing::Level;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn capture(run: impl FnOnce()) -> String {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, run);
    buf.contents()
}

#[test]
fn test_one_entry_per_command_and_response() {
    let logs = capture(|| {
        let card = ScriptedCard::new(|cmd: Command| match (cmd.class(), cmd.instruction()) {
            (0x80, 0x00) => sw(0x90, 0x00),
            (0x80, 0x01) => Err(TransportError::Transmission),
            (0x80, 0x02) => Ok(vec![0x01]),
            (0x80, _) => sw(0x6D, 0x00),
            _ => sw(0x6E, 0x00),
        });
        let mut fuzzer = Fuzzer::new(card, StatusTables::default());
        assert_eq!(fuzzer.fuzz().count(), 1);
        assert_eq!(fuzzer.stats().commands_sent, 256 + 254);
    });

    let sends = logs.lines().filter(|l| l.contains("Send: ")).count();
    let returns = logs.lines().filter(|l| l.contains("Returned: ")).count();
    assert_eq!(sends, 256 + 254);
    // The transport error and the truncated answer produce no response entry
    assert_eq!(returns, 256 + 254 - 2);

    assert!(logs.contains("Send: 80 00 00 00"));
    assert!(logs.contains("Returned: 6E 00 (Class not supported)"));
    assert!(logs.contains("Class recognized"));
    assert!(logs.contains("Apdu command success"));
    assert!(logs.contains("Got protocol error"));
    // Every instruction probe but the one success is a failure, errors included
    let failures: Vec<_> = logs
        .lines()
        .filter(|l| l.contains("Apdu command failed"))
        .collect();
    assert_eq!(failures.len(), 254 - 1);
    assert!(failures.iter().all(|l| l.contains("INFO")));
    assert!(
        logs.lines()
            .any(|l| l.contains("WARN") && l.contains("Something went wrong while probing"))
    );
}

#[test]
fn test_escalation_is_logged() {
    let logs = capture(|| {
        let card = ScriptedCard::new(|cmd: Command| match (cmd.class(), cmd.instruction()) {
            (0x00, 0x00) => sw(0x90, 0x00),
            (0x00, 0xB0) => sw(0x6A, 0x86),
            (0x00, _) => sw(0x6D, 0x00),
            _ => sw(0x6E, 0x00),
        });
        let mut fuzzer = Fuzzer::new(card, StatusTables::default());
        // (0x00, 0x00, 0x00, 0x00) only: every pair of the 0xB0 sweep fails
        assert_eq!(fuzzer.fuzz().count(), 1);
    });

    assert_eq!(
        logs.lines()
            .filter(|l| l.contains("Got partial success, bruteforce all the params"))
            .count(),
        1
    );
    assert!(logs.contains("Sweeping all P1/P2 combinations"));

    // One classification entry per probe: the zero-parameter form plus every pair
    assert_eq!(
        logs.lines()
            .filter(|l| l.contains("INFO") && l.contains("Parameters rejected"))
            .count(),
        1 + 65_536
    );
}

#[test]
fn test_hard_failures_logged_at_info() {
    let logs = capture(|| {
        let card = ScriptedCard::new(|cmd: Command| match (cmd.class(), cmd.instruction()) {
            (0x00, 0x00) => sw(0x90, 0x00),
            (0x00, 0x01) => sw(0x6A, 0x81),
            (0x00, _) => sw(0x6D, 0x00),
            _ => sw(0x6E, 0x00),
        });
        let mut fuzzer = Fuzzer::new(card, StatusTables::default());
        assert_eq!(fuzzer.fuzz().count(), 1);
    });

    let failed = |command: &str| {
        logs.lines().any(|l| {
            l.contains("INFO") && l.contains("Apdu command failed") && l.contains(command)
        })
    };
    assert!(failed("00 01 00 00"));
    assert!(failed("00 FF 00 00"));
    assert!(!failed("00 00 00 00"));
    assert!(logs.contains("Apdu command success"));
}
