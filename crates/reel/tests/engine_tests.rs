//! Integration tests for driving the probe handler through the engine.
//!
//! The transport is an in-process duplex pipe; the test plays the command's
//! side by writing recorded output into it.

mod common;

use std::time::Duration;

use common::{CASES, TEST_TIMEOUT, fixture, init_logging};
use reel::{
    CTRL_C, Outcome, Ping, Reel, ReelConfig, ReelEnd, ReelEngine, ReelError, ReelPhase, drive,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

const PIPE_CAPACITY: usize = 64 * 1024;

/// Write `text` to the command side in `chunk`-byte pieces, then close it.
fn play(mut command: DuplexStream, text: String, chunk: usize, gap: Duration) {
    tokio::spawn(async move {
        for piece in text.as_bytes().chunks(chunk.max(1)) {
            if command.write_all(piece).await.is_err() {
                return;
            }
            if !gap.is_zero() {
                tokio::time::sleep(gap).await;
            }
        }
    });
}

/// Test every recorded run streamed in one write.
#[tokio::test]
async fn recorded_runs() {
    init_logging();
    for case in CASES {
        let (engine_side, command_side) = duplex(PIPE_CAPACITY);
        play(command_side, case.output(), PIPE_CAPACITY, Duration::ZERO);

        let mut ping = Ping::new(TEST_TIMEOUT, case.host, case.count);
        let report = ReelEngine::new(engine_side).run(&mut ping).await.unwrap();

        assert_eq!(report.end, ReelEnd::Finished, "{}", case.name);
        assert_eq!(report.outcome, case.outcome, "{}", case.name);
        assert_eq!(ping.stats(), case.stats(), "{}", case.name);
    }
}

/// Test streamed delivery produces the same counters as a single match.
#[tokio::test]
async fn streaming_matches_single_delivery() {
    for case in CASES {
        for chunk in [1, 7, 64] {
            let (engine_side, command_side) = duplex(PIPE_CAPACITY);
            play(command_side, case.output(), chunk, Duration::ZERO);

            let mut streamed = Ping::new(TEST_TIMEOUT, case.host, case.count);
            let report = ReelEngine::new(engine_side).run(&mut streamed).await.unwrap();

            let mut whole = Ping::new(TEST_TIMEOUT, case.host, case.count);
            let _ = whole.reel_match("", "", &case.output());

            assert!(report.is_finished(), "{} / {chunk}", case.name);
            assert_eq!(streamed.stats(), whole.stats(), "{} / {chunk}", case.name);
            assert_eq!(streamed.result(), whole.result(), "{} / {chunk}", case.name);
        }
    }
}

/// Test each reply and error line is delivered as its own match.
#[tokio::test]
async fn one_match_per_line() {
    let (engine_side, command_side) = duplex(PIPE_CAPACITY);
    play(
        command_side,
        fixture("ip_address_error_packet_loss"),
        PIPE_CAPACITY,
        Duration::ZERO,
    );

    let mut ping = Ping::new(TEST_TIMEOUT, "192.168.1.1", 20);
    let report = ReelEngine::new(engine_side).run(&mut ping).await.unwrap();

    // 16 replies, 4 errors and the summary.
    assert_eq!(report.matches.len(), 21);
    assert_eq!(report.steps, 21);
    assert!(report.matches[0].before.starts_with("PING 192.168.1.1"));
    assert!(report.matches[20].matched.starts_with("20 packets transmitted"));
    assert!(report.unmatched.contains("rtt min/avg/max/mdev"));
}

/// Test a stalled probe is interrupted.
#[tokio::test]
async fn timeout_interrupts() {
    init_logging();
    let (engine_side, mut command_side) = duplex(PIPE_CAPACITY);
    command_side
        .write_all(b"PING 192.168.1.1 (192.168.1.1) 56(84) bytes of data.\n")
        .await
        .unwrap();
    command_side
        .write_all(b"64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=0.41 ms\n")
        .await
        .unwrap();

    let mut ping = Ping::new(Duration::from_millis(100), "192.168.1.1", 0);
    let mut engine = ReelEngine::new(engine_side);
    let report = engine.run(&mut ping).await.unwrap();

    assert_eq!(report.end, ReelEnd::Timeout);
    assert_eq!(report.outcome, Outcome::Error);
    assert_eq!(ping.stats(), (0, 1, 0));
    assert_eq!(engine.phase(), ReelPhase::Terminal);

    let mut sent = [0u8; 8];
    let n = command_side.read(&mut sent).await.unwrap();
    assert_eq!(&sent[..n], CTRL_C.as_bytes());
}

/// Test output closing before the summary leaves the probe unclassified.
#[tokio::test]
async fn early_eof() {
    init_logging();
    let (engine_side, command_side) = duplex(PIPE_CAPACITY);
    play(
        command_side,
        "PING 192.168.1.1 (192.168.1.1) 56(84) bytes of data.\n\
         64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=0.41 ms\n"
            .to_string(),
        PIPE_CAPACITY,
        Duration::ZERO,
    );

    let mut ping = Ping::new(TEST_TIMEOUT, "192.168.1.1", 4);
    let report = ReelEngine::new(engine_side).run(&mut ping).await.unwrap();

    assert_eq!(report.end, ReelEnd::Eof);
    assert!(ping.eof_seen());
    assert!(!ping.is_finished());
    assert_eq!(ping.stats(), (0, 1, 0));
    assert_eq!(report.outcome, Outcome::Error);
}

/// Test paced output arriving slower than the read loop.
#[tokio::test]
async fn paced_output() {
    let (engine_side, command_side) = duplex(PIPE_CAPACITY);
    play(
        command_side,
        fixture("hostname_no_packet_loss"),
        40,
        Duration::from_millis(2),
    );

    let mut ping = Ping::new(TEST_TIMEOUT, "www.google.com", 10);
    let config = ReelConfig::default().timeout(TEST_TIMEOUT);
    let report = drive(engine_side, &mut ping, config).await.unwrap();

    assert!(report.is_finished());
    assert_eq!(ping.stats(), (10, 10, 0));
    assert_eq!(report.outcome, Outcome::Success);
}

/// Test a small output buffer still sees every line.
#[tokio::test]
async fn small_buffer() {
    let (engine_side, command_side) = duplex(PIPE_CAPACITY);
    play(
        command_side,
        fixture("ip_address_passing_packet_loss"),
        16,
        Duration::ZERO,
    );

    let mut ping = Ping::new(TEST_TIMEOUT, "192.168.1.1", 20);
    let config = ReelConfig::default().buffer_size(256);
    let report = drive(engine_side, &mut ping, config).await.unwrap();

    assert!(report.is_finished());
    assert_eq!(ping.stats(), (20, 19, 0));
}

/// Test the interrupt still goes out when the step limit is already reached.
#[tokio::test]
async fn interrupt_at_step_limit() {
    let (engine_side, mut command_side) = duplex(PIPE_CAPACITY);

    let mut ping = Ping::new(Duration::from_millis(50), "10.0.0.1", 0);
    let config = ReelConfig::default().max_steps(1);
    let report = drive(engine_side, &mut ping, config).await.unwrap();

    assert_eq!(report.end, ReelEnd::Timeout);
    assert_eq!(report.outcome, Outcome::Error);

    let mut sent = [0u8; 8];
    let n = command_side.read(&mut sent).await.unwrap();
    assert_eq!(&sent[..n], CTRL_C.as_bytes());
}

/// Test an unbounded probe that outruns the step limit is interrupted.
#[tokio::test]
async fn unbounded_probe_past_step_limit() {
    let (engine_side, mut command_side) = duplex(PIPE_CAPACITY);
    for seq in 1..=5 {
        let line = format!("64 bytes from 10.0.0.1: icmp_seq={seq} ttl=64 time=0.4 ms\n");
        command_side.write_all(line.as_bytes()).await.unwrap();
    }

    let mut ping = Ping::new(TEST_TIMEOUT, "10.0.0.1", 0);
    let config = ReelConfig::default().max_steps(3);
    let err = drive(engine_side, &mut ping, config).await.unwrap_err();

    assert!(matches!(err, ReelError::TooManySteps { max: 3 }));
    assert_eq!(ping.stats(), (0, 3, 0));

    let mut sent = [0u8; 8];
    let n = command_side.read(&mut sent).await.unwrap();
    assert_eq!(&sent[..n], CTRL_C.as_bytes());
}
