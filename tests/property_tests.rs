//! Property tests for the core data structures.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets.  On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use leaksense::filter::ThresholdFilter;
use leaksense::status::StatusWord;
use leaksense::telemetry::{xor_checksum, TelemetryFrame, FRAME_LEN, PAYLOAD_LEN};
use proptest::prelude::*;

// ── Rolling-average window ────────────────────────────────────

proptest! {
    /// After any sample sequence, the mean covers exactly the most recent
    /// `min(len, 5)` samples — the ring saturates and older samples fall
    /// out.
    #[test]
    fn mean_tracks_the_last_window(
        samples in proptest::collection::vec(0u16..=1023, 1..=200),
    ) {
        let mut f: ThresholdFilter = ThresholdFilter::new();
        for &s in &samples {
            f.update(s);
        }

        let window = samples.len().min(5);
        let tail = &samples[samples.len() - window..];
        let expected: f32 =
            tail.iter().map(|&s| f32::from(s)).sum::<f32>() / window as f32;

        prop_assert!((f.sample_mean() - expected).abs() < 1e-3,
            "mean {} != expected {}", f.sample_mean(), expected);
    }

    /// An empty-constructed filter reports 0 regardless of configuration.
    #[test]
    fn unsampled_filter_reads_zero(
        min in -100.0f32..0.0,
        max in 1.0f32..200.0,
    ) {
        let f: ThresholdFilter = ThresholdFilter::with_range(min, max, 1.0);
        prop_assert_eq!(f.sample_mean(), 0.0);
    }
}

// ── Hysteresis comparator ─────────────────────────────────────

proptest! {
    /// Once alarmed, the comparator must not re-arm until the reading drops
    /// below `value() - hysteresis`, even though `reading < value()` may
    /// already hold.
    #[test]
    fn alarm_releases_only_below_the_hysteresis_band(
        raw in 200u16..=900,
        hysteresis in 0.0f32..10.0,
        readings in proptest::collection::vec(0.0f32..120.0, 1..=50),
    ) {
        let mut f: ThresholdFilter = ThresholdFilter::with_range(0.0, 100.0, hysteresis);
        for _ in 0..5 {
            f.update(raw);
        }
        let threshold = f.value();

        let mut prev_ok = true;
        for &reading in &readings {
            let ok = f.compare(reading);
            if ok && !prev_ok {
                prop_assert!(
                    reading < threshold - hysteresis,
                    "re-armed at {reading} with threshold {threshold} and hysteresis {hysteresis}"
                );
            }
            if ok {
                prop_assert!(reading < threshold);
            }
            prev_ok = ok;
        }
    }
}

// ── Frame checksum ────────────────────────────────────────────

fn arb_frame() -> impl Strategy<Value = TelemetryFrame> {
    (
        proptest::array::uniform4(any::<u32>()),
        any::<u32>(),
        any::<u32>(),
        proptest::array::uniform2(any::<u32>()),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<u8>(),
    )
        .prop_map(|(sp, t, rh, pt, leak, cont, fault, warn, status)| {
            let mut frame = TelemetryFrame {
                setpoint: sp.map(f32::from_bits),
                board_temperature: f32::from_bits(t),
                board_humidity: f32::from_bits(rh),
                probe_temperature: pt.map(f32::from_bits),
                leak_detected: leak,
                leak_continuity: cont,
                fault_condition: fault,
                warning_condition: warn,
                ..TelemetryFrame::default()
            };
            for pos in 0..8 {
                frame.status.set_to(pos, status & (1 << pos) != 0);
            }
            frame
        })
}

proptest! {
    /// The transmitted checksum always equals an independent XOR fold over
    /// the payload, for any field contents (including NaN bit patterns).
    #[test]
    fn checksum_round_trips(frame in arb_frame()) {
        let mut buf = [0u8; FRAME_LEN];
        frame.encode(&mut buf);
        prop_assert_eq!(xor_checksum(&buf[..PAYLOAD_LEN]), buf[PAYLOAD_LEN]);
    }

    /// Corrupting any single payload byte by any non-zero delta changes the
    /// checksum.
    #[test]
    fn checksum_detects_single_byte_corruption(
        frame in arb_frame(),
        idx in 0usize..PAYLOAD_LEN,
        delta in 1u8..=255,
    ) {
        let mut buf = [0u8; FRAME_LEN];
        frame.encode(&mut buf);

        let mut corrupted = buf;
        corrupted[idx] ^= delta;
        prop_assert_ne!(
            xor_checksum(&corrupted[..PAYLOAD_LEN]),
            buf[PAYLOAD_LEN]
        );
    }

    /// Re-encoding an unchanged frame is byte-identical (the checksum is
    /// recomputed fresh, not accumulated).
    #[test]
    fn encode_is_deterministic(frame in arb_frame()) {
        let mut a = [0u8; FRAME_LEN];
        let mut b = [0u8; FRAME_LEN];
        frame.encode(&mut a);
        frame.encode(&mut b);
        prop_assert_eq!(a, b);
    }
}

// ── Status word ───────────────────────────────────────────────

#[derive(Debug, Clone)]
enum BitOp {
    Set(u8),
    Clear(u8),
    SetTo(u8, bool),
}

fn arb_bit_op() -> impl Strategy<Value = BitOp> {
    prop_oneof![
        (0u8..8).prop_map(BitOp::Set),
        (0u8..8).prop_map(BitOp::Clear),
        ((0u8..8), any::<bool>()).prop_map(|(b, v)| BitOp::SetTo(b, v)),
    ]
}

proptest! {
    /// The status word agrees with a naive model under any op sequence.
    #[test]
    fn status_word_matches_model(
        ops in proptest::collection::vec(arb_bit_op(), 0..=64),
    ) {
        let mut word = StatusWord::new();
        let mut model: u8 = 0;

        for op in &ops {
            match *op {
                BitOp::Set(b) => {
                    word.set(b);
                    model |= 1 << b;
                }
                BitOp::Clear(b) => {
                    word.clear(b);
                    model &= !(1 << b);
                }
                BitOp::SetTo(b, v) => {
                    word.set_to(b, v);
                    if v { model |= 1 << b } else { model &= !(1 << b) }
                }
            }
        }

        prop_assert_eq!(word.as_byte(), model);
    }
}
