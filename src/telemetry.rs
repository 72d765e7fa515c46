//! Telemetry frame layout and encoder.
//!
//! Wire format (all multi-byte fields little-endian, no padding):
//!
//! ```text
//! ┌──────────────┬───────┬───────┬──────────────┬──────────────────┬──────┬─────┬────────┐
//! │ set-points   │ board │ board │ probe temps  │ flags            │ stat │ chk │ marker │
//! │ 4 × f32      │ T f32 │ RH f32│ 2 × f32      │ 4 × u8 (0/1)     │ u8   │ u8  │ 0xA5A5 │
//! └──────────────┴───────┴───────┴──────────────┴──────────────────┴──────┴─────┴────────┘
//!   16 B           4 B     4 B     8 B            4 B                1 B    1 B   2 B
//! ```
//!
//! The checksum is an XOR fold of the 37 payload bytes preceding it
//! (status byte included),
//! recomputed from scratch on every encode.  The end-of-packet marker is a
//! transmission constant for receiver resynchronisation only — it is never
//! checksummed and never validated on this side of the link.  Receivers rely
//! on the fixed 40-byte length plus the marker to regain frame alignment.
//!
//! The encoder writes field by field rather than reinterpreting the struct's
//! memory, so the layout is independent of platform padding and alignment.

use crate::config::{NUM_PROBES, NUM_SETPOINTS};
use crate::status::StatusWord;

/// End-of-packet marker appended to every frame.
pub const EOP_MARKER: u16 = 0xA5A5;

/// Bytes covered by the checksum.
pub const PAYLOAD_LEN: usize = (NUM_SETPOINTS + 2 + NUM_PROBES) * 4 + 4 + 1;

/// Total frame length on the wire.
pub const FRAME_LEN: usize = PAYLOAD_LEN + 1 + 2;

/// One cycle's measured and derived values, staged for transmission.
///
/// A single instance lives in the cycle context for the process lifetime and
/// is overwritten in place every period.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryFrame {
    /// Current threshold value per set-point channel (physical units).
    pub setpoint: [f32; NUM_SETPOINTS],
    /// Board temperature (°C).
    pub board_temperature: f32,
    /// Board relative humidity (%).
    pub board_humidity: f32,
    /// RTD probe temperatures (°C).
    pub probe_temperature: [f32; NUM_PROBES],
    /// Leak detection comparator state.
    pub leak_detected: bool,
    /// Leak continuity loop state.
    pub leak_continuity: bool,
    /// Derived fault condition (leak detected OR error condition).
    pub fault_condition: bool,
    /// Derived warning condition (board temperature OR humidity warning).
    pub warning_condition: bool,
    /// Sensor status bits.
    pub status: StatusWord,
}

impl TelemetryFrame {
    /// Serialize into `buf`, recomputing the checksum and appending the
    /// end-of-packet marker.
    pub fn encode(&self, buf: &mut [u8; FRAME_LEN]) {
        let mut at = 0;

        for v in self.setpoint {
            put_f32(buf, &mut at, v);
        }
        put_f32(buf, &mut at, self.board_temperature);
        put_f32(buf, &mut at, self.board_humidity);
        for v in self.probe_temperature {
            put_f32(buf, &mut at, v);
        }
        put_bool(buf, &mut at, self.leak_detected);
        put_bool(buf, &mut at, self.leak_continuity);
        put_bool(buf, &mut at, self.fault_condition);
        put_bool(buf, &mut at, self.warning_condition);
        buf[at] = self.status.as_byte();
        at += 1;

        debug_assert_eq!(at, PAYLOAD_LEN);

        buf[at] = xor_checksum(&buf[..PAYLOAD_LEN]);
        at += 1;
        buf[at..at + 2].copy_from_slice(&EOP_MARKER.to_le_bytes());
    }
}

/// XOR fold over a byte slice.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

fn put_f32(buf: &mut [u8], at: &mut usize, v: f32) {
    buf[*at..*at + 4].copy_from_slice(&v.to_le_bytes());
    *at += 4;
}

fn put_bool(buf: &mut [u8], at: &mut usize, v: bool) {
    buf[*at] = u8::from(v);
    *at += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(frame: &TelemetryFrame) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        frame.encode(&mut buf);
        buf
    }

    #[test]
    fn frame_length_is_fixed() {
        assert_eq!(PAYLOAD_LEN, 37);
        assert_eq!(FRAME_LEN, 40);
    }

    #[test]
    fn zero_frame_has_zero_checksum() {
        let buf = encode(&TelemetryFrame::default());
        assert_eq!(buf[PAYLOAD_LEN], 0x00);
    }

    #[test]
    fn marker_terminates_every_frame() {
        let buf = encode(&TelemetryFrame::default());
        assert_eq!(buf[FRAME_LEN - 2..], EOP_MARKER.to_le_bytes());
    }

    #[test]
    fn toggling_leak_detected_flips_checksum_by_its_byte() {
        let mut frame = TelemetryFrame::default();
        let clean = encode(&frame);

        frame.leak_detected = true;
        let flagged = encode(&frame);

        // The flag encodes as 0x01, so the checksum moves by exactly that.
        assert_eq!(flagged[PAYLOAD_LEN], clean[PAYLOAD_LEN] ^ 0x01);
    }

    #[test]
    fn checksum_covers_payload_only() {
        let mut frame = TelemetryFrame::default();
        frame.board_temperature = 21.5;
        frame.leak_continuity = true;
        let buf = encode(&frame);

        assert_eq!(xor_checksum(&buf[..PAYLOAD_LEN]), buf[PAYLOAD_LEN]);
    }

    #[test]
    fn any_single_payload_corruption_changes_checksum() {
        let mut frame = TelemetryFrame::default();
        frame.setpoint = [29.0, 31.5, 40.0, 40.0];
        frame.board_temperature = 22.25;
        frame.board_humidity = 45.5;
        frame.probe_temperature = [18.0, 19.0];
        frame.leak_continuity = true;
        let buf = encode(&frame);
        let checksum = buf[PAYLOAD_LEN];

        for idx in 0..PAYLOAD_LEN {
            let mut corrupted = buf;
            corrupted[idx] ^= 0x5A;
            assert_ne!(
                xor_checksum(&corrupted[..PAYLOAD_LEN]),
                checksum,
                "corruption at byte {idx} went undetected"
            );
        }
    }

    #[test]
    fn field_order_is_little_endian_and_fixed() {
        let mut frame = TelemetryFrame::default();
        frame.setpoint[0] = 1.0;
        frame.probe_temperature[1] = -2.0;
        frame.warning_condition = true;
        frame.status.set(6);
        let buf = encode(&frame);

        assert_eq!(buf[0..4], 1.0f32.to_le_bytes());
        assert_eq!(buf[28..32], (-2.0f32).to_le_bytes());
        assert_eq!(buf[32..36], [0, 0, 0, 1]);
        assert_eq!(buf[35], 0x01); // warning flag byte
        // status byte sits between the flags and the checksum
        // (index PAYLOAD_LEN - 1).
        assert_eq!(buf[PAYLOAD_LEN - 1], 0b0100_0000);
    }
}
