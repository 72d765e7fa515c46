//! GPIO / peripheral pin assignments for the LeakSense sensor board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Leak sense inputs
// ---------------------------------------------------------------------------

/// Digital input: leak continuity loop. HIGH = cable loop intact.
pub const LEAK_CONTINUITY_GPIO: i32 = 4;
/// Digital input: leak detection comparator. HIGH = moisture detected.
pub const LEAK_DETECT_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Condition outputs (to the supervisory controller backplane)
// ---------------------------------------------------------------------------

/// Digital output: mirrors the derived warning condition every cycle.
pub const WARNING_LINE_GPIO: i32 = 6;
/// Digital output: mirrors the derived error condition every cycle.
pub const ERROR_LINE_GPIO: i32 = 7;
/// Digital output: spare line pulsed high for the duration of one update
/// cycle — scope hook for measuring cycle latency.
pub const CYCLE_MARKER_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Set-point potentiometers — Analog (ADC1, 10-bit)
// ---------------------------------------------------------------------------

/// ADC1 channels for the four set-point pots, in `SetpointChannel` order:
/// board temperature, board humidity, probe 1, probe 2.
pub const SETPOINT_ADC_CHANNELS: [u32; 4] = [0, 1, 2, 3];

// ---------------------------------------------------------------------------
// RTD probe amplifiers (MAX31865-class, SPI)
// ---------------------------------------------------------------------------

/// SPI chip-select lines for the two RTD probe amplifiers.
pub const PROBE_CS_GPIOS: [i32; 2] = [10, 11];

pub const SPI_SCLK_GPIO: i32 = 12;
pub const SPI_MOSI_GPIO: i32 = 13;
pub const SPI_MISO_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// I²C bus (board environmental sensor)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 15;
pub const I2C_SCL_GPIO: i32 = 16;

/// 7-bit I²C address of the board temperature/humidity sensor.
pub const BOARD_ENV_I2C_ADDR: u8 = 0x44;

// ---------------------------------------------------------------------------
// RS-485 telemetry link (UART1 + transceiver direction control)
// ---------------------------------------------------------------------------

pub const RS485_TX_GPIO: i32 = 17;
pub const RS485_RX_GPIO: i32 = 18;
/// Transceiver driver-enable. Held HIGH (transmit) for the process lifetime.
pub const RS485_DE_GPIO: i32 = 21;
/// Transceiver receiver-enable (active low). Held HIGH together with DE —
/// the link is push-only and the receive path is never used.
pub const RS485_RE_GPIO: i32 = 38;
