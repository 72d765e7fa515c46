//! Sensor subsystem — individual collaborators and the aggregating [`SensorHub`].
//!
//! The hub owns every input-side device and produces one
//! [`SensorSnapshot`] per period.  Per-reading fault flags travel with
//! their values; the hub never withholds a snapshot because something on a
//! bus misbehaved.

pub mod board_env;
pub mod leak;
pub mod probe;
pub mod setpoint;

use crate::config::{NUM_PROBES, NUM_SETPOINTS};
use crate::cycle::context::SensorSnapshot;
use board_env::BoardEnvSensor;
use leak::LeakInputs;
use probe::ProbeSensor;
use setpoint::SetpointInput;

/// Aggregates all input devices and produces a unified snapshot.
pub struct SensorHub {
    pub board_env: BoardEnvSensor,
    pub probes: [ProbeSensor; NUM_PROBES],
    pub setpoints: [SetpointInput; NUM_SETPOINTS],
    pub leak: LeakInputs,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built collaborators (built in main
    /// where pin ownership is established).
    pub fn new(
        board_env: BoardEnvSensor,
        probes: [ProbeSensor; NUM_PROBES],
        setpoints: [SetpointInput; NUM_SETPOINTS],
        leak: LeakInputs,
    ) -> Self {
        Self {
            board_env,
            probes,
            setpoints,
            leak,
        }
    }

    /// Read every input and return a unified snapshot.
    ///
    /// Individual read failures surface as fault flags with the previous
    /// good value retained — best effort, never an abort.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::default();

        for (i, pot) in self.setpoints.iter().enumerate() {
            snapshot.setpoint_raw[i] = pot.read();
        }

        let env = self.board_env.read();
        snapshot.board_temperature_c = env.temperature_c;
        snapshot.board_humidity_pct = env.humidity_pct;
        snapshot.board_env_fault = env.fault;

        for (i, probe) in self.probes.iter_mut().enumerate() {
            let reading = probe.read();
            snapshot.probe_temperature_c[i] = reading.temperature_c;
            snapshot.probe_fault[i] = reading.fault;
        }

        let leak = self.leak.read();
        snapshot.leak_detected = leak.detected;
        snapshot.leak_continuity = leak.continuity;

        snapshot
    }
}
