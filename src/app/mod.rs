//! Application layer: port traits, the monitor service, and outbound events.
//!
//! The domain core lives behind the port boundary declared in [`ports`];
//! [`service::MonitorService`] is the single writer of all mutable state.

pub mod events;
pub mod ports;
pub mod service;
