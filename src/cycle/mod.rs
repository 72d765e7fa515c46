//! Function-pointer phase machine for the update cycle.
//!
//! Classic embedded table-driven state machine:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PhaseTable                                                   │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ PhaseId      │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle         │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Sampling     │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Evaluating   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Transmitting │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** phase.  If it
//! returns `Some(next_id)`, the engine runs `on_exit` for the current phase,
//! then `on_enter` for the next, and updates the current pointer.  All
//! handlers receive `&mut CycleContext`, the blackboard holding sensor
//! readings, filters, the status word and the staged frame.
//!
//! The machine idles between periods and makes exactly one revolution
//! (Idle → Sampling → Evaluating → Transmitting → Idle) per update period.

pub mod context;
pub mod phases;

use context::CycleContext;
use log::debug;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Enumeration of the update-cycle phases.
/// Must stay in sync with the table built in [`phases::build_phase_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PhaseId {
    Idle = 0,
    Sampling = 1,
    Evaluating = 2,
    Transmitting = 3,
}

impl PhaseId {
    /// Total number of phases — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `usize` index back to `PhaseId`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Sampling,
            2 => Self::Evaluating,
            3 => Self::Transmitting,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each phase transition.
pub type PhaseActionFn = fn(&mut CycleContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type PhaseUpdateFn = fn(&mut CycleContext) -> Option<PhaseId>;

// ---------------------------------------------------------------------------
// Phase descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single phase.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct PhaseDescriptor {
    pub id: PhaseId,
    pub name: &'static str,
    pub on_enter: Option<PhaseActionFn>,
    pub on_exit: Option<PhaseActionFn>,
    pub on_update: PhaseUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The phase machine engine.
///
/// Owns the phase table and threads a mutable [`CycleContext`] through every
/// handler call.
pub struct CycleEngine {
    /// Fixed-size table indexed by `PhaseId as usize`.
    table: [PhaseDescriptor; PhaseId::COUNT],
    /// Index of the currently active phase.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
}

impl CycleEngine {
    /// Construct a new engine with the given phase table, starting in `initial`.
    pub fn new(table: [PhaseDescriptor; PhaseId::COUNT], initial: PhaseId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
        }
    }

    /// Run the initial `on_enter` for the starting phase.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut CycleContext) {
        debug!("cycle starting in phase: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the machine by one tick.
    ///
    /// 1. Call `on_update` for the current phase.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut CycleContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current phase's identity.
    pub fn current_phase(&self) -> PhaseId {
        PhaseId::from_index(self.current)
    }

    /// Total handler ticks executed since start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: PhaseId, ctx: &mut CycleContext) {
        let next_idx = next_id as usize;

        debug!(
            "cycle phase: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
