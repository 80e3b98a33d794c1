//! Observability hook for the allocation solver.
//!
//! The solver reports its decisions as [`SolveEvent`]s to a caller-supplied
//! [`SolveObserver`]. Nothing is logged unless an observer asks for it.

use crate::size_spec::Priority;

/// Branch chosen by the solver for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Preferred lengths already sum to the container length.
    PerfectFit,
    /// Minimums exceed the container; every cell scales below its floor.
    Squish,
    /// Preferred lengths exceed the container.
    Shrink,
    /// Preferred lengths fall short of the container.
    Stretch,
}

/// A structured solver event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveEvent {
    /// Solver entry, before any branch is taken.
    Start {
        cells: usize,
        container: u32,
        preferred_sum: f64,
        minimum_sum: u64,
    },
    /// The branch taken for this call.
    Branch(Branch),
    /// One round of the relative water-filling loop.
    RelativeShrinkRound {
        iteration: usize,
        active: usize,
        excess: f64,
    },
    /// The single proportional pass over preferred cells.
    PreferredShrink { excess: f64, factor: f64 },
    /// Surplus handed to one priority class.
    Grow { class: Priority, surplus: f64 },
    /// Rounding found the working sum off the container by `residual` and
    /// moved it back before converting to integers.
    Reconcile { residual: f64 },
    /// Space no eligible class could absorb. Positive values are excess,
    /// negative values are unfilled surplus.
    Unresolved { residual: f64 },
    /// Cells below one pixel were raised to one before rounding.
    Bumped { cells: usize, shortfall: f64 },
    /// Final integer lengths have been written back.
    Finished { total: u64, container: u32 },
}

/// Receiver for [`SolveEvent`]s.
pub trait SolveObserver {
    /// Called synchronously for each event, in order.
    fn observe(&mut self, event: SolveEvent);
}

impl<F: FnMut(SolveEvent)> SolveObserver for F {
    fn observe(&mut self, event: SolveEvent) {
        self(event);
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SolveObserver for NoopObserver {
    #[inline]
    fn observe(&mut self, _event: SolveEvent) {}
}

/// Observer that forwards events to `tracing`.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[cfg(feature = "tracing")]
impl SolveObserver for TracingObserver {
    fn observe(&mut self, event: SolveEvent) {
        match event {
            SolveEvent::Unresolved { residual } => {
                tracing::warn!(residual, "allocation left space unresolved");
            }
            SolveEvent::Branch(branch) => {
                tracing::debug!(branch = ?branch, "allocation branch");
            }
            other => tracing::trace!(event = ?other, "allocation event"),
        }
    }
}

/// Observer that records every event, for tests and diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<SolveEvent>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[SolveEvent] {
        &self.events
    }

    /// The branch reported by the last solver call, if any.
    #[must_use]
    pub fn branch(&self) -> Option<Branch> {
        self.events.iter().rev().find_map(|event| match event {
            SolveEvent::Branch(branch) => Some(*branch),
            _ => None,
        })
    }

    /// Number of relative water-filling rounds recorded.
    #[must_use]
    pub fn relative_rounds(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SolveEvent::RelativeShrinkRound { .. }))
            .count()
    }
}

impl SolveObserver for EventLog {
    fn observe(&mut self, event: SolveEvent) {
        self.events.push(event);
    }
}
