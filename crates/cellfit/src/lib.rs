#![forbid(unsafe_code)]

//! cellfit public facade crate.
//!
//! Re-exports the geometry and allocation types from the internal crates and
//! offers a small prelude for table layout code.

// --- Core re-exports -------------------------------------------------------

pub use cellfit_core::geometry::{Axis, Extent, Rect, Sides};

// --- Layout re-exports -----------------------------------------------------

pub use cellfit_layout::{
    Branch, CellMeasure, EventLog, NoopObserver, Priority, PriorityGroups, SizeSpec,
    SizeSpecError, SolveEvent, SolveObserver, SpecSet, TableGeometry, TableLayout, Track,
    allocate, allocate_with, measure_tracks, normalize_relative, positions,
};

#[cfg(feature = "tracing")]
pub use cellfit_layout::TracingObserver;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CellMeasure, Extent, Priority, Rect, Sides, SizeSpec, SizeSpecError, SolveEvent,
        SolveObserver, TableGeometry, TableLayout, allocate, allocate_with,
    };

    pub use crate::{core, layout};
}

pub use cellfit_core as core;
pub use cellfit_layout as layout;
