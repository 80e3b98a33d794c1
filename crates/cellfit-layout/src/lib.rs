#![forbid(unsafe_code)]

//! Constrained-space allocation for table layouts.
//!
//! This crate distributes a fixed container length among a sequence of
//! cells along one axis:
//!
//! - [`SizeSpec`] - One cell's priority class, minimum, preferred length, and stretch factor
//! - [`SpecSet`] - Sums and per-priority queries over a slice of specs
//! - [`measure_tracks`] - Folds component measurements into column and row specs
//! - [`allocate`] - The solver: squish, shrink, or stretch, then exact-sum rounding
//! - [`TableLayout`] - Measures, solves, and places both axes of a grid
//!
//! # Example
//!
//! ```
//! use cellfit_layout::{SizeSpec, allocate};
//!
//! let mut specs = vec![
//!     SizeSpec::preferred().with_preferred(100.0),
//!     SizeSpec::relative(1.0).with_preferred(100.0),
//!     SizeSpec::preferred().with_preferred(100.0).with_minimum(60),
//! ];
//! let lengths = allocate(&mut specs, 250);
//! assert_eq!(lengths, vec![100, 50, 100]);
//! assert_eq!(lengths.iter().sum::<u32>(), 250);
//! ```
//!
//! # Observability
//!
//! [`allocate_with`] takes a [`SolveObserver`]; closures of type
//! `FnMut(SolveEvent)` qualify. With the `tracing` feature the solver also
//! emits spans and events, and `TracingObserver` forwards solver events.

pub mod measure;
pub mod observe;
pub mod queries;
pub mod size_spec;
pub mod solver;
pub mod table;

pub use cellfit_core::geometry::{Axis, Extent, Rect, Sides};
pub use measure::{CellMeasure, measure_tracks, normalize_relative};
#[cfg(feature = "tracing")]
pub use observe::TracingObserver;
pub use observe::{Branch, EventLog, NoopObserver, SolveEvent, SolveObserver};
pub use queries::{PriorityGroups, SpecSet};
pub use size_spec::{Priority, SizeSpec, SizeSpecError};
pub use solver::{allocate, allocate_with};
pub use table::{TableGeometry, TableLayout, Track, positions};
