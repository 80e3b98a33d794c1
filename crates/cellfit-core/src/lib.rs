#![forbid(unsafe_code)]

//! Core: pixel geometry and the logging facade used by the layout solver.

pub mod geometry;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
