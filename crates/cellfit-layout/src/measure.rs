//! Preferred-size measurement pass.
//!
//! Merges per-component measurements into one [`SizeSpec`] per column and one
//! per row before the solver runs. Recording is a running maximum, so the
//! result does not depend on the order components are visited in.

use cellfit_core::geometry::{Axis, Extent};

use crate::size_spec::{Priority, SizeSpec};

/// Measured sizes of one component placed in a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellMeasure {
    /// Column index of the occupied cell.
    pub column: usize,
    /// Row index of the occupied cell.
    pub row: usize,
    /// Preferred size reported by the component.
    pub preferred: Extent,
    /// Minimum size reported by the component.
    pub minimum: Extent,
}

impl CellMeasure {
    /// Create a measurement for the component at `(column, row)`.
    #[must_use]
    pub const fn new(column: usize, row: usize, preferred: Extent, minimum: Extent) -> Self {
        Self {
            column,
            row,
            preferred,
            minimum,
        }
    }

    /// Track index along the given axis.
    #[inline]
    #[must_use]
    pub const fn track(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.column,
            Axis::Vertical => self.row,
        }
    }
}

impl SizeSpec {
    /// Fold one component's measured sizes into this cell.
    ///
    /// - `Exact` ignores content.
    /// - `Minimum` tracks the largest component minimum.
    /// - `Preferred` tracks the largest minimum and the largest preferred
    ///   size, never letting preferred fall below 1 or below the minimum.
    /// - `Relative` tracks the largest preferred size (at least 1); its floor
    ///   stays where the caller set it so it can still contract.
    pub fn record_component(&mut self, preferred: u32, minimum: u32) {
        match self.priority() {
            Priority::Exact => {}
            Priority::Minimum => {
                let floor = self.minimum_len().max(minimum);
                self.set_minimum(floor);
                self.set_preferred(self.preferred_len().max(f64::from(floor)));
            }
            Priority::Preferred => {
                let floor = self.minimum_len().max(minimum);
                self.set_minimum(floor);
                let value = self
                    .preferred_len()
                    .max(f64::from(preferred))
                    .max(f64::from(floor))
                    .max(1.0);
                self.set_preferred(value);
            }
            Priority::Relative => {
                let value = self.preferred_len().max(f64::from(preferred)).max(1.0);
                self.set_preferred(value);
            }
        }
    }
}

/// Rescale relative cells so their preferred lengths follow their weights.
///
/// Every relative cell becomes `max(1, stretch * scale)`, where `scale` is
/// the largest `preferred / stretch` ratio among relative cells. The result
/// never drops below a cell's own minimum.
pub fn normalize_relative(specs: &mut [SizeSpec]) {
    let scale = specs
        .iter()
        .filter(|spec| spec.priority() == Priority::Relative && spec.stretch() > 0.0)
        .map(|spec| spec.preferred_len() / spec.stretch())
        .fold(0.0_f64, f64::max);

    for spec in specs
        .iter_mut()
        .filter(|spec| spec.priority() == Priority::Relative)
    {
        let value = (spec.stretch() * scale)
            .max(1.0)
            .max(f64::from(spec.minimum_len()));
        spec.set_preferred(value);
    }
}

/// Record every component into its column and row, then normalize the
/// relative cells on both axes.
///
/// # Panics
///
/// Panics if a component's column or row lies outside the given spec sets.
pub fn measure_tracks(
    columns: &mut [SizeSpec],
    rows: &mut [SizeSpec],
    components: &[CellMeasure],
) {
    let _span = cellfit_core::debug_span!(
        "measure_tracks",
        columns = columns.len(),
        rows = rows.len(),
        components = components.len()
    )
    .entered();

    for component in components {
        assert!(
            component.column < columns.len() && component.row < rows.len(),
            "component at ({}, {}) is outside a {}x{} table",
            component.column,
            component.row,
            columns.len(),
            rows.len()
        );
        for (specs, axis) in [(&mut *columns, Axis::Horizontal), (&mut *rows, Axis::Vertical)] {
            specs[component.track(axis)].record_component(
                component.preferred.along(axis),
                component.minimum.along(axis),
            );
        }
    }

    normalize_relative(columns);
    normalize_relative(rows);
}
