//! Table layout: measure components, size both axes, place tracks.
//!
//! [`TableLayout`] is the collaborator the solver is written for. It owns
//! the column and row specs, folds component measurements into them, hands
//! each axis to [`allocate_with`] and lays the resulting lengths out
//! sequentially with a fixed gap between tracks.

use cellfit_core::geometry::{Axis, Extent, Rect, Sides};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::measure::{CellMeasure, measure_tracks};
use crate::observe::{NoopObserver, SolveObserver};
use crate::size_spec::SizeSpec;
use crate::solver::allocate_with;

/// One placed column or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    /// Start coordinate along the axis.
    pub offset: u32,
    /// Allocated length.
    pub length: u32,
}

impl Track {
    /// End coordinate (exclusive), saturating.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.offset.saturating_add(self.length)
    }
}

/// Place `lengths` one after another starting at `start`, `gap` apart.
#[must_use]
pub fn positions(lengths: &[u32], start: u32, gap: u32) -> Vec<Track> {
    let mut tracks = Vec::with_capacity(lengths.len());
    let mut offset = start;
    for &length in lengths {
        tracks.push(Track { offset, length });
        offset = offset.saturating_add(length).saturating_add(gap);
    }
    tracks
}

/// Column and row placement produced by [`TableLayout::solve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGeometry {
    pub columns: Vec<Track>,
    pub rows: Vec<Track>,
}

impl TableGeometry {
    /// Rectangle of the cell at `(column, row)`.
    #[must_use]
    pub fn cell_rect(&self, column: usize, row: usize) -> Option<Rect> {
        let col = self.columns.get(column)?;
        let row = self.rows.get(row)?;
        Some(Rect::new(col.offset, row.offset, col.length, row.length))
    }

    /// The cell containing the point, if any. Gaps belong to no cell.
    #[must_use]
    pub fn cell_at(&self, x: u32, y: u32) -> Option<(usize, usize)> {
        let column = self.columns.iter().position(|t| x >= t.offset && x < t.end())?;
        let row = self.rows.iter().position(|t| y >= t.offset && y < t.end())?;
        self.cell_rect(column, row)
            .filter(|rect| rect.contains(x, y))
            .map(|_| (column, row))
    }

    /// Column widths in order.
    #[must_use]
    pub fn column_widths(&self) -> Vec<u32> {
        self.columns.iter().map(|t| t.length).collect()
    }

    /// Row heights in order.
    #[must_use]
    pub fn row_heights(&self) -> Vec<u32> {
        self.rows.iter().map(|t| t.length).collect()
    }
}

/// A grid of column and row specs with optional gaps and margin.
#[derive(Debug, Clone, Default)]
pub struct TableLayout {
    columns: Vec<SizeSpec>,
    rows: Vec<SizeSpec>,
    gap: Extent,
    margin: Sides,
}

impl TableLayout {
    /// Create a table from column and row specs.
    pub fn new(
        columns: impl IntoIterator<Item = SizeSpec>,
        rows: impl IntoIterator<Item = SizeSpec>,
    ) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows: rows.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Set the gap between columns (`width`) and between rows (`height`).
    #[must_use]
    pub fn gap(mut self, gap: Extent) -> Self {
        self.gap = gap;
        self
    }

    /// Set the margin around the table.
    #[must_use]
    pub fn margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Fresh copies of the specs with `components` recorded into them.
    ///
    /// # Panics
    ///
    /// Panics if a component lies outside the table.
    #[must_use]
    pub fn measure(&self, components: &[CellMeasure]) -> (Vec<SizeSpec>, Vec<SizeSpec>) {
        let mut columns = self.columns.clone();
        let mut rows = self.rows.clone();
        measure_tracks(&mut columns, &mut rows, components);
        (columns, rows)
    }

    /// Size and place every column and row inside `area`.
    ///
    /// # Panics
    ///
    /// Panics if a component lies outside the table.
    #[must_use]
    pub fn solve(&self, components: &[CellMeasure], area: Rect) -> TableGeometry {
        self.solve_with(components, area, &mut NoopObserver)
    }

    /// [`solve`](Self::solve) with an observer that sees both axes' solver
    /// events, columns first.
    ///
    /// # Panics
    ///
    /// Panics if a component lies outside the table.
    pub fn solve_with<O>(
        &self,
        components: &[CellMeasure],
        area: Rect,
        observer: &mut O,
    ) -> TableGeometry
    where
        O: SolveObserver + ?Sized,
    {
        let (mut columns, mut rows) = self.measure(components);
        let inner = area.inner(self.margin);
        TableGeometry {
            columns: self.place_axis(&mut columns, inner, Axis::Horizontal, observer),
            rows: self.place_axis(&mut rows, inner, Axis::Vertical, observer),
        }
    }

    /// Size the table would like: rounded preferred lengths plus gaps and margin.
    ///
    /// # Panics
    ///
    /// Panics if a component lies outside the table.
    #[must_use]
    pub fn preferred_size(&self, components: &[CellMeasure]) -> Extent {
        let (columns, rows) = self.measure(components);
        self.outer_extent(&columns, &rows, |spec| spec.rounded())
    }

    /// Smallest size that keeps every cell at its floor.
    ///
    /// # Panics
    ///
    /// Panics if a component lies outside the table.
    #[must_use]
    pub fn minimum_size(&self, components: &[CellMeasure]) -> Extent {
        let (columns, rows) = self.measure(components);
        self.outer_extent(&columns, &rows, |spec| spec.minimum_len())
    }

    fn total_gap(&self, count: usize, axis: Axis) -> u32 {
        let gaps = count.saturating_sub(1) as u64 * u64::from(self.gap.along(axis));
        gaps.min(u64::from(u32::MAX)) as u32
    }

    fn outer_extent(
        &self,
        columns: &[SizeSpec],
        rows: &[SizeSpec],
        length: impl Fn(&SizeSpec) -> u32,
    ) -> Extent {
        let along = |specs: &[SizeSpec], axis: Axis| {
            specs
                .iter()
                .fold(0u32, |acc, spec| acc.saturating_add(length(spec)))
                .saturating_add(self.total_gap(specs.len(), axis))
                .saturating_add(self.margin.sum_along(axis))
        };
        Extent::new(
            along(columns, Axis::Horizontal),
            along(rows, Axis::Vertical),
        )
    }

    fn place_axis<O>(
        &self,
        specs: &mut [SizeSpec],
        inner: Rect,
        axis: Axis,
        observer: &mut O,
    ) -> Vec<Track>
    where
        O: SolveObserver + ?Sized,
    {
        if specs.is_empty() {
            return Vec::new();
        }
        let available = inner
            .extent()
            .along(axis)
            .saturating_sub(self.total_gap(specs.len(), axis));
        let lengths = allocate_with(specs, available, observer);
        positions(&lengths, inner.origin_along(axis), self.gap.along(axis))
    }
}
