//! Aggregate queries over a sequence of [`SizeSpec`]s.

use crate::size_spec::{Priority, SizeSpec};

/// Sums and per-priority subsets over a slice of specs.
pub trait SpecSet {
    /// Sum of working preferred lengths.
    fn preferred_sum(&self) -> f64;

    /// Sum of minimum lengths.
    fn minimum_sum(&self) -> u64;

    /// True if any cell has the given priority.
    fn has_priority(&self, priority: Priority) -> bool;

    /// Indices of the cells with the given priority, in sequence order.
    fn indices_of(&self, priority: Priority) -> Vec<usize>;

    /// Sum of preferred lengths over cells with the given priority.
    fn preferred_sum_of(&self, priority: Priority) -> f64;

    /// Sum of stretch factors over cells with the given priority.
    fn stretch_sum_of(&self, priority: Priority) -> f64;
}

impl SpecSet for [SizeSpec] {
    fn preferred_sum(&self) -> f64 {
        self.iter().map(SizeSpec::preferred_len).sum()
    }

    fn minimum_sum(&self) -> u64 {
        self.iter().map(|spec| u64::from(spec.minimum_len())).sum()
    }

    fn has_priority(&self, priority: Priority) -> bool {
        self.iter().any(|spec| spec.priority() == priority)
    }

    fn indices_of(&self, priority: Priority) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter(|(_, spec)| spec.priority() == priority)
            .map(|(i, _)| i)
            .collect()
    }

    fn preferred_sum_of(&self, priority: Priority) -> f64 {
        self.iter()
            .filter(|spec| spec.priority() == priority)
            .map(SizeSpec::preferred_len)
            .sum()
    }

    fn stretch_sum_of(&self, priority: Priority) -> f64 {
        self.iter()
            .filter(|spec| spec.priority() == priority)
            .map(SizeSpec::stretch)
            .sum()
    }
}

/// Cell indices grouped by priority, computed once per solver call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityGroups {
    /// Exact cells without a stretch factor.
    pub exact: Vec<usize>,
    /// Exact cells that carry a non-zero stretch factor and may grow.
    pub stretched_exact: Vec<usize>,
    pub minimum: Vec<usize>,
    pub preferred: Vec<usize>,
    pub relative: Vec<usize>,
}

impl PriorityGroups {
    /// Partition `specs` by priority in a single pass.
    pub fn new(specs: &[SizeSpec]) -> Self {
        let mut groups = Self::default();
        for (i, spec) in specs.iter().enumerate() {
            let bucket = match spec.priority() {
                Priority::Exact if spec.stretch() > 0.0 => &mut groups.stretched_exact,
                Priority::Exact => &mut groups.exact,
                Priority::Minimum => &mut groups.minimum,
                Priority::Preferred => &mut groups.preferred,
                Priority::Relative => &mut groups.relative,
            };
            bucket.push(i);
        }
        groups
    }

    /// Cells that grow by stretch factor once the relative tier is chosen:
    /// relative cells and stretched exact cells, in sequence order.
    ///
    /// Stretched exact cells never select that tier on their own.
    pub fn weighted(&self) -> Vec<usize> {
        let mut indices = self.relative.clone();
        indices.extend_from_slice(&self.stretched_exact);
        indices.sort_unstable();
        indices
    }
}
