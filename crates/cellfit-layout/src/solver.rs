//! Allocation solver: distribute a container length among cells.
//!
//! # Algorithm
//!
//! One call compares the container length against the minimum and preferred
//! sums and takes exactly one branch:
//!
//! 1. **Perfect fit**: the rounded preferred sum already equals the container.
//! 2. **Squish**: minimums alone exceed the container. Every cell becomes
//!    `minimum * container / sum(minimum)`; this is the only branch that can
//!    take a cell below its floor.
//! 3. **Shrink**: relative cells give up space first, in water-filling rounds
//!    weighted by stretch factor; preferred cells then shrink in one
//!    proportional pass, each clamped at its own minimum.
//! 4. **Stretch**: if any relative cell exists, relative cells (and exact
//!    cells with a stretch factor) grow by stretch factor; otherwise preferred
//!    cells, otherwise minimum cells, grow proportionally to their size.
//!
//! Rounding always runs last and works against the container length:
//!
//! - cells below one pixel are raised to one;
//! - whatever the working sum still differs from the container is settled.
//!   Excess comes out of relative cells, then preferred cells, in proportion
//!   to their room above `max(minimum, 1)`. Extra pixels forced by the
//!   one-pixel floor may then come out of any cell above one pixel. A
//!   shortfall goes to every non-exact cell in proportion to its length;
//! - lengths are rounded with error diffusion, so the integer sum matches the
//!   settled fractional sum.
//!
//! # Failure Modes
//!
//! - **No shrinkable class**: when shrinking is required but only exact and
//!   minimum cells exist, the excess stays. The integer sum then exceeds the
//!   container and a [`SolveEvent::Unresolved`] event is emitted. The same
//!   applies to a shortfall when only exact cells exist.
//! - **Fewer pixels than floors**: when the container cannot hold every
//!   cell's `max(minimum, 1)`, the one-pixel floor wins over minimums; when
//!   it cannot hold one pixel per cell, the sum exceeds the container.
//! - **Squish rounding**: error diffusion can move a pixel between neighbours
//!   as the container grows, so inside the squish branch a cell may lose one
//!   pixel when the container gains one. Fractional lengths are monotonic;
//!   no cell ever drops by more than one pixel.

use crate::observe::{Branch, NoopObserver, SolveEvent, SolveObserver};
use crate::queries::{PriorityGroups, SpecSet};
use crate::size_spec::{Priority, SizeSpec};

/// Water-filling stops once less than this much excess remains; rounding
/// absorbs the rest.
const SHRINK_TOLERANCE: f64 = 0.5;

/// Residuals at or above this size survive rounding and are reported.
const UNRESOLVED_THRESHOLD: f64 = 0.5;

/// Fractional drift below this is treated as zero.
const EPSILON: f64 = 1e-9;

/// Allocate `container` pixels among `specs`, returning the final lengths.
///
/// Each spec's preferred value is overwritten with its allocated length.
///
/// # Panics
///
/// Panics if `specs` is empty.
///
/// # Example
///
/// ```
/// use cellfit_layout::{SizeSpec, allocate};
///
/// let mut specs = vec![SizeSpec::exact(50), SizeSpec::relative(1.0).with_preferred(50.0)];
/// assert_eq!(allocate(&mut specs, 200), vec![50, 150]);
/// ```
pub fn allocate(specs: &mut [SizeSpec], container: u32) -> Vec<u32> {
    allocate_with(specs, container, &mut NoopObserver)
}

/// [`allocate`] with an observer that receives every solver decision.
///
/// # Panics
///
/// Panics if `specs` is empty.
pub fn allocate_with<O>(specs: &mut [SizeSpec], container: u32, observer: &mut O) -> Vec<u32>
where
    O: SolveObserver + ?Sized,
{
    assert!(!specs.is_empty(), "allocate requires at least one cell");

    let _span = cellfit_core::debug_span!("allocate", cells = specs.len(), container).entered();

    let target = f64::from(container);
    let preferred_sum = specs.preferred_sum();
    let minimum_sum = specs.minimum_sum();
    observer.observe(SolveEvent::Start {
        cells: specs.len(),
        container,
        preferred_sum,
        minimum_sum,
    });

    let branch = if preferred_sum.round() == target {
        Branch::PerfectFit
    } else if minimum_sum > u64::from(container) {
        Branch::Squish
    } else if preferred_sum >= target {
        Branch::Shrink
    } else {
        Branch::Stretch
    };
    observer.observe(SolveEvent::Branch(branch));

    let groups = PriorityGroups::new(specs);
    match branch {
        Branch::PerfectFit => {}
        Branch::Squish => squish(specs, target, minimum_sum),
        Branch::Shrink => shrink(specs, &groups, target, observer),
        Branch::Stretch => stretch(specs, &groups, target - preferred_sum, observer),
    }

    let lengths = round_exact(specs, container, observer);
    let total: u64 = lengths.iter().map(|&len| u64::from(len)).sum();
    cellfit_core::debug!(total, container, branch = ?branch, "allocation finished");
    observer.observe(SolveEvent::Finished { total, container });
    lengths
}

fn squish(specs: &mut [SizeSpec], target: f64, minimum_sum: u64) {
    let scale = target / minimum_sum as f64;
    for spec in specs.iter_mut() {
        spec.set_preferred(f64::from(spec.minimum_len()) * scale);
    }
}

fn shrink<O>(specs: &mut [SizeSpec], groups: &PriorityGroups, target: f64, observer: &mut O)
where
    O: SolveObserver + ?Sized,
{
    let mut excess = specs.preferred_sum() - target;
    if !groups.relative.is_empty() {
        excess = shrink_relative(specs, &groups.relative, excess, observer) - target;
    }
    if excess > 0.0 && !groups.preferred.is_empty() {
        shrink_preferred(specs, &groups.preferred, excess, observer);
    }
}

/// Water-filling reduction of relative cells; returns the new preferred sum
/// over all cells.
///
/// Each round splits the remaining excess among the cells still above their
/// floor, in proportion to stretch factor. A cell that lands on its floor
/// leaves the active set, and the next round re-splits what is left among the
/// rest. The loop ends when a round clamps nobody, so it runs at most once per
/// cell plus one.
pub(crate) fn shrink_relative<O>(
    specs: &mut [SizeSpec],
    indices: &[usize],
    excess: f64,
    observer: &mut O,
) -> f64
where
    O: SolveObserver + ?Sized,
{
    let mut excess = excess;
    let mut active: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| specs[i].above_minimum() && specs[i].stretch() > 0.0)
        .collect();

    let mut iteration = 0;
    while excess >= SHRINK_TOLERANCE && !active.is_empty() {
        let active_stretch: f64 = active.iter().map(|&i| specs[i].stretch()).sum();
        observer.observe(SolveEvent::RelativeShrinkRound {
            iteration,
            active: active.len(),
            excess,
        });
        cellfit_core::trace!(iteration, active = active.len(), excess, "relative shrink round");

        let round_excess = excess;
        for &i in &active {
            let spec = &mut specs[i];
            let floor = f64::from(spec.minimum_len());
            let proposed = spec.preferred_len() - round_excess * spec.stretch() / active_stretch;
            let next = proposed.max(floor);
            excess -= spec.preferred_len() - next;
            spec.set_preferred(next);
        }

        let before = active.len();
        active.retain(|&i| specs[i].above_minimum());
        if active.len() == before {
            break;
        }
        iteration += 1;
    }

    specs.preferred_sum()
}

/// Single proportional pass over preferred cells above their floor.
///
/// Cells that hit their minimum keep it; the shortfall is not passed on here.
/// Rounding settles it against the container.
pub(crate) fn shrink_preferred<O>(
    specs: &mut [SizeSpec],
    indices: &[usize],
    excess: f64,
    observer: &mut O,
) where
    O: SolveObserver + ?Sized,
{
    let active: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| specs[i].above_minimum())
        .collect();
    let total: f64 = active.iter().map(|&i| specs[i].preferred_len()).sum();
    if total <= 0.0 {
        return;
    }

    let factor = ((total - excess) / total).max(0.0);
    observer.observe(SolveEvent::PreferredShrink { excess, factor });
    for i in active {
        let spec = &mut specs[i];
        let next = (spec.preferred_len() * factor).max(f64::from(spec.minimum_len()));
        spec.set_preferred(next);
    }
}

fn stretch<O>(specs: &mut [SizeSpec], groups: &PriorityGroups, surplus: f64, observer: &mut O)
where
    O: SolveObserver + ?Sized,
{
    if !groups.relative.is_empty() {
        observer.observe(SolveEvent::Grow {
            class: Priority::Relative,
            surplus,
        });
        let weighted = groups.weighted();
        let total_stretch: f64 = weighted.iter().map(|&i| specs[i].stretch()).sum();
        if total_stretch <= 0.0 {
            return;
        }
        for i in weighted {
            let spec = &mut specs[i];
            spec.set_preferred(spec.preferred_len() + surplus * spec.stretch() / total_stretch);
        }
    } else if !groups.preferred.is_empty() {
        grow_proportional(specs, &groups.preferred, Priority::Preferred, surplus, observer);
    } else if !groups.minimum.is_empty() {
        grow_proportional(specs, &groups.minimum, Priority::Minimum, surplus, observer);
    }
}

/// Scale a class subtotal by `(subtotal + surplus) / subtotal`.
fn grow_proportional<O>(
    specs: &mut [SizeSpec],
    indices: &[usize],
    class: Priority,
    surplus: f64,
    observer: &mut O,
) where
    O: SolveObserver + ?Sized,
{
    observer.observe(SolveEvent::Grow { class, surplus });
    let subtotal: f64 = indices.iter().map(|&i| specs[i].preferred_len()).sum();
    if subtotal <= 0.0 {
        return;
    }
    let factor = (subtotal + surplus) / subtotal;
    for &i in indices {
        let spec = &mut specs[i];
        spec.set_preferred(spec.preferred_len() * factor);
    }
}

/// Convert working lengths to integers that sum to `container` whenever a
/// shrinkable or growable class can take the difference.
pub(crate) fn round_exact<O>(specs: &mut [SizeSpec], container: u32, observer: &mut O) -> Vec<u32>
where
    O: SolveObserver + ?Sized,
{
    let target = f64::from(container);

    let mut shortfall = 0.0;
    let mut bumped = 0;
    for spec in specs.iter_mut() {
        if spec.preferred_len() < 1.0 {
            shortfall += 1.0 - spec.preferred_len();
            bumped += 1;
            spec.set_preferred(1.0);
        }
    }
    if bumped > 0 {
        observer.observe(SolveEvent::Bumped {
            cells: bumped,
            shortfall,
        });
    }

    // Pixels the one-pixel floor may add on top of declared minimums.
    let pixel_debt = shortfall
        + specs
            .iter()
            .filter(|spec| is_shrinkable(spec) && spec.minimum_len() == 0)
            .count() as f64;
    let residual = settle(specs, target, pixel_debt, observer);
    if residual.abs() >= UNRESOLVED_THRESHOLD {
        cellfit_core::warn!(residual, container, "allocation left space unresolved");
        observer.observe(SolveEvent::Unresolved { residual });
    }

    // Error diffusion: each cell's rounding error carries into the next.
    let mut carry = 0.0;
    specs
        .iter_mut()
        .map(|spec| {
            let value = spec.preferred_len() + carry;
            let rounded = value.round().max(0.0);
            carry = value - rounded;
            spec.set_preferred(rounded);
            rounded.min(f64::from(u32::MAX)) as u32
        })
        .collect()
}

fn is_shrinkable(spec: &SizeSpec) -> bool {
    matches!(spec.priority(), Priority::Relative | Priority::Preferred)
}

/// Move the working sum onto `target`; returns what is left over.
fn settle<O>(specs: &mut [SizeSpec], target: f64, pixel_debt: f64, observer: &mut O) -> f64
where
    O: SolveObserver + ?Sized,
{
    let residual = specs.preferred_sum() - target;
    if residual.abs() <= EPSILON {
        return residual;
    }
    observer.observe(SolveEvent::Reconcile { residual });

    if residual > 0.0 {
        let mut left = residual;
        for class in [Priority::Relative, Priority::Preferred] {
            left -= take(specs, left, |spec| {
                if spec.priority() == class {
                    spec.preferred_len() - f64::from(spec.minimum_len().max(1))
                } else {
                    0.0
                }
            });
        }
        take(specs, left.min(pixel_debt), |spec| spec.preferred_len() - 1.0);
    } else {
        let growable: f64 = specs
            .iter()
            .filter(|spec| spec.priority() != Priority::Exact)
            .map(SizeSpec::preferred_len)
            .sum();
        if growable > 0.0 {
            let factor = (growable - residual) / growable;
            for spec in specs
                .iter_mut()
                .filter(|spec| spec.priority() != Priority::Exact)
            {
                spec.set_preferred(spec.preferred_len() * factor);
            }
        }
    }

    specs.preferred_sum() - target
}

/// Remove up to `amount` from the cells, each in proportion to its `room`.
/// Returns the amount removed.
fn take(specs: &mut [SizeSpec], amount: f64, room: impl Fn(&SizeSpec) -> f64) -> f64 {
    if amount <= EPSILON {
        return 0.0;
    }
    let total: f64 = specs.iter().map(|spec| room(spec).max(0.0)).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let taken = amount.min(total);
    for spec in specs.iter_mut() {
        let share = room(spec).max(0.0);
        if share > 0.0 {
            spec.set_preferred(spec.preferred_len() - taken * share / total);
        }
    }
    taken
}
