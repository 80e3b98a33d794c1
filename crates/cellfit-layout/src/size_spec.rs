//! Per-cell sizing constraints.
//!
//! A [`SizeSpec`] describes one row or column slot along a single axis. It is
//! built once per layout pass, filled in by the measurement pass, mutated in
//! place by [`allocate`](crate::allocate), and discarded after the caller has
//! read the final lengths.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sizing priority class of a cell.
///
/// The class decides whether a cell may absorb shrink or stretch, and in
/// which order:
///
/// | Class       | Shrinks to        | Grows                                  |
/// |-------------|-------------------|----------------------------------------|
/// | `Exact`     | never             | only with a non-zero stretch factor    |
/// | `Minimum`   | never             | last resort, proportional to size      |
/// | `Preferred` | its minimum       | second, proportional to size           |
/// | `Relative`  | its minimum (0)   | first, proportional to stretch factor  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    /// Fixed length.
    Exact,
    /// Tracks the largest minimum size of its components.
    Minimum,
    /// Tracks the largest preferred size of its components.
    Preferred,
    /// Driven by its stretch factor relative to other relative cells.
    Relative,
}

impl Priority {
    /// All priority classes in declaration order.
    pub const ALL: [Priority; 4] = [
        Priority::Exact,
        Priority::Minimum,
        Priority::Preferred,
        Priority::Relative,
    ];

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Exact => "exact",
            Priority::Minimum => "minimum",
            Priority::Preferred => "preferred",
            Priority::Relative => "relative",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected [`SizeSpec`] construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeSpecError {
    /// Preferred length was negative, NaN, or infinite.
    InvalidPreferred { value: f64 },
    /// Stretch factor was negative, NaN, or infinite.
    InvalidStretch { value: f64 },
}

impl fmt::Display for SizeSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPreferred { value } => {
                write!(f, "preferred length must be finite and non-negative, got {value}")
            }
            Self::InvalidStretch { value } => {
                write!(f, "stretch factor must be finite and non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for SizeSpecError {}

fn check_preferred(value: f64) -> Result<f64, SizeSpecError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SizeSpecError::InvalidPreferred { value })
    }
}

fn check_stretch(value: f64) -> Result<f64, SizeSpecError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SizeSpecError::InvalidStretch { value })
    }
}

/// Sizing constraint for one cell along one axis.
///
/// `preferred` is the solver's working value: it starts as the measured or
/// requested length and holds the allocated length once
/// [`allocate`](crate::allocate) returns.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeSpec {
    priority: Priority,
    minimum: u32,
    preferred: f64,
    stretch: f64,
}

impl SizeSpec {
    /// Create a spec, validating every field.
    pub fn try_new(
        priority: Priority,
        minimum: u32,
        preferred: f64,
        stretch: f64,
    ) -> Result<Self, SizeSpecError> {
        Ok(Self {
            priority,
            minimum,
            preferred: check_preferred(preferred)?,
            stretch: check_stretch(stretch)?,
        })
    }

    /// A fixed-length cell. Its minimum equals its length.
    #[must_use]
    pub const fn exact(length: u32) -> Self {
        Self {
            priority: Priority::Exact,
            minimum: length,
            preferred: length as f64,
            stretch: 0.0,
        }
    }

    /// A cell sized to the largest minimum of its components.
    #[must_use]
    pub const fn minimum() -> Self {
        Self {
            priority: Priority::Minimum,
            minimum: 0,
            preferred: 0.0,
            stretch: 0.0,
        }
    }

    /// A cell sized to the largest preferred size of its components.
    #[must_use]
    pub const fn preferred() -> Self {
        Self {
            priority: Priority::Preferred,
            minimum: 0,
            preferred: 0.0,
            stretch: 0.0,
        }
    }

    /// A cell weighted by `stretch` against the other relative cells.
    ///
    /// # Panics
    ///
    /// Panics if `stretch` is negative or not finite.
    #[must_use]
    pub fn relative(stretch: f64) -> Self {
        Self {
            priority: Priority::Relative,
            minimum: 0,
            preferred: 0.0,
            stretch: 0.0,
        }
        .with_stretch(stretch)
    }

    /// Replace the minimum. An exact cell keeps its length as its floor, so
    /// the preferred value is raised to match when it would fall below.
    #[must_use]
    pub fn with_minimum(mut self, minimum: u32) -> Self {
        self.minimum = minimum;
        if self.priority == Priority::Exact {
            self.preferred = self.preferred.max(f64::from(minimum));
        }
        self
    }

    /// Replace the preferred length.
    ///
    /// # Panics
    ///
    /// Panics if `preferred` is negative or not finite.
    #[must_use]
    pub fn with_preferred(mut self, preferred: f64) -> Self {
        match check_preferred(preferred) {
            Ok(value) => self.preferred = value,
            Err(err) => panic!("{err}"),
        }
        self
    }

    /// Replace the stretch factor.
    ///
    /// # Panics
    ///
    /// Panics if `stretch` is negative or not finite.
    #[must_use]
    pub fn with_stretch(mut self, stretch: f64) -> Self {
        match check_stretch(stretch) {
            Ok(value) => self.stretch = value,
            Err(err) => panic!("{err}"),
        }
        self
    }

    /// Priority class.
    #[inline]
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Hard floor in pixels.
    #[inline]
    #[must_use]
    pub const fn minimum_len(&self) -> u32 {
        self.minimum
    }

    /// Current working (or final) length.
    #[inline]
    #[must_use]
    pub const fn preferred_len(&self) -> f64 {
        self.preferred
    }

    /// Stretch weight.
    #[inline]
    #[must_use]
    pub const fn stretch(&self) -> f64 {
        self.stretch
    }

    /// Preferred length rounded to whole pixels.
    #[inline]
    #[must_use]
    pub fn rounded(&self) -> u32 {
        self.preferred.round().max(0.0) as u32
    }

    /// True while the working length sits strictly above the floor.
    #[inline]
    pub(crate) fn above_minimum(&self) -> bool {
        self.preferred > f64::from(self.minimum)
    }

    #[inline]
    pub(crate) fn set_preferred(&mut self, value: f64) {
        self.preferred = value;
    }

    #[inline]
    pub(crate) fn set_minimum(&mut self, value: u32) {
        self.minimum = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_floor_equals_length() {
        let spec = SizeSpec::exact(40);
        assert_eq!(spec.priority(), Priority::Exact);
        assert_eq!(spec.minimum_len(), 40);
        assert_eq!(spec.preferred_len(), 40.0);
        assert_eq!(spec.stretch(), 0.0);
    }

    #[test]
    fn exact_with_larger_minimum_raises_length() {
        let spec = SizeSpec::exact(10).with_minimum(25);
        assert_eq!(spec.minimum_len(), 25);
        assert_eq!(spec.preferred_len(), 25.0);
    }

    #[test]
    fn relative_records_stretch() {
        let spec = SizeSpec::relative(2.5);
        assert_eq!(spec.priority(), Priority::Relative);
        assert_eq!(spec.minimum_len(), 0);
        assert_eq!(spec.stretch(), 2.5);
    }

    #[test]
    fn try_new_rejects_negative_preferred() {
        let err = SizeSpec::try_new(Priority::Preferred, 0, -1.0, 0.0).unwrap_err();
        assert_eq!(err, SizeSpecError::InvalidPreferred { value: -1.0 });
    }

    #[test]
    fn try_new_rejects_non_finite_stretch() {
        let err = SizeSpec::try_new(Priority::Relative, 0, 5.0, f64::NAN).unwrap_err();
        assert!(matches!(err, SizeSpecError::InvalidStretch { .. }));
        assert!(err.to_string().contains("stretch factor"));
    }

    #[test]
    fn try_new_accepts_valid_fields() {
        let spec = SizeSpec::try_new(Priority::Preferred, 3, 12.5, 0.0).unwrap();
        assert_eq!(spec.minimum_len(), 3);
        assert_eq!(spec.preferred_len(), 12.5);
    }

    #[test]
    #[should_panic(expected = "stretch factor")]
    fn relative_with_negative_stretch_panics() {
        let _ = SizeSpec::relative(-1.0);
    }

    #[test]
    #[should_panic(expected = "preferred length")]
    fn with_preferred_rejects_infinity() {
        let _ = SizeSpec::preferred().with_preferred(f64::INFINITY);
    }

    #[test]
    fn rounded_uses_nearest_pixel() {
        assert_eq!(SizeSpec::preferred().with_preferred(10.49).rounded(), 10);
        assert_eq!(SizeSpec::preferred().with_preferred(10.5).rounded(), 11);
    }

    #[test]
    fn priority_labels() {
        let labels: Vec<String> = Priority::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["exact", "minimum", "preferred", "relative"]);
    }
}
