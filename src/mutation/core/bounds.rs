//! Parameter bounds — validated closed intervals for mutation parameters.
//!
//! Purpose
//! -------
//! Provide a small, validated container for the lower/upper bounds attached
//! to each mutation-model parameter, and the clamping step that intersects
//! user-supplied bounds with the parameter's feasible domain before the
//! first use of the model.
//!
//! Key behaviors
//! -------------
//! - Construct [`ParamBounds`] values with `lower ≤ upper` and no NaN.
//!   Infinite bounds are allowed and mean "unbounded on that side".
//! - Intersect bounds with a feasible domain via [`ParamBounds::clamp_to`],
//!   rejecting configurations whose intersection is empty.
//! - Check candidate values against the bounds via [`ParamBounds::check`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower ≤ upper` and neither bound is NaN for every constructed value.
//! - Bounds are closed: values equal to a bound are accepted.
//!
//! Conventions
//! -----------
//! - Invalid configurations return `ParamError::InvalidBounds` and
//!   out-of-range values return `ParamError::OutOfBounds`; nothing panics.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction, clamping against the `[0, 1]` domain of
//!   `g`, empty intersections, and value checks at and beyond the bounds.
use crate::mutation::errors::{ParamError, ParamResult};

/// ParamBounds — closed interval `[lower, upper]` for a single parameter.
///
/// Fields
/// ------
/// - `lower`: `f64`
///   Lower bound (may be `-∞`).
/// - `upper`: `f64`
///   Upper bound (may be `+∞`).
///
/// Invariants
/// ----------
/// - `lower ≤ upper`, neither is NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ParamBounds {
    /// The unrestricted interval `(-∞, +∞)`.
    pub const UNBOUNDED: ParamBounds =
        ParamBounds { lower: f64::NEG_INFINITY, upper: f64::INFINITY };

    /// Construct validated bounds for parameter `name`.
    ///
    /// Parameters
    /// ----------
    /// - `name`: `&'static str`
    ///   Parameter name used in error payloads.
    /// - `lower`, `upper`: `f64`
    ///   Interval end points. Infinite values are allowed.
    ///
    /// Returns
    /// -------
    /// ParamResult<ParamBounds>
    ///   - `Ok(ParamBounds)` when `lower ≤ upper` and neither is NaN.
    ///
    /// Errors
    /// ------
    /// - `ParamError::InvalidBounds`
    ///   Returned when either bound is NaN or `lower > upper`.
    pub fn new(name: &'static str, lower: f64, upper: f64) -> ParamResult<Self> {
        if lower.is_nan() || upper.is_nan() {
            return Err(ParamError::InvalidBounds {
                name,
                lower,
                upper,
                reason: "Bounds must not be NaN.",
            });
        }
        if lower > upper {
            return Err(ParamError::InvalidBounds {
                name,
                lower,
                upper,
                reason: "Lower bound must not exceed upper bound.",
            });
        }
        Ok(ParamBounds { lower, upper })
    }

    /// Intersect these bounds with the feasible domain `domain`.
    ///
    /// Mirrors `lower' = max(lower, domain.lower)` and
    /// `upper' = min(upper, domain.upper)`.
    ///
    /// Errors
    /// ------
    /// - `ParamError::InvalidBounds`
    ///   Returned when the intersection is empty.
    pub fn clamp_to(self, name: &'static str, domain: ParamBounds) -> ParamResult<Self> {
        let lower = self.lower.max(domain.lower);
        let upper = self.upper.min(domain.upper);
        if lower > upper {
            return Err(ParamError::InvalidBounds {
                name,
                lower,
                upper,
                reason: "Bounds do not intersect the feasible domain of the parameter.",
            });
        }
        Ok(ParamBounds { lower, upper })
    }

    /// Whether `value` lies in `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Validate a candidate value for parameter `name`.
    ///
    /// Errors
    /// ------
    /// - `ParamError::NonFiniteValue` if `value` is NaN or ±∞.
    /// - `ParamError::OutOfBounds` if `value` is outside `[lower, upper]`.
    pub fn check(&self, name: &'static str, value: f64) -> ParamResult<f64> {
        if !value.is_finite() {
            return Err(ParamError::NonFiniteValue { name, value });
        }
        if !self.contains(value) {
            return Err(ParamError::OutOfBounds {
                name,
                value,
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(value)
    }
}

impl Default for ParamBounds {
    fn default() -> Self {
        ParamBounds::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation in `ParamBounds::new`.
    // - Intersection with feasible domains in `ParamBounds::clamp_to`.
    // - Value checks in `ParamBounds::check`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Inverted and NaN bounds are rejected with `InvalidBounds`.
    fn new_rejects_inverted_and_nan_bounds() {
        assert!(matches!(
            ParamBounds::new("rb", 2.0, 1.0),
            Err(ParamError::InvalidBounds { name: "rb", .. })
        ));
        assert!(matches!(
            ParamBounds::new("rb", f64::NAN, 1.0),
            Err(ParamError::InvalidBounds { .. })
        ));
        assert!(ParamBounds::new("rb", 1.0, 1.0).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // User bounds wider than the feasible domain are narrowed to it.
    //
    // Given
    // -----
    // - Bounds `[-5, 5]` for `g`, whose feasible domain is `[0, 1]`.
    //
    // Expect
    // ------
    // - `clamp_to` returns `[0, 1]`.
    fn clamp_to_intersects_with_domain() {
        // Arrange
        let user = ParamBounds::new("g", -5.0, 5.0).unwrap();
        let domain = ParamBounds { lower: 0.0, upper: 1.0 };

        // Act
        let clamped = user.clamp_to("g", domain).unwrap();

        // Assert
        assert_eq!(clamped, ParamBounds { lower: 0.0, upper: 1.0 });
    }

    #[test]
    // Purpose
    // -------
    // Bounds entirely outside the domain cannot be clamped.
    fn clamp_to_rejects_empty_intersection() {
        let user = ParamBounds::new("g", 2.0, 3.0).unwrap();
        let domain = ParamBounds { lower: 0.0, upper: 1.0 };
        assert!(matches!(user.clamp_to("g", domain), Err(ParamError::InvalidBounds { .. })));
    }

    #[test]
    // Purpose
    // -------
    // `check` accepts end points and rejects values beyond them or non-finite.
    fn check_accepts_closed_interval_only() {
        let bounds = ParamBounds { lower: 0.0, upper: 1.0 };
        assert_eq!(bounds.check("g", 0.0), Ok(0.0));
        assert_eq!(bounds.check("g", 1.0), Ok(1.0));
        assert!(matches!(bounds.check("g", 1.5), Err(ParamError::OutOfBounds { .. })));
        assert!(matches!(bounds.check("g", f64::NAN), Err(ParamError::NonFiniteValue { .. })));
    }
}
