//! Mutation-model parameters and their bounds.
//!
//! This module provides the **model-space** parameter container
//! [`MutationParams`] for the Sainudiin/Wu microsatellite mutation model, the
//! parameter identifiers [`ParamId`] used by generic setters and bindings,
//! and the per-parameter bound set [`MutationBounds`].
//!
//! ## Parameters
//! - `rb`: force of attraction toward the equilibrium repeat length, `≥ 0`.
//! - `ieq`: equilibrium repeat length of the mutational bias (absolute
//!   repeat-length units, signed).
//! - `g`: parameter of the geometric step-size law, `g ∈ [0, 1]`
//!   (`1 − g` is the probability that a mutation is a single step).
//! - `one_on_a1`: inverse proportionality of mutation rate to repeat length,
//!   `≥ 0`.
//! - `start_lin_regime`: lowest repeat length at which the rate starts to
//!   grow linearly with length (absolute units, integer).
//!
//! ## Invariants validated by constructors
//! - Every user-supplied bound is intersected with the feasible domain of its
//!   parameter before any value is accepted (see [`ParamId::domain`]).
//! - Every stored value is finite and lies inside its clamped bounds.
//! - `start_lin_regime` is an integer; the generic setter rejects fractional
//!   input rather than rounding it.
//!
//! `ieq` and `start_lin_regime` stay in absolute units here; the rate-matrix
//! builder shifts them by `min_repeat` into the zero-based index space.
use crate::mutation::{
    core::bounds::ParamBounds,
    errors::{ParamError, ParamResult},
};
use std::str::FromStr;

/// Identifier of a single mutation-model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Rb,
    Ieq,
    G,
    OneOnA1,
    StartLinRegime,
}

impl ParamId {
    /// All parameters in canonical order.
    pub const ALL: [ParamId; 5] =
        [ParamId::Rb, ParamId::Ieq, ParamId::G, ParamId::OneOnA1, ParamId::StartLinRegime];

    /// Canonical parameter name.
    pub fn name(self) -> &'static str {
        match self {
            ParamId::Rb => "rb",
            ParamId::Ieq => "ieq",
            ParamId::G => "g",
            ParamId::OneOnA1 => "oneOnA1",
            ParamId::StartLinRegime => "startLinRegime",
        }
    }

    /// Feasible domain of the parameter, independent of user bounds.
    ///
    /// - `rb ≥ 0`, `one_on_a1 ≥ 0`
    /// - `g ∈ [0, 1]`
    /// - `ieq`, `start_lin_regime` unrestricted
    pub fn domain(self) -> ParamBounds {
        match self {
            ParamId::Rb | ParamId::OneOnA1 => ParamBounds { lower: 0.0, upper: f64::INFINITY },
            ParamId::G => ParamBounds { lower: 0.0, upper: 1.0 },
            ParamId::Ieq | ParamId::StartLinRegime => ParamBounds::UNBOUNDED,
        }
    }

    fn index(self) -> usize {
        match self {
            ParamId::Rb => 0,
            ParamId::Ieq => 1,
            ParamId::G => 2,
            ParamId::OneOnA1 => 3,
            ParamId::StartLinRegime => 4,
        }
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    /// Parse a parameter name. Accepts the canonical names and their
    /// snake_case spellings (`one_on_a1`, `start_lin_regime`).
    fn from_str(name: &str) -> ParamResult<Self> {
        match name {
            "rb" => Ok(ParamId::Rb),
            "ieq" => Ok(ParamId::Ieq),
            "g" => Ok(ParamId::G),
            "oneOnA1" | "one_on_a1" => Ok(ParamId::OneOnA1),
            "startLinRegime" | "start_lin_regime" => Ok(ParamId::StartLinRegime),
            other => Err(ParamError::UnknownParameter { name: other.to_string() }),
        }
    }
}

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-parameter bounds, as supplied by the host framework.
///
/// Defaults to unbounded for every parameter; the feasible domain is applied
/// on top by [`MutationBounds::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MutationBounds {
    pub rb: ParamBounds,
    pub ieq: ParamBounds,
    pub g: ParamBounds,
    pub one_on_a1: ParamBounds,
    pub start_lin_regime: ParamBounds,
}

impl MutationBounds {
    /// Bounds of parameter `id`.
    pub fn get(&self, id: ParamId) -> ParamBounds {
        match id {
            ParamId::Rb => self.rb,
            ParamId::Ieq => self.ieq,
            ParamId::G => self.g,
            ParamId::OneOnA1 => self.one_on_a1,
            ParamId::StartLinRegime => self.start_lin_regime,
        }
    }

    /// Intersect every bound with its parameter's feasible domain.
    ///
    /// Errors
    /// ------
    /// - `ParamError::InvalidBounds` if any intersection is empty or a bound
    ///   is NaN or inverted.
    pub fn clamped(self) -> ParamResult<Self> {
        let clamp = |id: ParamId| -> ParamResult<ParamBounds> {
            let b = self.get(id);
            ParamBounds::new(id.name(), b.lower, b.upper)?.clamp_to(id.name(), id.domain())
        };
        Ok(MutationBounds {
            rb: clamp(ParamId::Rb)?,
            ieq: clamp(ParamId::Ieq)?,
            g: clamp(ParamId::G)?,
            one_on_a1: clamp(ParamId::OneOnA1)?,
            start_lin_regime: clamp(ParamId::StartLinRegime)?,
        })
    }
}

/// MutationParams — validated model-space parameters.
///
/// Values are private so every mutation goes through [`MutationParams::set`],
/// which enforces bounds. Read access is through the named getters or
/// [`MutationParams::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct MutationParams {
    rb: f64,
    ieq: f64,
    g: f64,
    one_on_a1: f64,
    start_lin_regime: i64,
    bounds: MutationBounds,
}

impl MutationParams {
    /// Construct parameters constrained only by their feasible domains.
    ///
    /// Errors
    /// ------
    /// - `ParamError::NonFiniteValue` / `ParamError::OutOfBounds` if any value
    ///   violates its domain (e.g. `g > 1`, `rb < 0`).
    pub fn new(
        rb: f64, ieq: f64, g: f64, one_on_a1: f64, start_lin_regime: i64,
    ) -> ParamResult<Self> {
        Self::with_bounds(rb, ieq, g, one_on_a1, start_lin_regime, MutationBounds::default())
    }

    /// Construct parameters with user bounds, clamped to the feasible domains.
    ///
    /// Errors
    /// ------
    /// - `ParamError::InvalidBounds` if a bound cannot be clamped.
    /// - `ParamError::NonFiniteValue` / `ParamError::OutOfBounds` if a value
    ///   falls outside its clamped bounds.
    pub fn with_bounds(
        rb: f64, ieq: f64, g: f64, one_on_a1: f64, start_lin_regime: i64,
        bounds: MutationBounds,
    ) -> ParamResult<Self> {
        let bounds = bounds.clamped()?;
        let mut params = MutationParams {
            rb: 0.0,
            ieq: 0.0,
            g: 0.0,
            one_on_a1: 0.0,
            start_lin_regime: 0,
            bounds,
        };
        params.set(ParamId::Rb, rb)?;
        params.set(ParamId::Ieq, ieq)?;
        params.set(ParamId::G, g)?;
        params.set(ParamId::OneOnA1, one_on_a1)?;
        params.set(ParamId::StartLinRegime, start_lin_regime as f64)?;
        Ok(params)
    }

    pub fn rb(&self) -> f64 {
        self.rb
    }

    pub fn ieq(&self) -> f64 {
        self.ieq
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn one_on_a1(&self) -> f64 {
        self.one_on_a1
    }

    pub fn start_lin_regime(&self) -> i64 {
        self.start_lin_regime
    }

    /// Clamped bounds in force for every parameter.
    pub fn bounds(&self) -> &MutationBounds {
        &self.bounds
    }

    /// Current value of parameter `id` as `f64`.
    pub fn get(&self, id: ParamId) -> f64 {
        match id {
            ParamId::Rb => self.rb,
            ParamId::Ieq => self.ieq,
            ParamId::G => self.g,
            ParamId::OneOnA1 => self.one_on_a1,
            ParamId::StartLinRegime => self.start_lin_regime as f64,
        }
    }

    /// Current values in [`ParamId::ALL`] order.
    pub fn values(&self) -> [f64; 5] {
        let mut out = [0.0; 5];
        for id in ParamId::ALL {
            out[id.index()] = self.get(id);
        }
        out
    }

    /// Set parameter `id` after validating it against its bounds.
    ///
    /// Parameters
    /// ----------
    /// - `id`: `ParamId`
    ///   Parameter to update.
    /// - `value`: `f64`
    ///   New value. For `StartLinRegime` it must be integral.
    ///
    /// Errors
    /// ------
    /// - `ParamError::NonFiniteValue` if `value` is NaN or ±∞.
    /// - `ParamError::NonIntegerValue` for a fractional `StartLinRegime`.
    /// - `ParamError::OutOfBounds` if `value` is outside the clamped bounds.
    ///
    /// Notes
    /// -----
    /// - On error the stored value is left unchanged.
    pub fn set(&mut self, id: ParamId, value: f64) -> ParamResult<()> {
        let value = self.bounds.get(id).check(id.name(), value)?;
        match id {
            ParamId::Rb => self.rb = value,
            ParamId::Ieq => self.ieq = value,
            ParamId::G => self.g = value,
            ParamId::OneOnA1 => self.one_on_a1 = value,
            ParamId::StartLinRegime => self.start_lin_regime = to_integer(id.name(), value)?,
        }
        Ok(())
    }
}

fn to_integer(name: &'static str, value: f64) -> ParamResult<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper comparison.
    if value.fract() != 0.0 || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(ParamError::NonIntegerValue { name, value });
    }
    Ok(value as i64)
}
