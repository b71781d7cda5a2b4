//! State space of repeat lengths for microsatellite models.
//!
//! The chain runs on `nr_of_states` consecutive repeat lengths starting at
//! `min_repeat`. Matrix index `i` stands for repeat length `min_repeat + i`.
//!
//! Dimensions are explicit inputs. A host that discovers them from its own
//! data (an alignment, a genotype table) implements [`StateSpaceProvider`];
//! [`ObservedRepeats`] is the provider for a plain list of observed lengths.
use crate::mutation::errors::{ModelError, ModelResult};

/// Dimension state of the chain.
///
/// Invariant: `nr_of_states ≥ 2`. Both fields are fixed for the lifetime of
/// a model; changing them means building a new model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpace {
    nr_of_states: usize,
    min_repeat: i64,
}

impl StateSpace {
    /// Construct a [`StateSpace`] from a state count and smallest repeat length.
    ///
    /// # Errors
    /// - [`ModelError::InvalidStateCount`] if `nr_of_states < 2`.
    pub fn new(nr_of_states: usize, min_repeat: i64) -> ModelResult<Self> {
        if nr_of_states < 2 {
            return Err(ModelError::InvalidStateCount { nr_of_states });
        }
        Ok(StateSpace { nr_of_states, min_repeat })
    }

    pub fn nr_of_states(&self) -> usize {
        self.nr_of_states
    }

    pub fn min_repeat(&self) -> i64 {
        self.min_repeat
    }

    /// Largest representable repeat length.
    pub fn max_repeat(&self) -> i64 {
        self.min_repeat + self.nr_of_states as i64 - 1
    }

    /// Matrix index of an absolute repeat length, if in range.
    pub fn index_of(&self, repeat: i64) -> Option<usize> {
        let offset = repeat.checked_sub(self.min_repeat)?;
        usize::try_from(offset).ok().filter(|&i| i < self.nr_of_states)
    }
}

/// Late-binding source of the model dimensions.
pub trait StateSpaceProvider {
    /// Resolve the state space; called once at model construction.
    fn state_space(&self) -> ModelResult<StateSpace>;
}

impl StateSpaceProvider for StateSpace {
    fn state_space(&self) -> ModelResult<StateSpace> {
        Ok(*self)
    }
}

/// Provider backed by a set of observed repeat lengths.
///
/// `min_repeat` is the smallest observation and `nr_of_states` spans every
/// length up to the largest one: `max − min + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRepeats {
    repeats: Vec<i64>,
}

impl ObservedRepeats {
    pub fn new(repeats: impl Into<Vec<i64>>) -> Self {
        ObservedRepeats { repeats: repeats.into() }
    }
}

impl StateSpaceProvider for ObservedRepeats {
    /// # Errors
    /// - [`ModelError::InvalidStateCount`] when no lengths were observed or
    ///   all observations are identical (a single state).
    fn state_space(&self) -> ModelResult<StateSpace> {
        let (Some(&min), Some(&max)) = (self.repeats.iter().min(), self.repeats.iter().max())
        else {
            return Err(ModelError::InvalidStateCount { nr_of_states: 0 });
        };
        let span = usize::try_from(max.abs_diff(min))
            .ok()
            .and_then(|d| d.checked_add(1))
            .ok_or(ModelError::InvalidStateCount { nr_of_states: usize::MAX })?;
        StateSpace::new(span, min)
    }
}
