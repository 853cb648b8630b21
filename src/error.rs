// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `switchcraft` library.
//!
//! This module provides the error hierarchy for the library: value
//! validation, task lifecycle misuse, actuator failures, and aggregate
//! failures from operations that touch multiple targets.

use std::fmt;

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when driving
/// switches and orchestrating tasks.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during task lifecycle operations.
    #[error("task error: {0}")]
    Task(#[from] TaskError),

    /// Error occurred while actuating a switch.
    #[error("switch error: {0}")]
    Switch(#[from] SwitchError),

    /// Multiple failures collected from an operation spanning several targets.
    #[error("aggregate error: {0}")]
    Aggregate(#[from] AggregateError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when constructing tasks or constrained types with
/// invalid values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A blink was constructed without a switch.
    #[error("a switch is required")]
    SwitchRequired,

    /// A flipflop was constructed with an empty switch list.
    #[error("at least one switch is required")]
    NoSwitches,

    /// The period is not a positive, finite number of seconds.
    #[error("period {0} is invalid: must be positive and finite")]
    InvalidPeriod(f64),

    /// The duty cycle is outside the range [0, 1].
    #[error("duty cycle {0} is out of range [0, 1]")]
    InvalidDutyCycle(f64),
}

/// Errors related to task lifecycle misuse.
///
/// These are recoverable: the caller decides whether a double start or
/// double stop is worth reporting.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// Start was called on a task that is already running.
    #[error("task is already running")]
    AlreadyRunning,

    /// Stop was called on a task that is not running.
    #[error("task is not running")]
    NotRunning,
}

/// Errors surfaced by switch implementations.
///
/// Concrete drivers (GPIO lines, remote relays) map their failures onto
/// these variants so the orchestration layer can report them with the
/// switch's identity attached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwitchError {
    /// The actuator rejected or failed the operation.
    #[error("switch '{switch}' actuation failed: {message}")]
    Actuation {
        /// Name of the switch that failed.
        switch: String,
        /// Driver-provided description of the failure.
        message: String,
    },

    /// The actuator could not be reached at all.
    #[error("switch '{switch}' is unreachable")]
    Unreachable {
        /// Name of the switch that could not be reached.
        switch: String,
    },
}

/// A collection of per-target failures from a multi-target operation.
///
/// Operations that touch several switches or tasks (group on/off, stopping
/// all tasks) attempt every member and collect each failure here instead of
/// stopping at the first one, so the caller sees the complete failure set.
///
/// # Examples
///
/// ```
/// use switchcraft::error::{AggregateError, SwitchError};
///
/// let mut agg = AggregateError::new();
/// assert!(agg.is_empty());
///
/// agg.push("porch", SwitchError::Unreachable { switch: "porch".into() }.into());
/// assert_eq!(agg.len(), 1);
/// assert!(agg.into_result().is_err());
/// ```
#[derive(Debug, Error, Default)]
pub struct AggregateError {
    failures: Vec<(String, Error)>,
}

impl AggregateError {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for the given target.
    pub fn push(&mut self, target: impl Into<String>, error: Error) {
        self.failures.push((target.into(), error));
    }

    /// Returns true if no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns the recorded failures in insertion order.
    #[must_use]
    pub fn failures(&self) -> &[(String, Error)] {
        &self.failures
    }

    /// Converts the aggregate into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Error::Aggregate)` if at least one failure was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(self))
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure(s):", self.failures.len())?;
        for (target, error) in &self.failures {
            write!(f, " [{target}: {error}]")?;
        }
        Ok(())
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
