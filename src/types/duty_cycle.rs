// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duty cycle type for periodic switch behaviors.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;
use crate::types::Period;

/// Fraction of a period during which the switch is ON.
///
/// Valid values are in `[0.0, 1.0]` inclusive. The edge values are
/// meaningful: `0.0` keeps the switch off for the whole period and `1.0`
/// keeps it on. The default is `0.5` (symmetric blink).
///
/// # Examples
///
/// ```
/// use switchcraft::types::DutyCycle;
///
/// let duty = DutyCycle::new(0.25).unwrap();
/// assert_eq!(duty.as_fraction(), 0.25);
///
/// assert_eq!(DutyCycle::default().as_fraction(), 0.5);
///
/// // Out-of-range values return an error
/// assert!(DutyCycle::new(1.5).is_err());
/// assert!(DutyCycle::new(-0.1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct DutyCycle(f64);

impl DutyCycle {
    /// Minimum duty cycle (always off).
    pub const MIN: f64 = 0.0;

    /// Maximum duty cycle (always on).
    pub const MAX: f64 = 1.0;

    /// Creates a new duty cycle.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidDutyCycle` if `fraction` is NaN or
    /// outside `[0, 1]`.
    pub fn new(fraction: f64) -> Result<Self, ValueError> {
        if !fraction.is_finite() || !(Self::MIN..=Self::MAX).contains(&fraction) {
            return Err(ValueError::InvalidDutyCycle(fraction));
        }
        Ok(Self(fraction))
    }

    /// Creates a duty cycle from a percentage (0-100).
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidDutyCycle` if the resulting fraction is
    /// outside `[0, 1]`.
    pub fn from_percent(percent: f64) -> Result<Self, ValueError> {
        Self::new(percent / 100.0)
    }

    /// Returns the duty cycle as a fraction in `[0, 1]`.
    #[must_use]
    pub const fn as_fraction(&self) -> f64 {
        self.0
    }

    /// Returns the ON-phase duration for the given period.
    #[must_use]
    pub fn on_duration(&self, period: Period) -> Duration {
        Duration::from_secs_f64(period.as_secs() * self.0)
    }

    /// Returns the OFF-phase duration for the given period.
    #[must_use]
    pub fn off_duration(&self, period: Period) -> Duration {
        Duration::from_secs_f64(period.as_secs() * (1.0 - self.0))
    }
}

impl Default for DutyCycle {
    fn default() -> Self {
        // Symmetric blink: half the period on, half off
        Self(0.5)
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

impl TryFrom<f64> for DutyCycle {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_cycle_valid_values() {
        for v in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let duty = DutyCycle::new(v).unwrap();
            assert!((duty.as_fraction() - v).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn duty_cycle_invalid_values() {
        assert!(DutyCycle::new(-0.01).is_err());
        assert!(DutyCycle::new(1.01).is_err());
        assert!(DutyCycle::new(f64::NAN).is_err());
    }

    #[test]
    fn duty_cycle_edges_are_valid() {
        // Always-off and always-on are expressible
        assert_eq!(DutyCycle::new(0.0).unwrap().as_fraction(), 0.0);
        assert_eq!(DutyCycle::new(1.0).unwrap().as_fraction(), 1.0);
    }

    #[test]
    fn duty_cycle_from_percent() {
        let duty = DutyCycle::from_percent(25.0).unwrap();
        assert!((duty.as_fraction() - 0.25).abs() < 1e-9);
        assert!(DutyCycle::from_percent(120.0).is_err());
    }

    #[test]
    fn phase_durations_sum_to_period() {
        let period = Period::from_secs(0.2).unwrap();
        for v in [0.0, 0.1, 0.5, 0.9, 1.0] {
            let duty = DutyCycle::new(v).unwrap();
            let total = duty.on_duration(period) + duty.off_duration(period);
            let diff = total.as_secs_f64() - period.as_secs();
            assert!(diff.abs() < 1e-9, "duty {v}: total {total:?}");
        }
    }

    #[test]
    fn on_duration_is_period_times_duty() {
        let period = Period::from_secs(2.0).unwrap();
        let duty = DutyCycle::new(0.25).unwrap();
        assert_eq!(duty.on_duration(period), Duration::from_millis(500));
        assert_eq!(duty.off_duration(period), Duration::from_millis(1500));
    }

    #[test]
    fn duty_cycle_default() {
        assert!((DutyCycle::default().as_fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn duty_cycle_display() {
        assert_eq!(DutyCycle::new(0.5).unwrap().to_string(), "50%");
        assert_eq!(DutyCycle::new(1.0).unwrap().to_string(), "100%");
    }

    #[test]
    fn duty_cycle_try_from() {
        let duty: DutyCycle = 0.3f64.try_into().unwrap();
        assert!((duty.as_fraction() - 0.3).abs() < f64::EPSILON);

        let result: Result<DutyCycle, _> = 2.0f64.try_into();
        assert!(result.is_err());
    }
}
