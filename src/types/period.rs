// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Period type for periodic switch behaviors.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Length of one full ON/OFF cycle, in seconds.
///
/// A period must be a positive, finite number of seconds. Sub-second
/// periods are valid (e.g. `0.2` for a fast blink).
///
/// # Examples
///
/// ```
/// use switchcraft::types::Period;
///
/// let period = Period::from_secs(2.5).unwrap();
/// assert_eq!(period.as_secs(), 2.5);
///
/// // Invalid values return an error
/// assert!(Period::from_secs(0.0).is_err());
/// assert!(Period::from_secs(-1.0).is_err());
/// assert!(Period::from_secs(f64::INFINITY).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Period(f64);

impl Period {
    /// Creates a new period from seconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPeriod` if `seconds` is not positive
    /// and finite.
    pub fn from_secs(seconds: f64) -> Result<Self, ValueError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ValueError::InvalidPeriod(seconds));
        }
        Ok(Self(seconds))
    }

    /// Creates a period from milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPeriod` if the resulting duration is not
    /// positive and finite.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_millis(millis: u64) -> Result<Self, ValueError> {
        Self::from_secs(millis as f64 / 1000.0)
    }

    /// Returns the period in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> f64 {
        self.0
    }

    /// Returns the period as a [`Duration`].
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.0)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<f64> for Period {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_secs(value)
    }
}

impl TryFrom<Duration> for Period {
    type Error = ValueError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::from_secs(value.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_valid_values() {
        for v in [0.01, 0.2, 1.0, 60.0, 3600.0] {
            let period = Period::from_secs(v).unwrap();
            assert!((period.as_secs() - v).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn period_invalid_values() {
        assert!(Period::from_secs(0.0).is_err());
        assert!(Period::from_secs(-0.5).is_err());
        assert!(Period::from_secs(f64::NAN).is_err());
        assert!(Period::from_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn period_from_millis() {
        let period = Period::from_millis(200).unwrap();
        assert!((period.as_secs() - 0.2).abs() < 1e-9);
        assert!(Period::from_millis(0).is_err());
    }

    #[test]
    fn period_as_duration() {
        let period = Period::from_secs(1.5).unwrap();
        assert_eq!(period.as_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn period_try_from_duration() {
        let period = Period::try_from(Duration::from_millis(250)).unwrap();
        assert!((period.as_secs() - 0.25).abs() < 1e-9);
        assert!(Period::try_from(Duration::ZERO).is_err());
    }

    #[test]
    fn period_display() {
        assert_eq!(Period::from_secs(0.2).unwrap().to_string(), "0.2s");
        assert_eq!(Period::from_secs(2.0).unwrap().to_string(), "2s");
    }

    #[test]
    fn period_ordering() {
        assert!(Period::from_secs(0.5).unwrap() < Period::from_secs(1.0).unwrap());
    }
}
