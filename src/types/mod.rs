// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for timed switch behaviors.
//!
//! This module provides type-safe representations of the values that govern
//! periodic tasks. Each type ensures values are valid at construction time,
//! preventing runtime errors in the scheduling loops.
//!
//! # Types
//!
//! - [`Period`] - Cycle length in seconds (positive, finite)
//! - [`DutyCycle`] - Fraction of the period spent ON (0.0-1.0)

mod duty_cycle;
mod period;

pub use duty_cycle::DutyCycle;
pub use period::Period;
