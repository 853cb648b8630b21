// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch abstraction and composites.
//!
//! A [`Switch`] is an addressable on/off actuator: a GPIO line, an SPI
//! relay board output, a remote HTTP relay. This module defines the trait
//! that all drivers implement, an ordered [`SwitchGroup`] composite that
//! aggregates several switches behind the same interface, and an in-memory
//! [`VirtualSwitch`] for tests and examples.
//!
//! # Contract
//!
//! - `turn_on`/`turn_off` are idempotent: turning on an already-on switch
//!   is not an error.
//! - All operations must tolerate concurrent invocation. A running task's
//!   loop and an external status read may call into the same switch at the
//!   same time.
//!
//! # Examples
//!
//! ```
//! use switchcraft::switch::{Switch, VirtualSwitch};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> switchcraft::Result<()> {
//! let lamp = VirtualSwitch::new("lamp");
//! lamp.turn_on().await?;
//! assert!(lamp.get_state().await?);
//! # Ok(())
//! # }
//! ```

mod group;
mod virtual_switch;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use group::SwitchGroup;
pub use virtual_switch::VirtualSwitch;

/// An addressable on/off actuator.
///
/// Implementations are provided by driver crates (or by [`VirtualSwitch`]
/// for in-memory use) and must be safe for concurrent invocation.
#[async_trait]
pub trait Switch: Send + Sync {
    /// Turns the switch on. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying actuator fails.
    async fn turn_on(&self) -> Result<()>;

    /// Turns the switch off. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying actuator fails.
    async fn turn_off(&self) -> Result<()>;

    /// Returns the current state (`true` = on).
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be read.
    async fn get_state(&self) -> Result<bool>;

    /// Returns the switch's name.
    fn name(&self) -> &str;
}

/// A shared, dynamically-typed switch handle.
///
/// Tasks and groups hold switches through this alias so heterogeneous
/// drivers can be mixed freely.
pub type SharedSwitch = Arc<dyn Switch>;
