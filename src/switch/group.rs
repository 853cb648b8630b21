// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered composite of switches.

use async_trait::async_trait;

use crate::error::{AggregateError, Result};

use super::{SharedSwitch, Switch};

/// A named, insertion-ordered composite of switches.
///
/// A group exposes the same interface as a single [`Switch`], applying
/// operations to every member. It does not own its members beyond the
/// shared handles; the same switch may belong to several groups.
///
/// # Aggregate semantics
///
/// - `get_state` is `true` iff **every** member is on (logical AND).
/// - `turn_on`/`turn_off` attempt **every** member and collect all
///   failures into one [`AggregateError`](crate::error::AggregateError)
///   instead of stopping at the first one.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchcraft::switch::{Switch, SwitchGroup, VirtualSwitch};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> switchcraft::Result<()> {
/// let group = SwitchGroup::new("hallway")
///     .with_switch(Arc::new(VirtualSwitch::new("h1")))
///     .with_switch(Arc::new(VirtualSwitch::new("h2")));
///
/// group.turn_on().await?;
/// assert!(group.get_state().await?);
/// assert_eq!(group.detailed_state().await?, vec![true, true]);
/// # Ok(())
/// # }
/// ```
pub struct SwitchGroup {
    name: String,
    members: Vec<SharedSwitch>,
}

impl SwitchGroup {
    /// Creates a new, empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member switch, preserving insertion order.
    #[must_use]
    pub fn with_switch(mut self, switch: SharedSwitch) -> Self {
        self.members.push(switch);
        self
    }

    /// Adds a member switch to an existing group.
    pub fn add_switch(&mut self, switch: SharedSwitch) {
        self.members.push(switch);
    }

    /// Returns the number of member switches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the member at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SharedSwitch> {
        self.members.get(index)
    }

    /// Returns the members in insertion order.
    #[must_use]
    pub fn switches(&self) -> &[SharedSwitch] {
        &self.members
    }

    /// Returns the state of every member, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an aggregate error if any member's state cannot be read;
    /// every member is still queried.
    pub async fn detailed_state(&self) -> Result<Vec<bool>> {
        let mut states = Vec::with_capacity(self.members.len());
        let mut failures = AggregateError::new();

        for member in &self.members {
            match member.get_state().await {
                Ok(state) => states.push(state),
                Err(e) => failures.push(member.name(), e),
            }
        }

        failures.into_result()?;
        Ok(states)
    }
}

#[async_trait]
impl Switch for SwitchGroup {
    async fn turn_on(&self) -> Result<()> {
        let mut failures = AggregateError::new();
        for member in &self.members {
            if let Err(e) = member.turn_on().await {
                failures.push(member.name(), e);
            }
        }
        failures.into_result()
    }

    async fn turn_off(&self) -> Result<()> {
        let mut failures = AggregateError::new();
        for member in &self.members {
            if let Err(e) = member.turn_off().await {
                failures.push(member.name(), e);
            }
        }
        failures.into_result()
    }

    async fn get_state(&self) -> Result<bool> {
        for member in &self.members {
            if !member.get_state().await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
