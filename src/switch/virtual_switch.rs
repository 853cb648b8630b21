// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory switch implementation.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::Result;

use super::Switch;

/// An in-memory switch that always succeeds.
///
/// Useful for tests, examples, and purely logical targets that have no
/// hardware behind them.
///
/// # Examples
///
/// ```
/// use switchcraft::switch::{Switch, VirtualSwitch};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> switchcraft::Result<()> {
/// let sw = VirtualSwitch::new("test");
/// assert!(!sw.get_state().await?);
///
/// sw.turn_on().await?;
/// assert!(sw.get_state().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VirtualSwitch {
    name: String,
    state: AtomicBool,
}

impl VirtualSwitch {
    /// Creates a new virtual switch, initially off.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AtomicBool::new(false),
        }
    }

    /// Returns the current state without going through the trait.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Switch for VirtualSwitch {
    async fn turn_on(&self) -> Result<()> {
        self.state.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn turn_off(&self) -> Result<()> {
        self.state.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn get_state(&self) -> Result<bool> {
        Ok(self.state.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_off() {
        let sw = VirtualSwitch::new("s1");
        assert!(!sw.get_state().await.unwrap());
        assert!(!sw.is_on());
    }

    #[tokio::test]
    async fn turn_on_and_off() {
        let sw = VirtualSwitch::new("s1");

        sw.turn_on().await.unwrap();
        assert!(sw.get_state().await.unwrap());

        sw.turn_off().await.unwrap();
        assert!(!sw.get_state().await.unwrap());
    }

    #[tokio::test]
    async fn operations_are_idempotent() {
        let sw = VirtualSwitch::new("s1");

        sw.turn_on().await.unwrap();
        sw.turn_on().await.unwrap();
        assert!(sw.get_state().await.unwrap());

        sw.turn_off().await.unwrap();
        sw.turn_off().await.unwrap();
        assert!(!sw.get_state().await.unwrap());
    }

    #[test]
    fn name_is_preserved() {
        let sw = VirtualSwitch::new("kitchen");
        assert_eq!(sw.name(), "kitchen");
    }
}
