// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic switch tasks.
//!
//! A task is an active, controllable operation bound to one or more
//! switches:
//!
//! - [`Blink`] - periodic ON/OFF toggling of a single switch
//! - [`Flipflop`] - round-robin activation across several switches
//!
//! Both run their loop as a spawned tokio task between `start()` and
//! `stop()`. Stopping is synchronous in effect: it signals the loop,
//! waits for it to acknowledge exit, and then forces a final turn-off, so
//! a caller that has seen `stop()` return knows the hardware is off.
//!
//! The [`Task`] enum lets the orchestration layer treat both uniformly.

mod blink;
mod flipflop;

use std::fmt;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::types::{DutyCycle, Period};

pub use blink::{Blink, BlinkBuilder};
pub use flipflop::{Flipflop, FlipflopBuilder};

/// Which phase of the cycle a loop is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Off,
    On,
}

impl Phase {
    pub(crate) const fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// Handle to a running loop: the stop signal and the join handle used as
/// the exit acknowledgement.
#[derive(Debug)]
pub(crate) struct LoopHandle {
    pub(crate) stop_tx: oneshot::Sender<()>,
    pub(crate) join: JoinHandle<()>,
}

impl LoopHandle {
    /// Signals the loop to stop and waits until it has exited.
    pub(crate) async fn shutdown(self) {
        // The loop also exits if the sender is dropped, so a failed send
        // (loop already gone) is fine either way.
        let _ = self.stop_tx.send(());
        let _ = self.join.await;
    }
}

/// The kind of a task, used as the event name on task start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Periodic two-state toggler for one switch.
    Blink,
    /// Round-robin activator across several switches.
    Flipflop,
}

impl TaskKind {
    /// Returns the event-name string for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::Flipflop => "flipflop",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A polymorphic handle over the concrete task types.
///
/// The [`TaskManager`](crate::manager::TaskManager) stores tasks through
/// this enum so blink and flipflop share one lifecycle path.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchcraft::switch::VirtualSwitch;
/// use switchcraft::task::{Blink, Task, TaskKind};
/// use switchcraft::types::{DutyCycle, Period};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> switchcraft::Result<()> {
/// let blink = Blink::new(
///     Arc::new(VirtualSwitch::new("lamp")),
///     Period::from_secs(1.0)?,
///     DutyCycle::default(),
/// );
/// let task = Task::from(blink);
/// assert_eq!(task.kind(), TaskKind::Blink);
/// assert!(!task.is_running());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub enum Task {
    /// A blink task.
    Blink(Blink),
    /// A flipflop task.
    Flipflop(Flipflop),
}

impl Task {
    /// Starts the task's loop.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyRunning` if the task is running.
    pub fn start(&self) -> Result<()> {
        match self {
            Self::Blink(b) => b.start(),
            Self::Flipflop(f) => f.start(),
        }
    }

    /// Stops the task's loop and forces the governed switches off.
    ///
    /// Blocks until the loop has exited before touching the hardware; see
    /// [`Blink::stop`] and [`Flipflop::stop`].
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotRunning` if the task is not running, or any
    /// error from the final turn-off.
    pub async fn stop(&self) -> Result<()> {
        match self {
            Self::Blink(b) => b.stop().await,
            Self::Flipflop(f) => f.stop().await,
        }
    }

    /// Returns true while the task's loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        match self {
            Self::Blink(b) => b.is_running(),
            Self::Flipflop(f) => f.is_running(),
        }
    }

    /// Returns the task's kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Blink(_) => TaskKind::Blink,
            Self::Flipflop(_) => TaskKind::Flipflop,
        }
    }

    /// Returns the task's period.
    #[must_use]
    pub fn period(&self) -> Period {
        match self {
            Self::Blink(b) => b.period(),
            Self::Flipflop(f) => f.period(),
        }
    }

    /// Returns the task's duty cycle.
    #[must_use]
    pub fn duty_cycle(&self) -> DutyCycle {
        match self {
            Self::Blink(b) => b.duty_cycle(),
            Self::Flipflop(f) => f.duty_cycle(),
        }
    }
}

impl From<Blink> for Task {
    fn from(blink: Blink) -> Self {
        Self::Blink(blink)
    }
}

impl From<Flipflop> for Task {
    fn from(flipflop: Flipflop) -> Self {
        Self::Flipflop(flipflop)
    }
}
