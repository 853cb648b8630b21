// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle events emitted by the orchestration layer.

use std::fmt;

use crate::task::TaskKind;

/// What happened to a target.
///
/// The string form of an event kind is what an external transport (e.g.
/// an MQTT bridge) publishes as the payload: `"blink"`, `"flipflop"`, or
/// `"off"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A task started controlling the target.
    TaskStarted(TaskKind),
    /// The target was switched off (task stopped or auto-off fired).
    Off,
}

impl EventKind {
    /// Returns the transport string for this event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TaskStarted(kind) => kind.as_str(),
            Self::Off => "off",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lifecycle event for one target.
///
/// # Examples
///
/// ```
/// use switchcraft::event::SwitchEvent;
/// use switchcraft::task::TaskKind;
///
/// let started = SwitchEvent::task_started("porch", TaskKind::Blink);
/// assert_eq!(started.event.as_str(), "blink");
///
/// let off = SwitchEvent::off("porch");
/// assert_eq!(off.event.as_str(), "off");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SwitchEvent {
    /// Name of the switch or group the event refers to.
    pub target: String,
    /// What happened.
    pub event: EventKind,
}

impl SwitchEvent {
    /// Creates a task-started event.
    #[must_use]
    pub fn task_started(target: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            target: target.into(),
            event: EventKind::TaskStarted(kind),
        }
    }

    /// Creates an off event.
    #[must_use]
    pub fn off(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            event: EventKind::Off,
        }
    }
}

impl fmt::Display for SwitchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.event)
    }
}
