// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orchestrator combining the task manager and the timer registry.

use std::time::Duration;

use crate::error::Result;
use crate::event::{EventBus, SwitchEvent};
use crate::manager::TaskManager;
use crate::switch::SharedSwitch;
use crate::task::Task;
use crate::timer::TimerRegistry;

/// The control-plane entry point: one [`TaskManager`] and one
/// [`TimerRegistry`] sharing an [`EventBus`].
///
/// An HTTP/control layer talks to this type. It is responsible for the
/// cross-structure operations: arming an auto-off deadline whose cleanup
/// stops the target's task, and tearing down both structures together for
/// one target or for everything.
///
/// The orchestrator is cheap to clone; clones share the same state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use switchcraft::Orchestrator;
/// use switchcraft::switch::{SharedSwitch, Switch, VirtualSwitch};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> switchcraft::Result<()> {
/// let orchestrator = Orchestrator::new();
/// let porch: SharedSwitch = Arc::new(VirtualSwitch::new("porch"));
///
/// // Momentary on: switch on now, auto-off in five minutes
/// porch.turn_on().await?;
/// orchestrator
///     .setup_auto_off("porch", Duration::from_secs(300), porch.clone())
///     .await;
///
/// // A later request supersedes the per-target state
/// orchestrator.cancel_tasks_and_timers("porch").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Orchestrator {
    tasks: TaskManager,
    timers: TimerRegistry,
    event_bus: EventBus,
}

impl Orchestrator {
    /// Creates a new orchestrator with its own event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Creates a new orchestrator publishing on the given bus.
    #[must_use]
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            tasks: TaskManager::with_event_bus(event_bus.clone()),
            timers: TimerRegistry::new(),
            event_bus,
        }
    }

    /// Returns the task manager.
    #[must_use]
    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    /// Returns the timer registry.
    #[must_use]
    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    /// Returns the shared event bus.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Starts a task for the target, replacing any previous task and
    /// cancelling any pending auto-off timer for it.
    ///
    /// # Errors
    ///
    /// Returns the error from stopping the previous task or starting the
    /// new one; see [`TaskManager::start_task`].
    pub async fn start_task(&self, name: impl Into<String>, task: Task) -> Result<()> {
        let name = name.into();
        self.timers.cancel_timer(&name).await;
        self.tasks.start_task(name, task).await
    }

    /// Arms an auto-off deadline for the target.
    ///
    /// After `duration`, the target's task (if any) is stopped, the
    /// target switch is turned off, and exactly one "off" event is
    /// published. Any previously pending deadline for the name is
    /// replaced.
    pub async fn setup_auto_off(
        &self,
        name: impl Into<String>,
        duration: Duration,
        target: SharedSwitch,
    ) {
        let name = name.into();
        let tasks = self.tasks.clone();
        let event_bus = self.event_bus.clone();
        let cleanup_name = name.clone();

        self.timers
            .setup_timer(name, duration, async move {
                tracing::info!(target = %cleanup_name, "auto-off deadline reached");
                // stop_task publishes "off" when it stops a task; only
                // announce ourselves when it did not
                let mut announced = false;
                match tasks.stop_task(&cleanup_name).await {
                    Ok(stopped) => announced = stopped,
                    Err(e) => {
                        tracing::warn!(target = %cleanup_name, error = %e, "auto-off: failed to stop task");
                    }
                }
                if let Err(e) = target.turn_off().await {
                    tracing::warn!(target = %cleanup_name, error = %e, "auto-off: failed to turn off");
                }
                if !announced {
                    event_bus.publish(SwitchEvent::off(&cleanup_name));
                }
            })
            .await;
    }

    /// Cancels the pending timer and stops the task for one target.
    ///
    /// # Errors
    ///
    /// Returns the error from stopping the task.
    pub async fn cancel_tasks_and_timers(&self, name: &str) -> Result<()> {
        self.timers.cancel_timer(name).await;
        self.tasks.stop_task(name).await?;
        Ok(())
    }

    /// Cancels every pending timer and stops every task.
    ///
    /// Used at shutdown, or when an "all switches" request supersedes all
    /// per-target state.
    ///
    /// # Errors
    ///
    /// Returns an aggregate error naming every target whose stop failed.
    pub async fn cancel_all_tasks_and_timers(&self) -> Result<()> {
        self.timers.cancel_all().await;
        self.tasks.stop_all_tasks().await
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
