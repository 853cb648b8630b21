// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Task manager enforcing one task per target name.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{AggregateError, Result};
use crate::event::{EventBus, SwitchEvent};
use crate::task::Task;

/// Maps target names to active tasks, enforcing single-owner semantics.
///
/// All mutating operations run under one async lock, so a replacement for
/// a name is serialized against any other start/stop touching the table.
/// Lifecycle events are published on the injected [`EventBus`]: the task's
/// kind name ("blink"/"flipflop") on start and "off" on stop.
///
/// The manager is cheap to clone; clones share the same table and bus.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchcraft::manager::TaskManager;
/// use switchcraft::switch::VirtualSwitch;
/// use switchcraft::task::Blink;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> switchcraft::Result<()> {
/// let manager = TaskManager::new();
///
/// let blink = Blink::builder()
///     .switch(Arc::new(VirtualSwitch::new("porch")))
///     .period_secs(1.0)
///     .build()?;
///
/// manager.start_task("porch", blink.into()).await?;
/// assert!(manager.get_task("porch").await.is_some());
///
/// manager.stop_task("porch").await?;
/// assert!(manager.get_task("porch").await.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TaskManager {
    tasks: Arc<Mutex<HashMap<String, Arc<Task>>>>,
    event_bus: EventBus,
}

impl TaskManager {
    /// Creates a new task manager with its own event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Creates a new task manager publishing on the given bus.
    #[must_use]
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            event_bus,
        }
    }

    /// Returns the event bus this manager publishes on.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Starts a task for the given target, replacing any existing one.
    ///
    /// Any existing task for `name` is fully stopped first - the call
    /// waits for its loop to exit and its switches to be forced off -
    /// before the new task starts. On success the task is recorded and a
    /// start event carrying the task's kind is published.
    ///
    /// There is no half-started state: if the old task's stop fails, or
    /// the new task's start fails, `name` has no task afterwards and the
    /// first error is returned.
    ///
    /// # Errors
    ///
    /// Returns the error from stopping the previous occupant or from
    /// starting the new task.
    pub async fn start_task(&self, name: impl Into<String>, task: Task) -> Result<()> {
        let name = name.into();
        let mut tasks = self.tasks.lock().await;

        if let Some(old) = tasks.remove(&name) {
            tracing::debug!(target = %name, "replacing existing task");
            if old.is_running() {
                old.stop().await?;
                self.event_bus.publish(SwitchEvent::off(&name));
            }
        }

        task.start()?;
        let kind = task.kind();
        tasks.insert(name.clone(), Arc::new(task));

        tracing::info!(target = %name, kind = %kind, "task started");
        self.event_bus.publish(SwitchEvent::task_started(&name, kind));
        Ok(())
    }

    /// Stops and removes the task for the given target.
    ///
    /// The entry is removed whether or not the stop succeeds; an "off"
    /// event is published only on a successful stop. A name without a
    /// task is a no-op, not an error. Returns whether a task was removed,
    /// so callers composing their own "off" notification know if one was
    /// already published.
    ///
    /// # Errors
    ///
    /// Returns the error from the task's stop (including its final
    /// turn-off).
    pub async fn stop_task(&self, name: &str) -> Result<bool> {
        let mut tasks = self.tasks.lock().await;

        let Some(task) = tasks.remove(name) else {
            return Ok(false);
        };

        if task.is_running() {
            task.stop().await?;
        }

        tracing::info!(target = %name, "task stopped");
        self.event_bus.publish(SwitchEvent::off(name));
        Ok(true)
    }

    /// Returns the task for the given target, if any.
    pub async fn get_task(&self, name: &str) -> Option<Arc<Task>> {
        self.tasks.lock().await.get(name).cloned()
    }

    /// Returns the names of all tracked targets.
    pub async fn task_names(&self) -> Vec<String> {
        self.tasks.lock().await.keys().cloned().collect()
    }

    /// Returns the number of tracked tasks.
    pub async fn task_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Stops every tracked task, collecting all failures.
    ///
    /// Every task is attempted; the table is left empty even for tasks
    /// whose stop failed (their loop has already exited by then). An
    /// "off" event is published for each successfully stopped task.
    ///
    /// # Errors
    ///
    /// Returns an aggregate error naming every target whose stop failed.
    pub async fn stop_all_tasks(&self) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        let mut failures = AggregateError::new();

        for (name, task) in tasks.drain() {
            if !task.is_running() {
                continue;
            }
            match task.stop().await {
                Ok(()) => self.event_bus.publish(SwitchEvent::off(&name)),
                Err(e) => {
                    tracing::warn!(target = %name, error = %e, "failed to stop task");
                    failures.push(name, e);
                }
            }
        }

        failures.into_result()
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TaskManager {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            event_bus: self.event_bus.clone(),
        }
    }
}
