// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `switchcraft` - a Rust library to orchestrate timed switch behaviors.
//!
//! This library turns abstract on/off switches into timed and periodic
//! behaviors - blink, round-robin flipflop, momentary-on with auto-off -
//! while guaranteeing that at most one controlling operation governs a
//! given switch or group at any instant, and that stopping an operation
//! always leaves the hardware off before returning control.
//!
//! # Building blocks
//!
//! - **[`Switch`](switch::Switch)**: the driver trait for a single on/off
//!   actuator. [`SwitchGroup`](switch::SwitchGroup) aggregates several
//!   behind the same interface; [`VirtualSwitch`](switch::VirtualSwitch)
//!   is an in-memory implementation.
//! - **[`Blink`](task::Blink)** / **[`Flipflop`](task::Flipflop)**: the
//!   periodic state machines, wrapped by [`Task`](task::Task).
//! - **[`TaskManager`](manager::TaskManager)**: one task per target name,
//!   replace-don't-coexist.
//! - **[`TimerRegistry`](timer::TimerRegistry)**: one auto-off deadline
//!   per target name.
//! - **[`Orchestrator`]**: the facade combining all of the above over a
//!   shared [`EventBus`](event::EventBus).
//!
//! # Quick Start
//!
//! ## Blink a switch
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchcraft::Orchestrator;
//! use switchcraft::switch::VirtualSwitch;
//! use switchcraft::task::Blink;
//!
//! #[tokio::main]
//! async fn main() -> switchcraft::Result<()> {
//!     let orchestrator = Orchestrator::new();
//!
//!     let blink = Blink::builder()
//!         .switch(Arc::new(VirtualSwitch::new("porch")))
//!         .period_secs(2.0)
//!         .duty_cycle(0.25)
//!         .build()?;
//!
//!     // Replaces whatever previously controlled "porch"
//!     orchestrator.start_task("porch", blink.into()).await?;
//!
//!     // ... later: loop exits and the switch is off before this returns
//!     orchestrator.cancel_tasks_and_timers("porch").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Momentary on with auto-off
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use switchcraft::Orchestrator;
//! use switchcraft::switch::{SharedSwitch, Switch, VirtualSwitch};
//!
//! #[tokio::main]
//! async fn main() -> switchcraft::Result<()> {
//!     let orchestrator = Orchestrator::new();
//!     let door: SharedSwitch = Arc::new(VirtualSwitch::new("door"));
//!
//!     door.turn_on().await?;
//!     orchestrator
//!         .setup_auto_off("door", Duration::from_secs(5), door.clone())
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! ## Observe lifecycle events
//!
//! ```no_run
//! use switchcraft::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let orchestrator = Orchestrator::new();
//!
//!     // An MQTT bridge or status display subscribes here
//!     let mut events = orchestrator.event_bus().subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{}: {}", event.target, event.event);
//!         }
//!     });
//! }
//! ```

pub mod error;
pub mod event;
pub mod manager;
mod orchestrator;
pub mod switch;
pub mod task;
pub mod timer;
pub mod types;

pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
