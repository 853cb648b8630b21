// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for task lifecycle changes.
//!
//! This module provides a pub/sub event system for notifying subscribers
//! when a task starts or a target is switched off. The [`EventBus`] uses
//! tokio's broadcast channel so multiple subscribers (an MQTT bridge, a
//! status display) can receive the same events.
//!
//! # Examples
//!
//! ```
//! use switchcraft::event::{EventBus, SwitchEvent};
//!
//! let bus = EventBus::new();
//!
//! // Subscribe to events
//! let mut rx = bus.subscribe();
//!
//! // Publish an event
//! bus.publish(SwitchEvent::off("porch"));
//! ```

mod event_bus;
mod switch_event;

pub use event_bus::EventBus;
pub use switch_event::{EventKind, SwitchEvent};
