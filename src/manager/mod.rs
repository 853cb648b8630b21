// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exclusive task lifecycle management.
//!
//! The [`TaskManager`] maps target names to active tasks and enforces
//! "replace, don't coexist": starting a task for a name that already has
//! one first fully stops the old task - including its final turn-off -
//! before the new one starts. Two loops can never simultaneously control
//! the same target.

mod task_manager;

pub use task_manager::TaskManager;
