// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot auto-off deadlines.
//!
//! The [`TimerRegistry`] holds at most one pending deadline per target
//! name. When a deadline fires it runs a caller-supplied cleanup under the
//! registry's lock, so an expiry and a manual cancel/replace for the same
//! name are never interleaved.

mod registry;

pub use registry::TimerRegistry;
