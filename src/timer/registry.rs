// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timer registry for per-target one-shot deadlines.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A pending one-shot deadline for one target.
#[derive(Debug)]
struct TimerEntry {
    /// Distinguishes this arm from any earlier one for the same name, so
    /// a stale sleeper that lost the abort race cannot fire a newer timer.
    generation: u64,
    deadline: Instant,
    expires_at: DateTime<Utc>,
    sleeper: JoinHandle<()>,
}

/// Per-target one-shot deadlines with lock-serialized expiry.
///
/// Each target name holds at most one pending timer. Arming a name that
/// already has a timer cancels the old one first and re-bases the
/// deadline. When a deadline fires, the expiry task acquires the same
/// lock used by [`cancel_timer`](Self::cancel_timer) and
/// [`setup_timer`](Self::setup_timer), verifies it still owns the entry,
/// removes it, and runs the cleanup while still holding the lock. A
/// cancel arriving at the exact moment of expiry therefore either
/// removes the entry first (cleanup never runs) or waits until cleanup
/// has finished; there is no double-cleanup and no lost cancellation.
///
/// The registry is agnostic to what cleanup does, but the cleanup future
/// runs under the registry lock and must not call back into the registry.
///
/// The registry is cheap to clone; clones share the same table.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchcraft::timer::TimerRegistry;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let timers = TimerRegistry::new();
///
/// timers
///     .setup_timer("porch", Duration::from_secs(300), async {
///         // stop the task, turn the switch off, publish "off" ...
///     })
///     .await;
///
/// assert!(timers.remaining("porch").await.is_some());
///
/// // Cancelled before expiry: the cleanup never runs
/// timers.cancel_timer("porch").await;
/// # }
/// ```
#[derive(Debug)]
pub struct TimerRegistry {
    entries: Arc<Mutex<HashMap<String, TimerEntry>>>,
    generation: Arc<AtomicU64>,
}

impl TimerRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Arms a one-shot timer for the given target.
    ///
    /// Any pending timer for `name` is cancelled first; the new deadline
    /// is `now + duration`. When the deadline fires, `cleanup` runs once,
    /// under the registry lock, after the entry has been removed.
    pub async fn setup_timer<F>(&self, name: impl Into<String>, duration: Duration, cleanup: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + duration;
        let expires_at = Utc::now()
            + chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);

        let mut entries = self.entries.lock().await;

        if let Some(old) = entries.remove(&name) {
            tracing::debug!(target = %name, "replacing pending timer");
            old.sleeper.abort();
        }

        let sleeper = tokio::spawn(expire(
            Arc::clone(&self.entries),
            name.clone(),
            generation,
            duration,
            cleanup,
        ));

        tracing::debug!(target = %name, ?duration, "timer armed");
        entries.insert(
            name,
            TimerEntry {
                generation,
                deadline,
                expires_at,
                sleeper,
            },
        );
    }

    /// Cancels the pending timer for the given target.
    ///
    /// Best-effort: if the timer has already fired, this is a no-op.
    /// Returns `true` if a pending timer was removed.
    pub async fn cancel_timer(&self, name: &str) -> bool {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.remove(name) {
            entry.sleeper.abort();
            tracing::debug!(target = %name, "timer cancelled");
            true
        } else {
            false
        }
    }

    /// Cancels every pending timer.
    pub async fn cancel_all(&self) {
        let mut entries = self.entries.lock().await;
        for (name, entry) in entries.drain() {
            entry.sleeper.abort();
            tracing::debug!(target = %name, "timer cancelled");
        }
    }

    /// Returns the time left until the timer for `name` fires.
    pub async fn remaining(&self, name: &str) -> Option<Duration> {
        self.entries
            .lock()
            .await
            .get(name)
            .map(|e| e.deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the absolute expiry timestamp for `name`.
    pub async fn expires_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().await.get(name).map(|e| e.expires_at)
    }

    /// Returns the number of pending timers.
    pub async fn timer_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// The expiry task: sleeps, then fires the cleanup if this arm still owns
/// the entry.
async fn expire<F>(
    entries: Arc<Mutex<HashMap<String, TimerEntry>>>,
    name: String,
    generation: u64,
    duration: Duration,
    cleanup: F,
) where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::time::sleep(duration).await;

    let mut guard = entries.lock().await;
    let owned = matches!(guard.get(&name), Some(entry) if entry.generation == generation);
    if !owned {
        // Cancelled or superseded while we waited for the lock
        return;
    }
    guard.remove(&name);

    tracing::debug!(target = %name, "timer expired");
    // Still holding the lock: a concurrent cancel/replace for this name
    // waits until cleanup is done
    cleanup.await;
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TimerRegistry {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            generation: Arc::clone(&self.generation),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use tokio::time::sleep;

    use super::*;

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_runs_cleanup_once_and_removes_entry() {
        let timers = TimerRegistry::new();
        let fired = counter();

        let c = fired.clone();
        timers
            .setup_timer("s1", Duration::from_secs(1), async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(timers.timer_count().await, 1);

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timers.timer_count().await, 0);

        // No second fire later
        sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_expiry_suppresses_cleanup() {
        let timers = TimerRegistry::new();
        let fired = counter();

        let c = fired.clone();
        timers
            .setup_timer("s1", Duration::from_secs(1), async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        sleep(Duration::from_millis(500)).await;
        assert!(timers.cancel_timer("s1").await);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timers.timer_count().await, 0);
    }

    #[tokio::test]
    async fn cancel_without_timer_is_noop() {
        let timers = TimerRegistry::new();
        assert!(!timers.cancel_timer("nobody").await);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_the_deadline() {
        let timers = TimerRegistry::new();
        let first = counter();
        let second = counter();

        let c = first.clone();
        timers
            .setup_timer("s1", Duration::from_secs(1), async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        // Re-arm at 500ms with a 2s duration; old cleanup must never run
        sleep(Duration::from_millis(500)).await;
        let c = second.clone();
        timers
            .setup_timer("s1", Duration::from_secs(2), async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(timers.timer_count().await, 1);

        // Past the original deadline: nothing has fired
        sleep(Duration::from_millis(700)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        // Past the re-based deadline: only the new cleanup fired
        sleep(Duration::from_millis(1400)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_counts_down() {
        let timers = TimerRegistry::new();
        timers
            .setup_timer("s1", Duration::from_secs(10), async {})
            .await;

        let before = timers.remaining("s1").await.unwrap();
        assert!(before <= Duration::from_secs(10));
        assert!(before >= Duration::from_secs(9));

        sleep(Duration::from_secs(4)).await;
        let after = timers.remaining("s1").await.unwrap();
        assert!(after <= Duration::from_secs(6));

        assert!(timers.remaining("unknown").await.is_none());
        timers.cancel_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn expires_at_is_reported() {
        let timers = TimerRegistry::new();
        timers
            .setup_timer("s1", Duration::from_secs(60), async {})
            .await;

        let expires_at = timers.expires_at("s1").await.unwrap();
        assert!(expires_at > Utc::now());
        timers.cancel_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_clears_every_timer() {
        let timers = TimerRegistry::new();
        let fired = counter();

        for name in ["s1", "s2", "s3"] {
            let c = fired.clone();
            timers
                .setup_timer(name, Duration::from_secs(1), async move {
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }
        assert_eq!(timers.timer_count().await, 3);

        timers.cancel_all().await;
        assert_eq!(timers.timer_count().await, 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_timers_fire_independently() {
        let timers = TimerRegistry::new();
        let fired_fast = counter();
        let fired_slow = counter();

        let c = fired_fast.clone();
        timers
            .setup_timer("fast", Duration::from_secs(1), async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        let c = fired_slow.clone();
        timers
            .setup_timer("slow", Duration::from_secs(5), async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(fired_fast.load(Ordering::SeqCst), 1);
        assert_eq!(fired_slow.load(Ordering::SeqCst), 0);
        assert_eq!(timers.timer_count().await, 1);

        timers.cancel_all().await;
    }
}
