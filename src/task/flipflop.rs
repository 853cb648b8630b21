// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Round-robin activator across a set of switches.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::error::{AggregateError, Result, TaskError, ValueError};
use crate::switch::SharedSwitch;
use crate::types::{DutyCycle, Period};

use super::{LoopHandle, Phase};

/// Round-robin activator: exactly one member switch is on at a time.
///
/// Each ON-phase tick advances to the next member (wrapping around) and
/// turns only that switch on; each OFF-phase tick turns the active member
/// off again. Like [`Blink`](super::Blink), the cycle starts with an OFF
/// phase and the same period/duty-cycle arithmetic applies.
///
/// A duty cycle of `0.0` never activates a member. At `1.0` there is no
/// dark gap: each period boundary turns the active member off and the
/// next one on, so exactly one member is lit at all times.
///
/// Stopping turns **every** member off, not just the last active one, so
/// the final state is clean regardless of where the rotation stopped.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use switchcraft::switch::VirtualSwitch;
/// use switchcraft::task::Flipflop;
///
/// # #[tokio::main]
/// # async fn main() -> switchcraft::Result<()> {
/// let flipflop = Flipflop::builder()
///     .switch(Arc::new(VirtualSwitch::new("red")))
///     .switch(Arc::new(VirtualSwitch::new("green")))
///     .switch(Arc::new(VirtualSwitch::new("blue")))
///     .period_secs(0.3)
///     .build()?;
///
/// flipflop.start()?;
/// // ... later
/// flipflop.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct Flipflop {
    switches: Arc<[SharedSwitch]>,
    period: Period,
    duty_cycle: DutyCycle,
    running: AtomicBool,
    handle: Mutex<Option<LoopHandle>>,
}

impl Flipflop {
    /// Creates a new flipflop task from already-validated values.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NoSwitches` if `switches` is empty.
    pub fn new(
        switches: Vec<SharedSwitch>,
        period: Period,
        duty_cycle: DutyCycle,
    ) -> Result<Self> {
        if switches.is_empty() {
            return Err(ValueError::NoSwitches.into());
        }
        Ok(Self {
            switches: switches.into(),
            period,
            duty_cycle,
            running: AtomicBool::new(false),
            handle: Mutex::new(None),
        })
    }

    /// Returns a builder that validates raw inputs.
    #[must_use]
    pub fn builder() -> FlipflopBuilder {
        FlipflopBuilder::new()
    }

    /// Starts the rotation loop. Non-blocking.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyRunning` if the loop is already running.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.handle.lock();
        // The slot is emptied at the start of stop(), but `running` stays
        // set until the loop has been joined and the members forced off,
        // so a start racing a stop cannot spawn a second loop.
        if slot.is_some() || self.running.load(Ordering::SeqCst) {
            return Err(TaskError::AlreadyRunning.into());
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let switches = Arc::clone(&self.switches);
        let on = self.duty_cycle.on_duration(self.period);
        let off = self.duty_cycle.off_duration(self.period);

        let join = tokio::spawn(run_loop(switches, on, off, stop_rx));
        *slot = Some(LoopHandle { stop_tx, join });
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stops the rotation loop and forces every member off.
    ///
    /// Signals the loop, waits until it has observably exited, then calls
    /// `turn_off()` on **all** members, collecting every failure.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotRunning` if the loop is not running, or an
    /// aggregate of the failures from the final turn-offs.
    pub async fn stop(&self) -> Result<()> {
        let handle = self
            .handle
            .lock()
            .take()
            .ok_or(TaskError::NotRunning)?;

        handle.shutdown().await;

        let mut failures = AggregateError::new();
        for member in self.switches.iter() {
            if let Err(e) = member.turn_off().await {
                failures.push(member.name(), e);
            }
        }
        self.running.store(false, Ordering::SeqCst);
        failures.into_result()
    }

    /// Returns true while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns the configured period.
    #[must_use]
    pub fn period(&self) -> Period {
        self.period
    }

    /// Returns the configured duty cycle.
    #[must_use]
    pub fn duty_cycle(&self) -> DutyCycle {
        self.duty_cycle
    }

    /// Returns the member switches in rotation order.
    #[must_use]
    pub fn switches(&self) -> &[SharedSwitch] {
        &self.switches
    }
}

impl fmt::Debug for Flipflop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = self.switches.iter().map(|s| s.name()).collect();
        f.debug_struct("Flipflop")
            .field("switches", &members)
            .field("period", &self.period)
            .field("duty_cycle", &self.duty_cycle)
            .field("running", &self.is_running())
            .finish()
    }
}

/// The rotation loop. The current index lives here, not in the struct:
/// it only has meaning while the loop runs.
async fn run_loop(
    switches: Arc<[SharedSwitch]>,
    on: Duration,
    off: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    tracing::debug!(members = switches.len(), "flipflop loop started");

    let mut phase = Phase::Off;
    let mut current: Option<usize> = None;
    loop {
        let wait = match phase {
            Phase::Off => off,
            Phase::On => on,
        };

        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            () = sleep(wait) => {
                phase = phase.toggled();
                let entering = match phase {
                    Phase::Off => off,
                    Phase::On => on,
                };
                if entering.is_zero() {
                    continue;
                }

                let result = match phase {
                    Phase::On => {
                        let next = current.map_or(0, |i| (i + 1) % switches.len());
                        // At full duty the OFF tick never runs; hand over
                        // here so the previous member is off before the
                        // next one lights up.
                        let handover = match current {
                            Some(prev) if off.is_zero() && prev != next => {
                                switches[prev].turn_off().await
                            }
                            _ => Ok(()),
                        };
                        current = Some(next);
                        handover.and(switches[next].turn_on().await)
                    }
                    Phase::Off => match current {
                        Some(i) => switches[i].turn_off().await,
                        None => Ok(()),
                    },
                };
                if let Err(e) = result {
                    // Skip this transition; the next wake-up stays on schedule
                    tracing::warn!(error = %e, "rotation step failed");
                }
            }
        }
    }

    tracing::debug!(members = switches.len(), "flipflop loop stopped");
}

/// Builder for [`Flipflop`], validating raw inputs at `build()`.
///
/// # Examples
///
/// ```
/// use switchcraft::task::Flipflop;
///
/// // An empty member list is rejected
/// assert!(Flipflop::builder().period_secs(1.0).build().is_err());
/// ```
#[derive(Default)]
pub struct FlipflopBuilder {
    switches: Vec<SharedSwitch>,
    period_secs: f64,
    duty_cycle: Option<f64>,
}

impl FlipflopBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member switch, preserving rotation order.
    #[must_use]
    pub fn switch(mut self, switch: SharedSwitch) -> Self {
        self.switches.push(switch);
        self
    }

    /// Adds several member switches at once.
    #[must_use]
    pub fn switches(mut self, switches: impl IntoIterator<Item = SharedSwitch>) -> Self {
        self.switches.extend(switches);
        self
    }

    /// Sets the period in seconds.
    #[must_use]
    pub fn period_secs(mut self, seconds: f64) -> Self {
        self.period_secs = seconds;
        self
    }

    /// Sets the duty cycle as a fraction in `[0, 1]`.
    ///
    /// Defaults to `0.5` when not set.
    #[must_use]
    pub fn duty_cycle(mut self, fraction: f64) -> Self {
        self.duty_cycle = Some(fraction);
        self
    }

    /// Validates the inputs and builds the task.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NoSwitches` if no members were added,
    /// `ValueError::InvalidPeriod` if the period is not positive and
    /// finite, or `ValueError::InvalidDutyCycle` if the duty cycle is
    /// outside `[0, 1]`.
    pub fn build(self) -> Result<Flipflop> {
        if self.switches.is_empty() {
            return Err(ValueError::NoSwitches.into());
        }
        let period = Period::from_secs(self.period_secs)?;
        let duty_cycle = match self.duty_cycle {
            Some(fraction) => DutyCycle::new(fraction)?,
            None => DutyCycle::default(),
        };
        Flipflop::new(self.switches, period, duty_cycle)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{Error, TaskError, ValueError};
    use crate::switch::VirtualSwitch;

    use super::*;

    fn duty_flipflop(
        n: usize,
        period_ms: u64,
        duty: f64,
    ) -> (Vec<Arc<VirtualSwitch>>, Flipflop) {
        let switches: Vec<Arc<VirtualSwitch>> = (0..n)
            .map(|i| Arc::new(VirtualSwitch::new(format!("s{i}"))))
            .collect();
        let members: Vec<SharedSwitch> = switches
            .iter()
            .map(|s| s.clone() as SharedSwitch)
            .collect();
        let flipflop = Flipflop::new(
            members,
            Period::from_millis(period_ms).unwrap(),
            DutyCycle::new(duty).unwrap(),
        )
        .unwrap();
        (switches, flipflop)
    }

    fn test_flipflop(n: usize, period_ms: u64) -> (Vec<Arc<VirtualSwitch>>, Flipflop) {
        duty_flipflop(n, period_ms, 0.5)
    }

    fn on_states(switches: &[Arc<VirtualSwitch>]) -> Vec<bool> {
        switches.iter().map(|s| s.is_on()).collect()
    }

    #[test]
    fn empty_member_list_is_rejected() {
        let err = Flipflop::new(
            Vec::new(),
            Period::from_secs(1.0).unwrap(),
            DutyCycle::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::NoSwitches)));
    }

    #[test]
    fn builder_validates() {
        assert!(matches!(
            Flipflop::builder().period_secs(1.0).build().unwrap_err(),
            Error::Value(ValueError::NoSwitches)
        ));

        let sw: SharedSwitch = Arc::new(VirtualSwitch::new("s"));
        assert!(matches!(
            Flipflop::builder().switch(sw).build().unwrap_err(),
            Error::Value(ValueError::InvalidPeriod(_))
        ));
    }

    #[tokio::test]
    async fn double_start_and_double_stop() {
        let (_switches, flipflop) = test_flipflop(2, 200);

        flipflop.start().unwrap();
        assert!(matches!(
            flipflop.start().unwrap_err(),
            Error::Task(TaskError::AlreadyRunning)
        ));

        flipflop.stop().await.unwrap();
        assert!(matches!(
            flipflop.stop().await.unwrap_err(),
            Error::Task(TaskError::NotRunning)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rotates_one_member_at_a_time() {
        let (switches, flipflop) = test_flipflop(3, 300);

        flipflop.start().unwrap();
        // OFF phase first
        assert_eq!(on_states(&switches), vec![false, false, false]);

        // ON tick at 150ms activates the first member only
        sleep(Duration::from_millis(160)).await;
        assert_eq!(on_states(&switches), vec![true, false, false]);

        // OFF tick at 300ms: everything dark between activations
        sleep(Duration::from_millis(150)).await;
        assert_eq!(on_states(&switches), vec![false, false, false]);

        // Next ON tick advances the rotation by exactly one
        sleep(Duration::from_millis(150)).await;
        assert_eq!(on_states(&switches), vec![false, true, false]);

        // And wraps around after the last member
        sleep(Duration::from_millis(300)).await;
        assert_eq!(on_states(&switches), vec![false, false, true]);
        sleep(Duration::from_millis(300)).await;
        assert_eq!(on_states(&switches), vec![true, false, false]);

        flipflop.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn never_more_than_one_member_on() {
        let (switches, flipflop) = test_flipflop(4, 100);

        flipflop.start().unwrap();
        for _ in 0..20 {
            sleep(Duration::from_millis(20)).await;
            let on_count = on_states(&switches).iter().filter(|&&s| s).count();
            assert!(on_count <= 1, "more than one member on");
        }
        flipflop.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duty_never_activates_a_member() {
        let (switches, flipflop) = duty_flipflop(3, 100, 0.0);

        flipflop.start().unwrap();
        for _ in 0..6 {
            sleep(Duration::from_millis(80)).await;
            assert_eq!(on_states(&switches), vec![false, false, false]);
        }
        flipflop.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn full_duty_hands_over_between_members() {
        let (switches, flipflop) = duty_flipflop(3, 300, 1.0);

        flipflop.start().unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(on_states(&switches), vec![true, false, false]);

        // Each period boundary moves the single active member along
        sleep(Duration::from_millis(300)).await;
        assert_eq!(on_states(&switches), vec![false, true, false]);
        sleep(Duration::from_millis(300)).await;
        assert_eq!(on_states(&switches), vec![false, false, true]);
        sleep(Duration::from_millis(300)).await;
        assert_eq!(on_states(&switches), vec![true, false, false]);

        flipflop.stop().await.unwrap();
        assert_eq!(on_states(&switches), vec![false, false, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn full_duty_keeps_exactly_one_member_on() {
        let (switches, flipflop) = duty_flipflop(3, 100, 1.0);

        flipflop.start().unwrap();
        sleep(Duration::from_millis(10)).await;
        for _ in 0..20 {
            sleep(Duration::from_millis(20)).await;
            let on_count = on_states(&switches).iter().filter(|&&s| s).count();
            assert_eq!(on_count, 1, "exactly one member on at full duty");
        }
        flipflop.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_turns_every_member_off() {
        let (switches, flipflop) = test_flipflop(3, 300);

        flipflop.start().unwrap();
        sleep(Duration::from_millis(160)).await;
        assert!(switches[0].is_on());

        flipflop.stop().await.unwrap();
        assert!(!flipflop.is_running());
        assert_eq!(on_states(&switches), vec![false, false, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_stop_is_draining_is_rejected() {
        use async_trait::async_trait;
        use tokio::sync::Notify;

        use crate::switch::Switch;

        /// turn_on parks until released, pinning the loop mid-actuation.
        struct GatedSwitch {
            gate: Notify,
        }

        #[async_trait]
        impl Switch for GatedSwitch {
            async fn turn_on(&self) -> Result<()> {
                self.gate.notified().await;
                Ok(())
            }

            async fn turn_off(&self) -> Result<()> {
                Ok(())
            }

            async fn get_state(&self) -> Result<bool> {
                Ok(false)
            }

            fn name(&self) -> &str {
                "gated"
            }
        }

        let gated = Arc::new(GatedSwitch {
            gate: Notify::new(),
        });
        let flipflop = Arc::new(
            Flipflop::new(
                vec![gated.clone() as SharedSwitch],
                Period::from_millis(200).unwrap(),
                DutyCycle::default(),
            )
            .unwrap(),
        );

        flipflop.start().unwrap();
        // ON tick at 100ms parks the loop inside turn_on
        sleep(Duration::from_millis(110)).await;

        let stopper = {
            let flipflop = flipflop.clone();
            tokio::spawn(async move { flipflop.stop().await })
        };
        tokio::task::yield_now().await;

        // The stop is still draining the loop; a restart must not slip in
        assert!(matches!(
            flipflop.start().unwrap_err(),
            Error::Task(TaskError::AlreadyRunning)
        ));

        gated.gate.notify_one();
        stopper.await.unwrap().unwrap();
        assert!(!flipflop.is_running());

        // Fully stopped: restart is allowed again
        flipflop.start().unwrap();
        flipflop.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_begins_a_fresh_rotation() {
        let (switches, flipflop) = test_flipflop(3, 300);

        flipflop.start().unwrap();
        sleep(Duration::from_millis(460)).await;
        flipflop.stop().await.unwrap();

        flipflop.start().unwrap();
        sleep(Duration::from_millis(160)).await;
        // Fresh loop starts over at the first member
        assert_eq!(on_states(&switches), vec![true, false, false]);
        flipflop.stop().await.unwrap();
    }
}
