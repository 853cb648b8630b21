// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic two-state toggler for a single switch.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::error::{Result, TaskError, ValueError};
use crate::switch::SharedSwitch;
use crate::types::{DutyCycle, Period};

use super::{LoopHandle, Phase};

/// Periodic ON/OFF toggler for one switch.
///
/// On each period the switch spends `period × duty_cycle` in the ON phase
/// and the remainder in the OFF phase. The cycle starts in the OFF phase,
/// so the switch stays dark for `off_duration` before its first ON - this
/// avoids an instantaneous on-flash at start.
///
/// A phase of zero length performs no actuation: a duty cycle of `0.0`
/// never turns the switch on, `1.0` never turns it off mid-run.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use switchcraft::switch::VirtualSwitch;
/// use switchcraft::task::Blink;
///
/// # #[tokio::main]
/// # async fn main() -> switchcraft::Result<()> {
/// let blink = Blink::builder()
///     .switch(Arc::new(VirtualSwitch::new("lamp")))
///     .period_secs(2.0)
///     .duty_cycle(0.25)
///     .build()?;
///
/// blink.start()?;
/// // ... later: waits for the loop to exit, then forces the switch off
/// blink.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct Blink {
    switch: SharedSwitch,
    period: Period,
    duty_cycle: DutyCycle,
    running: AtomicBool,
    handle: Mutex<Option<LoopHandle>>,
}

impl Blink {
    /// Creates a new blink task from already-validated values.
    #[must_use]
    pub fn new(switch: SharedSwitch, period: Period, duty_cycle: DutyCycle) -> Self {
        Self {
            switch,
            period,
            duty_cycle,
            running: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    /// Returns a builder that validates raw inputs.
    #[must_use]
    pub fn builder() -> BlinkBuilder {
        BlinkBuilder::new()
    }

    /// Starts the toggling loop. Non-blocking.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyRunning` if the loop is already running.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.handle.lock();
        // The slot is emptied at the start of stop(), but `running` stays
        // set until the loop has been joined and the switch forced off, so
        // a start racing a stop cannot spawn a second loop.
        if slot.is_some() || self.running.load(Ordering::SeqCst) {
            return Err(TaskError::AlreadyRunning.into());
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let switch = Arc::clone(&self.switch);
        let on = self.duty_cycle.on_duration(self.period);
        let off = self.duty_cycle.off_duration(self.period);

        let join = tokio::spawn(run_loop(switch, on, off, stop_rx));
        *slot = Some(LoopHandle { stop_tx, join });
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stops the toggling loop and forces the switch off.
    ///
    /// Signals the loop, waits until it has observably exited, then calls
    /// `turn_off()` on the switch. Only after this returns is the switch
    /// guaranteed off. The task can be started again afterwards.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotRunning` if the loop is not running, or the
    /// error from the final `turn_off()`.
    pub async fn stop(&self) -> Result<()> {
        let handle = self
            .handle
            .lock()
            .take()
            .ok_or(TaskError::NotRunning)?;

        handle.shutdown().await;

        let result = self.switch.turn_off().await;
        self.running.store(false, Ordering::SeqCst);
        result
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

    /// Returns the governed switch.
    #[must_use]
    pub fn switch(&self) -> &SharedSwitch {
        &self.switch
    }
}

impl fmt::Debug for Blink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blink")
            .field("switch", &self.switch.name())
            .field("period", &self.period)
            .field("duty_cycle", &self.duty_cycle)
            .field("running", &self.is_running())
            .finish()
    }
}

/// The toggling loop, racing the stop signal against the phase timer.
async fn run_loop(
    switch: SharedSwitch,
    on: Duration,
    off: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    tracing::debug!(switch = %switch.name(), "blink loop started");

    let mut phase = Phase::Off;
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
                // Zero-length phase: degenerate duty cycle, skip the pulse
                if entering.is_zero() {
                    continue;
                }

                let result = match phase {
                    Phase::On => switch.turn_on().await,
                    Phase::Off => switch.turn_off().await,
                };
                if let Err(e) = result {
                    // Skip this transition; the next wake-up stays on schedule
                    tracing::warn!(switch = %switch.name(), error = %e, "toggle failed");
                }
            }
        }
    }

    tracing::debug!(switch = %switch.name(), "blink loop stopped");
}

/// Builder for [`Blink`], validating raw inputs at `build()`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchcraft::switch::VirtualSwitch;
/// use switchcraft::task::Blink;
///
/// // Missing switch is rejected
/// assert!(Blink::builder().period_secs(1.0).build().is_err());
///
/// // Duty cycle defaults to 0.5 when not set
/// let blink = Blink::builder()
///     .switch(Arc::new(VirtualSwitch::new("lamp")))
///     .period_secs(1.0)
///     .build()
///     .unwrap();
/// assert_eq!(blink.duty_cycle().as_fraction(), 0.5);
/// ```
#[derive(Default)]
pub struct BlinkBuilder {
    switch: Option<SharedSwitch>,
    period_secs: f64,
    duty_cycle: Option<f64>,
}

impl BlinkBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the governed switch.
    #[must_use]
    pub fn switch(mut self, switch: SharedSwitch) -> Self {
        self.switch = Some(switch);
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
    /// Returns `ValueError::SwitchRequired` if no switch was set,
    /// `ValueError::InvalidPeriod` if the period is not positive and
    /// finite, or `ValueError::InvalidDutyCycle` if the duty cycle is
    /// outside `[0, 1]`.
    pub fn build(self) -> Result<Blink> {
        let switch = self.switch.ok_or(ValueError::SwitchRequired)?;
        let period = Period::from_secs(self.period_secs)?;
        let duty_cycle = match self.duty_cycle {
            Some(fraction) => DutyCycle::new(fraction)?,
            None => DutyCycle::default(),
        };
        Ok(Blink::new(switch, period, duty_cycle))
    }
}
