//! Auto-refresh timer.
//!
//! [`RefreshScheduler`] owns at most one recurring tokio task. `arm` always
//! aborts the previous task before spawning a new one, and `disarm` (or
//! dropping the scheduler) aborts it, so intervals can never pile up.
//!
//! The tick callback is invoked on each period *after* the first full
//! interval, never immediately. It should read whatever live state it needs
//! (e.g. the active category) at call time rather than capturing it at arm
//! time.
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Default)]
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
    period: Option<Duration>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any armed timer with one firing every `period`.
    ///
    /// A zero period leaves the scheduler disarmed. Must be called from
    /// within a tokio runtime.
    pub fn arm<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.disarm();

        if period.is_zero() {
            tracing::debug!("Auto-refresh disabled");
            return;
        }

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // A stalled runtime should not produce a burst of catch-up refreshes
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        tracing::info!(period_ms = period.as_millis() as u64, "Auto-refresh armed");
        self.handle = Some(handle);
        self.period = Some(period);
    }

    /// Cancels the armed timer, if any. Idempotent.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Auto-refresh disarmed");
        }
        self.period = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Period of the armed timer.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
