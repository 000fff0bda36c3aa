//! Round timers.
//!
//! A round runs two schedules off one deadline: a terminal expiry and a
//! periodic tick reporting whole seconds left. The remaining time is always
//! derived from the deadline, never from a decremented counter.
//!
//! Timers run as tokio tasks and are cancelled by dropping their handle.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::domain::entities::seconds_until;

/// Handle to a scheduled task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancel the task before it fires again.
    pub fn cancel(self) {}
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `f` once after `delay`.
pub fn schedule_once<F>(delay: Duration, f: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        time::sleep(delay).await;
        f();
    });
    TimerHandle { task }
}

/// Deadline and tick schedule of one round.
#[derive(Debug)]
pub struct RoundTimer {
    handle: TimerHandle,
}

impl RoundTimer {
    /// Start the schedule.
    ///
    /// `on_tick` receives the seconds remaining every `tick_period` and may
    /// return `false` to stop ticking. `on_expire` runs once at `deadline`.
    /// When a tick and the expiry fall on the same instant, only the expiry
    /// runs.
    pub fn start<T, E>(deadline: Instant, tick_period: Duration, mut on_tick: T, on_expire: E) -> Self
    where
        T: FnMut(u64) -> bool + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + tick_period, tick_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let expiry = time::sleep_until(deadline);
            tokio::pin!(expiry);

            let mut on_expire = Some(on_expire);
            let mut ticking = true;

            loop {
                tokio::select! {
                    biased;

                    _ = &mut expiry => {
                        if let Some(expire) = on_expire.take() {
                            expire();
                        }
                        break;
                    }

                    _ = ticker.tick(), if ticking => {
                        let remaining = seconds_until(deadline, Instant::now());
                        ticking = on_tick(remaining);
                    }
                }
            }
        });

        Self {
            handle: TimerHandle { task },
        }
    }

    /// Stop both the tick and the expiry.
    pub fn cancel(self) {
        self.handle.cancel();
    }
}
