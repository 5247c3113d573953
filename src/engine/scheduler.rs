// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable poll timer.
//!
//! The scheduler is either idle or armed with exactly one one-shot timer.
//! Arming aborts the previous timer task and bumps a generation counter; a
//! timer that wakes up with an old generation does nothing, so a reset can
//! never be followed by a stale fire. When the timer fires it detaches
//! itself (idle), runs one refresh and re-arms, whatever the outcome.
//!
//! Refreshes never overlap. A timer fire that finds a refresh running is
//! dropped; an explicit refresh waits for the running one and then runs
//! its own, so its caller always gets the outcome of a real device query.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::error::Result;

use super::Reconciler;

#[derive(Debug, Default)]
struct Timer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
    running: bool,
}

/// Drives periodic refreshes.
///
/// Nothing is armed until [`start`](Self::start). After
/// [`shutdown`](Self::shutdown) no timer is armed again.
#[derive(Debug)]
pub struct PollScheduler {
    reconciler: Arc<Reconciler>,
    interval: Duration,
    timer: Mutex<Timer>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl PollScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler>, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
            timer: Mutex::new(Timer::default()),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Enables polling and arms the timer.
    pub fn start(self: &Arc<Self>) {
        self.timer.lock().running = true;
        self.reset_timer();
    }

    /// Cancels the armed timer, if any, and arms a new one for a full
    /// interval. Does nothing before `start` or after `shutdown`.
    pub fn reset_timer(self: &Arc<Self>) {
        let mut timer = self.timer.lock();
        if !timer.running {
            return;
        }
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        timer.generation = timer.generation.wrapping_add(1);
        let generation = timer.generation;

        let weak = Arc::downgrade(self);
        let interval = self.interval;
        timer.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(scheduler) = weak.upgrade() {
                scheduler.on_fire(generation).await;
            }
        }));
        tracing::trace!(generation, ?interval, "Poll timer armed");
    }

    /// Returns `true` while a timer is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.timer
            .lock()
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs a refresh now and re-arms the timer afterwards.
    ///
    /// If a refresh is already running, waits for it to finish and then
    /// queries the device again.
    ///
    /// # Errors
    ///
    /// Returns the refresh error; the timer is re-armed regardless.
    pub async fn refresh_now(self: &Arc<Self>) -> Result<()> {
        let guard = self.refresh_lock.lock().await;
        self.refresh_locked(guard).await
    }

    async fn refresh_locked(
        self: &Arc<Self>,
        guard: tokio::sync::MutexGuard<'_, ()>,
    ) -> Result<()> {
        let result = self.reconciler.refresh().await;
        drop(guard);
        self.reset_timer();
        result
    }

    /// Disarms the timer for good.
    ///
    /// A refresh that is already running completes but does not re-arm.
    pub fn shutdown(&self) {
        let mut timer = self.timer.lock();
        timer.running = false;
        if let Some(handle) = timer.handle.take() {
            handle.abort();
            tracing::debug!("Poll timer stopped");
        }
    }

    async fn on_fire(self: Arc<Self>, generation: u64) {
        {
            let mut timer = self.timer.lock();
            if !timer.running || timer.generation != generation {
                return;
            }
            // Detach so a reset during the refresh cannot abort it.
            timer.handle = None;
        }
        let Ok(guard) = self.refresh_lock.try_lock() else {
            // The running refresh re-arms the timer when it completes.
            tracing::debug!("Refresh already running, skipping timer fire");
            return;
        };
        // Refresh errors are already logged and published.
        let _ = self.refresh_locked(guard).await;
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::command::OutletCommand;
    use crate::config::{Credentials, DeviceConfig};
    use crate::error::ProtocolError;
    use crate::event::EventBus;
    use crate::protocol::{DeviceClient, StatusPayload};
    use crate::state::StateStore;

    const STATUS: &str = r#"{"upsstatus":"On Line","batterylevel":90,"batterystatus":"Charged",
        "load":100,"runtime":40,"output1":"on","output2":"on","output3":"on"}"#;

    #[derive(Default)]
    struct CountingClient {
        queries: AtomicUsize,
    }

    #[async_trait]
    impl DeviceClient for CountingClient {
        async fn query_status(
            &self,
            _address: &str,
        ) -> std::result::Result<StatusPayload, ProtocolError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(StatusPayload::new(STATUS))
        }

        async fn send_command(
            &self,
            _address: &str,
            _command: OutletCommand,
            _credentials: &Credentials,
        ) -> std::result::Result<(), ProtocolError> {
            Ok(())
        }
    }

    fn scheduler(client: &Arc<CountingClient>) -> Arc<PollScheduler> {
        let config = Arc::new(DeviceConfig::new("ups"));
        let store = Arc::new(StateStore::new(&config));
        let reconciler = Reconciler::new(
            Arc::clone(client) as Arc<dyn DeviceClient>,
            config,
            store,
            EventBus::new(),
        );
        Arc::new(PollScheduler::new(
            Arc::new(reconciler),
            Duration::from_secs(30),
        ))
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(secs: u64) {
        // Freshly spawned timers read the clock on their first poll.
        settle().await;
        tokio::time::advance(Duration::from_secs(secs)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn idle_until_started() {
        let client = Arc::new(CountingClient::default());
        let scheduler = scheduler(&client);
        scheduler.reset_timer();
        assert!(!scheduler.is_armed());

        advance(60).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_every_interval() {
        let client = Arc::new(CountingClient::default());
        let scheduler = scheduler(&client);
        scheduler.start();
        assert!(scheduler.is_armed());

        advance(29).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 0);
        advance(1).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 1);
        advance(30).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 2);
        assert!(scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_pushes_the_next_poll_out() {
        let client = Arc::new(CountingClient::default());
        let scheduler = scheduler(&client);
        scheduler.start();

        advance(20).await;
        scheduler.reset_timer();
        advance(20).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 0);
        advance(10).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_prevents_further_polls() {
        let client = Arc::new(CountingClient::default());
        let scheduler = scheduler(&client);
        scheduler.start();
        scheduler.shutdown();
        assert!(!scheduler.is_armed());

        scheduler.reset_timer();
        advance(120).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_now_rearms() {
        let client = Arc::new(CountingClient::default());
        let scheduler = scheduler(&client);
        scheduler.start();

        advance(25).await;
        scheduler.refresh_now().await.unwrap();
        assert_eq!(client.queries.load(Ordering::SeqCst), 1);

        advance(25).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 1);
        advance(5).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fire_during_refresh_is_dropped() {
        let client = Arc::new(CountingClient::default());
        let scheduler = scheduler(&client);
        scheduler.start();
        settle().await;

        let held = scheduler.refresh_lock.lock().await;
        advance(30).await;
        assert_eq!(client.queries.load(Ordering::SeqCst), 0);
        drop(held);

        scheduler.refresh_now().await.unwrap();
        assert_eq!(client.queries.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_armed());
    }
}
