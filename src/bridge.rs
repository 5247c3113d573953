// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing bridge for one UPS.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::config::DeviceConfig;
use crate::engine::{CommandExecutor, PollScheduler, Reconciler};
use crate::error::{ConfigError, Result};
use crate::event::{BridgeEvent, EventBus};
use crate::protocol::DeviceClient;
use crate::state::{DeviceState, StateStore};
use crate::types::{BatteryLevel, OutletIndex};

/// A managed UPS: its state, its poll loop and its outlet commands.
///
/// Reads never touch the device; they return the last reconciled or
/// optimistic value. Writes return the resulting value, or an error that
/// carries the best-known one.
///
/// # Examples
///
/// ```no_run
/// use ups_bridge::{DeviceConfig, OutletIndex, UpsBridge};
/// use ups_bridge::protocol::ScriptClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DeviceConfig::from_path("ups.json")?;
/// let bridge = UpsBridge::new(config, ScriptClient::new("/opt/ups/apc-status.sh"))?;
/// bridge.start().await;
///
/// println!("battery: {}", bridge.battery_level());
/// bridge.set_outlet(OutletIndex::new(2)?, false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UpsBridge {
    config: Arc<DeviceConfig>,
    store: Arc<StateStore>,
    events: EventBus,
    scheduler: Arc<PollScheduler>,
    executor: CommandExecutor,
}

impl UpsBridge {
    /// Creates a bridge talking to the device through `client`.
    ///
    /// Construction does not arm the poll timer, so no runtime is needed
    /// here. Polling begins with [`start`](Self::start); outlet commands
    /// issued before that are sent but do not schedule a poll.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the configuration is invalid.
    pub fn new(
        config: DeviceConfig,
        client: impl DeviceClient + 'static,
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_client(config, Arc::new(client))
    }

    /// Creates a bridge from a shared client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the configuration is invalid.
    pub fn with_client(
        config: DeviceConfig,
        client: Arc<dyn DeviceClient>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        let store = Arc::new(StateStore::new(&config));
        let events = EventBus::new();

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&client),
            Arc::clone(&config),
            Arc::clone(&store),
            events.clone(),
        ));
        let scheduler = Arc::new(PollScheduler::new(reconciler, config.poll_interval()));
        let executor = CommandExecutor::new(
            client,
            Arc::clone(&config),
            Arc::clone(&store),
            events.clone(),
            Arc::clone(&scheduler),
        );

        tracing::debug!(
            name = config.name(),
            address = config.address(),
            interval = ?config.poll_interval(),
            "UPS bridge created"
        );

        Ok(Self {
            config,
            store,
            events,
            scheduler,
            executor,
        })
    }

    /// Runs the initial refresh and starts polling.
    ///
    /// This is where the poll timer is first armed.
    ///
    /// A failed initial refresh is logged and published like any other; the
    /// poll loop starts regardless. Must be called from within a Tokio
    /// runtime.
    pub async fn start(&self) {
        tracing::info!(name = self.config.name(), address = self.config.address(), "Starting UPS bridge");
        self.scheduler.start();
        let _ = self.scheduler.refresh_now().await;
    }

    /// Refreshes the state now and pushes the next poll out one interval.
    ///
    /// A call made while another refresh runs waits for it, then queries
    /// the device itself.
    ///
    /// # Errors
    ///
    /// Returns the refresh error: `Unreachable`, `MalformedResponse` or
    /// `UnexpectedStatus`. The state is unchanged in every error case.
    pub async fn refresh(&self) -> Result<()> {
        self.scheduler.refresh_now().await
    }

    /// Stops polling. Outlet commands keep working.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Returns `true` while a poll is scheduled.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns a snapshot of the whole device state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.store.read()
    }

    /// Returns a receiver that sees every new state snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DeviceState> {
        self.store.subscribe()
    }

    /// Returns a receiver for bridge events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Whether the UPS runs on mains power.
    #[must_use]
    pub fn mains_ok(&self) -> bool {
        self.store.read().mains_ok()
    }

    /// Battery charge.
    #[must_use]
    pub fn battery_level(&self) -> BatteryLevel {
        self.store.read().battery_level()
    }

    /// Whether the battery is charging (or charged).
    #[must_use]
    pub fn charging(&self) -> bool {
        self.store.read().charging()
    }

    /// Whether the charge is below the configured threshold.
    #[must_use]
    pub fn low_battery(&self) -> bool {
        self.store.read().low_battery()
    }

    /// Output load in watts.
    #[must_use]
    pub fn load_watts(&self) -> f64 {
        self.store.read().load_watts()
    }

    /// Estimated runtime on battery, in minutes.
    #[must_use]
    pub fn runtime_minutes(&self) -> f64 {
        self.store.read().runtime_minutes()
    }

    /// Whether an outlet is on.
    #[must_use]
    pub fn outlet_on(&self, outlet: OutletIndex) -> bool {
        self.store.read().outlet(outlet).on()
    }

    /// Whether an outlet is in use.
    #[must_use]
    pub fn outlet_in_use(&self, outlet: OutletIndex) -> bool {
        self.store.read().outlet(outlet).in_use()
    }

    /// The reboot switch value of an outlet: active only while a reboot is
    /// in flight.
    #[must_use]
    pub fn outlet_reboot_state(&self, outlet: OutletIndex) -> bool {
        self.executor.outlet_reboot_state(outlet)
    }

    /// Switches an outlet on or off. See [`CommandExecutor::set_outlet`].
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Locked` or `DeviceError::CommandFailed`; both
    /// carry the outlet's current value.
    pub async fn set_outlet(&self, outlet: OutletIndex, on: bool) -> Result<bool> {
        self.executor.set_outlet(outlet, on).await
    }

    /// Writes the reboot switch of an outlet.
    ///
    /// Activating it starts a reboot; deactivating it sends nothing.
    /// Returns the switch value to report.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Locked` if reboots are disabled for the outlet.
    pub fn set_outlet_reboot(&self, outlet: OutletIndex, active: bool) -> Result<bool> {
        if active {
            self.executor.reboot_outlet(outlet)
        } else {
            Ok(self.executor.release_reboot(outlet))
        }
    }

    /// Starts a reboot of an outlet. See [`CommandExecutor::reboot_outlet`].
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Locked` if reboots are disabled for the outlet.
    pub fn reboot_outlet(&self, outlet: OutletIndex) -> Result<bool> {
        self.executor.reboot_outlet(outlet)
    }
}

impl Drop for UpsBridge {
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}
