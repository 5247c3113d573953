// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet command execution.
//!
//! Two command families share one shape:
//!
//! - **Switch**: blocked by the outlet lock, otherwise applied to the state
//!   at once, then forwarded to the device. A failed device call leaves the
//!   optimistic value in place.
//! - **Reboot**: a momentary action. The caller gets an answer right away;
//!   the device call completes in the background and then clears the
//!   outlet's in-flight flag.

use std::sync::Arc;

use crate::command::OutletCommand;
use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::event::{BridgeEvent, EventBus};
use crate::protocol::DeviceClient;
use crate::state::{PendingField, RebootStart, StateStore};
use crate::types::OutletIndex;

use super::{PollScheduler, bounded};

/// Runs outlet commands against the device.
pub struct CommandExecutor {
    client: Arc<dyn DeviceClient>,
    config: Arc<DeviceConfig>,
    store: Arc<StateStore>,
    events: EventBus,
    scheduler: Arc<PollScheduler>,
}

impl CommandExecutor {
    /// Creates an executor.
    #[must_use]
    pub fn new(
        client: Arc<dyn DeviceClient>,
        config: Arc<DeviceConfig>,
        store: Arc<StateStore>,
        events: EventBus,
        scheduler: Arc<PollScheduler>,
    ) -> Self {
        Self {
            client,
            config,
            store,
            events,
            scheduler,
        }
    }

    /// Switches an outlet on or off.
    ///
    /// The new value is visible to readers before the device is contacted,
    /// and the next refresh will not overwrite it. Returns the new value.
    ///
    /// # Errors
    ///
    /// - `DeviceError::Locked` if the outlet is locked; nothing is sent and
    ///   the state is untouched
    /// - `DeviceError::CommandFailed` if the device call fails or times
    ///   out; the optimistic value stays in place
    pub async fn set_outlet(&self, outlet: OutletIndex, on: bool) -> Result<bool> {
        let current = self.store.read().outlet(outlet).on();
        if self.config.outlet(outlet).locked() {
            tracing::warn!(outlet = %outlet, requested = on, "Outlet is locked, command ignored");
            return Err(DeviceError::Locked { outlet, current });
        }

        tracing::info!(outlet = %outlet, on, "Switching outlet");
        self.store
            .apply_optimistic(PendingField::OutletPower(outlet), on);
        self.events.publish(BridgeEvent::OutletChanged { outlet, on });
        self.scheduler.reset_timer();

        let command = OutletCommand::switch(outlet, on);
        let sent = bounded(
            self.config.command_timeout(),
            self.client.send_command(
                self.config.address(),
                command,
                self.config.credentials(),
            ),
        )
        .await;

        match sent {
            Ok(()) => {
                tracing::debug!(command = %command, "Outlet command accepted");
                Ok(on)
            }
            Err(source) => {
                tracing::error!(command = %command, error = %source, "Outlet command failed");
                let current = self.store.read().outlet(outlet).on();
                Err(DeviceError::CommandFailed {
                    outlet,
                    current,
                    source,
                })
            }
        }
    }

    /// Starts a reboot of an outlet.
    ///
    /// Returns the reboot switch value to report: `true` if a reboot of this
    /// outlet was already running (no second device call is made), `false`
    /// once a new reboot has been handed to the device. The switch is set
    /// back to inactive when the device call completes, whatever its
    /// outcome, and a [`BridgeEvent::RebootFinished`] is published.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Locked` if reboots are disabled for the outlet.
    pub fn reboot_outlet(&self, outlet: OutletIndex) -> Result<bool> {
        match self.store.begin_reboot(outlet) {
            RebootStart::AlreadyInFlight => {
                tracing::debug!(outlet = %outlet, "Reboot already in flight");
                return Ok(true);
            }
            RebootStart::Disabled => {
                tracing::warn!(outlet = %outlet, "Reboot is disabled for outlet");
                return Err(DeviceError::Locked {
                    outlet,
                    current: false,
                });
            }
            RebootStart::Started => {}
        }

        tracing::info!(outlet = %outlet, "Rebooting outlet");
        self.scheduler.reset_timer();

        let client = Arc::clone(&self.client);
        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        tokio::spawn(async move {
            let command = OutletCommand::reboot(outlet);
            let result = bounded(
                config.command_timeout(),
                client.send_command(config.address(), command, config.credentials()),
            )
            .await;

            if let Err(err) = &result {
                tracing::error!(command = %command, error = %err, "Reboot command failed");
            } else {
                tracing::debug!(command = %command, "Reboot command accepted");
            }
            store.finish_reboot(outlet);
            events.publish(BridgeEvent::RebootFinished {
                outlet,
                ok: result.is_ok(),
            });
        });

        Ok(false)
    }

    /// Handles a request to turn the reboot switch off.
    ///
    /// The device owns reboot completion, so nothing is sent; the switch
    /// reads inactive.
    #[must_use]
    pub fn release_reboot(&self, outlet: OutletIndex) -> bool {
        tracing::debug!(
            address = self.config.address(),
            outlet = %outlet,
            "Reboot switch released, nothing to send"
        );
        false
    }

    /// Returns the reboot switch value: `true` only while a reboot of the
    /// outlet is in flight.
    #[must_use]
    pub fn outlet_reboot_state(&self, outlet: OutletIndex) -> bool {
        self.store.read().outlet(outlet).reboot_in_flight()
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("address", &self.config.address())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
