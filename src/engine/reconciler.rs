// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status refresh.

use std::sync::Arc;

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::event::{BridgeEvent, EventBus};
use crate::protocol::DeviceClient;
use crate::response::StatusReport;
use crate::state::StateStore;

use super::bounded;

/// Pulls the device status and merges it into the state store.
///
/// A failed refresh leaves the state exactly as it was; stale values are
/// preferred over zeroed ones. Retrying is left to the poll timer.
pub struct Reconciler {
    client: Arc<dyn DeviceClient>,
    config: Arc<DeviceConfig>,
    store: Arc<StateStore>,
    events: EventBus,
}

impl Reconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(
        client: Arc<dyn DeviceClient>,
        config: Arc<DeviceConfig>,
        store: Arc<StateStore>,
        events: EventBus,
    ) -> Self {
        Self {
            client,
            config,
            store,
            events,
        }
    }

    /// Queries the device once and reconciles the result.
    ///
    /// # Errors
    ///
    /// - `DeviceError::Unreachable` if the status call fails or times out
    /// - `DeviceError::MalformedResponse` if the payload does not match the
    ///   status schema
    /// - `DeviceError::UnexpectedStatus` if the operating mode is unknown
    pub async fn refresh(&self) -> Result<()> {
        match self.fetch().await {
            Ok(report) => {
                let changed = self.store.reconcile(&report);
                tracing::debug!(
                    address = self.config.address(),
                    changed,
                    mode = ?report.mode,
                    battery = %report.battery_level,
                    "Status refreshed"
                );
                self.events.publish(BridgeEvent::Refreshed { changed });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    address = self.config.address(),
                    error = %err,
                    "Status refresh failed, keeping last known state"
                );
                self.events.publish(BridgeEvent::RefreshFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn fetch(&self) -> Result<StatusReport> {
        let payload = bounded(
            self.config.command_timeout(),
            self.client.query_status(self.config.address()),
        )
        .await
        .map_err(DeviceError::Unreachable)?;

        StatusReport::from_payload(&payload)
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("address", &self.config.address())
            .finish_non_exhaustive()
    }
}
