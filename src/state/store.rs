// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared, lock-guarded device state.

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::DeviceConfig;
use crate::response::StatusReport;
use crate::types::OutletIndex;

use super::{DeviceState, PendingField};

/// Outcome of [`StateStore::begin_reboot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootStart {
    /// The reboot was registered; the caller must issue it.
    Started,
    /// A reboot of this outlet is already running.
    AlreadyInFlight,
    /// Reboots are disabled for this outlet.
    Disabled,
}

/// Holder of the single [`DeviceState`] of a UPS.
///
/// Every read and write goes through one mutex that is only held for the
/// in-memory update, never across a device call. Each mutation publishes
/// the new snapshot on a watch channel.
#[derive(Debug)]
pub struct StateStore {
    state: Mutex<DeviceState>,
    low_battery_threshold: u8,
    state_tx: watch::Sender<DeviceState>,
}

impl StateStore {
    /// Creates a store holding the startup state for `config`.
    #[must_use]
    pub fn new(config: &DeviceConfig) -> Self {
        let state = DeviceState::initial(config);
        let (state_tx, _) = watch::channel(state.clone());
        Self {
            state: Mutex::new(state),
            low_battery_threshold: config.low_battery_threshold(),
            state_tx,
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn read(&self) -> DeviceState {
        self.state.lock().clone()
    }

    /// Subscribes to state snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.state_tx.subscribe()
    }

    /// Writes a command's intended value immediately and protects the field
    /// from the next refresh.
    ///
    /// Returns `true` if the value changed.
    pub fn apply_optimistic(&self, field: PendingField, value: bool) -> bool {
        self.mutate(|state| {
            state.pending.insert(field);
            match field {
                PendingField::OutletPower(outlet) => {
                    let slot = state.outlet_mut(outlet);
                    let changed = slot.on != value || slot.in_use != value;
                    slot.set_on(value);
                    changed
                }
                PendingField::OutletReboot(outlet) => {
                    let slot = state.outlet_mut(outlet);
                    let changed = slot.reboot_in_flight != value;
                    slot.reboot_in_flight = value;
                    changed
                }
            }
        })
    }

    /// Registers a reboot of `outlet` unless one is already running or
    /// reboots are disabled.
    ///
    /// The check and the registration happen under one lock, so two
    /// concurrent callers cannot both get [`RebootStart::Started`].
    pub fn begin_reboot(&self, outlet: OutletIndex) -> RebootStart {
        let mut start = RebootStart::Started;
        self.mutate(|state| {
            let slot = state.outlet(outlet);
            if slot.reboot_in_flight() {
                start = RebootStart::AlreadyInFlight;
                return false;
            }
            if !slot.reboot_enabled() {
                start = RebootStart::Disabled;
                return false;
            }
            state.pending.insert(PendingField::OutletReboot(outlet));
            state.outlet_mut(outlet).reboot_in_flight = true;
            true
        });
        start
    }

    /// Marks the reboot of `outlet` as finished.
    ///
    /// Only that outlet's flag is cleared. Returns `true` if a reboot was in
    /// flight.
    pub fn finish_reboot(&self, outlet: OutletIndex) -> bool {
        self.mutate(|state| {
            let slot = state.outlet_mut(outlet);
            let was = slot.reboot_in_flight;
            slot.reboot_in_flight = false;
            was
        })
    }

    /// Merges a fresh status report.
    ///
    /// Outlets with a pending bit keep their current value, and outlets the
    /// report left ambiguous keep theirs too. The pending mask is cleared
    /// afterwards. Returns `true` if any value changed.
    pub fn reconcile(&self, report: &StatusReport) -> bool {
        let threshold = self.low_battery_threshold;
        self.mutate(|state| {
            let before = state.clone();

            state.mains_ok = report.mode.mains_ok();
            state.battery_level = report.battery_level;
            state.low_battery = report.battery_level.is_below(threshold);
            state.charging = report.charging;
            state.load_watts = report.load_watts;
            state.runtime_minutes = report.runtime_minutes;

            for outlet in OutletIndex::all() {
                let Some(reported) = report.outlet(outlet) else {
                    continue;
                };
                if state.pending.protects_outlet(outlet) {
                    tracing::debug!(
                        outlet = %outlet,
                        reported = %reported,
                        "Outlet changed by a command, keeping local value until next refresh"
                    );
                    continue;
                }
                state.outlet_mut(outlet).set_on(reported.is_on());
            }

            state.pending.clear();
            *state != before
        })
    }

    fn mutate(&self, f: impl FnOnce(&mut DeviceState) -> bool) -> bool {
        let mut state = self.state.lock();
        let pending_before = state.pending;
        let changed = f(&mut state);
        if changed || state.pending != pending_before {
            self.state_tx.send_replace(state.clone());
        }
        changed
    }
}
