// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use crate::config::DeviceConfig;
use crate::types::{BatteryLevel, OUTLET_COUNT, OutletIndex};

use super::PendingMask;

/// Last known state of one switched output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletState {
    pub(crate) on: bool,
    pub(crate) in_use: bool,
    locked: bool,
    reboot_enabled: bool,
    pub(crate) reboot_in_flight: bool,
}

impl OutletState {
    /// Returns `true` if the outlet is powered.
    #[must_use]
    pub fn on(&self) -> bool {
        self.on
    }

    /// Returns `true` if the outlet is in use.
    ///
    /// There is no per-outlet load sensing, so this mirrors [`Self::on`].
    #[must_use]
    pub fn in_use(&self) -> bool {
        self.in_use
    }

    /// Returns `true` if on/off commands are blocked by configuration.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Returns `true` if reboot commands are allowed by configuration.
    #[must_use]
    pub fn reboot_enabled(&self) -> bool {
        self.reboot_enabled
    }

    /// Returns `true` while a reboot of this outlet is in progress.
    #[must_use]
    pub fn reboot_in_flight(&self) -> bool {
        self.reboot_in_flight
    }

    pub(crate) fn set_on(&mut self, on: bool) {
        self.on = on;
        self.in_use = on;
    }
}

/// Last known state of the UPS.
///
/// Before the first successful refresh the state holds conservative
/// defaults: on mains, full battery, every outlet on.
///
/// # Examples
///
/// ```
/// use ups_bridge::config::DeviceConfig;
/// use ups_bridge::state::DeviceState;
/// use ups_bridge::types::OutletIndex;
///
/// let state = DeviceState::initial(&DeviceConfig::new("192.168.1.20"));
/// assert!(state.mains_ok());
/// assert!(!state.low_battery());
/// assert!(state.outlet(OutletIndex::new(1).unwrap()).on());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub(crate) mains_ok: bool,
    pub(crate) battery_level: BatteryLevel,
    pub(crate) charging: bool,
    pub(crate) low_battery: bool,
    pub(crate) load_watts: f64,
    pub(crate) runtime_minutes: f64,
    pub(crate) outlets: [OutletState; OUTLET_COUNT],
    pub(crate) pending: PendingMask,
}

impl DeviceState {
    /// Creates the startup state for a configured UPS.
    #[must_use]
    pub fn initial(config: &DeviceConfig) -> Self {
        let mut outlets = [OutletState {
            on: true,
            in_use: true,
            locked: false,
            reboot_enabled: false,
            reboot_in_flight: false,
        }; OUTLET_COUNT];
        for index in OutletIndex::all() {
            let outlet = &mut outlets[index.slot()];
            outlet.locked = config.outlet(index).locked();
            outlet.reboot_enabled = config.outlet(index).reboot_enabled();
        }

        let battery_level = BatteryLevel::FULL;
        Self {
            mains_ok: true,
            battery_level,
            charging: false,
            low_battery: battery_level.is_below(config.low_battery_threshold()),
            load_watts: 0.0,
            runtime_minutes: 0.0,
            outlets,
            pending: PendingMask::default(),
        }
    }

    /// Returns `true` when the UPS is on primary power.
    #[must_use]
    pub fn mains_ok(&self) -> bool {
        self.mains_ok
    }

    /// Returns the battery charge.
    #[must_use]
    pub fn battery_level(&self) -> BatteryLevel {
        self.battery_level
    }

    /// Returns `true` if the battery is charging or fully charged.
    #[must_use]
    pub fn charging(&self) -> bool {
        self.charging
    }

    /// Returns `true` if the battery level is below the configured threshold.
    #[must_use]
    pub fn low_battery(&self) -> bool {
        self.low_battery
    }

    /// Returns the load in Watts.
    #[must_use]
    pub fn load_watts(&self) -> f64 {
        self.load_watts
    }

    /// Returns the estimated runtime in minutes.
    #[must_use]
    pub fn runtime_minutes(&self) -> f64 {
        self.runtime_minutes
    }

    /// Returns the state of one outlet.
    #[must_use]
    pub fn outlet(&self, index: OutletIndex) -> &OutletState {
        &self.outlets[index.slot()]
    }

    /// Returns all outlets in order.
    #[must_use]
    pub fn outlets(&self) -> &[OutletState; OUTLET_COUNT] {
        &self.outlets
    }

    /// Returns the fields awaiting reconciliation.
    #[must_use]
    pub fn pending(&self) -> PendingMask {
        self.pending
    }

    pub(crate) fn outlet_mut(&mut self, index: OutletIndex) -> &mut OutletState {
        &mut self.outlets[index.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_copies_static_outlet_flags() {
        let two = OutletIndex::new(2).unwrap();
        let config = DeviceConfig::new("ups")
            .with_outlet_locked(two, true)
            .with_outlet_reboot(two, true);
        let state = DeviceState::initial(&config);

        let outlet = state.outlet(two);
        assert!(outlet.locked());
        assert!(outlet.reboot_enabled());
        assert!(!outlet.reboot_in_flight());
        assert!(outlet.on());
        assert!(outlet.in_use());

        let first = state.outlet(OutletIndex::new(1).unwrap());
        assert!(!first.locked());
        assert!(!first.reboot_enabled());
    }

    #[test]
    fn initial_state_has_nothing_pending() {
        let state = DeviceState::initial(&DeviceConfig::new("ups"));
        assert!(state.pending().is_empty());
        assert!(state.mains_ok());
        assert_eq!(state.battery_level(), BatteryLevel::FULL);
    }

    #[test]
    fn set_on_mirrors_in_use() {
        let mut state = DeviceState::initial(&DeviceConfig::new("ups"));
        let one = OutletIndex::new(1).unwrap();
        state.outlet_mut(one).set_on(false);
        assert!(!state.outlet(one).on());
        assert!(!state.outlet(one).in_use());
    }
}
