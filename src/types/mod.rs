// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for UPS status and outlet control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time.
//!
//! # Types
//!
//! - [`OutletIndex`] - Switched output number (1-3)
//! - [`OutletSwitch`] - On/off value of an output
//! - [`BatteryLevel`] - Battery charge (0-100%)
//! - [`OperatingMode`] - On line or on battery
//! - [`BatteryCondition`] - Charging, charged or anything else

mod battery;
mod mode;
mod outlet;

pub use battery::BatteryLevel;
pub use mode::{BatteryCondition, OperatingMode};
pub use outlet::{OUTLET_COUNT, OutletIndex, OutletSwitch};
