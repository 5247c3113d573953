// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management.
//!
//! [`DeviceState`] is the last known state of the UPS. [`StateStore`] owns
//! it behind a single lock and enforces the reconciliation rule: a status
//! refresh skips every field in the [`PendingMask`], then clears the mask.
//!
//! # Examples
//!
//! ```
//! use ups_bridge::config::DeviceConfig;
//! use ups_bridge::state::{PendingField, StateStore};
//! use ups_bridge::types::OutletIndex;
//!
//! let store = StateStore::new(&DeviceConfig::new("192.168.1.20"));
//! let outlet = OutletIndex::new(1).unwrap();
//!
//! store.apply_optimistic(PendingField::OutletPower(outlet), false);
//!
//! let state = store.read();
//! assert!(!state.outlet(outlet).on());
//! assert!(state.pending().contains(PendingField::OutletPower(outlet)));
//! ```

mod device_state;
mod pending;
mod store;

pub use device_state::{DeviceState, OutletState};
pub use pending::{PendingField, PendingMask};
pub use store::{RebootStart, StateStore};
