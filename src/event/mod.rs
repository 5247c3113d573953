// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notifications from the bridge to the host.
//!
//! The host framework learns about refreshes, outlet changes and finished
//! reboots through an [`EventBus`]. A finished reboot is the signal to force
//! the momentary reboot switch back to off.
//!
//! # Examples
//!
//! ```
//! use ups_bridge::event::{BridgeEvent, EventBus};
//! use ups_bridge::types::OutletIndex;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(BridgeEvent::RebootFinished {
//!     outlet: OutletIndex::new(1).unwrap(),
//!     ok: true,
//! });
//! assert!(rx.try_recv().is_ok());
//! ```

mod bridge_event;
mod event_bus;

pub use bridge_event::BridgeEvent;
pub use event_bus::EventBus;
