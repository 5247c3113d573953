// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge event types.

use crate::types::OutletIndex;

/// Events emitted by the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// A status refresh was merged into the device state.
    Refreshed {
        /// Whether any value changed.
        changed: bool,
    },

    /// A status refresh failed; the device state was left untouched.
    RefreshFailed {
        /// Description of the failure.
        reason: String,
    },

    /// An outlet command was applied optimistically.
    OutletChanged {
        /// The outlet.
        outlet: OutletIndex,
        /// The new on/off value.
        on: bool,
    },

    /// A reboot finished; the reboot switch must read off again.
    RebootFinished {
        /// The rebooted outlet.
        outlet: OutletIndex,
        /// Whether the device accepted the reboot.
        ok: bool,
    },
}

impl BridgeEvent {
    /// Returns the outlet this event concerns, if any.
    #[must_use]
    pub fn outlet(&self) -> Option<OutletIndex> {
        match self {
            Self::OutletChanged { outlet, .. } | Self::RebootFinished { outlet, .. } => {
                Some(*outlet)
            }
            Self::Refreshed { .. } | Self::RefreshFailed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlet_is_reported_for_outlet_events_only() {
        let two = OutletIndex::new(2).unwrap();
        assert_eq!(
            BridgeEvent::OutletChanged { outlet: two, on: true }.outlet(),
            Some(two)
        );
        assert_eq!(BridgeEvent::Refreshed { changed: false }.outlet(), None);
    }
}
