// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fields protected from the next status refresh.

use crate::types::{OUTLET_COUNT, OutletIndex};

/// A mutable field that a user command can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingField {
    /// On/off value of an outlet.
    OutletPower(OutletIndex),
    /// A reboot of an outlet was requested.
    OutletReboot(OutletIndex),
}

impl PendingField {
    const fn bit(self) -> u8 {
        match self {
            Self::OutletPower(outlet) => 1 << outlet.slot(),
            Self::OutletReboot(outlet) => 1 << (OUTLET_COUNT + outlet.slot()),
        }
    }
}

/// Set of fields touched by commands since the last reconciliation.
///
/// While a bit is set, a status refresh must not overwrite the field. The
/// whole mask is cleared at the end of every reconciliation, so a device
/// report may lag a command by at most one refresh.
///
/// A reboot bit also protects the outlet's on/off value: while the outlet
/// is power-cycling the device may report it off, and that transient value
/// is not merged. See [`protects_outlet`](Self::protects_outlet).
///
/// ```
/// use ups_bridge::state::{PendingField, PendingMask};
/// use ups_bridge::types::OutletIndex;
///
/// let outlet = OutletIndex::new(2).unwrap();
/// let mut mask = PendingMask::default();
/// mask.insert(PendingField::OutletReboot(outlet));
///
/// assert!(mask.protects_outlet(outlet));
/// assert!(!mask.contains(PendingField::OutletPower(outlet)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PendingMask(u8);

impl PendingMask {
    /// Marks a field as pending.
    pub fn insert(&mut self, field: PendingField) {
        self.0 |= field.bit();
    }

    /// Returns `true` if the field is pending.
    #[must_use]
    pub const fn contains(&self, field: PendingField) -> bool {
        self.0 & field.bit() != 0
    }

    /// Returns `true` if the outlet's on/off value must be left alone,
    /// either because it was switched or because a reboot was requested.
    #[must_use]
    pub const fn protects_outlet(&self, outlet: OutletIndex) -> bool {
        self.contains(PendingField::OutletPower(outlet))
            || self.contains(PendingField::OutletReboot(outlet))
    }

    /// Returns `true` if no field is pending.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(n: u8) -> OutletIndex {
        OutletIndex::new(n).unwrap()
    }

    #[test]
    fn bits_are_independent_per_outlet_and_kind() {
        let mut mask = PendingMask::default();
        mask.insert(PendingField::OutletPower(outlet(1)));

        assert!(mask.contains(PendingField::OutletPower(outlet(1))));
        assert!(!mask.contains(PendingField::OutletReboot(outlet(1))));
        assert!(!mask.contains(PendingField::OutletPower(outlet(2))));
        assert!(!mask.protects_outlet(outlet(3)));
    }

    #[test]
    fn reboot_bit_of_outlet_three_does_not_leak() {
        let mut mask = PendingMask::default();
        mask.insert(PendingField::OutletReboot(outlet(3)));

        assert!(mask.protects_outlet(outlet(3)));
        assert!(!mask.protects_outlet(outlet(1)));
        assert!(!mask.protects_outlet(outlet(2)));
    }

    #[test]
    fn reboot_bit_alone_protects_power_value() {
        let mut mask = PendingMask::default();
        mask.insert(PendingField::OutletReboot(outlet(2)));

        assert!(!mask.contains(PendingField::OutletPower(outlet(2))));
        assert!(mask.protects_outlet(outlet(2)));
    }

    #[test]
    fn clear_empties_mask() {
        let mut mask = PendingMask::default();
        assert!(mask.is_empty());
        for index in OutletIndex::all() {
            mask.insert(PendingField::OutletPower(index));
            mask.insert(PendingField::OutletReboot(index));
        }
        assert!(!mask.is_empty());
        mask.clear();
        assert!(mask.is_empty());
    }
}
