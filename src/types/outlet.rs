// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet addressing and outlet state values.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Number of switched outputs on the UPS.
pub const OUTLET_COUNT: usize = 3;

/// Index of a switched output, from 1 to [`OUTLET_COUNT`].
///
/// # Examples
///
/// ```
/// use ups_bridge::types::OutletIndex;
///
/// let idx = OutletIndex::new(2).unwrap();
/// assert_eq!(idx.value(), 2);
/// assert_eq!(idx.slot(), 1);
///
/// assert!(OutletIndex::new(0).is_err());
/// assert!(OutletIndex::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutletIndex(u8);

impl OutletIndex {
    /// Highest valid outlet number.
    #[allow(clippy::cast_possible_truncation)]
    pub const MAX: u8 = OUTLET_COUNT as u8;

    /// Creates a new outlet index.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `index` is 0 or above [`Self::MAX`].
    pub fn new(index: u8) -> Result<Self, ValueError> {
        if index == 0 || index > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: u16::from(Self::MAX),
                actual: u16::from(index),
            });
        }
        Ok(Self(index))
    }

    /// Returns the 1-based outlet number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the 0-based position in per-outlet arrays.
    #[must_use]
    pub const fn slot(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Iterates over every outlet in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::MAX).map(Self)
    }
}

impl fmt::Display for OutletIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for OutletIndex {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// On/off value of an output as the status script reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutletSwitch {
    /// Output is powered.
    On,
    /// Output is switched off.
    Off,
}

impl OutletSwitch {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Returns `true` for [`OutletSwitch::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for OutletSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutletSwitch {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(ValueError::InvalidOutletState(s.to_string())),
        }
    }
}

impl From<bool> for OutletSwitch {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlet_index_bounds() {
        assert!(OutletIndex::new(0).is_err());
        assert!(OutletIndex::new(1).is_ok());
        assert!(OutletIndex::new(3).is_ok());
        assert_eq!(
            OutletIndex::new(4),
            Err(ValueError::OutOfRange {
                min: 1,
                max: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn all_yields_every_outlet_in_order() {
        let values: Vec<u8> = OutletIndex::all().map(|i| i.value()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn switch_parses_only_unambiguous_values() {
        assert_eq!("on".parse::<OutletSwitch>(), Ok(OutletSwitch::On));
        assert_eq!("OFF".parse::<OutletSwitch>(), Ok(OutletSwitch::Off));
        assert!("".parse::<OutletSwitch>().is_err());
        assert!("rebooting".parse::<OutletSwitch>().is_err());
        assert!("1".parse::<OutletSwitch>().is_err());
    }

    #[test]
    fn switch_from_bool() {
        assert_eq!(OutletSwitch::from(true), OutletSwitch::On);
        assert!(!OutletSwitch::from(false).is_on());
    }
}
