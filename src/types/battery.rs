// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery charge level.

use std::fmt;

use crate::error::ValueError;

/// Battery charge as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use ups_bridge::types::BatteryLevel;
///
/// let level = BatteryLevel::new(15).unwrap();
/// assert!(level.is_below(20));
/// assert!(!BatteryLevel::FULL.is_below(20));
///
/// assert!(BatteryLevel::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    /// Empty battery.
    pub const EMPTY: Self = Self(0);

    /// Fully charged battery.
    pub const FULL: Self = Self(100);

    /// Creates a new battery level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` if the level is strictly below `threshold` percent.
    #[must_use]
    pub const fn is_below(&self, threshold: u8) -> bool {
        self.0 < threshold
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
