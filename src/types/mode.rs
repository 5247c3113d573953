// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode and battery condition as reported by the status script.
//!
//! The script reports human-readable strings ("On Line", "On Battery",
//! "Charging"). Matching ignores case and treats `-` and `_` as spaces, so
//! "on-line" and "On Line" are the same mode.

use std::fmt;

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Top-level power source of the UPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    /// Running from mains power.
    OnLine,
    /// Running from the battery.
    OnBattery,
}

impl OperatingMode {
    /// Recognizes one of the two operating modes.
    ///
    /// Returns `None` for anything else (self test, calibration, unknown).
    ///
    /// ```
    /// use ups_bridge::types::OperatingMode;
    ///
    /// assert_eq!(OperatingMode::parse("On Line"), Some(OperatingMode::OnLine));
    /// assert_eq!(OperatingMode::parse("on-battery"), Some(OperatingMode::OnBattery));
    /// assert_eq!(OperatingMode::parse("Self Test"), None);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "on line" => Some(Self::OnLine),
            "on battery" => Some(Self::OnBattery),
            _ => None,
        }
    }

    /// Returns `true` when the UPS is on primary power.
    #[must_use]
    pub const fn mains_ok(&self) -> bool {
        matches!(self, Self::OnLine)
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnLine => f.write_str("On Line"),
            Self::OnBattery => f.write_str("On Battery"),
        }
    }
}

/// Battery condition string reported alongside the charge level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatteryCondition {
    /// The battery is being charged.
    Charging,
    /// The battery is fully charged.
    Charged,
    /// Any other condition ("Discharging", "Not Charging", ...).
    Other(String),
}

impl BatteryCondition {
    /// Classifies a raw condition string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "charging" => Self::Charging,
            "charged" => Self::Charged,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Whether this condition is reported as charging.
    ///
    /// A fully charged battery counts as charging.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self, Self::Charging | Self::Charged)
    }
}
