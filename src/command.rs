// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet control commands sent to the UPS.
//!
//! A command addresses one switched output and asks for it to be turned on,
//! turned off, or power-cycled. On the wire it is a single `outputN=<kind>`
//! argument.
//!
//! ```
//! use ups_bridge::command::{CommandKind, OutletCommand};
//! use ups_bridge::types::OutletIndex;
//!
//! let cmd = OutletCommand::new(OutletIndex::new(2).unwrap(), CommandKind::Reboot);
//! assert_eq!(cmd.key(), "output2");
//! assert_eq!(cmd.argument(), "output2=reboot");
//! ```

use std::fmt;

use crate::types::OutletIndex;

/// What to do with an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Switch the outlet on.
    On,
    /// Switch the outlet off.
    Off,
    /// Power-cycle the outlet.
    Reboot,
}

impl CommandKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Reboot => "reboot",
        }
    }
}

impl From<bool> for CommandKind {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command addressed to one outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutletCommand {
    outlet: OutletIndex,
    kind: CommandKind,
}

impl OutletCommand {
    /// Creates a command for `outlet`.
    #[must_use]
    pub const fn new(outlet: OutletIndex, kind: CommandKind) -> Self {
        Self { outlet, kind }
    }

    /// Creates an on/off command.
    #[must_use]
    pub fn switch(outlet: OutletIndex, on: bool) -> Self {
        Self::new(outlet, CommandKind::from(on))
    }

    /// Creates a reboot command.
    #[must_use]
    pub const fn reboot(outlet: OutletIndex) -> Self {
        Self::new(outlet, CommandKind::Reboot)
    }

    /// Returns the targeted outlet.
    #[must_use]
    pub const fn outlet(&self) -> OutletIndex {
        self.outlet
    }

    /// Returns the command kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Returns the parameter name, e.g. `output1`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("output{}", self.outlet)
    }

    /// Returns the `key=value` argument, e.g. `output1=on`.
    #[must_use]
    pub fn argument(&self) -> String {
        format!("{}={}", self.key(), self.kind)
    }
}

impl fmt::Display for OutletCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argument())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_maps_bool_to_kind() {
        let outlet = OutletIndex::new(1).unwrap();
        assert_eq!(OutletCommand::switch(outlet, true).argument(), "output1=on");
        assert_eq!(OutletCommand::switch(outlet, false).argument(), "output1=off");
    }

    #[test]
    fn reboot_argument() {
        let cmd = OutletCommand::reboot(OutletIndex::new(3).unwrap());
        assert_eq!(cmd.kind(), CommandKind::Reboot);
        assert_eq!(cmd.to_string(), "output3=reboot");
    }
}
