// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the UPS bridge.
//!
//! [`DeviceError`] is what the engine reports: refresh failures and command
//! failures. The remaining enums describe the underlying cause and are
//! attached as error sources.

use thiserror::Error;

use crate::types::OutletIndex;

/// Errors reported by the refresh loop and by outlet commands.
///
/// Refresh errors (`Unreachable`, `MalformedResponse`, `UnexpectedStatus`)
/// never reach a command caller; they are logged and leave the device state
/// untouched. Command errors (`Locked`, `CommandFailed`) carry the
/// best-known value of the outlet so the caller can report it.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device could not be reached (transport or process failure).
    #[error("device unreachable: {0}")]
    Unreachable(#[source] ProtocolError),

    /// The device answered with something that is not a status payload.
    #[error("malformed status response: {0}")]
    MalformedResponse(#[source] ParseError),

    /// The status payload parsed, but reports an unknown operating mode.
    #[error("unexpected UPS status: {0:?}")]
    UnexpectedStatus(String),

    /// The command is blocked by static configuration.
    #[error("outlet {outlet} is locked")]
    Locked {
        /// The outlet the command targeted.
        outlet: OutletIndex,
        /// The outlet value as currently known.
        current: bool,
    },

    /// The device call carrying the command failed.
    #[error("command for outlet {outlet} failed: {source}")]
    CommandFailed {
        /// The outlet the command targeted.
        outlet: OutletIndex,
        /// The outlet value as currently known (possibly optimistic).
        current: bool,
        /// The transport failure.
        #[source]
        source: ProtocolError,
    },
}

impl DeviceError {
    /// Returns the best-known outlet value attached to a command error.
    ///
    /// Returns `None` for refresh errors, which carry no value.
    #[must_use]
    pub fn current_value(&self) -> Option<bool> {
        match self {
            Self::Locked { current, .. } | Self::CommandFailed { current, .. } => Some(*current),
            _ => None,
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid outlet state string was provided.
    #[error("invalid outlet state: {0}")]
    InvalidOutletState(String),

    /// A credential character cannot be expressed as two hex digits.
    #[error("character {0:?} cannot be encoded as a two-digit token")]
    UnencodableCharacter(char),

    /// An encoded credential token is not two hex digits.
    #[error("invalid credential token: {0:?}")]
    InvalidToken(String),
}

/// Errors related to communication with the device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device script could not be spawned or its output read.
    #[error("process error: {0}")]
    Io(#[from] std::io::Error),

    /// The device script exited unsuccessfully.
    #[error("script exited with {code:?}: {stderr}")]
    ScriptFailed {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The credential could not be encoded for the device.
    #[error("credential error: {0}")]
    Credential(#[from] ValueError),
}

/// Errors related to parsing status payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload was empty.
    #[error("empty response")]
    Empty,

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors raised while loading or validating a [`DeviceConfig`](crate::config::DeviceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON or has wrongly typed keys.
    #[error("cannot parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 1,
            max: 3,
            actual: 4,
        };
        assert_eq!(err.to_string(), "value 4 is out of range [1, 3]");
    }

    #[test]
    fn locked_error_carries_current_value() {
        let err = DeviceError::Locked {
            outlet: OutletIndex::new(2).unwrap(),
            current: true,
        };
        assert_eq!(err.to_string(), "outlet 2 is locked");
        assert_eq!(err.current_value(), Some(true));
    }

    #[test]
    fn refresh_errors_have_no_current_value() {
        let err = DeviceError::UnexpectedStatus("Self Test".to_string());
        assert_eq!(err.current_value(), None);
        assert_eq!(err.to_string(), "unexpected UPS status: \"Self Test\"");
    }

    #[test]
    fn command_failed_exposes_source() {
        use std::error::Error as _;

        let err = DeviceError::CommandFailed {
            outlet: OutletIndex::new(1).unwrap(),
            current: false,
            source: ProtocolError::Timeout(10_000),
        };
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("request timed out after 10000 ms".to_string())
        );
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::InvalidValue {
            field: "batterylevel".to_string(),
            message: "150 is not a percentage".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse batterylevel: 150 is not a percentage"
        );
    }
}
