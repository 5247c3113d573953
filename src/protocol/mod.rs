// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clients that talk to the UPS.
//!
//! The engine only depends on the [`DeviceClient`] trait: one call that
//! returns the raw status payload and one call that carries an outlet
//! command. Each call is a single request/response exchange that may fail
//! or hang; the engine bounds it with the configured timeout.
//!
//! # Clients
//!
//! - [`ScriptClient`]: runs the vendor status script and reads its stdout
//! - [`HttpClient`]: calls a management gateway that fronts the same script

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "script")]
mod script;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpClientBuilder};
#[cfg(feature = "script")]
pub use script::ScriptClient;

use async_trait::async_trait;

use crate::command::OutletCommand;
use crate::config::Credentials;
use crate::error::{ParseError, ProtocolError};

/// Raw status output returned by the device.
#[derive(Debug, Clone)]
pub struct StatusPayload {
    /// The raw JSON body.
    body: String,
}

impl StatusPayload {
    /// Wraps a raw status body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body as a specific type.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Empty` for a blank body and `ParseError::Json`
    /// if the JSON cannot be parsed into the target type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, ParseError> {
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        serde_json::from_str(trimmed).map_err(Into::into)
    }
}

/// Request/response access to one UPS.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Queries the full status of the UPS at `address`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the device cannot be reached.
    async fn query_status(&self, address: &str) -> Result<StatusPayload, ProtocolError>;

    /// Sends an outlet command to the UPS at `address`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the device cannot be reached or rejects
    /// the command.
    async fn send_command(
        &self,
        address: &str,
        command: OutletCommand,
        credentials: &Credentials,
    ) -> Result<(), ProtocolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_payload_is_empty_error() {
        let payload = StatusPayload::new("  \n");
        let result: Result<serde_json::Value, _> = payload.parse();
        assert!(matches!(result, Err(ParseError::Empty)));
    }

    #[test]
    fn payload_is_trimmed_before_parsing() {
        let payload = StatusPayload::new("\n{\"upsstatus\":\"On Line\"}\n");
        let value: serde_json::Value = payload.parse().unwrap();
        assert_eq!(value["upsstatus"], "On Line");
    }
}
