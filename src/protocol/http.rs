// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for a UPS management gateway.
//!
//! The gateway exposes the status script over HTTP:
//!
//! - `GET /status?ip=<address>` returns the status JSON
//! - `GET /command?ip=<address>&outputN=<kind>&user=<user>&pass=<token>`
//!   runs an outlet command; any 2xx answer means success

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::command::OutletCommand;
use crate::config::Credentials;
use crate::error::ProtocolError;
use crate::protocol::{DeviceClient, StatusPayload};

/// HTTP client talking to a management gateway.
///
/// # Examples
///
/// ```no_run
/// use ups_bridge::protocol::{DeviceClient, HttpClient};
///
/// # async fn example() -> Result<(), ups_bridge::error::ProtocolError> {
/// let client = HttpClient::new("gateway.local:8080")?;
/// let status = client.query_status("192.168.1.20").await?;
/// println!("{}", status.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the gateway at `host`.
    ///
    /// `host` may carry a scheme; plain `http://` is assumed otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpClientBuilder::new().host(host).build()
    }

    /// Returns the gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn status_url(&self, address: &str) -> String {
        format!(
            "{}/status?ip={}",
            self.base_url,
            urlencoding::encode(address)
        )
    }

    fn command_url(
        &self,
        address: &str,
        command: OutletCommand,
        credentials: &Credentials,
    ) -> Result<String, ProtocolError> {
        let token = credentials.encoded_password()?;
        Ok(format!(
            "{}/command?ip={}&{}={}&user={}&pass={}",
            self.base_url,
            urlencoding::encode(address),
            command.key(),
            command.kind(),
            urlencoding::encode(credentials.username()),
            token
        ))
    }

    async fn get(&self, url: &str) -> Result<String, ProtocolError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response.text().await.map_err(ProtocolError::Http)
    }
}

#[async_trait]
impl DeviceClient for HttpClient {
    async fn query_status(&self, address: &str) -> Result<StatusPayload, ProtocolError> {
        let url = self.status_url(address);
        tracing::debug!(url = %url, "Requesting UPS status");

        let body = self.get(&url).await?;
        tracing::debug!(body = %body, "Received UPS status");
        Ok(StatusPayload::new(body))
    }

    async fn send_command(
        &self,
        address: &str,
        command: OutletCommand,
        credentials: &Credentials,
    ) -> Result<(), ProtocolError> {
        let url = self.command_url(address, command, credentials)?;
        // The URL carries the credential token; log the command only.
        tracing::debug!(address, command = %command, "Sending outlet command");

        self.get(&url).await.map(drop)
    }
}

/// Builder for an [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    host: Option<String>,
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gateway host, optionally with scheme and port.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` if no host was set, or
    /// `ProtocolError::Http` if the HTTP client cannot be created.
    pub fn build(self) -> Result<HttpClient, ProtocolError> {
        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ProtocolError::InvalidAddress("gateway host is required".to_string()))?;

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", host.trim_end_matches('/'))
        };

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(HttpClient::DEFAULT_TIMEOUT))
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient { base_url, client })
    }
}
