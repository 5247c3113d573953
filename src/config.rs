// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static configuration of a managed UPS.
//!
//! A [`DeviceConfig`] is built once at startup and never mutated. It can be
//! assembled with builder methods or read from the host's JSON accessory
//! block, which uses flat camel-case keys:
//!
//! ```
//! use std::time::Duration;
//! use ups_bridge::config::DeviceConfig;
//! use ups_bridge::types::OutletIndex;
//!
//! let config = DeviceConfig::from_json_str(r#"{
//!     "name": "Rack UPS",
//!     "upsIpAddress": "192.168.1.20",
//!     "pollTimer": 15,
//!     "outlet2Name": "NAS",
//!     "outlet2Locked": 1
//! }"#).unwrap();
//!
//! assert_eq!(config.poll_interval(), Duration::from_secs(15));
//! let nas = config.outlet(OutletIndex::new(2).unwrap());
//! assert_eq!(nas.name(), "NAS");
//! assert!(nas.locked());
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::codec::encode_credential;
use crate::error::{ConfigError, ValueError};
use crate::types::{OUTLET_COUNT, OutletIndex};

/// Username/password pair for the UPS management card.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Default management card username and password.
    pub const DEFAULT: &'static str = "apc";

    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password encoded as a device command token.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnencodableCharacter` if the password contains a
    /// character above `U+00FF`.
    pub fn encoded_password(&self) -> Result<String, ValueError> {
        encode_credential(&self.password)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(Self::DEFAULT, Self::DEFAULT)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Static per-outlet settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletConfig {
    name: String,
    locked: bool,
    reboot_enabled: bool,
}

impl OutletConfig {
    fn numbered(number: usize) -> Self {
        Self {
            name: format!("Outlet {number}"),
            locked: false,
            reboot_enabled: false,
        }
    }

    /// Display name of the outlet.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether on/off commands are blocked.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Whether reboot commands are allowed.
    #[must_use]
    pub fn reboot_enabled(&self) -> bool {
        self.reboot_enabled
    }
}

/// Configuration for one UPS.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    name: String,
    model: String,
    serial_number: Option<String>,
    address: String,
    credentials: Credentials,
    outlets: [OutletConfig; OUTLET_COUNT],
    poll_interval: Duration,
    low_battery_threshold: u8,
    command_timeout: Duration,
}

impl DeviceConfig {
    /// Default display name.
    pub const DEFAULT_NAME: &'static str = "APC UPS";
    /// Default model string.
    pub const DEFAULT_MODEL: &'static str = "APC UPS Type";
    /// Default poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
    /// Default low battery threshold, in percent.
    pub const DEFAULT_LOW_BATTERY: u8 = 20;
    /// Default bound on a single device call.
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with defaults for the UPS at `address`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            serial_number: None,
            address: address.into(),
            credentials: Credentials::default(),
            outlets: std::array::from_fn(|slot| OutletConfig::numbered(slot + 1)),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            low_battery_threshold: Self::DEFAULT_LOW_BATTERY,
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Parses the host's JSON accessory block.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` for malformed JSON and
    /// `ConfigError::Invalid` when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        raw.into_config()
    }

    /// Converts an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`DeviceConfig::from_json_str`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_value(value)?;
        raw.into_config()
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise see
    /// [`DeviceConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the model string.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the serial number.
    #[must_use]
    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    /// Sets the management card credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Sets the display name of an outlet.
    #[must_use]
    pub fn with_outlet_name(mut self, index: OutletIndex, name: impl Into<String>) -> Self {
        self.outlets[index.slot()].name = name.into();
        self
    }

    /// Blocks or allows on/off commands for an outlet.
    #[must_use]
    pub fn with_outlet_locked(mut self, index: OutletIndex, locked: bool) -> Self {
        self.outlets[index.slot()].locked = locked;
        self
    }

    /// Allows or blocks reboot commands for an outlet.
    #[must_use]
    pub fn with_outlet_reboot(mut self, index: OutletIndex, enabled: bool) -> Self {
        self.outlets[index.slot()].reboot_enabled = enabled;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the low battery threshold, in percent.
    #[must_use]
    pub fn with_low_battery_threshold(mut self, percent: u8) -> Self {
        self.low_battery_threshold = percent;
        self
    }

    /// Sets the bound on a single device call.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Invalid("UPS address is empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll interval must be positive".to_string()));
        }
        if self.command_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "command timeout must be positive".to_string(),
            ));
        }
        if self.low_battery_threshold > 100 {
            return Err(ConfigError::Invalid(format!(
                "low battery threshold {} exceeds 100",
                self.low_battery_threshold
            )));
        }
        Ok(())
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the model string.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the serial number, if configured.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    /// Returns the network address of the UPS.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the management card credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the settings of one outlet.
    #[must_use]
    pub fn outlet(&self, index: OutletIndex) -> &OutletConfig {
        &self.outlets[index.slot()]
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the low battery threshold, in percent.
    #[must_use]
    pub fn low_battery_threshold(&self) -> u8 {
        self.low_battery_threshold
    }

    /// Returns the bound on a single device call.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

/// Boolean settings are written either as `true`/`false` or as `0`/`1`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Number(n) => n != 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    name: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    ups_ip_address: Option<String>,
    poll_timer: Option<u64>,
    low_battery: Option<u8>,
    command_timeout: Option<u64>,
    apc_username: Option<String>,
    apc_password: Option<String>,
    outlet1_name: Option<String>,
    outlet2_name: Option<String>,
    outlet3_name: Option<String>,
    outlet1_locked: Option<Flag>,
    outlet2_locked: Option<Flag>,
    outlet3_locked: Option<Flag>,
    outlet1_reboot_enabled: Option<Flag>,
    outlet2_reboot_enabled: Option<Flag>,
    outlet3_reboot_enabled: Option<Flag>,
}

impl RawConfig {
    fn into_config(self) -> Result<DeviceConfig, ConfigError> {
        let address = self
            .ups_ip_address
            .ok_or_else(|| ConfigError::Invalid("upsIpAddress is required".to_string()))?;

        let mut config = DeviceConfig::new(address);
        if let Some(name) = self.name {
            config = config.with_name(name);
        }
        if let Some(model) = self.model {
            config = config.with_model(model);
        }
        config.serial_number = self.serial_number;
        if let Some(secs) = self.poll_timer {
            config = config.with_poll_interval(Duration::from_secs(secs));
        }
        if let Some(percent) = self.low_battery {
            config = config.with_low_battery_threshold(percent);
        }
        if let Some(secs) = self.command_timeout {
            config = config.with_command_timeout(Duration::from_secs(secs));
        }
        config.credentials = Credentials::new(
            self.apc_username
                .unwrap_or_else(|| Credentials::DEFAULT.to_string()),
            self.apc_password
                .unwrap_or_else(|| Credentials::DEFAULT.to_string()),
        );

        let names = [self.outlet1_name, self.outlet2_name, self.outlet3_name];
        let locked = [self.outlet1_locked, self.outlet2_locked, self.outlet3_locked];
        let reboot = [
            self.outlet1_reboot_enabled,
            self.outlet2_reboot_enabled,
            self.outlet3_reboot_enabled,
        ];
        for (((outlet, name), locked), reboot) in
            config.outlets.iter_mut().zip(names).zip(locked).zip(reboot)
        {
            if let Some(name) = name {
                outlet.name = name;
            }
            outlet.locked = locked.is_some_and(Flag::is_set);
            outlet.reboot_enabled = reboot.is_some_and(Flag::is_set);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(n: u8) -> OutletIndex {
        OutletIndex::new(n).unwrap()
    }

    #[test]
    fn defaults_match_plugin_defaults() {
        let config = DeviceConfig::from_json_str(r#"{"upsIpAddress":"10.0.0.5"}"#).unwrap();
        assert_eq!(config.name(), "APC UPS");
        assert_eq!(config.model(), "APC UPS Type");
        assert_eq!(config.address(), "10.0.0.5");
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.low_battery_threshold(), 20);
        assert_eq!(config.command_timeout(), Duration::from_secs(10));
        assert_eq!(config.credentials().username(), "apc");
        assert_eq!(config.credentials().encoded_password().unwrap(), "61-70-63");
        assert_eq!(config.outlet(outlet(3)).name(), "Outlet 3");
        assert!(!config.outlet(outlet(1)).locked());
        assert!(!config.outlet(outlet(1)).reboot_enabled());
    }

    #[test]
    fn flags_accept_numbers_and_booleans() {
        let config = DeviceConfig::from_json_str(
            r#"{
                "upsIpAddress": "10.0.0.5",
                "outlet1Locked": 1,
                "outlet2Locked": false,
                "outlet3Locked": true,
                "outlet2RebootEnabled": 1
            }"#,
        )
        .unwrap();
        assert!(config.outlet(outlet(1)).locked());
        assert!(!config.outlet(outlet(2)).locked());
        assert!(config.outlet(outlet(3)).locked());
        assert!(config.outlet(outlet(2)).reboot_enabled());
        assert!(!config.outlet(outlet(3)).reboot_enabled());
    }

    #[test]
    fn missing_address_is_rejected() {
        let err = DeviceConfig::from_json_str(r#"{"name":"UPS"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn wrongly_typed_value_is_a_json_error() {
        let err =
            DeviceConfig::from_json_str(r#"{"upsIpAddress":"x","pollTimer":"soon"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        assert!(DeviceConfig::new(" ").validate().is_err());
        assert!(
            DeviceConfig::new("ups")
                .with_poll_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            DeviceConfig::new("ups")
                .with_command_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            DeviceConfig::new("ups")
                .with_low_battery_threshold(101)
                .validate()
                .is_err()
        );
        assert!(DeviceConfig::new("ups").validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = DeviceConfig::new("ups").with_credentials("admin", "hunter2");
        let debug = format!("{config:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn builder_sets_outlet_flags() {
        let config = DeviceConfig::new("ups")
            .with_outlet_name(outlet(1), "Router")
            .with_outlet_locked(outlet(1), true)
            .with_outlet_reboot(outlet(1), true);
        let router = config.outlet(outlet(1));
        assert_eq!(router.name(), "Router");
        assert!(router.locked());
        assert!(router.reboot_enabled());
    }
}
