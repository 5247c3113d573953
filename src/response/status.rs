// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status response parsing.

use serde::Deserialize;

use crate::error::{DeviceError, ParseError};
use crate::protocol::StatusPayload;
use crate::types::{
    BatteryCondition, BatteryLevel, OUTLET_COUNT, OperatingMode, OutletIndex, OutletSwitch,
};

/// Status JSON as printed by the status script.
///
/// ```
/// use ups_bridge::response::StatusResponse;
/// use ups_bridge::types::{OperatingMode, OutletIndex, OutletSwitch};
///
/// let json = r#"{
///     "upsstatus": "On Line",
///     "batterylevel": 100,
///     "batterystatus": "Charged",
///     "load": 42.5,
///     "runtime": 61,
///     "output1": "on",
///     "output2": "off"
/// }"#;
/// let response: StatusResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(response.mode(), Some(OperatingMode::OnLine));
/// assert_eq!(response.outlet(OutletIndex::new(2).unwrap()), Some(OutletSwitch::Off));
/// assert_eq!(response.outlet(OutletIndex::new(3).unwrap()), None);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    upsstatus: String,
    batterylevel: f64,
    #[serde(default)]
    batterystatus: Option<String>,
    load: f64,
    runtime: f64,
    // Kept as raw values: an odd value only leaves that outlet untouched.
    #[serde(default)]
    output1: Option<serde_json::Value>,
    #[serde(default)]
    output2: Option<serde_json::Value>,
    #[serde(default)]
    output3: Option<serde_json::Value>,
}

impl StatusResponse {
    /// Returns the raw `upsstatus` string.
    #[must_use]
    pub fn raw_status(&self) -> &str {
        &self.upsstatus
    }

    /// Returns the operating mode, or `None` if it is not one of the two
    /// recognized modes.
    #[must_use]
    pub fn mode(&self) -> Option<OperatingMode> {
        OperatingMode::parse(&self.upsstatus)
    }

    /// Returns the battery charge.
    ///
    /// Fractional percentages are rounded.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the level is not within 0-100.
    pub fn battery_level(&self) -> Result<BatteryLevel, ParseError> {
        let raw = self.batterylevel;
        if !raw.is_finite() || !(0.0..=100.0).contains(&raw) {
            return Err(ParseError::InvalidValue {
                field: "batterylevel".to_string(),
                message: format!("{raw} is not a percentage"),
            });
        }
        // Range checked above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = raw.round() as u8;
        BatteryLevel::new(percent).map_err(|e| ParseError::InvalidValue {
            field: "batterylevel".to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the battery condition.
    ///
    /// A missing condition is treated as "not charging".
    #[must_use]
    pub fn battery_condition(&self) -> BatteryCondition {
        BatteryCondition::parse(self.batterystatus.as_deref().unwrap_or_default())
    }

    /// Returns the load in Watts.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the load is negative or not finite.
    pub fn load_watts(&self) -> Result<f64, ParseError> {
        non_negative("load", self.load)
    }

    /// Returns the estimated runtime in minutes.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the runtime is negative or not
    /// finite.
    pub fn runtime_minutes(&self) -> Result<f64, ParseError> {
        non_negative("runtime", self.runtime)
    }

    /// Returns the reported state of an outlet.
    ///
    /// Returns `None` when the outlet is missing or its value is neither
    /// `"on"` nor `"off"`.
    #[must_use]
    pub fn outlet(&self, index: OutletIndex) -> Option<OutletSwitch> {
        let raw = match index.value() {
            1 => self.output1.as_ref(),
            2 => self.output2.as_ref(),
            3 => self.output3.as_ref(),
            _ => None,
        }?;
        raw.as_str()?.parse().ok()
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64, ParseError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("{value} is not a non-negative number"),
        })
    }
}

/// Validated status of the UPS, ready to be merged into device state.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Power source.
    pub mode: OperatingMode,
    /// Battery charge.
    pub battery_level: BatteryLevel,
    /// Charging or fully charged.
    pub charging: bool,
    /// Load in Watts.
    pub load_watts: f64,
    /// Estimated runtime in minutes.
    pub runtime_minutes: f64,
    /// Reported outlet values; `None` leaves the outlet untouched.
    pub outlets: [Option<OutletSwitch>; OUTLET_COUNT],
}

impl StatusReport {
    /// Parses and validates a raw status payload.
    ///
    /// # Errors
    ///
    /// - `DeviceError::MalformedResponse` if the payload is not a status
    ///   document or a numeric field is out of range
    /// - `DeviceError::UnexpectedStatus` if `upsstatus` is not a recognized
    ///   operating mode
    pub fn from_payload(payload: &StatusPayload) -> Result<Self, DeviceError> {
        let response: StatusResponse = payload.parse().map_err(DeviceError::MalformedResponse)?;
        Self::from_response(&response)
    }

    /// Validates an already parsed response.
    ///
    /// # Errors
    ///
    /// See [`StatusReport::from_payload`].
    pub fn from_response(response: &StatusResponse) -> Result<Self, DeviceError> {
        let mode = response
            .mode()
            .ok_or_else(|| DeviceError::UnexpectedStatus(response.raw_status().to_string()))?;

        let mut outlets = [None; OUTLET_COUNT];
        for index in OutletIndex::all() {
            outlets[index.slot()] = response.outlet(index);
        }

        Ok(Self {
            mode,
            battery_level: response
                .battery_level()
                .map_err(DeviceError::MalformedResponse)?,
            charging: response.battery_condition().is_charging(),
            load_watts: response
                .load_watts()
                .map_err(DeviceError::MalformedResponse)?,
            runtime_minutes: response
                .runtime_minutes()
                .map_err(DeviceError::MalformedResponse)?,
            outlets,
        })
    }

    /// Returns the reported value of one outlet, if unambiguous.
    #[must_use]
    pub fn outlet(&self, index: OutletIndex) -> Option<OutletSwitch> {
        self.outlets[index.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> Result<StatusReport, DeviceError> {
        StatusReport::from_payload(&StatusPayload::new(json))
    }

    fn outlet(n: u8) -> OutletIndex {
        OutletIndex::new(n).unwrap()
    }

    #[test]
    fn parses_real_script_output() {
        let report = report(
            r#"{"upsstatus":"On Line","batterylevel":100,"batterystatus":"Charged",
                "load":36,"runtime":74.5,"output1":"on","output2":"on","output3":"off"}"#,
        )
        .unwrap();
        assert_eq!(report.mode, OperatingMode::OnLine);
        assert_eq!(report.battery_level, BatteryLevel::FULL);
        assert!(report.charging);
        assert!((report.load_watts - 36.0).abs() < f64::EPSILON);
        assert!((report.runtime_minutes - 74.5).abs() < f64::EPSILON);
        assert_eq!(report.outlet(outlet(1)), Some(OutletSwitch::On));
        assert_eq!(report.outlet(outlet(3)), Some(OutletSwitch::Off));
    }

    #[test]
    fn on_battery_not_charging() {
        let report = report(
            r#"{"upsstatus":"on-battery","batterylevel":15,"batterystatus":"not charging",
                "load":10,"runtime":5}"#,
        )
        .unwrap();
        assert_eq!(report.mode, OperatingMode::OnBattery);
        assert_eq!(report.battery_level.value(), 15);
        assert!(!report.charging);
        assert_eq!(report.outlets, [None, None, None]);
    }

    #[test]
    fn ambiguous_outlet_values_are_ignored() {
        let report = report(
            r#"{"upsstatus":"On Line","batterylevel":50,"load":1,"runtime":1,
                "output1":"rebooting","output2":1,"output3":null}"#,
        )
        .unwrap();
        assert_eq!(report.outlets, [None, None, None]);
    }

    #[test]
    fn not_json_is_malformed() {
        let err = report("Connection refused").unwrap_err();
        assert!(matches!(err, DeviceError::MalformedResponse(ParseError::Json(_))));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = report(r#"{"upsstatus":"On Line","batterylevel":50}"#).unwrap_err();
        assert!(matches!(err, DeviceError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_mode_is_unexpected_status() {
        let err =
            report(r#"{"upsstatus":"Self Test","batterylevel":50,"load":1,"runtime":1}"#)
                .unwrap_err();
        assert!(matches!(err, DeviceError::UnexpectedStatus(ref s) if s == "Self Test"));
    }

    #[test]
    fn out_of_range_numbers_are_malformed() {
        let err = report(r#"{"upsstatus":"On Line","batterylevel":150,"load":1,"runtime":1}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            DeviceError::MalformedResponse(ParseError::InvalidValue { ref field, .. })
                if field == "batterylevel"
        ));

        let err = report(r#"{"upsstatus":"On Line","batterylevel":50,"load":-1,"runtime":1}"#)
            .unwrap_err();
        assert!(matches!(err, DeviceError::MalformedResponse(_)));
    }

    #[test]
    fn fractional_battery_level_is_rounded() {
        let report =
            report(r#"{"upsstatus":"On Line","batterylevel":87.6,"load":1,"runtime":1}"#).unwrap();
        assert_eq!(report.battery_level.value(), 88);
    }
}
