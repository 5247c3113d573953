// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ups_bridge` - keeps a live model of an APC UPS with switchable outlets.
//!
//! The bridge polls the UPS on a fixed interval, keeps the last known state
//! in memory, and forwards outlet commands to the device. Commands are
//! applied optimistically: readers see the requested value at once, and the
//! next refresh does not overwrite it while the device catches up.
//!
//! # Features
//!
//! - **Monitoring**: mains power, battery charge, charging, low battery,
//!   load and runtime
//! - **Outlets**: on/off per outlet, with per-outlet lock
//! - **Reboot**: a momentary reboot switch per outlet, guarded against
//!   concurrent reboots
//! - **Notifications**: state snapshots on a `watch` channel and
//!   [`BridgeEvent`]s on a broadcast channel
//!
//! # Device access
//!
//! The device is reached through a [`DeviceClient`](protocol::DeviceClient).
//! Two clients ship, each behind a cargo feature (both enabled by default):
//!
//! - `script`: [`ScriptClient`](protocol::ScriptClient) runs the vendor
//!   status script
//! - `http`: [`HttpClient`](protocol::HttpClient) calls a management gateway
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use ups_bridge::protocol::ScriptClient;
//! use ups_bridge::{DeviceConfig, OutletIndex, UpsBridge};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeviceConfig::new("192.168.1.20")
//!         .with_credentials("apc", "secret")
//!         .with_outlet_locked(OutletIndex::new(1)?, true)
//!         .with_poll_interval(Duration::from_secs(15));
//!
//!     let bridge = UpsBridge::new(config, ScriptClient::new("/opt/ups/apc-status.sh"))?;
//!     bridge.start().await;
//!
//!     if !bridge.mains_ok() && bridge.low_battery() {
//!         bridge.set_outlet(OutletIndex::new(3)?, false).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration file
//!
//! [`DeviceConfig`] reads the accessory block of a host JSON configuration:
//!
//! ```
//! use ups_bridge::{DeviceConfig, OutletIndex};
//!
//! let config = DeviceConfig::from_json_str(r#"{
//!     "name": "Rack UPS",
//!     "upsIpAddress": "10.0.0.5",
//!     "pollTimer": 60,
//!     "outlet2Name": "Router",
//!     "outlet2Locked": true
//! }"#).unwrap();
//!
//! assert_eq!(config.poll_interval().as_secs(), 60);
//! assert!(config.outlet(OutletIndex::new(2).unwrap()).locked());
//! ```

mod bridge;
pub mod codec;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

pub use bridge::UpsBridge;
pub use codec::{decode_credential, encode_credential};
pub use command::{CommandKind, OutletCommand};
pub use config::{Credentials, DeviceConfig, OutletConfig};
pub use error::{ConfigError, DeviceError, ParseError, ProtocolError, Result, ValueError};
pub use event::{BridgeEvent, EventBus};
pub use response::{StatusReport, StatusResponse};
pub use state::{DeviceState, OutletState};
pub use types::{BatteryLevel, OUTLET_COUNT, OperatingMode, OutletIndex, OutletSwitch};
