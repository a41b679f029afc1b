// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sonoff Bridge - set and confirm the power state of Tasmota/Sonoff plugs.
//!
//! One operation, two transports: a device is addressed either by IP
//! (HTTP request/response) or by topic (MQTT publish/subscribe), and either
//! way the caller gets back the state the device itself reported.
//!
//! # Identifiers
//!
//! A device identifier is `<address-or-topic>[_<sub-index>]`. The sub-index
//! selects one relay on multi-relay devices (`Power1`, `Power2`, ...); without
//! it the default relay is used.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use sonoff_bridge::config::{BridgeConfig, BrokerSettings, MqttConfig};
//! use sonoff_bridge::{Bridge, DeviceTypeDescriptor, PowerState, StateRequest};
//!
//! #[tokio::main]
//! async fn main() -> sonoff_bridge::Result<()> {
//!     let config = BridgeConfig::new(MqttConfig::new(Duration::from_secs(5)));
//!     let settings = BrokerSettings::new("mqtt://192.168.1.50:1883", "user", "secret");
//!     let bridge = Bridge::new(config, settings)?;
//!
//!     // Relay 1 of the plug at 192.168.1.100, over HTTP
//!     let plug = DeviceTypeDescriptor::http("192.168.1.100_1");
//!     let result = bridge.set_power(&plug, StateRequest::new(PowerState::On)).await?;
//!     println!("plug is {}", result.confirmed());
//!
//!     // The default relay of the device with topic `sonoff_desk`, over MQTT
//!     let lamp = DeviceTypeDescriptor::mqtt("sonoff_desk");
//!     bridge.set_power(&lamp, StateRequest::new(PowerState::Off)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events and never installs a subscriber; the
//! embedding application decides where they go.

mod bridge;
pub mod command;
pub mod config;
pub mod error;
mod identifier;
pub mod protocol;
pub mod response;
pub mod types;

pub use bridge::{Bridge, Route, route};
pub use config::{BridgeConfig, BrokerSettings, BrokerSettingsProvider, HttpConfig, MqttConfig};
pub use error::{ConfigError, Error, Result, TransportError, ValueError};
pub use identifier::{Identifier, parse_ipv4};
pub use types::{
    DeviceType, DeviceTypeDescriptor, PowerState, ProtocolKind, StateRequest, StateResult,
};
