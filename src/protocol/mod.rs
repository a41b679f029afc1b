// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol drivers for setting device power state.
//!
//! # Drivers
//!
//! - [`HttpDriver`]: one GET per command, state read from the response body
//! - [`MqttDriver`]: one broker session per command, state read from the
//!   device's status topic
//!
//! # Broker abstraction
//!
//! [`MqttDriver`] talks to the broker through the [`BrokerConnector`] and
//! [`BrokerSession`] traits. [`RumqttcConnector`] is the production
//! implementation.

mod broker;
#[cfg(feature = "http")]
mod http;
mod mqtt;
#[cfg(feature = "mqtt")]
mod mqtt_broker;

pub use broker::{
    BrokerConnector, BrokerEvent, BrokerSession, InboundMessage, SessionGuard,
};
#[cfg(feature = "http")]
pub use http::HttpDriver;
pub use mqtt::{MqttDriver, OperationPhase};
#[cfg(feature = "mqtt")]
pub use mqtt_broker::{DEFAULT_MQTT_PORT, RumqttcConnector, RumqttcSession, parse_mqtt_url};
