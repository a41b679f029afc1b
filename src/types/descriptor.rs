// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device descriptors supplied by the caller.

use std::fmt;

use serde::Deserialize;

/// The kind of output a device exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DeviceType {
    /// Two states, on and off.
    Binary,
    /// Anything else, kept verbatim for diagnostics.
    Other(String),
}

impl From<String> for DeviceType {
    fn from(s: String) -> Self {
        if s == "binary" {
            Self::Binary
        } else {
            Self::Other(s)
        }
    }
}

impl From<&str> for DeviceType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// The protocol used to reach a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ProtocolKind {
    /// Direct request/response to the device's web server.
    Http,
    /// Publish/subscribe through an MQTT broker.
    Mqtt,
    /// Anything else, kept verbatim for diagnostics.
    Other(String),
}

impl From<String> for ProtocolKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "http" => Self::Http,
            "mqtt" => Self::Mqtt,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ProtocolKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Mqtt => f.write_str("mqtt"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Describes how to reach one device output.
///
/// # Examples
///
/// ```
/// use sonoff_bridge::{DeviceType, DeviceTypeDescriptor, ProtocolKind};
///
/// let json = r#"{"type": "binary", "identifier": "10.0.0.5_1", "protocol": "http"}"#;
/// let descriptor: DeviceTypeDescriptor = serde_json::from_str(json).unwrap();
/// assert_eq!(descriptor.device_type, DeviceType::Binary);
/// assert_eq!(descriptor.protocol, ProtocolKind::Http);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceTypeDescriptor {
    /// The output type.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Opaque identifier: `<address-or-topic>[_<sub-index>]`.
    pub identifier: String,
    /// The protocol to use.
    pub protocol: ProtocolKind,
}

impl DeviceTypeDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(
        device_type: impl Into<DeviceType>,
        identifier: impl Into<String>,
        protocol: impl Into<ProtocolKind>,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            identifier: identifier.into(),
            protocol: protocol.into(),
        }
    }

    /// Creates a binary descriptor reached over HTTP.
    #[must_use]
    pub fn http(identifier: impl Into<String>) -> Self {
        Self::new(DeviceType::Binary, identifier, ProtocolKind::Http)
    }

    /// Creates a binary descriptor reached over MQTT.
    #[must_use]
    pub fn mqtt(identifier: impl Into<String>) -> Self {
        Self::new(DeviceType::Binary, identifier, ProtocolKind::Mqtt)
    }
}
