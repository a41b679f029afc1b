// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Every failure is terminal for the call that produced it. The variants of
//! [`Error`] are distinguishable so the surrounding system can decide what to
//! log and whether to retry.

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor names a device type other than `binary`.
    #[error("unsupported device type: {0}")]
    UnsupportedDeviceType(String),

    /// The descriptor names a protocol other than `http` or `mqtt`, or the
    /// protocol's cargo feature is disabled.
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// The HTTP address is not a dotted-quad IPv4 address.
    #[error("invalid device address: {0:?}")]
    InvalidAddress(String),

    /// Network or broker communication failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The device answered, but not with a usable power state.
    #[error("malformed response, expected {field} in {body}")]
    MalformedResponse {
        /// The field that was expected (e.g. `POWER1`).
        field: String,
        /// The raw response body.
        body: String,
    },

    /// The broker connection could not be established.
    #[error("broker connection failed: {0}")]
    Connection(String),

    /// No status message arrived on the expected topic in time.
    #[error("no confirmation on {topic} within {} ms", timeout.as_millis())]
    ConfirmationTimeout {
        /// The status topic that was awaited.
        topic: String,
        /// The configured confirmation window.
        timeout: Duration,
    },

    /// Broker settings could not be looked up.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A request value was out of range.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

/// Errors raised by the underlying transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, body read...).
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The MQTT client refused a request.
    #[cfg(feature = "mqtt")]
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The MQTT event loop failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT connection error: {0}")]
    MqttConnection(#[from] rumqttc::ConnectionError),

    /// The broker reported an error or closed the session.
    #[error("broker error: {0}")]
    Broker(String),
}

/// Errors raised while looking up broker settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing setting {0}")]
    Missing(String),

    /// A setting is present but unusable.
    #[error("invalid setting {key}: {message}")]
    Invalid {
        /// The setting name.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric power value other than 0 or 1.
    #[error("power value {0} is not 0 or 1")]
    InvalidPowerValue(u8),

    /// A power state string other than `ON` or `OFF`.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
