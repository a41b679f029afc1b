// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the HTTP and MQTT drivers.
//!
//! Timeouts and ports are fixed when the [`Bridge`](crate::Bridge) is built.
//! Broker URL and credentials are looked up on every MQTT operation through a
//! [`BrokerSettingsProvider`], so rotated credentials are picked up without
//! rebuilding anything.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use sonoff_bridge::config::{BridgeConfig, HttpConfig, MqttConfig};
//!
//! let config = BridgeConfig::new(MqttConfig::new(Duration::from_secs(5)))
//!     .with_http(HttpConfig::new().with_timeout(Duration::from_secs(3)));
//! assert_eq!(config.mqtt().confirmation_timeout(), Duration::from_secs(5));
//! ```

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the broker URL.
pub const MQTT_URL: &str = "MQTT_URL";
/// Environment variable holding the broker username.
pub const MQTT_USERNAME: &str = "MQTT_USERNAME";
/// Environment variable holding the broker password.
pub const MQTT_PASSWORD: &str = "MQTT_PASSWORD";

/// Settings for the HTTP driver.
#[derive(Clone)]
pub struct HttpConfig {
    port: u16,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("port", &self.port)
            .field("username", &self.credentials.as_ref().map(|(user, _)| user))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with default port and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the port the devices' web servers listen on.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the web UI credentials sent with each command.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Settings for the MQTT driver.
///
/// The confirmation window has no default: every caller must decide how long
/// an operation may wait for the device's status message.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    confirmation_timeout: Duration,
    connection_timeout: Duration,
    keep_alive: Duration,
}

impl MqttConfig {
    /// Default time allowed for the broker's CONNACK.
    pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default keep-alive interval.
    pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

    /// Creates a configuration with the given confirmation window.
    #[must_use]
    pub fn new(confirmation_timeout: Duration) -> Self {
        Self {
            confirmation_timeout,
            connection_timeout: Self::DEFAULT_CONNECTION_TIMEOUT,
            keep_alive: Self::DEFAULT_KEEP_ALIVE,
        }
    }

    /// Sets the time allowed for the broker's CONNACK.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Returns how long to wait for a status message after publishing.
    #[must_use]
    pub fn confirmation_timeout(&self) -> Duration {
        self.confirmation_timeout
    }

    /// Returns how long to wait for the broker's CONNACK.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }
}

/// Configuration for both drivers.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    http: HttpConfig,
    mqtt: MqttConfig,
}

impl BridgeConfig {
    /// Creates a configuration with default HTTP settings.
    #[must_use]
    pub fn new(mqtt: MqttConfig) -> Self {
        Self {
            http: HttpConfig::new(),
            mqtt,
        }
    }

    /// Replaces the HTTP settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Returns the HTTP settings.
    #[must_use]
    pub fn http(&self) -> &HttpConfig {
        &self.http
    }

    /// Returns the MQTT settings.
    #[must_use]
    pub fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }
}

/// Broker URL and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    url: String,
    username: String,
    password: String,
}

impl BrokerSettings {
    /// Creates settings; an empty username means anonymous access.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates settings for an anonymous broker.
    #[must_use]
    pub fn anonymous(url: impl Into<String>) -> Self {
        Self::new(url, "", "")
    }

    /// Returns the broker URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the credentials, or `None` for anonymous access.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }
}

impl std::fmt::Debug for BrokerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies broker settings at the start of each MQTT operation.
pub trait BrokerSettingsProvider {
    /// Looks up the broker URL and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the settings cannot be obtained; the
    /// operation then fails without touching the network.
    fn broker_settings(&self) -> Result<BrokerSettings, ConfigError>;
}

impl BrokerSettingsProvider for BrokerSettings {
    fn broker_settings(&self) -> Result<BrokerSettings, ConfigError> {
        Ok(self.clone())
    }
}

impl<F> BrokerSettingsProvider for F
where
    F: Fn() -> Result<BrokerSettings, ConfigError>,
{
    fn broker_settings(&self) -> Result<BrokerSettings, ConfigError> {
        self()
    }
}

/// Reads broker settings from `MQTT_URL`, `MQTT_USERNAME` and
/// `MQTT_PASSWORD`.
///
/// The URL is required; missing credentials mean anonymous access.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvBrokerSettings;

impl BrokerSettingsProvider for EnvBrokerSettings {
    fn broker_settings(&self) -> Result<BrokerSettings, ConfigError> {
        let url = read_env(MQTT_URL)?.ok_or_else(|| ConfigError::Missing(MQTT_URL.to_string()))?;
        let username = read_env(MQTT_USERNAME)?.unwrap_or_default();
        let password = read_env(MQTT_PASSWORD)?.unwrap_or_default();
        Ok(BrokerSettings::new(url, username, password))
    }
}

fn read_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: "not valid unicode".to_string(),
        }),
    }
}
