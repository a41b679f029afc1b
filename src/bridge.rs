// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol-independent entry point.
//!
//! [`Bridge::set_power`] validates a [`DeviceTypeDescriptor`], picks the
//! driver for its protocol and returns the state the device confirmed.
//! The bridge holds no per-device state, so one instance can serve
//! concurrent calls for different devices.

use crate::config::{BridgeConfig, BrokerSettingsProvider};
use crate::error::Error;
use crate::identifier::Identifier;
#[cfg(feature = "http")]
use crate::protocol::HttpDriver;
#[cfg(feature = "mqtt")]
use crate::protocol::RumqttcConnector;
use crate::protocol::{BrokerConnector, MqttDriver};
use crate::types::{DeviceType, DeviceTypeDescriptor, ProtocolKind, StateRequest, StateResult};

/// Where a descriptor's command goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Direct HTTP to a device address.
    Http {
        /// The device address (validated by the HTTP driver).
        address: String,
        /// The relay sub-index, possibly empty.
        sub_index: String,
    },
    /// MQTT through the broker.
    Mqtt {
        /// The device topic root.
        topic_root: String,
        /// The relay sub-index, possibly empty.
        sub_index: String,
    },
}

/// Validates a descriptor and decodes its identifier.
///
/// # Examples
///
/// ```
/// use sonoff_bridge::{DeviceTypeDescriptor, Route, route};
///
/// let route = route(&DeviceTypeDescriptor::http("10.0.0.5_1")).unwrap();
/// assert_eq!(
///     route,
///     Route::Http { address: "10.0.0.5".into(), sub_index: "1".into() }
/// );
/// ```
///
/// # Errors
///
/// - [`Error::UnsupportedDeviceType`] if the type is not `binary`.
/// - [`Error::UnsupportedProtocol`] if the protocol is neither `http` nor
///   `mqtt`.
pub fn route(descriptor: &DeviceTypeDescriptor) -> Result<Route, Error> {
    if let DeviceType::Other(device_type) = &descriptor.device_type {
        tracing::error!(device_type = %device_type, "Device type invalid or unknown");
        return Err(Error::UnsupportedDeviceType(device_type.clone()));
    }

    let (primary, sub_index) = Identifier::parse(&descriptor.identifier).into_parts();

    match &descriptor.protocol {
        ProtocolKind::Http => Ok(Route::Http {
            address: primary,
            sub_index,
        }),
        ProtocolKind::Mqtt => Ok(Route::Mqtt {
            topic_root: primary,
            sub_index,
        }),
        ProtocolKind::Other(protocol) => {
            tracing::error!(protocol = %protocol, "Protocol invalid or unknown");
            Err(Error::UnsupportedProtocol(protocol.clone()))
        }
    }
}

/// Sets the power state of binary devices over HTTP or MQTT.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use sonoff_bridge::config::{BridgeConfig, EnvBrokerSettings, MqttConfig};
/// use sonoff_bridge::{Bridge, DeviceTypeDescriptor, PowerState, StateRequest};
///
/// # async fn example() -> sonoff_bridge::Result<()> {
/// let config = BridgeConfig::new(MqttConfig::new(Duration::from_secs(5)));
/// let bridge = Bridge::new(config, EnvBrokerSettings)?;
///
/// let plug = DeviceTypeDescriptor::mqtt("sonoff_kitchen");
/// let result = bridge.set_power(&plug, StateRequest::new(PowerState::On)).await?;
/// assert_eq!(result.value(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bridge<P, C> {
    #[cfg(feature = "http")]
    http: HttpDriver,
    mqtt: MqttDriver<P, C>,
}

#[cfg(feature = "mqtt")]
impl<P: BrokerSettingsProvider> Bridge<P, RumqttcConnector> {
    /// Creates a bridge that reaches the broker with `rumqttc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be created.
    pub fn new(config: BridgeConfig, settings: P) -> Result<Self, Error> {
        let connector = RumqttcConnector::new(config.mqtt().clone());
        Self::with_connector(config, settings, connector)
    }
}

impl<P, C> Bridge<P, C>
where
    P: BrokerSettingsProvider,
    C: BrokerConnector,
{
    /// Creates a bridge with a custom broker connector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be created.
    pub fn with_connector(config: BridgeConfig, settings: P, connector: C) -> Result<Self, Error> {
        Ok(Self {
            #[cfg(feature = "http")]
            http: HttpDriver::new(config.http().clone())?,
            mqtt: MqttDriver::new(config.mqtt().clone(), settings, connector),
        })
    }

    /// Drives a device to the requested state and returns the state it
    /// confirmed.
    ///
    /// # Errors
    ///
    /// Fails with the error of [`route`] or of the selected driver, unchanged.
    pub async fn set_power(
        &self,
        descriptor: &DeviceTypeDescriptor,
        request: StateRequest,
    ) -> Result<StateResult, Error> {
        let desired = request.desired();

        match route(descriptor)? {
            Route::Http { address, sub_index } => {
                #[cfg(feature = "http")]
                {
                    self.http.set_state(&address, &sub_index, desired).await
                }
                #[cfg(not(feature = "http"))]
                {
                    let _ = (address, sub_index, desired);
                    Err(Error::UnsupportedProtocol("http".to_string()))
                }
            }
            Route::Mqtt {
                topic_root,
                sub_index,
            } => self.mqtt.set_state(&topic_root, &sub_index, desired).await,
        }
    }
}
