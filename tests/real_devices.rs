// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a real plug.
//!
//! These tests require a device on the network and are ignored by default.
//! Run with: `cargo test --test real_devices -- --ignored --test-threads=1`
//!
//! # Environment Variables
//!
//! ## MQTT Broker
//! - `MQTT_URL` - Broker URL, e.g. `mqtt://192.168.1.100:1883`
//! - `MQTT_USERNAME` - MQTT username (optional)
//! - `MQTT_PASSWORD` - MQTT password (optional)
//!
//! ## Device
//! - `PLUG_HTTP_IP` - Device IP address
//! - `PLUG_HTTP_USER` - HTTP username (optional)
//! - `PLUG_HTTP_PASSWORD` - HTTP password (optional)
//! - `PLUG_MQTT_TOPIC` - Device topic
//! - `PLUG_RELAY` - Relay sub-index (optional, default relay if unset)
//!
//! # Example
//!
//! ```bash
//! export MQTT_URL=mqtt://192.168.1.100:1883
//! export MQTT_USERNAME=mqtt
//! export MQTT_PASSWORD=secret
//! export PLUG_HTTP_IP=192.168.1.50
//! export PLUG_MQTT_TOPIC=tasmota_ABC123
//! cargo test --test real_devices -- --ignored --test-threads=1
//! ```

use std::env;
use std::time::Duration;

use sonoff_bridge::config::{BridgeConfig, EnvBrokerSettings, HttpConfig, MqttConfig};
use sonoff_bridge::protocol::RumqttcConnector;
use sonoff_bridge::{Bridge, DeviceTypeDescriptor, PowerState, StateRequest};
use tokio::time::sleep;

// =============================================================================
// Test Configuration from Environment Variables
// =============================================================================

/// Device configuration loaded from environment variables.
struct PlugConfig {
    ip: String,
    user: Option<String>,
    password: Option<String>,
    topic: String,
    relay: Option<String>,
}

impl PlugConfig {
    fn from_env() -> Self {
        Self {
            ip: env::var("PLUG_HTTP_IP").expect("PLUG_HTTP_IP not set"),
            user: env::var("PLUG_HTTP_USER").ok(),
            password: env::var("PLUG_HTTP_PASSWORD").ok(),
            topic: env::var("PLUG_MQTT_TOPIC").expect("PLUG_MQTT_TOPIC not set"),
            relay: env::var("PLUG_RELAY").ok().filter(|r| !r.is_empty()),
        }
    }

    fn identifier(&self, primary: &str) -> String {
        match &self.relay {
            Some(relay) => format!("{primary}_{relay}"),
            None => primary.to_string(),
        }
    }

    fn http(&self) -> DeviceTypeDescriptor {
        DeviceTypeDescriptor::http(self.identifier(&self.ip))
    }

    fn mqtt(&self) -> DeviceTypeDescriptor {
        DeviceTypeDescriptor::mqtt(self.identifier(&self.topic))
    }
}

fn bridge(plug: &PlugConfig) -> Bridge<EnvBrokerSettings, RumqttcConnector> {
    let mut http = HttpConfig::new();
    if let (Some(user), Some(password)) = (&plug.user, &plug.password) {
        http = http.with_credentials(user.as_str(), password.as_str());
    }
    let config = BridgeConfig::new(MqttConfig::new(Duration::from_secs(5))).with_http(http);
    Bridge::new(config, EnvBrokerSettings).expect("Failed to create bridge")
}

/// Delay between commands so the device settles.
const SETTLE: Duration = Duration::from_millis(500);

// =============================================================================
// HTTP
// =============================================================================

#[tokio::test]
#[ignore = "requires a real device"]
async fn http_toggle() {
    let plug = PlugConfig::from_env();
    let bridge = bridge(&plug);

    for state in [PowerState::On, PowerState::Off] {
        let result = bridge
            .set_power(&plug.http(), StateRequest::new(state))
            .await
            .expect("HTTP command failed");
        assert_eq!(result.confirmed(), state);
        sleep(SETTLE).await;
    }
}

// =============================================================================
// MQTT
// =============================================================================

#[tokio::test]
#[ignore = "requires a real device and broker"]
async fn mqtt_toggle() {
    let plug = PlugConfig::from_env();
    let bridge = bridge(&plug);

    for state in [PowerState::On, PowerState::Off] {
        let result = bridge
            .set_power(&plug.mqtt(), StateRequest::new(state))
            .await
            .expect("MQTT command failed");
        assert_eq!(result.confirmed(), state);
        sleep(SETTLE).await;
    }
}

#[tokio::test]
#[ignore = "requires a real device and broker"]
async fn both_protocols_agree() {
    let plug = PlugConfig::from_env();
    let bridge = bridge(&plug);

    let over_mqtt = bridge
        .set_power(&plug.mqtt(), StateRequest::new(PowerState::On))
        .await
        .expect("MQTT command failed");
    sleep(SETTLE).await;

    let over_http = bridge
        .set_power(&plug.http(), StateRequest::new(PowerState::On))
        .await
        .expect("HTTP command failed");

    assert_eq!(over_mqtt.value(), over_http.value());

    sleep(SETTLE).await;
    bridge
        .set_power(&plug.http(), StateRequest::new(PowerState::Off))
        .await
        .expect("HTTP command failed");
}
