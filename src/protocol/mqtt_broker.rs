// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker sessions backed by `rumqttc`.
//!
//! Each session owns its own client and event loop, polled only from
//! [`BrokerSession::next_event`] while the operation runs. On release the
//! event loop moves to a short-lived task that sends the DISCONNECT and then
//! closes the socket.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use uuid::Uuid;

use crate::config::{BrokerSettings, MqttConfig};
use crate::error::{Error, TransportError};
use crate::protocol::broker::{BrokerConnector, BrokerEvent, BrokerSession, InboundMessage};

/// Default MQTT port when the broker URL has none.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Capacity of the client request queue; a session only ever queues a
/// subscribe, a publish and a disconnect.
const REQUEST_CAPACITY: usize = 10;

/// Upper bound on flushing the DISCONNECT after release.
const DISCONNECT_FLUSH: Duration = Duration::from_millis(500);

/// Opens `rumqttc` sessions.
#[derive(Debug, Clone)]
pub struct RumqttcConnector {
    config: MqttConfig,
}

impl RumqttcConnector {
    /// Creates a connector using the keep-alive and connection timeout of
    /// `config`.
    #[must_use]
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    fn options(&self, settings: &BrokerSettings) -> Result<MqttOptions, Error> {
        let (host, port) = parse_mqtt_url(settings.url())?;
        let client_id = format!("sonoff_bridge_{}", Uuid::new_v4().simple());

        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(self.config.keep_alive());
        options.set_clean_session(true);
        if let Some((username, password)) = settings.credentials() {
            options.set_credentials(username, password);
        }
        Ok(options)
    }
}

impl BrokerConnector for RumqttcConnector {
    type Session = RumqttcSession;

    async fn connect(&self, settings: &BrokerSettings) -> Result<RumqttcSession, Error> {
        let options = self.options(settings)?;
        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        tracing::debug!(url = %settings.url(), "Connecting to MQTT broker");

        let timeout = self.config.connection_timeout();
        let outcome = tokio::time::timeout(timeout, wait_for_connack(&mut event_loop)).await;

        match outcome {
            Ok(Ok(())) => {
                tracing::debug!(url = %settings.url(), "Connected to MQTT broker");
                Ok(RumqttcSession {
                    client,
                    event_loop: Some(event_loop),
                })
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %settings.url(), error = %e, "MQTT connection failed");
                Err(Error::Connection(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(url = %settings.url(), "MQTT connection timed out");
                Err(Error::Connection(format!(
                    "no CONNACK within {} ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), rumqttc::ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(connack)) = event_loop.poll().await? {
            tracing::debug!(?connack, "MQTT CONNACK received");
            return Ok(());
        }
    }
}

/// A single `rumqttc` connection.
pub struct RumqttcSession {
    client: AsyncClient,
    // None once released
    event_loop: Option<EventLoop>,
}

impl std::fmt::Debug for RumqttcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumqttcSession").finish_non_exhaustive()
    }
}

impl BrokerSession for RumqttcSession {
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(TransportError::Mqtt)
    }

    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .await
            .map_err(TransportError::Mqtt)
    }

    async fn next_event(&mut self) -> BrokerEvent {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return BrokerEvent::Error(TransportError::Broker("session released".to_string()));
        };

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return BrokerEvent::Message(InboundMessage {
                        topic: publish.topic,
                        payload: String::from_utf8_lossy(&publish.payload).into_owned(),
                        retained: publish.retain,
                    });
                }
                Ok(Event::Incoming(Packet::SubAck(suback))) => {
                    tracing::debug!(?suback, "MQTT subscription acknowledged");
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    return BrokerEvent::Error(TransportError::Broker(
                        "broker closed the session".to_string(),
                    ));
                }
                Ok(_) => {}
                Err(e) => return BrokerEvent::Error(TransportError::MqttConnection(e)),
            }
        }
    }

    fn release(&mut self) {
        let Some(event_loop) = self.event_loop.take() else {
            return;
        };

        if let Err(e) = self.client.try_disconnect() {
            tracing::debug!(error = %e, "Could not queue MQTT disconnect");
        }

        // Without a runtime the event loop is dropped here and the socket
        // closes without a DISCONNECT.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(flush_disconnect(event_loop));
        }
        tracing::debug!("MQTT session released");
    }
}

/// Polls `event_loop` until the queued DISCONNECT is written, the
/// connection fails, or [`DISCONNECT_FLUSH`] elapses.
async fn flush_disconnect(mut event_loop: EventLoop) -> bool {
    let flushed = tokio::time::timeout(DISCONNECT_FLUSH, async {
        loop {
            match event_loop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => return true,
                Ok(_) => {}
                Err(_) => return false,
            }
        }
    })
    .await
    .unwrap_or(false);

    tracing::debug!(flushed, "MQTT disconnect flushed");
    flushed
}

/// Parses an MQTT URL into host and port.
///
/// Accepts `mqtt://host:port`, `tcp://host:port`, `host:port` and `host`.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the host is empty or the port is not a
/// number.
pub fn parse_mqtt_url(url: &str) -> Result<(String, u16), Error> {
    let rest = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url)
        .trim_end_matches('/');

    let (host, port) = match rest.rsplit_once(':') {
        Some((h, p)) => {
            let port = p
                .parse()
                .map_err(|_| Error::Connection(format!("invalid broker port in {url:?}")))?;
            (h, port)
        }
        None => (rest, DEFAULT_MQTT_PORT),
    };

    if host.is_empty() {
        return Err(Error::Connection(format!("missing broker host in {url:?}")));
    }

    Ok((host.to_string(), port))
}
