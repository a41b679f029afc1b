// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker client abstraction used by the MQTT driver.
//!
//! The driver opens one session per operation through a [`BrokerConnector`]
//! and wraps it in a [`SessionGuard`], which releases the session when it
//! goes out of scope. That covers every exit: confirmation, broker error,
//! timeout, and the caller dropping the future.
//!
//! The production implementation is
//! [`RumqttcConnector`](crate::protocol::RumqttcConnector); tests plug in
//! scripted brokers.

use std::ops::{Deref, DerefMut};

use crate::config::BrokerSettings;
use crate::error::{Error, TransportError};

/// A message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The full topic, e.g. `stat/plugA/POWER1`.
    pub topic: String,
    /// The payload decoded as UTF-8 (lossy).
    pub payload: String,
    /// Whether the broker delivered this as a retained message.
    pub retained: bool,
}

impl InboundMessage {
    /// Creates a live (non-retained) message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retained: false,
        }
    }

    /// Marks the message as retained.
    #[must_use]
    pub fn retained(mut self) -> Self {
        self.retained = true;
        self
    }
}

/// Something that happened on a broker session.
#[derive(Debug)]
pub enum BrokerEvent {
    /// A publish was received on a subscribed topic.
    Message(InboundMessage),
    /// The session failed; no further events will follow.
    Error(TransportError),
}

/// Opens broker sessions.
#[allow(async_fn_in_trait)]
pub trait BrokerConnector {
    /// The session type produced by this connector.
    type Session: BrokerSession;

    /// Connects to the broker and waits for it to accept the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the broker is unreachable, rejects the
    /// connection, or does not answer in time. Any partially opened resources
    /// must be released before returning.
    async fn connect(&self, settings: &BrokerSettings) -> Result<Self::Session, Error>;
}

/// A live broker connection owned by a single operation.
#[allow(async_fn_in_trait)]
pub trait BrokerSession {
    /// Subscribes to a topic.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be sent.
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Publishes a non-retained message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be sent.
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;

    /// Waits for the next inbound message or session error.
    ///
    /// Must be cancel-safe: the driver races it against a deadline.
    async fn next_event(&mut self) -> BrokerEvent;

    /// Closes the connection. Called exactly once, by [`SessionGuard`].
    fn release(&mut self);
}

/// Owns a session and releases it on drop.
#[derive(Debug)]
pub struct SessionGuard<S: BrokerSession> {
    session: S,
}

impl<S: BrokerSession> SessionGuard<S> {
    /// Takes ownership of an open session.
    #[must_use]
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: BrokerSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: BrokerSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: BrokerSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.release();
    }
}
