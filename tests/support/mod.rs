// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory broker for driver tests.
//!
//! Replies are queued on a session when the command is published, so they
//! can never be observed before the publish.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use sonoff_bridge::BrokerSettings;
use sonoff_bridge::error::{Error, TransportError};
use sonoff_bridge::protocol::{BrokerConnector, BrokerEvent, BrokerSession, InboundMessage};

#[derive(Debug, Clone)]
enum Scripted {
    Message(InboundMessage),
    Error(String),
}

#[derive(Debug, Default)]
struct Inner {
    refuse_connect: bool,
    fail_publish: bool,
    replies: Vec<Scripted>,
    urls: Mutex<Vec<String>>,
    subscriptions: Mutex<Vec<String>>,
    published: Mutex<Vec<(String, String)>>,
    connects: AtomicUsize,
    releases: AtomicUsize,
}

/// A broker whose behaviour is fixed up front.
#[derive(Debug, Clone, Default)]
pub struct StubBroker {
    inner: Arc<Inner>,
}

impl StubBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn configure(mut self, f: impl FnOnce(&mut Inner)) -> Self {
        let inner = Arc::get_mut(&mut self.inner).expect("configure before sharing");
        f(inner);
        self
    }

    /// Rejects every connection attempt.
    pub fn refusing() -> Self {
        Self::new().configure(|i| i.refuse_connect = true)
    }

    /// Fails every publish.
    pub fn failing_publish(self) -> Self {
        self.configure(|i| i.fail_publish = true)
    }

    /// Emits a live message after the command is published.
    pub fn reply(self, topic: &str, payload: &str) -> Self {
        self.configure(|i| {
            i.replies
                .push(Scripted::Message(InboundMessage::new(topic, payload)));
        })
    }

    /// Emits a retained message after the command is published.
    pub fn reply_retained(self, topic: &str, payload: &str) -> Self {
        self.configure(|i| {
            i.replies.push(Scripted::Message(
                InboundMessage::new(topic, payload).retained(),
            ));
        })
    }

    /// Emits a session error after the command is published.
    pub fn fail_after_publish(self, reason: &str) -> Self {
        self.configure(|i| i.replies.push(Scripted::Error(reason.to_string())))
    }

    pub fn urls(&self) -> Vec<String> {
        self.inner.urls.lock().clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.inner.subscriptions.lock().clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.inner.published.lock().clone()
    }

    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }
}

impl BrokerConnector for StubBroker {
    type Session = StubSession;

    async fn connect(&self, settings: &BrokerSettings) -> Result<StubSession, Error> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        self.inner.urls.lock().push(settings.url().to_string());

        if self.inner.refuse_connect {
            return Err(Error::Connection("connection refused".to_string()));
        }

        Ok(StubSession {
            broker: self.clone(),
            queue: VecDeque::new(),
        })
    }
}

pub struct StubSession {
    broker: StubBroker,
    queue: VecDeque<Scripted>,
}

impl BrokerSession for StubSession {
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.broker.inner.subscriptions.lock().push(topic.to_string());
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if self.broker.inner.fail_publish {
            return Err(TransportError::Broker("publish rejected".to_string()));
        }
        self.broker
            .inner
            .published
            .lock()
            .push((topic.to_string(), payload.to_string()));
        self.queue.extend(self.broker.inner.replies.iter().cloned());
        Ok(())
    }

    async fn next_event(&mut self) -> BrokerEvent {
        match self.queue.pop_front() {
            Some(Scripted::Message(message)) => BrokerEvent::Message(message),
            Some(Scripted::Error(reason)) => BrokerEvent::Error(TransportError::Broker(reason)),
            None => std::future::pending().await,
        }
    }

    fn release(&mut self) {
        self.broker.inner.releases.fetch_add(1, Ordering::SeqCst);
    }
}
