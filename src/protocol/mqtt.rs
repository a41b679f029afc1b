// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT state driver.
//!
//! Uses the device MQTT topic structure:
//! - Command: `cmnd/<topic>/power<idx>` with payload `on`/`off`
//! - Status: `stat/<topic>/POWER<idx>` with payload `ON`/`OFF`
//!
//! Every call opens its own broker session, subscribes to the status topic,
//! publishes the command, then waits for the first matching status message,
//! a broker error or the confirmation deadline, whichever comes first.
//!
//! ```text
//! Connecting ──connack──▶ Publishing ──published──▶ AwaitingConfirmation
//!     │                       │                        │        │
//!     └──────────────▶ Failed ◀────────────────────────┘        └──▶ Resolved
//! ```

use tokio::time::{Instant, sleep_until};

use crate::command::{Command, PowerCommand};
use crate::config::{BrokerSettingsProvider, MqttConfig};
use crate::error::Error;
use crate::protocol::broker::{BrokerConnector, BrokerEvent, BrokerSession, SessionGuard};
use crate::types::{PowerState, StateResult};

/// Lifecycle of one MQTT operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    /// Opening the broker session.
    Connecting,
    /// Subscribing to the status topic and publishing the command.
    Publishing,
    /// Waiting for the device's status message.
    AwaitingConfirmation,
    /// The device confirmed a state.
    Resolved(PowerState),
    /// The operation failed.
    Failed,
}

impl OperationPhase {
    /// Returns true for `Resolved` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Failed)
    }
}

/// Correlation record for a single in-flight command.
///
/// Owned by exactly one call; it decides which inbound messages confirm the
/// command and never leaves a terminal phase.
#[derive(Debug)]
pub(crate) struct PendingOperation {
    status_topic: String,
    phase: OperationPhase,
}

impl PendingOperation {
    pub(crate) fn new(status_topic: String) -> Self {
        Self {
            status_topic,
            phase: OperationPhase::Connecting,
        }
    }

    pub(crate) fn status_topic(&self) -> &str {
        &self.status_topic
    }

    pub(crate) fn phase(&self) -> OperationPhase {
        self.phase
    }

    /// Moves to a later non-terminal phase.
    pub(crate) fn advance(&mut self, next: OperationPhase) {
        if !self.phase.is_terminal() {
            self.phase = next;
        }
    }

    /// Marks the operation failed unless it already finished.
    pub(crate) fn fail(&mut self) {
        self.advance(OperationPhase::Failed);
    }

    /// Feeds a broker event into the operation.
    ///
    /// Returns `None` while the operation is still waiting, `Some` once it
    /// resolved or failed.
    ///
    /// Only a live message on the exact status topic confirms. Retained
    /// messages are skipped on purpose even though the topic matches: they
    /// hold the state from before the command was published.
    pub(crate) fn on_event(&mut self, event: BrokerEvent) -> Option<Result<PowerState, Error>> {
        if self.phase != OperationPhase::AwaitingConfirmation {
            return None;
        }

        match event {
            BrokerEvent::Message(message) => {
                if message.topic != self.status_topic {
                    tracing::trace!(topic = %message.topic, "Ignoring unrelated MQTT message");
                    return None;
                }
                if message.retained {
                    tracing::debug!(
                        topic = %message.topic,
                        payload = %message.payload,
                        "Ignoring retained status message"
                    );
                    return None;
                }
                let state = PowerState::from_status_payload(&message.payload);
                self.phase = OperationPhase::Resolved(state);
                Some(Ok(state))
            }
            BrokerEvent::Error(e) => {
                self.phase = OperationPhase::Failed;
                Some(Err(e.into()))
            }
        }
    }
}

/// Sets power state over MQTT.
///
/// Generic over the broker settings lookup and the broker client so both
/// can be swapped out; [`Bridge::new`](crate::Bridge::new) wires in
/// [`RumqttcConnector`](crate::protocol::RumqttcConnector).
#[derive(Debug)]
pub struct MqttDriver<P, C> {
    settings: P,
    connector: C,
    config: MqttConfig,
}

impl<P, C> MqttDriver<P, C>
where
    P: BrokerSettingsProvider,
    C: BrokerConnector,
{
    /// Creates a driver.
    #[must_use]
    pub fn new(config: MqttConfig, settings: P, connector: C) -> Self {
        Self {
            settings,
            connector,
            config,
        }
    }

    /// Returns the driver configuration.
    #[must_use]
    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    /// Drives output `sub_index` of the device under `topic_root` to `state`
    /// and returns the state the device reports on its status topic.
    ///
    /// The broker session is released before this returns, whatever the
    /// outcome, and also if the returned future is dropped early.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the broker settings lookup fails.
    /// - [`Error::Connection`] if the broker cannot be reached.
    /// - [`Error::Transport`] if subscribing or publishing fails, or the
    ///   session errors while waiting.
    /// - [`Error::ConfirmationTimeout`] if no status message arrives within
    ///   the configured window.
    pub async fn set_state(
        &self,
        topic_root: &str,
        sub_index: &str,
        state: PowerState,
    ) -> Result<StateResult, Error> {
        let settings = self.settings.broker_settings().inspect_err(|e| {
            tracing::error!(error = %e, "Broker settings lookup failed");
        })?;

        let command = PowerCommand::new(sub_index, state);
        let mut operation = PendingOperation::new(command.status_topic(topic_root));

        let session = match self.connector.connect(&settings).await {
            Ok(session) => session,
            Err(e) => {
                operation.fail();
                tracing::error!(url = %settings.url(), error = %e, "MQTT connection failed");
                return Err(e);
            }
        };
        let mut session = SessionGuard::new(session);
        operation.advance(OperationPhase::Publishing);

        let outcome = self
            .run(&mut session, &mut operation, topic_root, &command)
            .await;
        drop(session);

        match &outcome {
            Ok(confirmed) => tracing::info!(
                topic = %topic_root,
                sub_index = %sub_index,
                state = %confirmed,
                "New state"
            ),
            Err(e) => tracing::error!(
                topic = %topic_root,
                phase = ?operation.phase(),
                error = %e,
                "MQTT command failed"
            ),
        }

        outcome.map(StateResult::new)
    }

    async fn run(
        &self,
        session: &mut SessionGuard<C::Session>,
        operation: &mut PendingOperation,
        topic_root: &str,
        command: &PowerCommand,
    ) -> Result<PowerState, Error> {
        let result = self.publish(session, operation, topic_root, command).await;
        if let Err(e) = result {
            operation.fail();
            return Err(e);
        }
        operation.advance(OperationPhase::AwaitingConfirmation);

        let timeout = self.config.confirmation_timeout();
        let deadline = sleep_until(Instant::now() + timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                event = session.next_event() => {
                    if let Some(outcome) = operation.on_event(event) {
                        return outcome;
                    }
                }
                () = &mut deadline => {
                    operation.fail();
                    return Err(Error::ConfirmationTimeout {
                        topic: operation.status_topic().to_string(),
                        timeout,
                    });
                }
            }
        }
    }

    async fn publish(
        &self,
        session: &mut SessionGuard<C::Session>,
        operation: &PendingOperation,
        topic_root: &str,
        command: &PowerCommand,
    ) -> Result<(), Error> {
        session.subscribe(operation.status_topic()).await?;

        let topic = command.mqtt_topic(topic_root);
        let payload = command.mqtt_payload();
        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT command");
        session.publish(&topic, &payload).await?;
        Ok(())
    }
}
