// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power control command.

use crate::command::Command;
use crate::types::PowerState;

/// Command to set the power state of one output.
///
/// The sub-index is appended verbatim; an empty sub-index addresses the
/// device's default relay.
///
/// # Examples
///
/// ```
/// use sonoff_bridge::command::{Command, PowerCommand};
/// use sonoff_bridge::PowerState;
///
/// let cmd = PowerCommand::new("", PowerState::Off);
/// assert_eq!(cmd.name(), "Power");
/// assert_eq!(cmd.status_topic("plugA"), "stat/plugA/POWER");
/// assert_eq!(cmd.response_field(), "POWER");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand {
    sub_index: String,
    state: PowerState,
}

impl PowerCommand {
    /// Creates a command driving output `sub_index` to `state`.
    #[must_use]
    pub fn new(sub_index: impl Into<String>, state: PowerState) -> Self {
        Self {
            sub_index: sub_index.into(),
            state,
        }
    }

    /// Returns the sub-index.
    #[must_use]
    pub fn sub_index(&self) -> &str {
        &self.sub_index
    }

    /// Returns the requested state.
    #[must_use]
    pub const fn state(&self) -> PowerState {
        self.state
    }

    /// Returns the JSON field carrying the resulting state, e.g. `POWER1`.
    #[must_use]
    pub fn response_field(&self) -> String {
        format!("POWER{}", self.sub_index)
    }

    /// Returns the topic on which the device reports the resulting state.
    #[must_use]
    pub fn status_topic(&self, topic_root: &str) -> String {
        format!("stat/{topic_root}/{}", self.response_field())
    }
}

impl Command for PowerCommand {
    fn name(&self) -> String {
        format!("Power{}", self.sub_index)
    }

    fn payload(&self) -> String {
        self.state.command_payload().to_string()
    }

    fn mqtt_topic_suffix(&self) -> String {
        format!("power{}", self.sub_index)
    }
}
