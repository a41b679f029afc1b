// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! A command has a name carrying the relay sub-index (e.g. `Power1`) and a
//! payload (e.g. `on`). Over HTTP both travel in the `cmnd` query parameter;
//! over MQTT the name becomes the last topic segment and the payload the
//! message body.
//!
//! ```
//! use sonoff_bridge::command::{Command, PowerCommand};
//! use sonoff_bridge::PowerState;
//!
//! let cmd = PowerCommand::new("1", PowerState::On);
//! assert_eq!(cmd.to_http_command(), "Power1 on");
//! assert_eq!(cmd.mqtt_topic("plugA"), "cmnd/plugA/power1");
//! assert_eq!(cmd.mqtt_payload(), "on");
//! ```

mod power;

pub use power::PowerCommand;

/// A command that can be sent to a device.
pub trait Command {
    /// Returns the command name with any index suffix, e.g. `"Power1"`.
    fn name(&self) -> String;

    /// Returns the command payload.
    fn payload(&self) -> String;

    /// Returns the full command string for HTTP requests: `<name> <payload>`.
    fn to_http_command(&self) -> String {
        format!("{} {}", self.name(), self.payload())
    }

    /// Returns the MQTT topic suffix, the part after `cmnd/<topic>/`.
    fn mqtt_topic_suffix(&self) -> String {
        self.name()
    }

    /// Returns the full MQTT command topic for a device topic root.
    fn mqtt_topic(&self, topic_root: &str) -> String {
        format!("cmnd/{topic_root}/{}", self.mqtt_topic_suffix())
    }

    /// Returns the MQTT payload.
    fn mqtt_payload(&self) -> String {
        self.payload()
    }
}
