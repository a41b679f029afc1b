// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-related types for binary devices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// The power state of a binary output.
///
/// # Examples
///
/// ```
/// use sonoff_bridge::PowerState;
///
/// assert_eq!(PowerState::On.as_num(), 1);
/// assert_eq!(PowerState::Off.command_payload(), "off");
/// assert_eq!(PowerState::from_report("ON"), Some(PowerState::On));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// Output is off.
    Off,
    /// Output is on.
    On,
}

impl PowerState {
    /// Returns the state as reported by the device (`ON`/`OFF`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the numeric value (0 or 1).
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Returns the payload used when commanding the device (`on`/`off`).
    #[must_use]
    pub const fn command_payload(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Parses a state reported in an HTTP response body.
    ///
    /// Only the exact strings `ON` and `OFF` are accepted.
    #[must_use]
    pub fn from_report(s: &str) -> Option<Self> {
        match s {
            "ON" => Some(Self::On),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }

    /// Parses the payload of a `stat/<topic>/POWER<idx>` message.
    ///
    /// `ON` means on; any other payload is read as off.
    #[must_use]
    pub fn from_status_payload(payload: &str) -> Self {
        if payload == "ON" { Self::On } else { Self::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for PowerState {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(ValueError::InvalidPowerValue(other)),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// A request to drive a device into a given state.
///
/// Deserializes from `{"value": 0}` or `{"value": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawValue")]
pub struct StateRequest {
    desired: PowerState,
}

impl StateRequest {
    /// Creates a request for the given state.
    #[must_use]
    pub const fn new(desired: PowerState) -> Self {
        Self { desired }
    }

    /// Returns the requested state.
    #[must_use]
    pub const fn desired(&self) -> PowerState {
        self.desired
    }
}

impl From<PowerState> for StateRequest {
    fn from(desired: PowerState) -> Self {
        Self::new(desired)
    }
}

impl TryFrom<u8> for StateRequest {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PowerState::try_from(value).map(Self::new)
    }
}

/// The state a device reported after a command.
///
/// This is always taken from the device's own acknowledgment, never copied
/// from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "RawValue")]
pub struct StateResult {
    confirmed: PowerState,
}

impl StateResult {
    /// Creates a result from a device-reported state.
    #[must_use]
    pub const fn new(confirmed: PowerState) -> Self {
        Self { confirmed }
    }

    /// Returns the confirmed state.
    #[must_use]
    pub const fn confirmed(&self) -> PowerState {
        self.confirmed
    }

    /// Returns the confirmed state as 0 or 1.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.confirmed.as_num()
    }
}

/// Wire form shared by [`StateRequest`] and [`StateResult`].
#[derive(Serialize, Deserialize)]
struct RawValue {
    value: u8,
}

impl TryFrom<RawValue> for StateRequest {
    type Error = ValueError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        Self::try_from(raw.value)
    }
}

impl From<StateResult> for RawValue {
    fn from(result: StateResult) -> Self {
        Self {
            value: result.value(),
        }
    }
}
