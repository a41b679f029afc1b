// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power response parsing.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::PowerState;

/// Response from a Power command over HTTP.
///
/// The device answers with a JSON object whose `POWER<idx>` field holds the
/// resulting state:
/// - `{"POWER": "ON"}` for the default relay
/// - `{"POWER1": "ON", "POWER2": "OFF"}` for multi-relay devices
///
/// # Examples
///
/// ```
/// use sonoff_bridge::response::PowerResponse;
/// use sonoff_bridge::PowerState;
///
/// let response = PowerResponse::parse(r#"{"POWER1": "OFF"}"#);
/// assert_eq!(response.state("1").unwrap(), PowerState::Off);
/// ```
#[derive(Debug, Clone)]
pub struct PowerResponse {
    body: String,
    fields: Option<Map<String, Value>>,
}

impl PowerResponse {
    /// Wraps a response body. A body that is not a JSON object is kept as
    /// is and reported by [`state`](Self::state).
    #[must_use]
    pub fn parse(body: impl Into<String>) -> Self {
        let body = body.into();
        let fields = serde_json::from_str::<Map<String, Value>>(&body).ok();
        Self { body, fields }
    }

    /// Returns the state reported for `sub_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] naming `POWER<sub_index>` if the
    /// body is not a JSON object, or the field is missing, is not a string,
    /// or is neither `ON` nor `OFF`.
    pub fn state(&self, sub_index: &str) -> Result<PowerState, Error> {
        let field = format!("POWER{sub_index}");
        self.fields
            .as_ref()
            .and_then(|fields| fields.get(&field))
            .and_then(Value::as_str)
            .and_then(PowerState::from_report)
            .ok_or_else(|| Error::MalformedResponse {
                field,
                body: self.body.clone(),
            })
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}
