// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier decoding.
//!
//! Identifiers have the form `<primary>[_<sub-index>]`, where `primary` is an
//! IPv4 address (HTTP) or a topic root (MQTT) and `sub-index` selects one
//! relay on a multi-relay device.

use std::net::Ipv4Addr;

use crate::error::Error;

const DELIMITER: char = '_';

/// A decoded device identifier.
///
/// Parsing never fails; each protocol validates `primary` its own way.
///
/// # Examples
///
/// ```
/// use sonoff_bridge::Identifier;
///
/// let id = Identifier::parse("10.0.0.5_2");
/// assert_eq!(id.primary(), "10.0.0.5");
/// assert_eq!(id.sub_index(), "2");
///
/// let id = Identifier::parse("plugA");
/// assert_eq!(id.primary(), "plugA");
/// assert_eq!(id.sub_index(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    primary: String,
    sub_index: String,
}

impl Identifier {
    /// Splits a raw identifier on `_`.
    ///
    /// Segments after the second are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split(DELIMITER);
        let primary = segments.next().unwrap_or_default().to_string();
        let sub_index = segments.next().unwrap_or_default().to_string();
        Self { primary, sub_index }
    }

    /// Returns the address or topic root.
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Returns the sub-index, possibly empty.
    #[must_use]
    pub fn sub_index(&self) -> &str {
        &self.sub_index
    }

    /// Consumes the identifier, returning `(primary, sub_index)`.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.primary, self.sub_index)
    }
}

/// Validates a strict dotted-quad IPv4 address.
///
/// Four decimal octets in 0-255, no leading zeros, no port and no
/// surrounding whitespace.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] if `address` is not of that shape.
pub fn parse_ipv4(address: &str) -> Result<Ipv4Addr, Error> {
    address
        .parse::<Ipv4Addr>()
        .map_err(|_| Error::InvalidAddress(address.to_string()))
}
