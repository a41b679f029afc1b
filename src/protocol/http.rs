// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP state driver.
//!
//! Uses the device web API endpoint `/cm?cmnd=<command>`. One call is one
//! GET; the device replies with its resulting state in the body.

use std::net::Ipv4Addr;

use reqwest::Client;

use crate::command::{Command, PowerCommand};
use crate::config::HttpConfig;
use crate::error::{Error, TransportError};
use crate::identifier::parse_ipv4;
use crate::response::PowerResponse;
use crate::types::{PowerState, StateResult};

/// Sets power state over HTTP.
///
/// # Examples
///
/// ```no_run
/// use sonoff_bridge::config::HttpConfig;
/// use sonoff_bridge::protocol::HttpDriver;
/// use sonoff_bridge::PowerState;
///
/// # async fn example() -> sonoff_bridge::Result<()> {
/// let driver = HttpDriver::new(HttpConfig::new())?;
/// let result = driver.set_state("192.168.1.100", "1", PowerState::On).await?;
/// println!("relay 1 is now {}", result.confirmed());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpDriver {
    client: Client,
    config: HttpConfig,
}

impl HttpDriver {
    /// Creates a driver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be created.
    pub fn new(config: HttpConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self { client, config })
    }

    /// Drives output `sub_index` of the device at `address` to `state` and
    /// returns the state the device reports back.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if `address` is not a dotted-quad IPv4
    ///   address; no request is made.
    /// - [`Error::Transport`] if the request fails or the status is not 2xx.
    /// - [`Error::MalformedResponse`] if the body has no `POWER<idx>` field
    ///   holding `ON` or `OFF`.
    pub async fn set_state(
        &self,
        address: &str,
        sub_index: &str,
        state: PowerState,
    ) -> Result<StateResult, Error> {
        let ip = parse_ipv4(address).inspect_err(|_| {
            tracing::error!(address = %address, "Device address is not an IPv4 address");
        })?;

        let command = PowerCommand::new(sub_index, state);
        let url = self.build_url(ip, &command);

        // The URL can carry credentials; only the address is logged.
        tracing::debug!(
            address = %address,
            command = %command.to_http_command(),
            "Sending HTTP command"
        );

        let body = self.fetch(&url).await.inspect_err(|e| {
            tracing::error!(
                address = %address,
                sub_index = %sub_index,
                error = %e,
                "HTTP command failed"
            );
        })?;

        tracing::debug!(body = %body, "Received HTTP response");

        let confirmed = PowerResponse::parse(body)
            .state(sub_index)
            .inspect_err(|e| {
                tracing::error!(error = %e, "Unexpected HTTP response");
            })?;

        tracing::info!(address = %address, sub_index = %sub_index, state = %confirmed, "New state");

        Ok(StateResult::new(confirmed))
    }

    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let response = self.client.get(url).send().await.map_err(redact)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response.text().await.map_err(redact)
    }

    /// Builds the command URL for a device.
    fn build_url(&self, ip: Ipv4Addr, command: &PowerCommand) -> String {
        let port_suffix = if self.config.port() == HttpConfig::DEFAULT_PORT {
            String::new()
        } else {
            format!(":{}", self.config.port())
        };
        let encoded_command = urlencoding::encode(&command.to_http_command()).into_owned();

        match self.config.credentials() {
            Some((username, password)) => format!(
                "http://{ip}{port_suffix}/cm?user={}&password={}&cmnd={encoded_command}",
                urlencoding::encode(username),
                urlencoding::encode(password),
            ),
            None => format!("http://{ip}{port_suffix}/cm?cmnd={encoded_command}"),
        }
    }
}

/// Drops the request URL from a client error.
fn redact(error: reqwest::Error) -> TransportError {
    TransportError::Http(error.without_url())
}
