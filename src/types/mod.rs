// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types exchanged with callers.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state of a binary output
//! - [`StateRequest`] - The state a caller wants
//! - [`StateResult`] - The state the device confirmed
//! - [`DeviceTypeDescriptor`] - Output type, identifier and protocol of a device

mod descriptor;
mod power;

pub use descriptor::{DeviceType, DeviceTypeDescriptor, ProtocolKind};
pub use power::{PowerState, StateRequest, StateResult};
