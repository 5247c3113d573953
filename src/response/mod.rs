// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status payload parsing.
//!
//! [`StatusResponse`] mirrors the JSON printed by the status script.
//! [`StatusReport`] is the validated, typed form the reconciler merges into
//! the device state.

mod status;

pub use status::{StatusReport, StatusResponse};
