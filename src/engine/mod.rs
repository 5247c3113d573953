// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The refresh and command engine.
//!
//! - [`Reconciler`] fetches the device status and merges it into the
//!   [`StateStore`](crate::state::StateStore).
//! - [`CommandExecutor`] validates outlet commands, applies them
//!   optimistically and forwards them to the device.
//! - [`PollScheduler`] owns the single cancellable poll timer. Every
//!   command pushes the next poll out by one full interval.
//!
//! Every device call made here is bounded by the configured command
//! timeout. A call that outlives it fails with
//! [`ProtocolError::Timeout`].

mod executor;
mod reconciler;
mod scheduler;

pub use executor::CommandExecutor;
pub use reconciler::Reconciler;
pub use scheduler::PollScheduler;

use std::future::Future;
use std::time::Duration;

use crate::error::ProtocolError;

/// Runs a device call, failing with `ProtocolError::Timeout` after `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::Timeout(
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn bounded_passes_through_fast_calls() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, ProtocolError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_keeps_call_errors() {
        let result: Result<(), _> = bounded(Duration::from_secs(1), async {
            Err(ProtocolError::AuthenticationFailed)
        })
        .await;
        assert!(matches!(result, Err(ProtocolError::AuthenticationFailed)));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_times_out_stuck_calls() {
        let result: Result<(), _> = bounded(
            Duration::from_millis(1500),
            std::future::pending::<Result<(), ProtocolError>>(),
        )
        .await;
        assert!(matches!(result, Err(ProtocolError::Timeout(1500))));
    }
}
