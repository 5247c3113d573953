// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel carrying [`BridgeEvent`]s.

use tokio::sync::broadcast;

use super::BridgeEvent;

const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of bridge events to any number of host listeners.
///
/// A listener that falls more than the capacity behind loses the oldest
/// events and sees `RecvError::Lagged`; the bridge never blocks on a slow
/// listener.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per listener.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Dropped silently when nobody listens.
    pub fn publish(&self, event: BridgeEvent) {
        tracing::trace!(?event, "Publishing bridge event");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutletIndex;

    #[test]
    fn publish_without_listeners_is_harmless() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(BridgeEvent::Refreshed { changed: true });
    }

    #[tokio::test]
    async fn every_listener_gets_each_event() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = BridgeEvent::OutletChanged {
            outlet: OutletIndex::new(3).unwrap(),
            on: false,
        };
        bus.publish(event.clone());

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn slow_listener_lags_instead_of_blocking() {
        let bus = EventBus::with_capacity(1);
        let mut rx = bus.subscribe();
        bus.publish(BridgeEvent::Refreshed { changed: true });
        bus.publish(BridgeEvent::Refreshed { changed: false });

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            BridgeEvent::Refreshed { changed: false }
        );
    }
}
