// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Relay hub: single producer -> N bounded subscriber queues.
//!
//! The receive loop publishes; each subscriber owns a dedicated crossbeam
//! channel. Delivery is lossy per subscriber: a full queue drops the event
//! for that subscriber only, and a disconnected receiver is pruned on the
//! next publish. The producer never blocks.

use super::RelayEvent;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default subscriber queue capacity. Sized for a burst of a full exercise
/// frame (hundreds of entities) without letting a dead consumer hoard memory.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

struct SubscriberEntry {
    id: u64,
    sender: Sender<RelayEvent>,
}

/// Shared fan-out point between the receive loop and its consumers.
///
/// Cloning the hub clones a handle to the same subscriber list.
#[derive(Clone)]
pub struct RelayHub {
    subscribers: Arc<Mutex<Vec<SubscriberEntry>>>,
    next_id: Arc<AtomicU64>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a subscriber with its own bounded queue.
    ///
    /// The handle unsubscribes itself on drop. If the subscriber stops
    /// polling, publishes to it drop once the queue fills.
    pub fn subscribe(&self, capacity: usize) -> SubscriberHandle {
        let (sender, receiver) = bounded(capacity.max(1));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers.lock().push(SubscriberEntry { id, sender });
        log::debug!("[RelayHub] subscriber {} attached (capacity {})", id, capacity);

        SubscriberHandle {
            id,
            receiver,
            hub: self.clone(),
        }
    }

    /// Broadcast an event to every live subscriber.
    ///
    /// Full queues drop the event for that subscriber; disconnected
    /// subscribers are removed here rather than on a separate sweep.
    pub fn publish(&self, event: &RelayEvent) {
        let mut subs = self.subscribers.lock();
        subs.retain(|entry| match entry.sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::debug!("[RelayHub] subscriber {} queue full, event dropped", entry.id);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("[RelayHub] subscriber {} disconnected, pruning", entry.id);
                false
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn unsubscribe(&self, id: u64) {
        let mut subs = self.subscribers.lock();
        let before = subs.len();
        subs.retain(|entry| entry.id != id);
        if subs.len() < before {
            log::debug!("[RelayHub] subscriber {} detached", id);
        }
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of one subscription. Dropping it detaches the subscriber
/// from the hub.
pub struct SubscriberHandle {
    id: u64,
    receiver: Receiver<RelayEvent>,
    hub: RelayHub,
}

impl SubscriberHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Non-blocking poll; `None` when the queue is empty.
    pub fn try_recv(&self) -> Option<RelayEvent> {
        self.receiver.try_recv().ok()
    }

    /// Block up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<RelayEvent, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Queue depth right now, for backpressure telemetry.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
