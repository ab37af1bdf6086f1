// SPDX-License-Identifier: MIT

//! In-process event bus: any number of subscribers, each with its own
//! unbounded queue, so a slow subscriber never back-pressures a fast one
//! or the publisher.
//!
//! This is a genuine multicast: every subscription gets every event
//! published after it joined. There is no durability story here; the audit
//! log (`tenazas-storage`) is the durable record, and the bus is purely a
//! live fan-out.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tenazas_core::BusEvent;
use tokio::sync::mpsc;

/// Opaque handle returned by [`EventBus::subscribe`], needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A receiver-side handle to a single subscription's queue.
pub struct Subscription {
    pub id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<BusEvent>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.rx.recv().await
    }
}

/// Multi-subscriber broadcast of [`BusEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<BusEvent>>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a new subscriber. It receives every event published from
    /// this point forward, in publish order, until it unsubscribes or drops.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().insert(id, tx);
        Subscription {
            id: SubscriptionId(id),
            rx,
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().remove(&id.0);
    }

    /// Fan an event out to every live subscriber. A subscriber whose
    /// receiver has been dropped is pruned lazily on the next publish.
    pub fn publish(&self, event: BusEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
