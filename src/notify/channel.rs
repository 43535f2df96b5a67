//! Forwarding property changes into a tokio channel.

use super::PropertyObserver;
use crate::core::{ListenerRef, ObjectId, PropertyAddress, ProcId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// A property change, detached from the delivery thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyEvent {
    /// The object whose property changed.
    pub object: ObjectId,
    /// The changed property.
    pub address: PropertyAddress,
    /// The listener that received the change.
    pub proc_id: ProcId,
}

enum EventSender {
    Unbounded(mpsc::UnboundedSender<PropertyEvent>),
    Bounded(mpsc::Sender<PropertyEvent>),
}

/// Observer that hands every event to async code through a channel.
///
/// Sending never blocks the delivery thread: the unbounded flavour always
/// accepts, the bounded flavour drops events when the channel is full.
///
/// # Examples
///
/// ```rust,no_run
/// use audio_property_listener::prelude::*;
/// use audio_property_listener::notify::ChannelObserver;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<()> {
/// let subsystem = Arc::new(SimulatedSubsystem::new());
/// let (observer, mut rx) = ChannelObserver::unbounded();
///
/// let listener = PropertyChangeListener::builder(subsystem)
///     .target(ObjectId(42))
///     .observer(&observer)
///     .start_immediately(true)
///     .build()?;
///
/// while let Some(event) = rx.recv().await {
///     println!("{} changed {}", event.object, event.address);
/// }
/// # drop(listener);
/// # Ok(())
/// # }
/// ```
pub struct ChannelObserver {
    sender: EventSender,
    dropped: AtomicU64,
}

impl ChannelObserver {
    /// Create an observer backed by an unbounded channel.
    pub fn unbounded() -> (Arc<Self>, mpsc::UnboundedReceiver<PropertyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let observer = Self {
            sender: EventSender::Unbounded(tx),
            dropped: AtomicU64::new(0),
        };
        (Arc::new(observer), rx)
    }

    /// Create an observer backed by a channel holding at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn bounded(capacity: usize) -> (Arc<Self>, mpsc::Receiver<PropertyEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let observer = Self {
            sender: EventSender::Bounded(tx),
            dropped: AtomicU64::new(0),
        };
        (Arc::new(observer), rx)
    }

    /// Number of events discarded because the channel was full or closed.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl PropertyObserver for ChannelObserver {
    fn property_changed(&self, listener: &ListenerRef<'_>, address: PropertyAddress) {
        let event = PropertyEvent {
            object: listener.target_id(),
            address,
            proc_id: listener.proc_id(),
        };

        let sent = match &self.sender {
            EventSender::Unbounded(tx) => tx.send(event).is_ok(),
            EventSender::Bounded(tx) => tx.try_send(event).is_ok(),
        };

        if !sent {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(object = %event.object, address = %event.address, "Event channel full or closed, dropping event");
        }
    }
}
