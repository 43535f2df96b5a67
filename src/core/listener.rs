//! The property-change listener and its subsystem callback adapter.

use crate::core::{ObjectId, PropertyAddress, PropertyChangeListenerBuilder, Status};
use crate::error::{ListenerError, Result};
use crate::notify::observer::ObserverSlot;
use crate::notify::PropertyObserver;
use crate::subsystem::PropertySubsystem;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

#[cfg(feature = "metrics")]
use crate::metrics::ListenerMetrics;

static NEXT_PROC_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of one listener instance within the subsystem.
///
/// Registration and unregistration are keyed by `(object, address, ProcId)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcId(u64);

impl ProcId {
    fn next() -> Self {
        ProcId(NEXT_PROC_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proc({})", self.0)
    }
}

/// State shared between the control path and the delivery path.
pub(crate) struct Shared {
    target: ObjectId,
    address: PropertyAddress,
    proc_id: ProcId,
    listening: AtomicBool,
    observer: ObserverSlot,
    instruments: Instruments,
}

/// Listens for property changes on one hardware object and forwards each
/// changed address to the registered observer.
///
/// The listener starts out stopped. [`start`](Self::start) registers a
/// subscription with the subsystem, [`stop`](Self::stop) removes it, and
/// dropping a listening instance stops it.
///
/// # Examples
///
/// ```rust
/// use audio_property_listener::prelude::*;
/// use std::sync::Arc;
///
/// # fn example() -> Result<()> {
/// let subsystem = Arc::new(SimulatedSubsystem::new());
/// let listener = PropertyChangeListener::new(subsystem.clone(), ObjectId(42));
///
/// let observer = observer_fn(|listener, address| {
///     println!("{} changed on {}", address, listener.target_id());
/// });
/// listener.set_observer(&observer);
///
/// listener.start()?;
/// assert!(listener.is_listening());
///
/// listener.stop()?;
/// assert!(!listener.is_listening());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct PropertyChangeListener {
    shared: Arc<Shared>,
    subsystem: Arc<dyn PropertySubsystem>,
    /// Serializes start/stop. Held only across the subsystem call.
    control: Mutex<()>,
}

impl PropertyChangeListener {
    /// Create a stopped listener bound to `target`, subscribing to every
    /// property of the object.
    ///
    /// Performs no subsystem interaction.
    pub fn new(subsystem: Arc<dyn PropertySubsystem>, target: ObjectId) -> Self {
        Self::from_parts(subsystem, target, PropertyAddress::WILDCARD, Instruments::default())
    }

    /// Create a builder for configuring a listener.
    pub fn builder(subsystem: Arc<dyn PropertySubsystem>) -> PropertyChangeListenerBuilder {
        PropertyChangeListenerBuilder::new(subsystem)
    }

    pub(crate) fn from_parts(
        subsystem: Arc<dyn PropertySubsystem>,
        target: ObjectId,
        address: PropertyAddress,
        instruments: Instruments,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                target,
                address,
                proc_id: ProcId::next(),
                listening: AtomicBool::new(false),
                observer: ObserverSlot::empty(),
                instruments,
            }),
            subsystem,
            control: Mutex::new(()),
        }
    }

    /// The observed object.
    pub fn target_id(&self) -> ObjectId {
        self.shared.target
    }

    /// The address registered with the subsystem.
    pub fn address(&self) -> PropertyAddress {
        self.shared.address
    }

    /// This listener's identity in the subsystem.
    pub fn proc_id(&self) -> ProcId {
        self.shared.proc_id
    }

    /// Returns true while a subscription is registered.
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::Acquire)
    }

    /// Register the subscription with the subsystem.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::AlreadyListening`] if already started; no subsystem
    ///   call is made.
    /// - [`ListenerError::Subsystem`] with the unchanged status if the
    ///   subsystem rejects the registration. The listener stays stopped.
    pub fn start(&self) -> Result<()> {
        let _guard = self.control.lock();
        let shared = &self.shared;
        shared.instruments.start_attempt();

        if self.is_listening() {
            tracing::warn!(object = %shared.target, proc_id = %shared.proc_id, "Start called while already listening");
            shared.instruments.start_failure();
            return Err(ListenerError::AlreadyListening);
        }

        let status = self
            .subsystem
            .add_property_listener(shared.target, &shared.address, self.listener_proc());

        if let Err(err) = status.into_result() {
            tracing::error!(
                object = %shared.target,
                subsystem = %self.subsystem.name(),
                status = %status,
                "Failed to register property listener"
            );
            shared.instruments.start_failure();
            return Err(err);
        }

        shared.listening.store(true, Ordering::Release);
        shared.instruments.listening_changed(1);
        tracing::debug!(object = %shared.target, proc_id = %shared.proc_id, address = %shared.address, "Started listening");
        Ok(())
    }

    /// Remove the subscription from the subsystem.
    ///
    /// Deliveries stop being forwarded as soon as this is called, including
    /// ones already in flight on the delivery thread.
    ///
    /// Start/stop stay serialized across the subsystem call. If the subsystem
    /// blocks removal until in-flight callbacks return, do not call this from
    /// the listener's own observer on the delivery thread.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::AlreadyStopped`] if not started; no subsystem call
    ///   is made.
    /// - [`ListenerError::Subsystem`] with the unchanged status if the
    ///   subsystem rejects the removal. The listener is stopped regardless.
    pub fn stop(&self) -> Result<()> {
        let _guard = self.control.lock();
        let shared = &self.shared;
        shared.instruments.stop_attempt();

        if !self.is_listening() {
            tracing::warn!(object = %shared.target, proc_id = %shared.proc_id, "Stop called while not listening");
            shared.instruments.stop_failure();
            return Err(ListenerError::AlreadyStopped);
        }

        shared.listening.store(false, Ordering::Release);
        shared.instruments.listening_changed(-1);

        let status =
            self.subsystem
                .remove_property_listener(shared.target, &shared.address, shared.proc_id);

        if let Err(err) = status.into_result() {
            tracing::error!(
                object = %shared.target,
                subsystem = %self.subsystem.name(),
                status = %status,
                "Failed to unregister property listener"
            );
            shared.instruments.stop_failure();
            return Err(err);
        }

        tracing::debug!(object = %shared.target, proc_id = %shared.proc_id, "Stopped listening");
        Ok(())
    }

    /// Set the observer. Only a weak reference is kept.
    pub fn set_observer<O>(&self, observer: &Arc<O>)
    where
        O: PropertyObserver + 'static,
    {
        self.shared.observer.set(observer);
    }

    pub(crate) fn set_observer_weak(&self, observer: Weak<dyn PropertyObserver>) {
        self.shared.observer.set_weak(observer);
    }

    /// Remove the observer. Later deliveries are dropped.
    pub fn clear_observer(&self) {
        self.shared.observer.clear();
    }

    /// Returns true if an observer is set and still alive.
    pub fn has_observer(&self) -> bool {
        self.shared.observer.is_live()
    }

    /// The callback adapter registered with the subsystem.
    ///
    /// Exposed so subsystem implementations and tests can invoke it directly.
    pub fn listener_proc(&self) -> ListenerProc {
        ListenerProc {
            id: self.shared.proc_id,
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Drop for PropertyChangeListener {
    fn drop(&mut self) {
        if !self.is_listening() {
            return;
        }

        if let Err(e) = self.stop() {
            tracing::warn!(object = %self.shared.target, error = %e, "Failed to stop listener on drop");
        }
    }
}

impl fmt::Debug for PropertyChangeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangeListener")
            .field("target", &self.shared.target)
            .field("address", &self.shared.address)
            .field("proc_id", &self.shared.proc_id)
            .field("listening", &self.is_listening())
            .field("subsystem", &self.subsystem.name())
            .finish()
    }
}

/// Callback handed to the subsystem in place of a function pointer plus
/// opaque context.
///
/// Holds only a weak reference to the listener, so a registration that
/// outlives its listener resolves to nothing instead of freed state.
#[derive(Clone)]
pub struct ListenerProc {
    id: ProcId,
    shared: Weak<Shared>,
}

impl ListenerProc {
    /// Identity of the listener this proc belongs to.
    pub fn id(&self) -> ProcId {
        self.id
    }

    /// Returns true if the owning listener still exists.
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Deliver a batch of changed addresses for `object`.
    ///
    /// Returns [`Status::BAD_OBJECT`] if the listener no longer exists and
    /// [`Status::NO_ERROR`] otherwise. Observer panics are contained and
    /// do not change the returned status.
    pub fn invoke(&self, object: ObjectId, addresses: &[PropertyAddress]) -> Status {
        let Some(shared) = self.shared.upgrade() else {
            tracing::trace!(proc_id = %self.id, object = %object, "Delivery for dropped listener");
            return Status::BAD_OBJECT;
        };

        if object != shared.target {
            tracing::debug!(proc_id = %self.id, object = %object, expected = %shared.target, "Ignoring delivery for another object");
            return Status::NO_ERROR;
        }

        for (index, address) in addresses.iter().enumerate() {
            if !shared.listening.load(Ordering::Acquire) {
                let remaining = addresses.len() - index;
                tracing::trace!(object = %object, dropped = remaining, "Listener stopped, dropping delivery");
                shared.instruments.events_dropped(remaining as u64);
                break;
            }

            let Some(observer) = shared.observer.load() else {
                shared.instruments.events_dropped(1);
                continue;
            };

            tracing::trace!(object = %object, address = %address, "Forwarding property change");
            let listener = ListenerRef { shared: &*shared };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                observer.property_changed(&listener, *address);
            }));

            match outcome {
                Ok(()) => shared.instruments.events_delivered(1),
                Err(_) => {
                    tracing::error!(object = %object, address = %address, "Observer panicked while handling property change");
                    shared.instruments.events_dropped(1);
                }
            }
        }

        Status::NO_ERROR
    }
}

impl fmt::Debug for ListenerProc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerProc")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// The listener as seen by an observer during a delivery.
pub struct ListenerRef<'a> {
    shared: &'a Shared,
}

impl ListenerRef<'_> {
    /// The observed object.
    pub fn target_id(&self) -> ObjectId {
        self.shared.target
    }

    /// The address the listener registered.
    pub fn address(&self) -> PropertyAddress {
        self.shared.address
    }

    /// Identity of the delivering listener.
    pub fn proc_id(&self) -> ProcId {
        self.shared.proc_id
    }

    /// Whether the listener is still listening.
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ListenerRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRef")
            .field("target", &self.shared.target)
            .field("proc_id", &self.shared.proc_id)
            .finish()
    }
}

/// Optional metric hooks; no-ops without the `metrics` feature.
#[derive(Clone, Default)]
pub(crate) struct Instruments {
    #[cfg(feature = "metrics")]
    metrics: Option<ListenerMetrics>,
}

impl Instruments {
    #[cfg(feature = "metrics")]
    pub(crate) fn with_metrics(metrics: ListenerMetrics) -> Self {
        Self {
            metrics: Some(metrics),
        }
    }

    fn start_attempt(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_start_attempt();
        }
    }

    fn start_failure(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_start_failure();
        }
    }

    fn stop_attempt(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_stop_attempt();
        }
    }

    fn stop_failure(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_stop_failure();
        }
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn listening_changed(&self, delta: i64) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_active_delta(delta);
        }
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn events_delivered(&self, count: u64) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_delivered(count);
        }
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn events_dropped(&self, count: u64) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_dropped(count);
        }
    }
}
