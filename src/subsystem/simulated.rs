//! In-memory subsystem that delivers notifications on demand.

use super::PropertySubsystem;
use crate::core::{ListenerProc, ObjectId, ProcId, PropertyAddress, Status};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

struct Registration {
    object: ObjectId,
    address: PropertyAddress,
    callback: ListenerProc,
}

/// A [`PropertySubsystem`] backed by an in-memory registration table.
///
/// Notifications are injected with [`deliver`](Self::deliver) (on the calling
/// thread) or [`deliver_on_thread`](Self::deliver_on_thread) (on a separate
/// delivery thread, as real hardware layers do). Like a real hardware layer,
/// it rejects registering the same listener twice and removing a listener
/// that is not registered.
///
/// # Examples
///
/// ```rust
/// use audio_property_listener::prelude::*;
/// use std::sync::Arc;
///
/// let subsystem = Arc::new(SimulatedSubsystem::new());
/// let listener = PropertyChangeListener::new(subsystem.clone(), ObjectId(42));
/// listener.start().unwrap();
///
/// let volume = PropertyAddress::new(FourCharCode::from_bytes(*b"volm"));
/// assert_eq!(subsystem.deliver(ObjectId(42), &[volume]), 1);
/// ```
pub struct SimulatedSubsystem {
    registrations: Mutex<Vec<Registration>>,
    next_add_failure: Mutex<Option<Status>>,
    next_remove_failure: Mutex<Option<Status>>,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl SimulatedSubsystem {
    /// Create an empty subsystem.
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            next_add_failure: Mutex::new(None),
            next_remove_failure: Mutex::new(None),
            add_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        }
    }

    /// Make the next registration attempt fail with `status`.
    pub fn fail_next_add(&self, status: Status) {
        *self.next_add_failure.lock() = Some(status);
    }

    /// Make the next removal attempt fail with `status`.
    ///
    /// The registration is left in place, as if the removal never happened.
    pub fn fail_next_remove(&self, status: Status) {
        *self.next_remove_failure.lock() = Some(status);
    }

    /// Number of `add_property_listener` calls received, including failed ones.
    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    /// Number of `remove_property_listener` calls received, including failed ones.
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    /// Number of live registrations.
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Returns true if `proc_id` is registered for `object`.
    pub fn is_registered(&self, object: ObjectId, proc_id: ProcId) -> bool {
        self.registrations
            .lock()
            .iter()
            .any(|r| r.object == object && r.callback.id() == proc_id)
    }

    /// Deliver a batch of changed addresses for `object` on the calling thread.
    ///
    /// Each registration for `object` receives the addresses matching its
    /// registered address, in the order given. Registrations with no matching
    /// address are skipped. Returns the number of callbacks invoked.
    ///
    /// The registration table is not locked while callbacks run, so a
    /// callback may start or stop listeners.
    pub fn deliver(&self, object: ObjectId, addresses: &[PropertyAddress]) -> usize {
        let targets: Vec<(PropertyAddress, ListenerProc)> = self
            .registrations
            .lock()
            .iter()
            .filter(|r| r.object == object)
            .map(|r| (r.address, r.callback.clone()))
            .collect();

        let mut invoked = 0;
        for (registered, callback) in targets {
            let matching: Vec<PropertyAddress> = addresses
                .iter()
                .filter(|a| registered.matches(a))
                .copied()
                .collect();

            if matching.is_empty() {
                continue;
            }

            let status = callback.invoke(object, &matching);
            if !status.is_ok() {
                tracing::debug!(object = %object, proc_id = %callback.id(), status = %status, "Callback returned error status");
            }
            invoked += 1;
        }

        invoked
    }

    /// Deliver a batch from a freshly spawned delivery thread.
    pub fn deliver_on_thread(
        self: &Arc<Self>,
        object: ObjectId,
        addresses: Vec<PropertyAddress>,
    ) -> JoinHandle<usize> {
        let subsystem = Arc::clone(self);
        std::thread::spawn(move || subsystem.deliver(object, &addresses))
    }
}

impl Default for SimulatedSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySubsystem for SimulatedSubsystem {
    fn add_property_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        callback: ListenerProc,
    ) -> Status {
        self.add_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.next_add_failure.lock().take() {
            return status;
        }

        let mut registrations = self.registrations.lock();
        let duplicate = registrations.iter().any(|r| {
            r.object == object && r.address == *address && r.callback.id() == callback.id()
        });
        if duplicate {
            return Status::ILLEGAL_OPERATION;
        }

        registrations.push(Registration {
            object,
            address: *address,
            callback,
        });
        Status::NO_ERROR
    }

    fn remove_property_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        proc_id: ProcId,
    ) -> Status {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.next_remove_failure.lock().take() {
            return status;
        }

        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|r| {
            !(r.object == object && r.address == *address && r.callback.id() == proc_id)
        });

        if registrations.len() == before {
            Status::BAD_OBJECT
        } else {
            Status::NO_ERROR
        }
    }

    fn name(&self) -> String {
        "simulated".to_string()
    }
}
