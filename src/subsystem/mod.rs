//! The hardware subsystem boundary.
//!
//! The listener never talks to hardware directly. It registers a
//! [`ListenerProc`] with a [`PropertySubsystem`], and the subsystem invokes
//! that proc from its own delivery thread whenever a matching property
//! changes.

mod simulated;

pub use simulated::SimulatedSubsystem;

use crate::core::{ListenerProc, ObjectId, ProcId, PropertyAddress, Status};

/// A source of property-change notifications.
///
/// Implement this trait to bind the listener to a concrete hardware layer.
/// Registration identity is `(object, address, proc id)`: a removal must name
/// the same triple that was added.
pub trait PropertySubsystem: Send + Sync {
    /// Register `callback` to be invoked whenever a property of `object`
    /// matching `address` changes. Returns [`Status::NO_ERROR`] on success.
    fn add_property_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        callback: ListenerProc,
    ) -> Status;

    /// Reverse a previous [`add_property_listener`](Self::add_property_listener).
    fn remove_property_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        proc_id: ProcId,
    ) -> Status;

    /// Get a human-readable name for this subsystem (for logging/debugging).
    fn name(&self) -> String;
}
