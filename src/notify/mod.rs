//! Observer capabilities for consuming property-change events.
//!
//! A listener forwards each changed address to one [`PropertyObserver`].
//! Besides implementing the trait directly, events can be handled by a
//! closure ([`observer_fn`]), decoded into a user-defined notification type
//! ([`TypedObserver`]), or forwarded into an async channel
//! (`ChannelObserver`, feature `channel`).

pub(crate) mod observer;
mod typed;

#[cfg(feature = "channel")]
mod channel;

pub use observer::{observer_fn, FnObserver, PropertyObserver};
pub use typed::{PropertyNotification, TypedObserver};

#[cfg(feature = "channel")]
pub use channel::{ChannelObserver, PropertyEvent};
