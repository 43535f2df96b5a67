//! Decoding raw addresses into caller-defined notification types.

use super::PropertyObserver;
use crate::core::{ListenerRef, ObjectId, PropertyAddress};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A caller-defined notification decoded from a changed property address.
///
/// The listener itself attaches no meaning to addresses; implement this trait
/// to map the selectors your application cares about onto your own type.
///
/// # Examples
///
/// ```rust
/// use audio_property_listener::core::{FourCharCode, ObjectId, PropertyAddress};
/// use audio_property_listener::notify::PropertyNotification;
///
/// enum DeviceChange {
///     SampleRate,
///     Name,
/// }
///
/// impl PropertyNotification for DeviceChange {
///     fn from_address(_object: ObjectId, address: &PropertyAddress) -> Option<Self> {
///         match &address.selector.as_bytes() {
///             b"nsrt" => Some(DeviceChange::SampleRate),
///             b"lnam" => Some(DeviceChange::Name),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait PropertyNotification: Sized {
    /// Decode `address`, or return `None` to ignore it.
    fn from_address(object: ObjectId, address: &PropertyAddress) -> Option<Self>;
}

/// Observer that decodes each address into `N` and passes it to a handler.
///
/// Addresses `N` does not recognize are counted and ignored.
pub struct TypedObserver<N, F> {
    handler: F,
    ignored: AtomicU64,
    _notification: PhantomData<fn() -> N>,
}

impl<N, F> TypedObserver<N, F>
where
    N: PropertyNotification,
    F: Fn(N) + Send + Sync,
{
    /// Create a shared typed observer.
    pub fn new(handler: F) -> Arc<Self> {
        Arc::new(Self {
            handler,
            ignored: AtomicU64::new(0),
            _notification: PhantomData,
        })
    }

    /// Number of addresses that did not decode into `N`.
    pub fn ignored_events(&self) -> u64 {
        self.ignored.load(Ordering::Relaxed)
    }
}

impl<N, F> PropertyObserver for TypedObserver<N, F>
where
    N: PropertyNotification,
    F: Fn(N) + Send + Sync,
{
    fn property_changed(&self, listener: &ListenerRef<'_>, address: PropertyAddress) {
        match N::from_address(listener.target_id(), &address) {
            Some(notification) => (self.handler)(notification),
            None => {
                self.ignored.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FourCharCode, PropertyChangeListener, scope};
    use crate::subsystem::SimulatedSubsystem;
    use parking_lot::Mutex;

    #[derive(Debug, PartialEq)]
    enum StreamChange {
        IsActive,
        PhysicalFormat { scope: FourCharCode },
    }

    impl PropertyNotification for StreamChange {
        fn from_address(_object: ObjectId, address: &PropertyAddress) -> Option<Self> {
            match &address.selector.as_bytes() {
                b"sact" => Some(StreamChange::IsActive),
                b"pft " => Some(StreamChange::PhysicalFormat { scope: address.scope }),
                _ => None,
            }
        }
    }

    #[test]
    fn test_decodes_known_and_ignores_unknown() {
        let subsystem = Arc::new(SimulatedSubsystem::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        let observer = TypedObserver::new(move |change: StreamChange| sink.lock().push(change));

        let listener = PropertyChangeListener::new(subsystem.clone(), ObjectId(11));
        listener.set_observer(&observer);
        listener.start().unwrap();

        let active = PropertyAddress::new(FourCharCode::from_bytes(*b"sact"));
        let format = PropertyAddress::new(FourCharCode::from_bytes(*b"pft ")).with_scope(scope::INPUT);
        let unknown = PropertyAddress::new(FourCharCode::from_bytes(*b"zzzz"));

        subsystem.deliver(ObjectId(11), &[active, unknown, format]);

        assert_eq!(
            *received.lock(),
            vec![
                StreamChange::IsActive,
                StreamChange::PhysicalFormat { scope: scope::INPUT },
            ]
        );
        assert_eq!(observer.ignored_events(), 1);
    }
}
