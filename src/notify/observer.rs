//! Observer capability and the non-owning observer slot.

use crate::core::{ListenerRef, PropertyAddress};
use arc_swap::ArcSwapOption;
use std::sync::{Arc, Weak};

/// Receives property-change events from a
/// [`PropertyChangeListener`](crate::core::PropertyChangeListener).
///
/// Called once per changed address, synchronously, on the subsystem's
/// delivery thread. Implementations must not assume any particular thread and
/// should hand long-running work off elsewhere.
///
/// Calling [`stop`](crate::core::PropertyChangeListener::stop) on the
/// delivering listener from inside this callback is only safe when the
/// subsystem's removal does not wait for in-flight callbacks. Hardware layers
/// that do wait will deadlock; move the stop to another thread for those.
pub trait PropertyObserver: Send + Sync {
    /// Called for each changed property address, in the order the subsystem
    /// reported them.
    fn property_changed(&self, listener: &ListenerRef<'_>, address: PropertyAddress);
}

/// Closure-backed observer.
///
/// # Examples
///
/// ```rust
/// use audio_property_listener::notify::observer_fn;
///
/// let observer = observer_fn(|listener, address| {
///     println!("object {} changed {}", listener.target_id(), address);
/// });
/// # drop(observer);
/// ```
pub struct FnObserver<F> {
    handler: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&ListenerRef<'_>, PropertyAddress) + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> PropertyObserver for FnObserver<F>
where
    F: Fn(&ListenerRef<'_>, PropertyAddress) + Send + Sync,
{
    fn property_changed(&self, listener: &ListenerRef<'_>, address: PropertyAddress) {
        (self.handler)(listener, address)
    }
}

/// Create a shared closure observer.
///
/// The listener only keeps a weak reference, so the caller must hold on to
/// the returned `Arc` for as long as events should be delivered.
pub fn observer_fn<F>(handler: F) -> Arc<FnObserver<F>>
where
    F: Fn(&ListenerRef<'_>, PropertyAddress) + Send + Sync + 'static,
{
    Arc::new(FnObserver::new(handler))
}

struct WeakObserver(Weak<dyn PropertyObserver>);

/// Atomically swappable, non-owning reference to an observer.
///
/// Readers on the delivery thread never observe a partially-updated
/// reference, and the slot never keeps the observer alive.
pub(crate) struct ObserverSlot {
    inner: ArcSwapOption<WeakObserver>,
}

impl ObserverSlot {
    pub(crate) fn empty() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    pub(crate) fn set<O>(&self, observer: &Arc<O>)
    where
        O: PropertyObserver + 'static,
    {
        let weak: Weak<dyn PropertyObserver> = Arc::downgrade(observer) as Weak<dyn PropertyObserver>;
        self.inner.store(Some(Arc::new(WeakObserver(weak))));
    }

    pub(crate) fn set_weak(&self, weak: Weak<dyn PropertyObserver>) {
        self.inner.store(Some(Arc::new(WeakObserver(weak))));
    }

    pub(crate) fn clear(&self) {
        self.inner.store(None);
    }

    /// Resolve the observer for one dispatch. `None` if unset or already dropped.
    pub(crate) fn load(&self) -> Option<Arc<dyn PropertyObserver>> {
        let guard = self.inner.load();
        Option::as_ref(&*guard).and_then(|slot| slot.0.upgrade())
    }

    pub(crate) fn is_live(&self) -> bool {
        let guard = self.inner.load();
        Option::as_ref(&*guard).is_some_and(|slot| slot.0.strong_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ListenerRef;

    struct Nop;

    impl PropertyObserver for Nop {
        fn property_changed(&self, _listener: &ListenerRef<'_>, _address: PropertyAddress) {}
    }

    #[test]
    fn test_slot_starts_empty() {
        let slot = ObserverSlot::empty();
        assert!(slot.load().is_none());
        assert!(!slot.is_live());
    }

    #[test]
    fn test_slot_does_not_extend_lifetime() {
        let slot = ObserverSlot::empty();
        let observer = Arc::new(Nop);
        slot.set(&observer);

        assert!(slot.is_live());
        assert_eq!(Arc::strong_count(&observer), 1);

        drop(observer);
        assert!(!slot.is_live());
        assert!(slot.load().is_none());
    }

    #[test]
    fn test_slot_clear() {
        let slot = ObserverSlot::empty();
        let observer = Arc::new(Nop);
        slot.set(&observer);
        slot.clear();
        assert!(slot.load().is_none());
    }

    #[test]
    fn test_slot_replace() {
        let slot = ObserverSlot::empty();
        let first = Arc::new(Nop);
        let second = Arc::new(Nop);

        slot.set(&first);
        slot.set(&second);
        drop(first);

        assert!(slot.is_live());
    }
}
