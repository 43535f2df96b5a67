//! Builder for constructing PropertyChangeListener instances.

use crate::core::listener::Instruments;
use crate::core::{ObjectId, PropertyAddress, PropertyChangeListener};
use crate::error::{ListenerError, Result};
use crate::notify::PropertyObserver;
use crate::subsystem::PropertySubsystem;
use std::sync::{Arc, Weak};

#[cfg(feature = "metrics")]
use crate::metrics::ListenerMetrics;

#[cfg(feature = "settings")]
use crate::settings::ListenerSettings;

/// Builder for constructing a [`PropertyChangeListener`].
///
/// # Examples
///
/// ```rust
/// use audio_property_listener::prelude::*;
/// use std::sync::Arc;
///
/// # fn example() -> Result<()> {
/// let subsystem = Arc::new(SimulatedSubsystem::new());
/// let observer = observer_fn(|_, address| println!("changed: {}", address));
///
/// let listener = PropertyChangeListener::builder(subsystem)
///     .target(ObjectId(42))
///     .observer(&observer)
///     .start_immediately(true)
///     .build()?;
///
/// assert!(listener.is_listening());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct PropertyChangeListenerBuilder {
    subsystem: Arc<dyn PropertySubsystem>,
    target: Option<ObjectId>,
    address: PropertyAddress,
    observer: Option<Weak<dyn PropertyObserver>>,
    start_immediately: bool,
    #[cfg(feature = "metrics")]
    metrics: Option<ListenerMetrics>,
}

impl PropertyChangeListenerBuilder {
    /// Create a new builder for listeners on `subsystem`.
    pub fn new(subsystem: Arc<dyn PropertySubsystem>) -> Self {
        Self {
            subsystem,
            target: None,
            address: PropertyAddress::WILDCARD,
            observer: None,
            start_immediately: false,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Set the object to observe. Required.
    pub fn target(mut self, target: impl Into<ObjectId>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Narrow the subscription to `address`.
    ///
    /// Defaults to [`PropertyAddress::WILDCARD`], i.e. every property.
    pub fn address(mut self, address: PropertyAddress) -> Self {
        self.address = address;
        self
    }

    /// Set the initial observer. Only a weak reference is kept.
    pub fn observer<O>(mut self, observer: &Arc<O>) -> Self
    where
        O: PropertyObserver + 'static,
    {
        let weak: Weak<dyn PropertyObserver> = Arc::downgrade(observer) as Weak<dyn PropertyObserver>;
        self.observer = Some(weak);
        self
    }

    /// Call [`PropertyChangeListener::start`] as part of [`build`](Self::build).
    pub fn start_immediately(mut self, start: bool) -> Self {
        self.start_immediately = start;
        self
    }

    /// Apply target, address and start behaviour from loaded settings.
    #[cfg(feature = "settings")]
    pub fn with_settings(mut self, settings: &ListenerSettings) -> Self {
        self.target = Some(ObjectId(settings.target));
        self.address = settings.property_address();
        self.start_immediately = settings.start_immediately;
        self
    }

    /// Record listener activity with OpenTelemetry metrics.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: ListenerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the listener.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No target was set ([`ListenerError::Configuration`])
    /// - `start_immediately` is set and [`PropertyChangeListener::start`] fails
    pub fn build(self) -> Result<PropertyChangeListener> {
        let target = self
            .target
            .ok_or_else(|| ListenerError::Configuration("no target object specified".to_string()))?;

        #[cfg(feature = "metrics")]
        let instruments = match self.metrics {
            Some(metrics) => Instruments::with_metrics(metrics),
            None => Instruments::default(),
        };
        #[cfg(not(feature = "metrics"))]
        let instruments = Instruments::default();

        let listener =
            PropertyChangeListener::from_parts(self.subsystem, target, self.address, instruments);

        if let Some(observer) = self.observer {
            listener.set_observer_weak(observer);
        }

        if self.start_immediately {
            listener.start()?;
        }

        Ok(listener)
    }
}
