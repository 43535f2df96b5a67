//! # audio-property-listener
//!
//! Stateful, observer-driven listener for hardware object property-change
//! notifications.
//!
//! ## Overview
//!
//! Hardware layers report property changes through a C-style callback
//! registration: "call this function with this context whenever a property of
//! object X changes". `audio-property-listener` turns that into a small state
//! machine:
//! - [`start`](core::PropertyChangeListener::start) registers exactly one
//!   subscription, [`stop`](core::PropertyChangeListener::stop) removes it
//! - Double start and double stop are reported, not silently ignored
//! - Each changed address is forwarded, in order, to an observer held by weak
//!   reference
//! - Dropping a listening instance unregisters it
//!
//! ## Quick Start
//!
//! ```rust
//! use audio_property_listener::prelude::*;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<()> {
//! let subsystem = Arc::new(SimulatedSubsystem::new());
//! let listener = PropertyChangeListener::new(subsystem.clone(), ObjectId(42));
//!
//! let observer = observer_fn(|listener, address| {
//!     println!("object {} changed {}", listener.target_id(), address);
//! });
//! listener.set_observer(&observer);
//!
//! listener.start()?;
//! assert!(matches!(listener.start(), Err(ListenerError::AlreadyListening)));
//!
//! let sample_rate = PropertyAddress::new(FourCharCode::from_bytes(*b"nsrt"));
//! subsystem.deliver(ObjectId(42), &[sample_rate]);
//!
//! listener.stop()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `channel` (default): [`ChannelObserver`](notify::ChannelObserver) for
//!   consuming events from async code
//! - `settings` (default): layered file/environment listener settings
//! - `metrics`: OpenTelemetry instruments for listener activity

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod subsystem;

#[cfg(feature = "settings")]
pub mod settings;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        FourCharCode, ListenerRef, ObjectId, PropertyAddress, PropertyChangeListener,
        PropertyChangeListenerBuilder, Status,
    };
    pub use crate::error::{ListenerError, Result};
    pub use crate::notify::{PropertyObserver, observer_fn};
    pub use crate::subsystem::{PropertySubsystem, SimulatedSubsystem};

    #[cfg(feature = "settings")]
    pub use crate::settings::{ListenerSettings, SettingsLoader};
}
