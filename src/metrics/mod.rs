//! Built-in metrics for listener operations.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Start/stop attempts and failures
//! - Forwarded and dropped events
//! - Currently active listeners
//! - Time since the last forwarded event
//!
//! # Examples
//!
//! ```rust,no_run
//! use audio_property_listener::prelude::*;
//! use audio_property_listener::metrics::ListenerMetrics;
//! use opentelemetry::global;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<()> {
//! let metrics = ListenerMetrics::new(global::meter("my-app"));
//!
//! let listener = PropertyChangeListener::builder(Arc::new(SimulatedSubsystem::new()))
//!     .target(ObjectId(42))
//!     .with_metrics(metrics)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod listener_metrics;

pub use listener_metrics::ListenerMetrics;
