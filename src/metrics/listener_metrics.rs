//! Listener metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Meter, UpDownCounter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for listener operations.
///
/// Cloning is cheap; clones report into the same instruments.
///
/// # Examples
///
/// ```rust,no_run
/// use audio_property_listener::metrics::ListenerMetrics;
/// use opentelemetry::global;
///
/// let meter = global::meter("audio-property-listener");
/// let metrics = ListenerMetrics::new(meter);
///
/// metrics.record_start_attempt();
/// metrics.record_delivered(3);
/// metrics.update_idle_time();
/// ```
#[derive(Clone)]
pub struct ListenerMetrics {
    start_attempts: Counter<u64>,
    start_failures: Counter<u64>,
    stop_attempts: Counter<u64>,
    stop_failures: Counter<u64>,
    events_delivered: Counter<u64>,
    events_dropped: Counter<u64>,
    active_listeners: UpDownCounter<i64>,
    idle_seconds: Gauge<i64>,
    last_event: Arc<parking_lot::Mutex<Instant>>,
}

impl ListenerMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let start_attempts = meter
            .u64_counter("property_listener.start.attempts")
            .with_description("Total number of start calls")
            .build();

        let start_failures = meter
            .u64_counter("property_listener.start.failures")
            .with_description("Number of rejected or failed start calls")
            .build();

        let stop_attempts = meter
            .u64_counter("property_listener.stop.attempts")
            .with_description("Total number of stop calls")
            .build();

        let stop_failures = meter
            .u64_counter("property_listener.stop.failures")
            .with_description("Number of rejected or failed stop calls")
            .build();

        let events_delivered = meter
            .u64_counter("property_listener.events.delivered")
            .with_description("Property changes forwarded to an observer")
            .build();

        let events_dropped = meter
            .u64_counter("property_listener.events.dropped")
            .with_description("Property changes not forwarded (no observer, stopped, or observer panic)")
            .build();

        let active_listeners = meter
            .i64_up_down_counter("property_listener.active")
            .with_description("Number of listeners currently subscribed")
            .build();

        let idle_seconds = meter
            .i64_gauge("property_listener.idle")
            .with_description("Time since the last forwarded property change in seconds")
            .with_unit("s")
            .build();

        Self {
            start_attempts,
            start_failures,
            stop_attempts,
            stop_failures,
            events_delivered,
            events_dropped,
            active_listeners,
            idle_seconds,
            last_event: Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Record a call to `start`.
    pub fn record_start_attempt(&self) {
        self.start_attempts.add(1, &[]);
    }

    /// Record a `start` that returned an error.
    pub fn record_start_failure(&self) {
        self.start_failures.add(1, &[]);
    }

    /// Record a call to `stop`.
    pub fn record_stop_attempt(&self) {
        self.stop_attempts.add(1, &[]);
    }

    /// Record a `stop` that returned an error.
    pub fn record_stop_failure(&self) {
        self.stop_failures.add(1, &[]);
    }

    /// Adjust the active listener count by `delta`.
    pub fn record_active_delta(&self, delta: i64) {
        self.active_listeners.add(delta, &[]);
    }

    /// Record `count` events forwarded to an observer.
    pub fn record_delivered(&self, count: u64) {
        self.events_delivered.add(count, &[]);
        *self.last_event.lock() = Instant::now();
    }

    /// Record `count` events that were not forwarded.
    pub fn record_dropped(&self, count: u64) {
        self.events_dropped.add(count, &[]);
    }

    /// Update the idle-time gauge.
    ///
    /// Call periodically to track how long the observed object has been quiet.
    pub fn update_idle_time(&self) {
        let idle = self.last_event.lock().elapsed().as_secs() as i64;
        self.idle_seconds.record(idle, &[]);
    }
}
