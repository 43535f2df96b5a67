//! Example demonstrating the listener lifecycle.
//!
//! This example shows how to:
//! - Attach an observer to a listener
//! - Start and stop listening
//! - Detect double start/stop
//! - Receive changes delivered from another thread
//!
//! Run with: cargo run --example observe_device

use audio_property_listener::core::scope;
use audio_property_listener::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: FourCharCode = FourCharCode::from_bytes(*b"nsrt");
const VOLUME: FourCharCode = FourCharCode::from_bytes(*b"volm");

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Property Listener Example ===\n");

    let subsystem = Arc::new(SimulatedSubsystem::new());
    let device = ObjectId(42);
    let listener = PropertyChangeListener::new(subsystem.clone(), device);

    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    let observer = observer_fn(move |listener, address| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[observer] #{} object {} changed {}", n, listener.target_id(), address);
    });
    listener.set_observer(&observer);

    listener.start()?;
    println!("Listening: {}", listener.is_listening());

    match listener.start() {
        Err(ListenerError::AlreadyListening) => println!("Second start rejected: already listening"),
        other => println!("Unexpected: {:?}", other),
    }

    println!("\nDelivering changes from a hardware thread...");
    let changes = vec![
        PropertyAddress::new(SAMPLE_RATE),
        PropertyAddress::new(VOLUME).with_scope(scope::OUTPUT).with_element(1),
        PropertyAddress::new(VOLUME).with_scope(scope::OUTPUT).with_element(2),
    ];
    subsystem
        .deliver_on_thread(device, changes.clone())
        .join()
        .expect("delivery thread panicked");

    listener.stop()?;
    println!("\nListening: {}", listener.is_listening());

    println!("Delivering again after stop (should be ignored)...");
    subsystem.deliver(device, &changes);

    match listener.stop() {
        Err(e) => println!("Second stop rejected: {} (code {})", e, e.code()),
        Ok(()) => println!("Unexpected: second stop succeeded"),
    }

    println!("\nObserver received {} events", received.load(Ordering::SeqCst));
    Ok(())
}
