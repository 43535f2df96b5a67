//! Example demonstrating async consumption of property changes.
//!
//! The observer runs on the subsystem's delivery thread and only forwards
//! events into a channel; all real work happens on the tokio runtime.
//!
//! Run with: cargo run --example async_events

use audio_property_listener::notify::ChannelObserver;
use audio_property_listener::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Async Events Example ===\n");

    let subsystem = Arc::new(SimulatedSubsystem::new());
    let (observer, mut rx) = ChannelObserver::unbounded();

    let listener = PropertyChangeListener::builder(subsystem.clone())
        .target(ObjectId(7))
        .observer(&observer)
        .start_immediately(true)
        .build()?;

    let producer = {
        let subsystem = Arc::clone(&subsystem);
        tokio::task::spawn_blocking(move || {
            for selector in [*b"nsrt", *b"lnam", *b"gone"] {
                let address = PropertyAddress::new(FourCharCode::from_bytes(selector));
                subsystem.deliver(ObjectId(7), &[address]);
                std::thread::sleep(Duration::from_millis(50));
            }
        })
    };

    for _ in 0..3 {
        match tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
            Ok(Some(event)) => println!("object {} changed {}", event.object, event.address),
            Ok(None) => break,
            Err(_) => {
                println!("Timed out waiting for an event");
                break;
            }
        }
    }

    producer.await.expect("producer task panicked");
    listener.stop()?;
    println!("\nDropped events: {}", observer.dropped_events());
    Ok(())
}
