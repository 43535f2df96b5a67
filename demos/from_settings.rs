//! Example demonstrating listeners configured from a settings file.
//!
//! Environment variables prefixed with `LISTENER_` override the file, e.g.
//! `LISTENER_TARGET=9` or `LISTENER_ADDRESS__SCOPE=inpt`.
//!
//! Run with: cargo run --example from_settings

use audio_property_listener::prelude::*;
use std::fs;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Settings Example ===\n");

    let dir = std::env::temp_dir().join("audio-property-listener-demo");
    fs::create_dir_all(&dir).map_err(|e| ListenerError::Configuration(e.to_string()))?;
    let path = dir.join("listener.yaml");
    fs::write(
        &path,
        r#"
target: 42
start_immediately: true
address:
  selector: "****"
  scope: "outp"
"#,
    )
    .map_err(|e| ListenerError::Configuration(e.to_string()))?;

    let settings = SettingsLoader::new()
        .with_file(&path)
        .with_env_overrides("LISTENER", "__")
        .load()?;
    println!("Loaded settings: {:?}", settings);

    let subsystem = Arc::new(SimulatedSubsystem::new());
    let observer = observer_fn(|listener, address| {
        println!("object {} changed {}", listener.target_id(), address);
    });

    let listener = PropertyChangeListener::builder(subsystem.clone())
        .with_settings(&settings)
        .observer(&observer)
        .build()?;

    println!("Listening on {} for {}", listener.target_id(), listener.address());

    let volume = FourCharCode::from_bytes(*b"volm");
    subsystem.deliver(
        listener.target_id(),
        &[
            PropertyAddress::new(volume).with_scope(audio_property_listener::core::scope::OUTPUT),
            PropertyAddress::new(volume).with_scope(audio_property_listener::core::scope::INPUT),
        ],
    );

    Ok(())
}
