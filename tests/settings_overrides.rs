//! Environment overrides layered over a settings file.

#![cfg(feature = "settings")]

use audio_property_listener::core::scope;
use audio_property_listener::prelude::*;
use std::env;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_env_overrides_file_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("listener.yaml");

    fs::write(
        &path,
        r#"
target: 42
start_immediately: false
address:
  selector: "nsrt"
  scope: "outp"
"#,
    )
    .unwrap();

    unsafe {
        env::set_var("APL_OVERRIDE_TARGET", "7");
        env::set_var("APL_OVERRIDE_ADDRESS__SCOPE", "inpt");
    }

    let result = SettingsLoader::new()
        .with_file(&path)
        .with_env_overrides("APL_OVERRIDE", "__")
        .load();

    unsafe {
        env::remove_var("APL_OVERRIDE_TARGET");
        env::remove_var("APL_OVERRIDE_ADDRESS__SCOPE");
    }

    let settings = result.unwrap();
    assert_eq!(settings.target, 7); // From env
    assert!(!settings.start_immediately); // From file

    let address = settings.property_address();
    assert_eq!(address.scope, scope::INPUT); // From env
    assert_eq!(address.selector, FourCharCode::from_bytes(*b"nsrt")); // From file

    let listener = PropertyChangeListener::builder(Arc::new(SimulatedSubsystem::new()))
        .with_settings(&settings)
        .build()
        .unwrap();
    assert_eq!(listener.target_id(), ObjectId(7));
    assert_eq!(listener.address(), address);
}

#[test]
fn test_unprefixed_env_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("listener.toml");
    fs::write(&path, "target = 3\n").unwrap();

    unsafe {
        env::set_var("APL_OTHER_TARGET", "9");
    }

    let result = SettingsLoader::new()
        .with_file(&path)
        .with_env_overrides("APL_IGNORED", "__")
        .load();

    unsafe {
        env::remove_var("APL_OTHER_TARGET");
    }

    assert_eq!(result.unwrap().target, 3);
}
