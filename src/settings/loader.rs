//! Settings loader that merges a file with environment overrides.

use super::ListenerSettings;
use crate::error::{ListenerError, Result};
use config::{Environment, File};
use std::path::{Path, PathBuf};

/// Loads [`ListenerSettings`] from files and environment variables.
///
/// Files are merged in the order they are added (later files override
/// earlier ones); environment variables override every file.
///
/// # Examples
///
/// ```rust,no_run
/// use audio_property_listener::settings::SettingsLoader;
///
/// # fn example() -> audio_property_listener::error::Result<()> {
/// let settings = SettingsLoader::new()
///     .with_file("config/listener.yaml")
///     .with_env_overrides("LISTENER", "__")
///     .load()?;
///
/// println!("observing object {}", settings.target);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
}

impl SettingsLoader {
    /// Create a loader with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file source.
    ///
    /// The format is detected from the file extension:
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add environment variable overrides.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "LISTENER")
    /// * `separator` - Separator for nested keys (e.g., "__" for LISTENER_ADDRESS__SCOPE)
    ///
    /// The prefix is always joined with a single underscore, so `LISTENER`
    /// matches `LISTENER_TARGET` regardless of `separator`.
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Load and merge all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Configuration`] if:
    /// - No sources were added
    /// - A file has an unsupported extension or cannot be read
    /// - The merged values do not form valid settings
    pub fn load(&self) -> Result<ListenerSettings> {
        if self.file_paths.is_empty() && self.env_prefix.is_none() {
            return Err(ListenerError::Configuration(
                "No settings sources specified".to_string(),
            ));
        }

        let mut builder = config::Config::builder();

        for path in &self.file_paths {
            validate_extension(path)?;
            if !path.exists() {
                return Err(ListenerError::Configuration(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.clone()).required(true));
        }

        if let (Some(prefix), Some(separator)) = (&self.env_prefix, &self.env_separator) {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .try_parsing(true),
            );
        }

        let settings: ListenerSettings = builder.build()?.try_deserialize()?;

        tracing::debug!(
            target_id = settings.target,
            address = %settings.property_address(),
            files = self.file_paths.len(),
            "Loaded listener settings"
        );

        Ok(settings)
    }
}

fn validate_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            ListenerError::Configuration(format!(
                "Unable to determine file format for: {}",
                path.display()
            ))
        })?;

    match extension {
        "yaml" | "yml" | "toml" | "json" => Ok(()),
        _ => Err(ListenerError::Configuration(format!(
            "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
            extension
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FourCharCode, scope};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_sources() {
        let result = SettingsLoader::new().load();
        assert!(matches!(result, Err(ListenerError::Configuration(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("listener.txt");
        fs::write(&path, "target: 1").unwrap();

        let result = SettingsLoader::new().with_file(&path).load();
        assert!(matches!(result, Err(ListenerError::Configuration(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SettingsLoader::new()
            .with_file("/nonexistent/listener.yaml")
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("listener.yaml");
        fs::write(
            &path,
            r#"
target: 42
start_immediately: true
address:
  selector: "nsrt"
  scope: "outp"
"#,
        )
        .unwrap();

        let settings = SettingsLoader::new().with_file(&path).load().unwrap();
        assert_eq!(settings.target, 42);
        assert!(settings.start_immediately);

        let address = settings.property_address();
        assert_eq!(address.selector, FourCharCode::from_bytes(*b"nsrt"));
        assert_eq!(address.scope, scope::OUTPUT);
        assert_eq!(address.element, 0);
    }

    #[test]
    fn test_load_toml_without_address() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("listener.toml");
        fs::write(&path, "target = 3\n").unwrap();

        let settings = SettingsLoader::new().with_file(&path).load().unwrap();
        assert_eq!(settings.target, 3);
        assert!(!settings.start_immediately);
        assert!(settings.property_address().is_wildcard());
    }

    #[test]
    fn test_later_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base.json");
        let local = temp_dir.path().join("local.json");
        fs::write(&base, r#"{"target": 1, "start_immediately": true}"#).unwrap();
        fs::write(&local, r#"{"target": 2}"#).unwrap();

        let settings = SettingsLoader::new()
            .with_file(&base)
            .with_file(&local)
            .load()
            .unwrap();
        assert_eq!(settings.target, 2);
        assert!(settings.start_immediately);
    }

    #[test]
    fn test_invalid_selector() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("listener.yaml");
        fs::write(&path, "target: 1\naddress:\n  selector: \"toolong\"\n").unwrap();

        let result = SettingsLoader::new().with_file(&path).load();
        assert!(matches!(result, Err(ListenerError::Configuration(_))));
    }
}
