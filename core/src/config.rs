//! Timer and counter configuration
//!
//! This module re-exports the shared definition types from cadence-types and
//! adds TOML loading, validation and persistence.

use std::fs;
use std::path::Path;

use hashbrown::HashSet;

pub use cadence_types::{CounterDefinition, TargetDefinition, TimerDefinition, TimingConfig};

use crate::error::ConfigError;

const APP_NAME: &str = "cadence";
const CONFIG_NAME: &str = "timing";

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<TimingConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let config: TimingConfig = toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config)?;
    tracing::debug!(
        path = %path.display(),
        timers = config.timers.len(),
        counters = config.counters.len(),
        "timing config loaded"
    );
    Ok(config)
}

/// Write a config file, creating parent directories as needed
pub fn save_config(config: &TimingConfig, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFile {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the per-user config from the platform config directory.
///
/// A missing file yields the (empty) default config.
pub fn load_user_config() -> Result<TimingConfig, ConfigError> {
    let config: TimingConfig = confy::load(APP_NAME, CONFIG_NAME)?;
    validate_config(&config)?;
    Ok(config)
}

/// Check ranges, frame lengths and id uniqueness
pub fn validate_config(config: &TimingConfig) -> Result<(), ConfigError> {
    let mut timer_ids = HashSet::new();
    for timer in &config.timers {
        if !timer_ids.insert(timer.id.as_str()) {
            return Err(ConfigError::DuplicateId(timer.id.clone()));
        }
        timer
            .target
            .validate()
            .map_err(|reason| ConfigError::InvalidDefinition {
                id: timer.id.clone(),
                reason,
            })?;
    }

    let mut counter_ids = HashSet::new();
    for counter in &config.counters {
        if !counter_ids.insert(counter.id.as_str()) {
            return Err(ConfigError::DuplicateId(counter.id.clone()));
        }
        if counter.frame_ms == 0 {
            return Err(ConfigError::InvalidDefinition {
                id: counter.id.clone(),
                reason: "frame_ms must be positive".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("timing.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
            [[timers]]
            id = "spawn"
            target = { type = "random", min_ms = 2500, max_ms = 3000 }

            [[counters]]
            id = "fps"
            frame_ms = 1000
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.timers[0].id, "spawn");
        assert_eq!(config.counters[0].frame_ms, 1000);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { path: ref p, .. } if p == &path));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[[timers]]\nid = ");
        assert!(matches!(load_config(&path), Err(ConfigError::ParseToml { .. })));
    }

    #[test]
    fn duplicate_timer_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
            [[timers]]
            id = "tick"

            [[timers]]
            id = "tick"
            "#,
        );
        assert!(matches!(load_config(&path), Err(ConfigError::DuplicateId(id)) if id == "tick"));
    }

    #[test]
    fn inverted_random_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
            [[timers]]
            id = "spawn"
            target = { type = "random", min_ms = 300, max_ms = 300 }
            "#,
        );
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("timing.toml");
        let config = TimingConfig {
            timers: vec![TimerDefinition {
                id: "tick".to_string(),
                name: Some("Tick".to_string()),
                enabled: true,
                target: TargetDefinition::Fixed { ms: 50 },
            }],
            counters: vec![],
        };

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
