use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Loads `path` if it exists, otherwise returns the built-in defaults.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        log::info!(
            "No config file at {}, using defaults",
            path.display()
        );
        Ok(Config::default())
    }
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Returns the canonical config path: `~/.karat/karat.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".karat").join("karat.json"))
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let pagination = &config.pagination;
    if pagination.default_page_size == 0 || pagination.max_page_size == 0 {
        return Err(ConfigError::Validation {
            message: "Page sizes must be positive".to_string(),
        });
    }
    if pagination.default_page_size > pagination.max_page_size {
        return Err(ConfigError::Validation {
            message: format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                pagination.default_page_size, pagination.max_page_size
            ),
        });
    }

    if !(1..=100).contains(&config.images.jpeg_quality) {
        return Err(ConfigError::Validation {
            message: format!(
                "jpeg_quality must be between 1 and 100, got {}",
                config.images.jpeg_quality
            ),
        });
    }

    if config.display_id_width == 0 {
        return Err(ConfigError::Validation {
            message: "display_id_width must be positive".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "database_path": "/var/lib/karat/karat.db",
            "display_id_width": 6,
            "pagination": { "default_page_size": 50, "max_page_size": 100 },
            "images": { "max_dimension": 800, "jpeg_quality": 70 }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(
            config.database_path.as_deref(),
            Some("/var/lib/karat/karat.db")
        );
        assert_eq!(config.display_id_width, 6);
        assert_eq!(config.pagination.default_page_size, 50);
        assert_eq!(config.images.jpeg_quality, 70);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = load_config_from_str(r#"{ "version": "2.0" }"#).unwrap_err();
        assert!(err.to_string().contains("Unsupported config version"));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = load_config_from_str(r#"{ "version": "1.0", "theme": "dark" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_rejects_default_above_max() {
        let err = load_config_from_str(
            r#"{ "version": "1.0", "pagination": { "default_page_size": 500, "max_page_size": 100 } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds max_page_size"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("karat.json");
        std::fs::write(&path, r#"{ "version": "1.0", "display_id_width": 5 }"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.display_id_width, 5);
    }
}
