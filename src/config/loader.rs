//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix for environment overrides, e.g. `GATEWAY_PORT`.
pub const ENV_PREFIX: &str = "GATEWAY_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}")]
    Override { key: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, applying `GATEWAY_*`
/// overrides from the process environment.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: &Path, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let content = fs::read_to_string(path)?;
    let mut config: GatewayConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the supported `GATEWAY_*` variables onto a parsed config.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        env(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = lookup("HOST") {
        config.host = value;
    }
    if let Some((key, value)) = lookup("PORT") {
        config.port = parse_port(key, value)?;
    }
    if let Some((key, value)) = lookup("ADMIN_PORT") {
        config.admin_port = parse_port(key, value)?;
    }
    if let Some((_, value)) = lookup("CACHE_SCHEME") {
        config.cache.scheme = value;
    }
    if let Some((_, value)) = lookup("CACHE_HOST") {
        config.cache.host = value;
    }

    Ok(())
}

fn parse_port(key: String, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Override { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_config(
            r#"
            port = 9000
            admin_port = 9001

            [adapters.appnexus]
            endpoint = "http://ib.adnxs.com/openrtb2"
            "#,
        );

        let config = load_config_with(file.path(), no_env).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.admin_port, 9001);
        assert_eq!(config.adapters.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_with(&dir.path().join("absent.toml"), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("port = \"eighty\"");
        let err = load_config_with(file.path(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_failure() {
        let file = write_config("port = 7000\nadmin_port = 7000\n");
        let err = load_config_with(file.path(), no_env).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::PortCollision(7000)]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_overrides_apply_before_validation() {
        let file = write_config("port = 7000\nadmin_port = 7000\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("GATEWAY_ADMIN_PORT", "7001"),
            ("GATEWAY_CACHE_HOST", "cache.internal:2424"),
        ]);

        let config =
            load_config_with(file.path(), |key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.admin_port, 7001);
        assert_eq!(config.cache.host, "cache.internal:2424");
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, |key| {
            (key == "GATEWAY_PORT").then(|| "http".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Override { ref key, .. } if key == "GATEWAY_PORT"));
    }
}
