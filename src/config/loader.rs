//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::InterceptConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<InterceptConfig, ConfigError> {
    let config: InterceptConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<InterceptConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.static_extensions.is_empty());
        assert_eq!(config.wait.default_timeout_ms, 5000);
        assert_eq!(config.wait.poll_interval_ms, 10);
        assert_eq!(config.websocket.handshake_message, "intercept:handshake");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
fixture_root_path = "tests/e2e"
static_extensions = ["jpg", "png"]

[wait]
default_timeout_ms = 1000
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fixture_root_path, Path::new("tests/e2e"));
        assert_eq!(config.static_extensions, vec!["jpg", "png"]);
        assert_eq!(config.wait.default_timeout_ms, 1000);
        assert_eq!(config.wait.poll_interval_ms, 10);
    }

    #[test]
    fn test_invalid_values_are_all_reported() {
        let err = parse_config(
            r#"
static_extensions = [".jpg"]

[wait]
default_timeout_ms = 0
"#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert!(errors.len() >= 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
