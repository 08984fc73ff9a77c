//! Configuration file loading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::raw::RawConfig;

/// Read and parse a `railsup.yml` configuration file.
///
/// Any read or parse failure collapses into a single
/// [`ConfigError::InvalidConfigFile`]; the underlying parser diagnostics are
/// logged at debug level rather than surfaced.
pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<RawConfig> {
    let path = path.as_ref();
    debug!("loading configuration from {}", path.display());

    let text = fs::read_to_string(path).map_err(|err| {
        debug!("failed to read {}: {err}", path.display());
        ConfigError::InvalidConfigFile {
            path: path.to_path_buf(),
        }
    })?;

    serde_yaml::from_str(&text).map_err(|err| {
        debug!("failed to parse {}: {err}", path.display());
        ConfigError::InvalidConfigFile {
            path: path.to_path_buf(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "vpc:\n  max_azs: 2\nservices:\n  rails_foo:\n    source_path: ./app"
        )
        .unwrap();

        let config = load_file(file.path()).unwrap();
        assert_eq!(config.vpc.unwrap().max_azs, Some(2));
        assert_eq!(config.services.unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_yaml_is_a_single_typed_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "services: [unterminated").unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfigFile { .. }));
        // the parser's own message must not leak into the display text
        assert!(!err.to_string().contains("expected"));
    }

    #[test]
    fn test_missing_file_is_invalid_config() {
        let err = load_file("/nonexistent/railsup.yml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfigFile { .. }));
    }
}
