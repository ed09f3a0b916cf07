//! Loading candidate configurations and tool settings.
//!
//! Candidates are TOML documents deserialized straight into the schema
//! types. Parsing only checks shape; constraint checking is left to
//! [`Validate`](proxycheck_validate::Validate) so that every rule violation
//! is reported the same way.

use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Parse a candidate from TOML text.
pub fn parse_candidate<T: DeserializeOwned>(contents: &str) -> Result<T, toml::de::Error> {
    toml::from_str(contents)
}

/// Read and parse a candidate file.
pub fn load_candidate<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, LoadError> {
    let path = path.as_ref();
    let contents =
        std::fs::read_to_string(path).map_err(|e| LoadError::Io(path.to_path_buf(), e))?;

    parse_candidate(&contents).map_err(|e| LoadError::Parse(path.to_path_buf(), e))
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read candidate file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML in {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::fs;

    use proxycheck_validate::Validate;
    use tempfile::TempDir;

    use super::*;
    use crate::schema::OAuth2;
    use crate::schema::OAuth2Credentials;

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::INFO);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert!(LogLevel::Debug < LogLevel::Warn);
    }

    #[test]
    fn test_load_candidate_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("oauth2.toml");
        fs::write(
            &path,
            r#"
            [config]
            authorization_endpoint = ""
            "#,
        )
        .unwrap();

        let root: OAuth2 = load_candidate(&path).unwrap();
        let err = root.validate().unwrap_err();
        assert_eq!(err.path(), "OAuth2.Config.AuthorizationEndpoint");
    }

    #[test]
    fn test_absent_fields_are_unset() {
        let credentials: OAuth2Credentials = parse_candidate("client_id = \"proxy\"").unwrap();
        assert_eq!(credentials.client_id, "proxy");
        assert!(credentials.token_secret.is_none());
        assert!(credentials.token_formation.is_none());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = load_candidate::<OAuth2>(&path).unwrap_err();
        assert!(matches!(err, LoadError::Io(ref p, _) if p == &path));
    }

    #[test]
    fn test_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "[config\nredirect_uri = 1").unwrap();

        let err = load_candidate::<OAuth2>(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse(..)));
        assert!(err.to_string().starts_with("Failed to parse TOML in"));
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        let err = parse_candidate::<OAuth2>("[config]\nforward_bearer_token = \"yes\"").unwrap_err();
        assert!(err.to_string().contains("a boolean"));
    }
}
