use thiserror::Error;

/// Top-level error type for the TrialMatch system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// TrialMatchError` so that the `?` operator works seamlessly across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrialMatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("NLU error: {0}")]
    Nlu(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TrialMatchError {
    fn from(err: toml::de::Error) -> Self {
        TrialMatchError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TrialMatchError {
    fn from(err: toml::ser::Error) -> Self {
        TrialMatchError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TrialMatchError {
    fn from(err: serde_json::Error) -> Self {
        TrialMatchError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for TrialMatch operations.
pub type Result<T> = std::result::Result<T, TrialMatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrialMatchError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(TrialMatchError, &str)> = vec![
            (
                TrialMatchError::Nlu("model unreachable".to_string()),
                "NLU error: model unreachable",
            ),
            (
                TrialMatchError::Registry("timeout".to_string()),
                "Registry error: timeout",
            ),
            (
                TrialMatchError::Session("lock poisoned".to_string()),
                "Session error: lock poisoned",
            ),
            (
                TrialMatchError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                TrialMatchError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TrialMatchError = io_err.into();
        assert!(matches!(err, TrialMatchError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let err: TrialMatchError = err.unwrap_err().into();
        assert!(matches!(err, TrialMatchError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let err: TrialMatchError = err.unwrap_err().into();
        assert!(matches!(err, TrialMatchError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = TrialMatchError::Registry("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Registry"));
        assert!(debug_str.contains("test debug"));
    }
}
