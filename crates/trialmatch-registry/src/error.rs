//! Error types for registry queries.

/// Errors from one registry request.
///
/// These never escape [`crate::client::RegistryClient::search`]; the client
/// converts them into a synthetic error record so callers always receive a
/// well-formed trial list.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("registry returned status {0}")]
    Status(u16),
    #[error("could not decode registry response: {0}")]
    Decode(String),
    #[error("registry request timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::Transport("connection reset".to_string());
        assert_eq!(err.to_string(), "transport error: connection reset");

        let err = RegistryError::Status(502);
        assert_eq!(err.to_string(), "registry returned status 502");

        let err = RegistryError::Decode("expected value at line 1".to_string());
        assert_eq!(
            err.to_string(),
            "could not decode registry response: expected value at line 1"
        );

        let err = RegistryError::Timeout;
        assert_eq!(err.to_string(), "registry request timed out");
    }
}
