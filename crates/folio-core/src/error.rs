use thiserror::Error;

/// Top-level error type for the folio crates.
///
/// Covers configuration and portfolio loading. The dialogue core has its
/// own error types in `folio-chat`, since transport failures and rejected
/// submissions never escape as `FolioError`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Portfolio error: {0}")]
    Portfolio(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FolioError {
    fn from(err: toml::ser::Error) -> Self {
        FolioError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FolioError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = FolioError::Portfolio("duplicate id e1".to_string());
        assert_eq!(err.to_string(), "Portfolio error: duplicate id e1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FolioError = io_err.into();
        assert!(matches!(err, FolioError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let folio_err: FolioError = err.unwrap_err().into();
        assert!(matches!(folio_err, FolioError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let folio_err: FolioError = err.unwrap_err().into();
        assert!(matches!(folio_err, FolioError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
