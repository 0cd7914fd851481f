#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("Role error: {0}")]
    Role(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoutError::Role("coordinator misconfigured".to_string());
        assert_eq!(err.to_string(), "Role error: coordinator misconfigured");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "listings missing");
        let err: ScoutError = io_err.into();
        assert!(matches!(err, ScoutError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ScoutError = serde_err.into();
        assert!(matches!(err, ScoutError::Serde(_)));
    }
}
