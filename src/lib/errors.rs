use thiserror::Error;

/// Network-layer failures raised by the API helpers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the text shown to the visitor, without the diagnostic prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(message)
            | AppError::Network(message)
            | AppError::Timeout(message)
            | AppError::Parse(message)
            | AppError::Serialization(message)
            | AppError::Http { message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn http_error_surfaces_server_message_only() {
        let err = AppError::Http {
            status: 500,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.user_message(), "rate limited");
        assert_eq!(err.to_string(), "Request failed (500): rate limited");
    }

    #[test]
    fn timeout_keeps_message() {
        let err = AppError::Timeout("Request timed out. Please try again.".to_string());
        assert_eq!(err.user_message(), "Request timed out. Please try again.");
    }
}
