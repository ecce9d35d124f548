use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImpersonationError {
    /// No signing secret is available to this process.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("invalid expiry '{input}': {reason}")]
    InvalidExpiry { input: String, reason: String },
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl ImpersonationError {
    pub(crate) fn missing_secret() -> Self {
        Self::Configuration("JWT_SECRET not configured".to_string())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Self::InvalidToken(_))
    }
}
