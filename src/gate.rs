use crate::error::AppError;

/// Shared-secret check run before any row is fetched.
#[derive(Debug, Clone)]
pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Exact text comparison. A missing secret never matches.
    pub fn check(&self, supplied: Option<&str>) -> Result<(), AppError> {
        match supplied {
            Some(secret) if secret == self.secret => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }
}
