//! Error types shared by every catalog operation.

use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Asset {guid} is not a {expected} (server returned {actual})")]
    TypeMismatch {
        guid: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// True for absence-style errors: the asset does not exist, or exists
    /// under a different type than the caller asked for.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound(_) | CatalogError::TypeMismatch { .. }
        )
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_display() {
        let err = CatalogError::TypeMismatch {
            guid: "abc-123".to_string(),
            expected: "Table",
            actual: "View".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc-123"));
        assert!(msg.contains("Table"));
        assert!(msg.contains("View"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(CatalogError::NotFound("gone".to_string()).is_not_found());
        assert!(CatalogError::TypeMismatch {
            guid: "g".to_string(),
            expected: "Table",
            actual: "Column".to_string(),
        }
        .is_not_found());
        assert!(!CatalogError::Timeout("slow".to_string()).is_not_found());
    }
}
