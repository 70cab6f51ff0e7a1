use thiserror::Error;

/// Failures a catalog query can report to its caller.
///
/// The message is what the action endpoint sends back as the response body.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required argument was missing or unusable.
    #[error("{0}")]
    InvalidArgument(String),

    /// The package or the requested version does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_messages_are_raw() {
        assert_eq!(
            CatalogError::invalid_argument("No slug provided").to_string(),
            "No slug provided"
        );
        assert_eq!(
            CatalogError::not_found("Package not found: plugins/foo").to_string(),
            "Package not found: plugins/foo"
        );
    }

    #[test]
    fn test_unexpected_includes_cause_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("disk on fire"));
        let err = CatalogError::from(err.context("Failed to scan packages").unwrap_err());
        assert_eq!(err.to_string(), "Failed to scan packages: disk on fire");
    }
}
