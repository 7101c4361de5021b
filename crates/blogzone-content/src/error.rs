//! Error types for the content layer.

use crate::BlogId;

/// Errors from talking to the Content API or validating content locally.
///
/// Transport-level failures carry the underlying message as a `String`
/// rather than the HTTP library's error type, so fakes of
/// [`ContentStore`](crate::ContentStore) can produce every variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The service could not be reached (DNS, connect, timeout, ...).
    #[error("content request failed: {0}")]
    Request(String),

    /// The service answered with a non-2xx status.
    #[error("content service returned status {status}")]
    Status { status: u16 },

    /// The requested entity does not exist (HTTP 404).
    #[error("{0} not found")]
    NotFound(String),

    /// The body could not be parsed into the expected shape.
    #[error("malformed content response: {0}")]
    Decode(String),

    /// A field required before submission was left blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The blog is already in the user's wishlist (checked client-side).
    #[error("blog {0} is already in the wishlist")]
    AlreadyInWishlist(BlogId),

    /// The service accepted a new blog but did not return its id.
    #[error("content service did not confirm the new blog")]
    Unconfirmed,

    /// The HTTP client could not be constructed.
    #[error("content client setup failed: {0}")]
    ClientBuild(String),
}

impl ContentError {
    /// Returns `true` for failures of the remote service itself
    /// (unreachable, non-2xx, unparseable), as opposed to local
    /// validation or a missing entity.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::Status { .. } | Self::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_network_failure_classification() {
        assert!(ContentError::Request("dns".into()).is_network_failure());
        assert!(ContentError::Status { status: 500 }.is_network_failure());
        assert!(ContentError::Decode("eof".into()).is_network_failure());
        assert!(!ContentError::NotFound("blog b1".into()).is_network_failure());
        assert!(!ContentError::MissingField("title").is_network_failure());
        assert!(!ContentError::Unconfirmed.is_network_failure());
    }

    #[test]
    fn test_status_display_includes_code() {
        let err = ContentError::Status { status: 503 };
        assert_eq!(err.to_string(), "content service returned status 503");
    }
}
