//! Error types for the routing layer.

/// Errors that can occur while resolving a navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Paths must be absolute (`/wishlist`, not `wishlist`).
    #[error("path {0:?} is not absolute")]
    NotAbsolute(String),
}
