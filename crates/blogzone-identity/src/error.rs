//! Error types for the identity gateway.

/// Failure codes reported by the identity gateway.
///
/// These are deliberately fine-grained: the session layer folds them into
/// coarse user-facing buckets ("invalid email or password") but keeps the
/// vendor code as the error source, so callers that care can still tell
/// a duplicate email apart from a malformed one.
///
/// `Clone` so a test gateway can hand out the same injected failure more
/// than once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The email/password pair was rejected. The gateway does not say
    /// which half was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration or email change hit an address that is already taken.
    #[error("email already in use: {0}")]
    EmailAlreadyInUse(String),

    /// The address is not a syntactically valid email.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The gateway's own password rule rejected the password.
    #[error("password rejected by gateway policy")]
    WeakPassword,

    /// The user closed the federated consent window.
    #[error("federated sign-in cancelled by the user")]
    ProviderCancelled,

    /// The federated provider reported an error.
    #[error("federated provider error: {0}")]
    Provider(String),

    /// The operation needs a signed-in user and there is none.
    #[error("no user is signed in")]
    NotSignedIn,

    /// Sensitive changes (email, password) need a fresh re-authentication.
    #[error("operation requires a recent login")]
    RequiresRecentLogin,

    /// The password-reset code is unknown, used, or expired.
    #[error("invalid or expired password reset code")]
    InvalidResetCode,

    /// Object storage refused the upload.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The gateway could not be reached.
    #[error("gateway unreachable: {0}")]
    Network(String),

    /// Any other rejection, with the vendor's message.
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
}
