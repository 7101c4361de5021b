//! Error types for the session layer.

use blogzone_identity::GatewayError;

/// Errors returned by [`SessionManager`](crate::SessionManager) operations.
///
/// Gateway failures are folded into the coarse buckets the login and
/// profile pages show ("invalid email or password", "failed to update
/// profile"). The gateway's own code is kept as the error source, so a
/// caller that wants to tell a duplicate email from a malformed one can
/// walk `source()`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The gateway rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials(#[source] GatewayError),

    /// The password does not meet the strength policy. Checked locally,
    /// before any gateway call.
    #[error("password does not meet the strength policy")]
    WeakPassword,

    /// The registration form's two password fields differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The gateway refused to create the account (duplicate or malformed
    /// email, gateway-side password rule, ...).
    #[error("registration failed")]
    RegistrationFailed(#[source] GatewayError),

    /// The federated consent flow was cancelled or the provider failed.
    #[error("federated sign-in failed")]
    FederatedSignInFailed(#[source] GatewayError),

    /// Re-checking the current password before a sensitive change failed.
    #[error("re-authentication failed")]
    ReauthenticationFailed(#[source] GatewayError),

    /// The gateway could not send the password-reset email.
    #[error("password reset request failed")]
    ResetRequestFailed(#[source] GatewayError),

    /// The reset code was rejected or the new password could not be set.
    #[error("password reset failed")]
    PasswordResetFailed(#[source] GatewayError),

    /// Uploading the photo or changing a profile field failed.
    #[error("profile update failed")]
    ProfileUpdateFailed(#[source] GatewayError),

    /// The gateway session could not be ended.
    #[error("sign-out failed")]
    SignOutFailed(#[source] GatewayError),

    /// A document lookup on behalf of the signed-in user failed.
    #[error("document query failed")]
    DocumentQueryFailed(#[source] GatewayError),

    /// The operation needs a signed-in user and the session has none.
    #[error("no user is signed in")]
    NotSignedIn,

    /// [`subscribe_to_identity`](crate::SessionManager::subscribe_to_identity)
    /// was called a second time.
    #[error("identity subscription already started")]
    AlreadySubscribed,
}

/// Which kind of failure a [`SessionError`] is, without its source.
///
/// Stored in [`Session::last_error`](crate::Session::last_error) so views
/// can render a notice from a plain copyable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionErrorKind {
    InvalidCredentials,
    WeakPassword,
    PasswordMismatch,
    RegistrationFailed,
    FederatedSignInFailed,
    ReauthenticationFailed,
    ResetRequestFailed,
    PasswordResetFailed,
    ProfileUpdateFailed,
    SignOutFailed,
    DocumentQueryFailed,
    NotSignedIn,
    AlreadySubscribed,
}

impl SessionError {
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            Self::InvalidCredentials(_) => SessionErrorKind::InvalidCredentials,
            Self::WeakPassword => SessionErrorKind::WeakPassword,
            Self::PasswordMismatch => SessionErrorKind::PasswordMismatch,
            Self::RegistrationFailed(_) => SessionErrorKind::RegistrationFailed,
            Self::FederatedSignInFailed(_) => {
                SessionErrorKind::FederatedSignInFailed
            }
            Self::ReauthenticationFailed(_) => {
                SessionErrorKind::ReauthenticationFailed
            }
            Self::ResetRequestFailed(_) => SessionErrorKind::ResetRequestFailed,
            Self::PasswordResetFailed(_) => SessionErrorKind::PasswordResetFailed,
            Self::ProfileUpdateFailed(_) => SessionErrorKind::ProfileUpdateFailed,
            Self::SignOutFailed(_) => SessionErrorKind::SignOutFailed,
            Self::DocumentQueryFailed(_) => SessionErrorKind::DocumentQueryFailed,
            Self::NotSignedIn => SessionErrorKind::NotSignedIn,
            Self::AlreadySubscribed => SessionErrorKind::AlreadySubscribed,
        }
    }

    /// The gateway's own failure code, if the gateway was involved.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::InvalidCredentials(e)
            | Self::RegistrationFailed(e)
            | Self::FederatedSignInFailed(e)
            | Self::ReauthenticationFailed(e)
            | Self::ResetRequestFailed(e)
            | Self::PasswordResetFailed(e)
            | Self::ProfileUpdateFailed(e)
            | Self::SignOutFailed(e)
            | Self::DocumentQueryFailed(e) => Some(e),
            Self::WeakPassword
            | Self::PasswordMismatch
            | Self::NotSignedIn
            | Self::AlreadySubscribed => None,
        }
    }
}
