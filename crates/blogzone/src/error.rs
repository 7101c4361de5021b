//! Unified error type for BlogZone, plus the user-facing notices.

use blogzone_content::ContentError;
use blogzone_identity::GatewayError;
use blogzone_router::RouteError;
use blogzone_session::{SessionError, SessionErrorKind};

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so
/// `?` converts layer errors automatically. Two variants add context the
/// layers don't have: a content failure while submitting a blog or while
/// adding to the wishlist is shown differently from the same failure
/// while browsing.
#[derive(Debug, thiserror::Error)]
pub enum BlogzoneError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The Content API refused or failed a blog submission.
    #[error("blog submission failed")]
    BlogSubmission(#[source] ContentError),

    /// The Content API refused or failed a wishlist addition.
    #[error("adding to the wishlist failed")]
    WishlistUpdate(#[source] ContentError),

    /// A heart button was clicked with nobody signed in.
    #[error("adding to the wishlist needs a signed-in user")]
    WishlistSignedOut,
}

/// What went wrong, in the terms the views care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
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
    NotSignedIn,
    /// [`NotSignedIn`](Self::NotSignedIn) from a heart button.
    WishlistNeedsLogin,
    AlreadyInWishlist,
    WishlistUpdateFailed,
    /// A form was submitted with a required field left blank.
    InvalidInput,
    BlogSubmissionFailed,
    /// The Content API or the gateway was unreachable or answered with an
    /// error.
    NetworkFailure,
    NotFound,
    /// Startup configuration or an internal setup step is wrong.
    Configuration,
}

impl ErrorKind {
    /// The message the site shows for this kind of failure.
    pub fn notice(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password.",
            Self::WeakPassword => {
                "Password must be at least 6 characters long, include a capital letter, a number, and a special character."
            }
            Self::PasswordMismatch => "Passwords do not match",
            Self::RegistrationFailed => {
                "Failed to create an account. Please try again."
            }
            Self::FederatedSignInFailed => "Google Sign-in failed.",
            Self::ReauthenticationFailed => "Current password is incorrect.",
            Self::ResetRequestFailed => "Failed to send password reset email.",
            Self::PasswordResetFailed => "Invalid verification code or password.",
            Self::ProfileUpdateFailed => "Failed to update profile.",
            Self::SignOutFailed => "Logout failed. Please try again.",
            Self::NotSignedIn => "Please login to continue.",
            Self::WishlistNeedsLogin => "Please login to add to wishlist.",
            Self::AlreadyInWishlist => "This blog is already in your wishlist!",
            Self::WishlistUpdateFailed => "Error adding to wishlist.",
            Self::InvalidInput => "❌ All fields are required.",
            Self::BlogSubmissionFailed => "❌ Failed to add blog. Try again!",
            Self::NetworkFailure => "Could not reach the server. Please try again.",
            Self::NotFound => "Blog not found.",
            Self::Configuration => "The site is not configured correctly.",
        }
    }
}

impl From<SessionErrorKind> for ErrorKind {
    fn from(kind: SessionErrorKind) -> Self {
        match kind {
            SessionErrorKind::InvalidCredentials => Self::InvalidCredentials,
            SessionErrorKind::WeakPassword => Self::WeakPassword,
            SessionErrorKind::PasswordMismatch => Self::PasswordMismatch,
            SessionErrorKind::RegistrationFailed => Self::RegistrationFailed,
            SessionErrorKind::FederatedSignInFailed => Self::FederatedSignInFailed,
            SessionErrorKind::ReauthenticationFailed => Self::ReauthenticationFailed,
            SessionErrorKind::ResetRequestFailed => Self::ResetRequestFailed,
            SessionErrorKind::PasswordResetFailed => Self::PasswordResetFailed,
            SessionErrorKind::ProfileUpdateFailed => Self::ProfileUpdateFailed,
            SessionErrorKind::SignOutFailed => Self::SignOutFailed,
            SessionErrorKind::DocumentQueryFailed => Self::NetworkFailure,
            SessionErrorKind::NotSignedIn => Self::NotSignedIn,
            SessionErrorKind::AlreadySubscribed => Self::Configuration,
        }
    }
}

fn content_kind(err: &ContentError) -> ErrorKind {
    match err {
        ContentError::NotFound(_) => ErrorKind::NotFound,
        ContentError::MissingField(_) => ErrorKind::InvalidInput,
        ContentError::AlreadyInWishlist(_) => ErrorKind::AlreadyInWishlist,
        ContentError::ClientBuild(_) => ErrorKind::Configuration,
        ContentError::Request(_)
        | ContentError::Status { .. }
        | ContentError::Decode(_)
        | ContentError::Unconfirmed => ErrorKind::NetworkFailure,
    }
}

impl BlogzoneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gateway(GatewayError::InvalidCredentials) => {
                ErrorKind::InvalidCredentials
            }
            Self::Gateway(GatewayError::NotSignedIn) => ErrorKind::NotSignedIn,
            Self::Gateway(_) => ErrorKind::NetworkFailure,
            Self::Content(e) => content_kind(e),
            Self::Session(e) => e.kind().into(),
            Self::Route(_) => ErrorKind::NotFound,
            Self::Config(_) => ErrorKind::Configuration,
            Self::BlogSubmission(_) => ErrorKind::BlogSubmissionFailed,
            Self::WishlistUpdate(_) => ErrorKind::WishlistUpdateFailed,
            Self::WishlistSignedOut => ErrorKind::WishlistNeedsLogin,
        }
    }

    /// Shorthand for `self.kind().notice()`.
    pub fn notice(&self) -> &'static str {
        self.kind().notice()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use blogzone_content::BlogId;

    use super::*;

    #[test]
    fn test_from_session_error() {
        let err: BlogzoneError = SessionError::WeakPassword.into();

        assert!(matches!(err, BlogzoneError::Session(_)));
        assert_eq!(err.kind(), ErrorKind::WeakPassword);
        assert!(err.notice().starts_with("Password must be at least 6"));
    }

    #[test]
    fn test_from_content_error() {
        let err: BlogzoneError = ContentError::Status { status: 502 }.into();

        assert!(matches!(err, BlogzoneError::Content(_)));
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert_eq!(err.to_string(), "content service returned status 502");
    }

    #[test]
    fn test_from_route_error() {
        let err: BlogzoneError = RouteError::NotAbsolute("x".into()).into();

        assert!(matches!(err, BlogzoneError::Route(_)));
    }

    #[test]
    fn test_from_config_error() {
        let err: BlogzoneError =
            ConfigError::Missing { var: "BLOGZONE_GATEWAY_API_KEY" }.into();

        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_content_kinds() {
        let kind = |e: ContentError| BlogzoneError::from(e).kind();

        assert_eq!(kind(ContentError::NotFound("blog b1".into())), ErrorKind::NotFound);
        assert_eq!(kind(ContentError::MissingField("title")), ErrorKind::InvalidInput);
        assert_eq!(
            kind(ContentError::AlreadyInWishlist(BlogId::from("b1"))),
            ErrorKind::AlreadyInWishlist
        );
        assert_eq!(kind(ContentError::Unconfirmed), ErrorKind::NetworkFailure);
    }

    #[test]
    fn test_wishlist_update_keeps_content_source() {
        let err = BlogzoneError::WishlistUpdate(ContentError::Status { status: 500 });

        assert_eq!(err.notice(), "Error adding to wishlist.");
        assert_eq!(
            err.source().unwrap().to_string(),
            "content service returned status 500"
        );
    }

    #[test]
    fn test_not_signed_in_notice_is_generic() {
        let from_session: BlogzoneError = SessionError::NotSignedIn.into();
        let from_gateway: BlogzoneError = GatewayError::NotSignedIn.into();

        for err in [from_session, from_gateway] {
            assert_eq!(err.kind(), ErrorKind::NotSignedIn);
            assert_eq!(err.notice(), "Please login to continue.");
        }
        assert_eq!(
            BlogzoneError::WishlistSignedOut.notice(),
            "Please login to add to wishlist."
        );
    }

    #[test]
    fn test_session_kinds_map_to_login_notices() {
        let err: BlogzoneError =
            SessionError::InvalidCredentials(GatewayError::InvalidCredentials).into();
        assert_eq!(err.notice(), "Invalid email or password.");

        let err: BlogzoneError =
            SessionError::FederatedSignInFailed(GatewayError::ProviderCancelled).into();
        assert_eq!(err.notice(), "Google Sign-in failed.");
    }

    #[test]
    fn test_every_kind_has_a_notice() {
        let kinds = [
            ErrorKind::InvalidCredentials,
            ErrorKind::WeakPassword,
            ErrorKind::PasswordMismatch,
            ErrorKind::RegistrationFailed,
            ErrorKind::FederatedSignInFailed,
            ErrorKind::ReauthenticationFailed,
            ErrorKind::ResetRequestFailed,
            ErrorKind::PasswordResetFailed,
            ErrorKind::ProfileUpdateFailed,
            ErrorKind::SignOutFailed,
            ErrorKind::NotSignedIn,
            ErrorKind::WishlistNeedsLogin,
            ErrorKind::AlreadyInWishlist,
            ErrorKind::WishlistUpdateFailed,
            ErrorKind::InvalidInput,
            ErrorKind::BlogSubmissionFailed,
            ErrorKind::NetworkFailure,
            ErrorKind::NotFound,
            ErrorKind::Configuration,
        ];
        for kind in kinds {
            assert!(!kind.notice().is_empty(), "{kind:?}");
        }
    }
}
