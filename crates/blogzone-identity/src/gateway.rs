//! The [`IdentityGateway`] trait: every call BlogZone makes into the
//! vendor identity platform.
//!
//! The session layer is generic over this trait, so production code can
//! plug in the vendor SDK binding while tests use [`LocalGateway`]
//! (or a hand-written fake) without changing any session code.
//!
//! [`LocalGateway`]: crate::LocalGateway

use std::future::Future;

use tokio::sync::mpsc;

use crate::{
    Document, FederatedProvider, GatewayError, ObjectKey, ProfileUpdate,
    UserIdentity,
};

/// Stream of identity notifications.
///
/// Each item is the complete identity after a change: `Some(user)` after a
/// sign-in or profile edit, `None` after a sign-out. The gateway sends the
/// current identity as the first item as soon as the stream is opened.
/// Items arrive in the order the gateway emitted them.
pub type IdentityStream = mpsc::UnboundedReceiver<Option<UserIdentity>>;

/// The vendor identity/document/object-storage surface.
///
/// # Trait bounds
///
/// `Send + Sync + 'static`: the session manager keeps the gateway in an
/// `Arc` and calls it from spawned tasks.
///
/// # State updates
///
/// Methods that change who is signed in (or their profile) return once
/// the gateway has accepted the change. The authoritative new state is
/// delivered separately on every [`IdentityStream`] opened with
/// [`watch_identity`](Self::watch_identity).
pub trait IdentityGateway: Send + Sync + 'static {
    /// Opens a new identity notification stream. Dropping the receiver
    /// unregisters the listener.
    fn watch_identity(&self) -> IdentityStream;

    /// Signs in with an email/password pair.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserIdentity, GatewayError>> + Send;

    /// Creates an account and signs it in.
    fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserIdentity, GatewayError>> + Send;

    /// Runs the provider's interactive consent flow and signs the
    /// resulting account in.
    fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> impl Future<Output = Result<UserIdentity, GatewayError>> + Send;

    /// Ends the current gateway session.
    fn sign_out(
        &self,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Asks the gateway to email a password-reset code.
    ///
    /// Succeeds whether or not an account exists for `email`.
    fn send_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Completes a password reset with the emailed code.
    fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Changes profile fields of the signed-in user.
    fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Re-checks the signed-in user's credentials. Required before
    /// [`update_email`](Self::update_email) and
    /// [`update_password`](Self::update_password).
    fn reauthenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Changes the signed-in user's email.
    fn update_email(
        &self,
        new_email: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Changes the signed-in user's password.
    fn update_password(
        &self,
        new_password: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Stores `bytes` at `key` and returns a URL the object can be
    /// downloaded from.
    fn upload_object(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Returns the documents of `collection` whose `field` equals `value`.
    fn query_documents(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<Document>, GatewayError>> + Send;
}
