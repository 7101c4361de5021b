//! The session manager: the single source of truth for who is logged in.
//!
//! It is responsible for:
//! - Listening to the gateway's identity notifications and keeping the
//!   [`Session`] current
//! - Running every sign-in, sign-up, sign-out, password and profile call
//!   against the gateway
//! - Checking new passwords against the [`PasswordPolicy`] before they
//!   leave the client
//! - Recording the kind of the last failure for the views to show
//!
//! # Who writes what
//!
//! The session lives in a `tokio::sync::watch` channel. The current user
//! is written in exactly one place: the listener task started by
//! [`SessionManager::subscribe_to_identity`], which applies gateway
//! notifications in the order they were emitted. Operations never set the
//! user from a return value; a successful `sign_in` is visible once the
//! gateway's notification has been applied. Operations only touch
//! `last_error`.
//!
//! [`PasswordPolicy`]: crate::PasswordPolicy

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use blogzone_identity::{
    Document, FederatedProvider, GatewayError, IdentityGateway, ObjectKey,
    ProfileUpdate, UserId, UserIdentity,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{Session, SessionConfig, SessionError};

/// Owns the client session and every call into the identity gateway.
///
/// Construct one per client and share it (`Arc<SessionManager<G>>`) with
/// whatever needs to read the session or trigger an operation.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ subscribe_to_identity() ──→ [Resolving]
///                                           │ first notification
///                                           ▼
///   sign_in / sign_up / sign_out ... ──→ [Resolved(user?)] ←─┐
///                                           │ notification  │
///                                           └───────────────┘
/// ```
pub struct SessionManager<G> {
    gateway: Arc<G>,

    /// The live session. Shared with the listener task, which is the only
    /// writer of the current user.
    state: Arc<watch::Sender<Session>>,

    /// Set by the first `subscribe_to_identity` call and never cleared.
    subscribed: AtomicBool,

    config: SessionConfig,
}

impl<G: IdentityGateway> SessionManager<G> {
    /// Creates a manager in the `Resolving` state. Nothing is read from
    /// the gateway until [`subscribe_to_identity`](Self::subscribe_to_identity).
    pub fn new(gateway: G, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(Session::resolving());
        Self {
            gateway: Arc::new(gateway),
            state: Arc::new(state),
            subscribed: AtomicBool::new(false),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Reading the session
    // -----------------------------------------------------------------

    /// Current snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that observes every session change.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Waits until the session satisfies `predicate` and returns that
    /// snapshot. Returns immediately if it already does.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&Session) -> bool,
    ) -> Session {
        let mut rx = self.state.subscribe();
        match rx.wait_for(predicate).await {
            Ok(session) => Session::clone(&session),
            // The sender lives in `self`, so the channel can't close
            // while we are borrowed.
            Err(_) => self.session(),
        }
    }

    /// Waits for the first identity notification.
    pub async fn resolved(&self) -> Session {
        self.wait_for(|session| !session.is_resolving()).await
    }

    // -----------------------------------------------------------------
    // Identity subscription
    // -----------------------------------------------------------------

    /// Starts listening to the gateway's identity notifications.
    ///
    /// Each notification replaces the current user and leaves the
    /// `Resolving` state. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// [`SessionError::AlreadySubscribed`] on every call after the first,
    /// even if the first subscription has since been disposed.
    pub fn subscribe_to_identity(
        &self,
    ) -> Result<IdentitySubscription, SessionError> {
        if self.subscribed.swap(true, Ordering::AcqRel) {
            return Err(SessionError::AlreadySubscribed);
        }

        let mut stream = self.gateway.watch_identity();
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            while let Some(identity) = stream.recv().await {
                apply_identity(&state, identity);
            }
            tracing::debug!("identity stream closed by the gateway");
        });

        tracing::info!("identity subscription started");
        Ok(IdentitySubscription { task })
    }

    // -----------------------------------------------------------------
    // Sign-in / sign-up / sign-out
    // -----------------------------------------------------------------

    /// Signs in with email and password and returns the account's id.
    ///
    /// The session itself switches to the account when the gateway's
    /// notification arrives; wait for a session whose user has the
    /// returned id before acting for that user.
    ///
    /// # Errors
    /// [`SessionError::InvalidCredentials`] for any gateway rejection.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserId, SessionError> {
        let result = match self.gateway.sign_in(email, password).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "signed in");
                Ok(user.id)
            }
            Err(e) => Err(SessionError::InvalidCredentials(e)),
        };
        self.record(result)
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    /// - [`SessionError::WeakPassword`] without contacting the gateway
    /// - [`SessionError::RegistrationFailed`] if the gateway refuses
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let result = self.create_account(email, password).await;
        self.record(result)
    }

    /// The registration form: both password fields must match, then
    /// behaves as [`sign_up`](Self::sign_up).
    ///
    /// # Errors
    /// [`SessionError::PasswordMismatch`] before any other check, then as
    /// `sign_up`.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), SessionError> {
        let result = if password != confirm_password {
            Err(SessionError::PasswordMismatch)
        } else {
            self.create_account(email, password).await
        };
        self.record(result)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        self.config.password_policy.check(password)?;
        let user = self
            .gateway
            .create_user(email, password)
            .await
            .map_err(SessionError::RegistrationFailed)?;
        tracing::info!(user_id = %user.id, "account created");
        Ok(())
    }

    /// Runs the provider's interactive consent flow and returns the
    /// signed-in account's id. As with [`sign_in`](Self::sign_in), the
    /// session follows once the notification arrives.
    ///
    /// # Errors
    /// [`SessionError::FederatedSignInFailed`] on cancellation or provider
    /// error.
    pub async fn sign_in_with_federated_provider(
        &self,
        provider: FederatedProvider,
    ) -> Result<UserId, SessionError> {
        let result = match self.gateway.sign_in_with_provider(provider).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, %provider, "signed in with provider");
                Ok(user.id)
            }
            Err(e) => Err(SessionError::FederatedSignInFailed(e)),
        };
        self.record(result)
    }

    /// Ends the gateway session. The session shows nobody signed in once
    /// the gateway's notification has been applied, not on return.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let result = self
            .gateway
            .sign_out()
            .await
            .map_err(SessionError::SignOutFailed);
        if result.is_ok() {
            tracing::info!("signed out");
        }
        self.record(result)
    }

    // -----------------------------------------------------------------
    // Password reset
    // -----------------------------------------------------------------

    /// Asks the gateway to email a reset code to `email`.
    ///
    /// Success means the request was accepted, not that an account exists
    /// for the address.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<(), SessionError> {
        let result = self
            .gateway
            .send_password_reset(email)
            .await
            .map_err(SessionError::ResetRequestFailed);
        if result.is_ok() {
            tracing::info!("password reset requested");
        }
        self.record(result)
    }

    /// Completes a reset with the emailed `code`.
    ///
    /// # Errors
    /// - [`SessionError::WeakPassword`] without contacting the gateway
    /// - [`SessionError::PasswordResetFailed`] if the gateway rejects the
    ///   code or the password
    pub async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let result = match self.config.password_policy.check(new_password) {
            Ok(()) => self
                .gateway
                .confirm_password_reset(code, new_password)
                .await
                .map_err(SessionError::PasswordResetFailed),
            Err(e) => Err(e),
        };
        if result.is_ok() {
            tracing::info!("password reset completed");
        }
        self.record(result)
    }

    // -----------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------

    /// Sets the display name and, if `photo` is given, a new profile
    /// picture.
    ///
    /// The photo is uploaded to `profile_pictures/{user id}` first and the
    /// profile fields are changed afterwards. Without a photo the stored
    /// photo URL is left as it is.
    ///
    /// If the upload succeeds but the field update fails, the uploaded
    /// object stays in storage unreferenced. This is logged, not undone.
    ///
    /// # Errors
    /// - [`SessionError::NotSignedIn`]
    /// - [`SessionError::ProfileUpdateFailed`] if the upload or the field
    ///   update fails
    pub async fn update_profile(
        &self,
        display_name: &str,
        photo: Option<Vec<u8>>,
    ) -> Result<(), SessionError> {
        let result = self.apply_profile_update(display_name, photo).await;
        self.record(result)
    }

    async fn apply_profile_update(
        &self,
        display_name: &str,
        photo: Option<Vec<u8>>,
    ) -> Result<(), SessionError> {
        let user = self.require_user()?;

        let uploaded = match photo {
            Some(bytes) => {
                let key = ObjectKey::profile_picture(&user.id);
                let url = self
                    .gateway
                    .upload_object(&key, bytes)
                    .await
                    .map_err(SessionError::ProfileUpdateFailed)?;
                Some((key, url))
            }
            None => None,
        };

        let update = ProfileUpdate {
            display_name: Some(display_name.to_string()),
            photo_url: uploaded.as_ref().map(|(_, url)| url.clone()),
        };
        if let Err(e) = self.gateway.update_profile(&update).await {
            if let Some((key, _)) = &uploaded {
                tracing::warn!(
                    user_id = %user.id,
                    %key,
                    "profile update failed after upload, stored object is orphaned"
                );
            }
            return Err(SessionError::ProfileUpdateFailed(e));
        }

        tracing::info!(
            user_id = %user.id,
            photo_changed = uploaded.is_some(),
            "profile updated"
        );
        Ok(())
    }

    /// Changes the signed-in user's email after re-checking
    /// `current_password`. Does nothing if `new_email` is already the
    /// current address.
    ///
    /// # Errors
    /// - [`SessionError::NotSignedIn`]
    /// - [`SessionError::ReauthenticationFailed`] if the password is wrong
    /// - [`SessionError::ProfileUpdateFailed`] if the gateway refuses the
    ///   new address
    pub async fn update_email(
        &self,
        new_email: &str,
        current_password: &str,
    ) -> Result<(), SessionError> {
        let result = self.change_email(new_email, current_password).await;
        self.record(result)
    }

    async fn change_email(
        &self,
        new_email: &str,
        current_password: &str,
    ) -> Result<(), SessionError> {
        let user = self.require_user()?;
        if user.email.as_deref() == Some(new_email) {
            tracing::debug!(user_id = %user.id, "email unchanged, nothing to do");
            return Ok(());
        }
        self.reauthenticate(&user, current_password).await?;
        self.gateway
            .update_email(new_email)
            .await
            .map_err(SessionError::ProfileUpdateFailed)?;
        tracing::info!(user_id = %user.id, "email changed");
        Ok(())
    }

    /// Changes the signed-in user's password after re-checking
    /// `current_password`.
    ///
    /// # Errors
    /// - [`SessionError::WeakPassword`] without contacting the gateway
    /// - [`SessionError::NotSignedIn`]
    /// - [`SessionError::ReauthenticationFailed`] if the password is wrong
    /// - [`SessionError::ProfileUpdateFailed`] if the gateway refuses
    pub async fn update_password(
        &self,
        new_password: &str,
        current_password: &str,
    ) -> Result<(), SessionError> {
        let result = self.change_password(new_password, current_password).await;
        self.record(result)
    }

    async fn change_password(
        &self,
        new_password: &str,
        current_password: &str,
    ) -> Result<(), SessionError> {
        self.config.password_policy.check(new_password)?;
        let user = self.require_user()?;
        self.reauthenticate(&user, current_password).await?;
        self.gateway
            .update_password(new_password)
            .await
            .map_err(SessionError::ProfileUpdateFailed)?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }

    async fn reauthenticate(
        &self,
        user: &UserIdentity,
        password: &str,
    ) -> Result<(), SessionError> {
        // Accounts without an email can't re-check a password.
        let email = user.email.as_deref().ok_or(
            SessionError::ReauthenticationFailed(GatewayError::InvalidCredentials),
        )?;
        self.gateway
            .reauthenticate(email, password)
            .await
            .map_err(SessionError::ReauthenticationFailed)
    }

    // -----------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------

    /// Documents of `collection` whose `email_field` equals the signed-in
    /// user's email. Empty for accounts without an email.
    ///
    /// # Errors
    /// - [`SessionError::NotSignedIn`]
    /// - [`SessionError::DocumentQueryFailed`]
    pub async fn documents_for_current_user(
        &self,
        collection: &str,
        email_field: &str,
    ) -> Result<Vec<Document>, SessionError> {
        let result = match self.require_user() {
            Ok(user) => match user.email.as_deref() {
                Some(email) => self
                    .gateway
                    .query_documents(collection, email_field, email)
                    .await
                    .map_err(SessionError::DocumentQueryFailed),
                None => Ok(Vec::new()),
            },
            Err(e) => Err(e),
        };
        self.record(result)
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    fn require_user(&self) -> Result<UserIdentity, SessionError> {
        self.state
            .borrow()
            .current_user()
            .cloned()
            .ok_or(SessionError::NotSignedIn)
    }

    /// Stores the outcome's error kind (or clears it on success) and
    /// passes the outcome through.
    fn record<T>(
        &self,
        result: Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let kind = result.as_ref().err().map(SessionError::kind);
        if let Err(e) = &result {
            tracing::info!(kind = ?e.kind(), error = %e, "session operation failed");
        }
        self.state.send_if_modified(|session| session.set_last_error(kind));
        result
    }
}

/// Applies one gateway notification. Only the listener task calls this.
fn apply_identity(
    state: &watch::Sender<Session>,
    identity: Option<UserIdentity>,
) {
    match &identity {
        Some(user) => tracing::info!(user_id = %user.id, "identity changed"),
        None => tracing::info!("identity cleared"),
    }
    state.send_modify(|session| session.set_identity(identity));
}

// ---------------------------------------------------------------------------
// IdentitySubscription
// ---------------------------------------------------------------------------

/// Handle to the running identity listener.
///
/// Dropping it (or calling [`dispose`](Self::dispose)) stops the listener;
/// the gateway notices the closed stream on its next emission. The session
/// keeps whatever value it had.
#[derive(Debug)]
#[must_use = "dropping the subscription stops identity updates"]
pub struct IdentitySubscription {
    task: JoinHandle<()>,
}

impl IdentitySubscription {
    /// Stops the listener.
    pub fn dispose(self) {
        drop(self);
    }

    /// Returns `false` once the listener has stopped.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.task.abort();
        tracing::info!("identity subscription released");
    }
}

// =========================================================================
// Tests
// =========================================================================
