//! In-memory [`IdentityGateway`] for development and tests.
//!
//! `LocalGateway` behaves like the vendor platform closely enough to drive
//! the whole session lifecycle without a network:
//!
//! - accounts with email/password, plus a scripted federated account
//! - identity notifications pushed to every open [`IdentityStream`]
//! - password-reset codes collected in an outbox instead of being emailed
//! - object storage and a document store kept in hash maps
//! - one-shot failure injection per operation ([`LocalGateway::fail_next`])
//!
//! # Sharing
//!
//! The gateway is a cheap handle around `Arc<Mutex<..>>`: clone it, hand
//! one clone to the session manager and keep another in the test to seed
//! accounts and inspect side effects.
//!
//! The lock is a `std::sync::Mutex` and is never held across an `.await`;
//! every trait method does its work inside [`LocalGateway::with_inner`]
//! and returns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use tokio::sync::mpsc;

use crate::{
    Document, FederatedProvider, GatewayError, IdentityGateway,
    IdentityStream, ObjectKey, ProfileUpdate, UserId, UserIdentity,
};

/// Minimum password length the platform itself enforces.
const GATEWAY_MIN_PASSWORD_LEN: usize = 6;

/// Gateway operations that can be told to fail via
/// [`LocalGateway::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    SignIn,
    CreateUser,
    Federated,
    SignOut,
    SendPasswordReset,
    ConfirmPasswordReset,
    UpdateProfile,
    Reauthenticate,
    UpdateEmail,
    UpdatePassword,
    Upload,
    Query,
}

/// A password-reset email the gateway would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetEmail {
    pub email: String,
    pub code: String,
}

#[derive(Debug)]
struct Account {
    identity: UserIdentity,
    /// `None` for accounts that only exist through a federated provider;
    /// they can't sign in with a password.
    password: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<UserId, Account>,
    current: Option<UserId>,
    /// Set by sign-in and re-authentication, cleared by sign-out.
    recent_login: bool,
    listeners: Vec<mpsc::UnboundedSender<Option<UserIdentity>>>,
    reset_codes: HashMap<String, UserId>,
    outbox: Vec<ResetEmail>,
    objects: HashMap<String, Vec<u8>>,
    documents: HashMap<String, Vec<Document>>,
    federated: Option<UserIdentity>,
    failures: HashMap<GatewayOp, GatewayError>,
}

impl Inner {
    fn current_identity(&self) -> Option<UserIdentity> {
        self.current
            .as_ref()
            .and_then(|id| self.accounts.get(id))
            .map(|account| account.identity.clone())
    }

    fn current_account_mut(&mut self) -> Result<&mut Account, GatewayError> {
        let id = self.current.clone().ok_or(GatewayError::NotSignedIn)?;
        self.accounts.get_mut(&id).ok_or(GatewayError::NotSignedIn)
    }

    fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|account| {
            account
                .identity
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
    }

    fn take_failure(&mut self, op: GatewayOp) -> Result<(), GatewayError> {
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Pushes the current identity to every listener, forgetting the ones
    /// whose receiver has been dropped.
    fn emit(&mut self) {
        let identity = self.current_identity();
        self.listeners
            .retain(|listener| listener.send(identity.clone()).is_ok());
        tracing::debug!(
            listeners = self.listeners.len(),
            signed_in = identity.is_some(),
            "identity change emitted"
        );
    }

    /// Makes `identity` the signed-in account and notifies listeners.
    fn sign_in_as(&mut self, identity: UserIdentity) -> UserIdentity {
        self.current = Some(identity.id.clone());
        self.recent_login = true;
        self.emit();
        identity
    }
}

/// An in-memory identity platform. See the module docs.
#[derive(Debug, Clone, Default)]
pub struct LocalGateway {
    inner: Arc<Mutex<Inner>>,
}

impl LocalGateway {
    /// Creates an empty gateway: no accounts, nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        // A panic inside `f` can only come from a test assertion; the
        // maps are still usable afterwards.
        let mut inner =
            self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *inner)
    }

    /// Registers an account without signing it in or notifying anyone.
    pub fn add_account(&self, email: &str, password: &str) -> UserIdentity {
        let identity = UserIdentity::with_email(generate_id(), email);
        self.with_inner(|inner| {
            inner.accounts.insert(
                identity.id.clone(),
                Account {
                    identity: identity.clone(),
                    password: Some(password.to_string()),
                },
            );
        });
        identity
    }

    /// Scripts the outcome of the next federated consent flows:
    /// `Some(identity)` signs that account in, `None` behaves as if the
    /// user closed the window.
    pub fn set_federated_identity(&self, identity: Option<UserIdentity>) {
        self.with_inner(|inner| inner.federated = identity);
    }

    /// Makes the next call of `op` fail with `err`. The failure is
    /// consumed by that call.
    pub fn fail_next(&self, op: GatewayOp, err: GatewayError) {
        self.with_inner(|inner| {
            inner.failures.insert(op, err);
        });
    }

    /// Password-reset emails sent so far, oldest first.
    pub fn sent_reset_emails(&self) -> Vec<ResetEmail> {
        self.with_inner(|inner| inner.outbox.clone())
    }

    /// Returns the bytes stored at `key`, if any.
    pub fn object(&self, key: &ObjectKey) -> Option<Vec<u8>> {
        self.with_inner(|inner| inner.objects.get(&key.0).cloned())
    }

    /// Adds a document to `collection` and returns its generated id.
    pub fn insert_document(
        &self,
        collection: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> String {
        let id = generate_id();
        self.with_inner(|inner| {
            inner
                .documents
                .entry(collection.to_string())
                .or_default()
                .push(Document {
                    id: id.clone(),
                    fields,
                });
        });
        id
    }

    /// The identity the gateway currently considers signed in.
    pub fn current_identity(&self) -> Option<UserIdentity> {
        self.with_inner(|inner| inner.current_identity())
    }

    /// Number of listeners still registered. Receivers that were dropped
    /// are only noticed (and removed) on the next emission.
    pub fn listener_count(&self) -> usize {
        self.with_inner(|inner| inner.listeners.len())
    }
}

impl IdentityGateway for LocalGateway {
    fn watch_identity(&self) -> IdentityStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.with_inner(|inner| {
            // Like the vendor SDK: a fresh listener immediately hears the
            // current state.
            let _ = tx.send(inner.current_identity());
            inner.listeners.push(tx);
        });
        rx
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::SignIn)?;
            let identity = inner
                .find_by_email(email)
                .filter(|account| {
                    account.password.as_deref() == Some(password)
                })
                .map(|account| account.identity.clone())
                .ok_or(GatewayError::InvalidCredentials)?;
            tracing::debug!(user_id = %identity.id, "local gateway sign-in");
            Ok(inner.sign_in_as(identity))
        })
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::CreateUser)?;
            if !looks_like_email(email) {
                return Err(GatewayError::InvalidEmail(email.to_string()));
            }
            if inner.find_by_email(email).is_some() {
                return Err(GatewayError::EmailAlreadyInUse(email.to_string()));
            }
            if password.chars().count() < GATEWAY_MIN_PASSWORD_LEN {
                return Err(GatewayError::WeakPassword);
            }
            let identity = UserIdentity::with_email(generate_id(), email);
            inner.accounts.insert(
                identity.id.clone(),
                Account {
                    identity: identity.clone(),
                    password: Some(password.to_string()),
                },
            );
            tracing::debug!(user_id = %identity.id, "local gateway account created");
            Ok(inner.sign_in_as(identity))
        })
    }

    async fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> Result<UserIdentity, GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::Federated)?;
            let identity = inner
                .federated
                .clone()
                .ok_or(GatewayError::ProviderCancelled)?;
            // A returning federated user keeps the profile stored here.
            let identity = inner
                .accounts
                .entry(identity.id.clone())
                .or_insert(Account {
                    identity,
                    password: None,
                })
                .identity
                .clone();
            tracing::debug!(user_id = %identity.id, %provider, "local gateway federated sign-in");
            Ok(inner.sign_in_as(identity))
        })
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::SignOut)?;
            inner.current = None;
            inner.recent_login = false;
            inner.emit();
            Ok(())
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::SendPasswordReset)?;
            if !looks_like_email(email) {
                return Err(GatewayError::InvalidEmail(email.to_string()));
            }
            // Unknown addresses succeed silently so the caller cannot discover
            // which emails have accounts.
            if let Some(id) =
                inner.find_by_email(email).map(|a| a.identity.id.clone())
            {
                let code = generate_id();
                inner.reset_codes.insert(code.clone(), id);
                inner.outbox.push(ResetEmail {
                    email: email.to_string(),
                    code,
                });
            }
            Ok(())
        })
    }

    async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::ConfirmPasswordReset)?;
            if new_password.chars().count() < GATEWAY_MIN_PASSWORD_LEN {
                return Err(GatewayError::WeakPassword);
            }
            let id = inner
                .reset_codes
                .remove(code)
                .ok_or(GatewayError::InvalidResetCode)?;
            let account = inner
                .accounts
                .get_mut(&id)
                .ok_or(GatewayError::InvalidResetCode)?;
            account.password = Some(new_password.to_string());
            Ok(())
        })
    }

    async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::UpdateProfile)?;
            let account = inner.current_account_mut()?;
            account.identity = account.identity.updated(update);
            inner.emit();
            Ok(())
        })
    }

    async fn reauthenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::Reauthenticate)?;
            let account = inner.current_account_mut()?;
            let email_matches = account
                .identity
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email));
            if !email_matches || account.password.as_deref() != Some(password) {
                return Err(GatewayError::InvalidCredentials);
            }
            inner.recent_login = true;
            Ok(())
        })
    }

    async fn update_email(&self, new_email: &str) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::UpdateEmail)?;
            if !inner.recent_login {
                return Err(GatewayError::RequiresRecentLogin);
            }
            if !looks_like_email(new_email) {
                return Err(GatewayError::InvalidEmail(new_email.to_string()));
            }
            let current = inner.current.clone();
            let taken = inner
                .find_by_email(new_email)
                .is_some_and(|other| Some(&other.identity.id) != current.as_ref());
            if taken {
                return Err(GatewayError::EmailAlreadyInUse(new_email.to_string()));
            }
            let account = inner.current_account_mut()?;
            account.identity = UserIdentity {
                email: Some(new_email.to_string()),
                ..account.identity.clone()
            };
            inner.emit();
            Ok(())
        })
    }

    async fn update_password(
        &self,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::UpdatePassword)?;
            if !inner.recent_login {
                return Err(GatewayError::RequiresRecentLogin);
            }
            if new_password.chars().count() < GATEWAY_MIN_PASSWORD_LEN {
                return Err(GatewayError::WeakPassword);
            }
            let account = inner.current_account_mut()?;
            account.password = Some(new_password.to_string());
            Ok(())
        })
    }

    async fn upload_object(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
    ) -> Result<String, GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::Upload)?;
            tracing::debug!(%key, size = bytes.len(), "local gateway upload");
            inner.objects.insert(key.0.clone(), bytes);
            Ok(format!("memory://objects/{key}"))
        })
    }

    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, GatewayError> {
        self.with_inner(|inner| {
            inner.take_failure(GatewayOp::Query)?;
            Ok(inner
                .documents
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| doc.str_field(field) == Some(value))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }
}

/// The platform's own (loose) email check: something on both sides of
/// one `@`.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// Generates a random 32-character hex string (128 bits of entropy), used
/// for account ids, document ids and reset codes.
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
