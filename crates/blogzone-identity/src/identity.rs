//! Identity types: who is signed in, and what can be changed about them.
//!
//! Everything here is a plain value. A [`UserIdentity`] is a snapshot;
//! when the user changes their display name the gateway emits a brand-new
//! snapshot rather than mutating the old one, so anyone holding the old
//! value keeps a consistent (if stale) view.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Opaque identifier the gateway assigns to an account.
///
/// Newtype over `String` so a user id can't be passed where a blog id or
/// an email is expected. `#[serde(transparent)]` keeps it a bare string on
/// the wire (`"uid-123"`, not `{"0": "uid-123"}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// UserIdentity
// ---------------------------------------------------------------------------

/// Immutable snapshot of a signed-in account.
///
/// Only `id` is guaranteed. Accounts created through a federated provider
/// may arrive without an email; accounts created with email/password have
/// no display name or photo until the user edits their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl UserIdentity {
    /// Creates an identity with only an id and an email.
    pub fn with_email(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId(id.into()),
            email: Some(email.into()),
            display_name: None,
            photo_url: None,
        }
    }

    /// Returns a copy with `update` applied. Fields left `None` in the
    /// update keep their current value.
    pub fn updated(&self, update: &ProfileUpdate) -> Self {
        Self {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: update
                .display_name
                .clone()
                .or_else(|| self.display_name.clone()),
            photo_url: update
                .photo_url
                .clone()
                .or_else(|| self.photo_url.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// ProfileUpdate
// ---------------------------------------------------------------------------

/// Profile fields to change. `None` means "leave as is", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

// ---------------------------------------------------------------------------
// Federated sign-in, storage keys, documents
// ---------------------------------------------------------------------------

/// Third-party identity providers offered on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FederatedProvider {
    #[default]
    Google,
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
        }
    }
}

/// Path of an object in the gateway's object storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(pub String);

impl ObjectKey {
    /// Key under which a user's profile picture is stored. One object per
    /// user: uploading a new picture overwrites the previous one.
    pub fn profile_picture(user: &UserId) -> Self {
        Self(format!("profile_pictures/{user}"))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record from the gateway's document store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Returns a string field, or `None` if it is missing or not a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(serde_json::Value::as_str)
    }
}
