//! Session types: the client's record of who is logged in.
//!
//! A [`Session`] is a plain value. The [`SessionManager`] owns the live
//! one and hands out clones; nobody else can change it.
//!
//! [`SessionManager`]: crate::SessionManager

use blogzone_identity::UserIdentity;

use crate::{PasswordPolicy, SessionErrorKind};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Rule applied to new passwords before they are sent to the gateway.
    pub password_policy: PasswordPolicy,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Whether the gateway has told us who is logged in yet.
///
/// ```text
///   Resolving ──(first notification)──→ Resolved(None | Some(user))
///                                            │            ↑
///                                            └──(event)───┘
/// ```
///
/// `Resolving` is only ever the initial state. Once the first identity
/// notification arrives the session stays `Resolved` for the rest of the
/// process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Startup: no identity notification has arrived yet.
    #[default]
    Resolving,

    /// The gateway has reported an identity (or its absence).
    Resolved(Option<UserIdentity>),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Snapshot of the client session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
    last_error: Option<SessionErrorKind>,
}

impl Session {
    /// A session that has not heard from the gateway yet.
    pub fn resolving() -> Self {
        Self::default()
    }

    /// A resolved session with `user` signed in (or nobody, for `None`).
    pub fn resolved(user: Option<UserIdentity>) -> Self {
        Self {
            state: SessionState::Resolved(user),
            last_error: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed-in user. `None` both while resolving and when nobody is
    /// signed in; use [`is_resolving`](Self::is_resolving) to tell them
    /// apart.
    pub fn current_user(&self) -> Option<&UserIdentity> {
        match &self.state {
            SessionState::Resolved(user) => user.as_ref(),
            SessionState::Resolving => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.state, SessionState::Resolving)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Kind of the most recent failed operation, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<SessionErrorKind> {
        self.last_error
    }

    pub(crate) fn set_identity(&mut self, user: Option<UserIdentity>) {
        self.state = SessionState::Resolved(user);
    }

    /// Returns `true` if the stored value changed.
    pub(crate) fn set_last_error(
        &mut self,
        kind: Option<SessionErrorKind>,
    ) -> bool {
        let changed = self.last_error != kind;
        self.last_error = kind;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolving_has_no_user() {
        let session = Session::resolving();

        assert!(session.is_resolving());
        assert!(session.current_user().is_none());
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_set_identity_leaves_resolving_for_good() {
        let mut session = Session::resolving();

        session.set_identity(None);
        assert!(!session.is_resolving());

        session.set_identity(Some(UserIdentity::with_email("u1", "a@b.c")));
        assert!(!session.is_resolving());
        assert_eq!(session.current_user().unwrap().id.as_str(), "u1");
    }

    #[test]
    fn test_set_last_error_reports_change() {
        let mut session = Session::resolved(None);

        assert!(session.set_last_error(Some(SessionErrorKind::WeakPassword)));
        assert!(!session.set_last_error(Some(SessionErrorKind::WeakPassword)));
        assert!(session.set_last_error(None));
        assert_eq!(session.last_error(), None);
    }
}
