//! The route guard: decides whether a navigation may render.
//!
//! The guard never looks at the gateway. It reads a [`Session`] snapshot
//! and answers with a [`GuardDecision`]:
//!
//! ```text
//!   session Resolving ─────────────────────────→ Pending
//!   public route ──────────────────────────────→ Allow
//!   protected route, user present ─────────────→ Allow
//!   protected route, no user ──→ remember intent → Redirect to /login
//! ```
//!
//! The remembered [`NavigationIntent`] is held in a one-shot slot. The
//! login view consumes it once with
//! [`post_login_destination`](RouteGuard::post_login_destination).

use std::sync::{Mutex, PoisonError};

use blogzone_session::Session;
use serde::{Deserialize, Serialize};

use crate::{Route, RouteError};

// ---------------------------------------------------------------------------
// NavigationIntent
// ---------------------------------------------------------------------------

/// Where a signed-out user was trying to go.
///
/// Created when a protected navigation is refused, consumed once by the
/// login view after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIntent {
    /// The path that was requested.
    pub target_path: String,

    /// The path to return to after login. Absent intents send the user
    /// to the site root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_path: Option<String>,
}

impl NavigationIntent {
    /// An intent to come back to `path` after login.
    pub fn returning_to(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            target_path: path.clone(),
            origin_path: Some(path),
        }
    }

    /// Where the login view should navigate: `origin_path`, or `/`.
    pub fn destination(&self) -> &str {
        self.origin_path.as_deref().unwrap_or(HOME_PATH)
    }
}

const HOME_PATH: &str = "/";

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// A redirect to the login view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Always the login route's path.
    pub to: String,
    pub intent: NavigationIntent,
}

impl Redirect {
    fn to_login(requested: &str) -> Self {
        Self {
            to: Route::Login.path(),
            intent: NavigationIntent::returning_to(requested),
        }
    }
}

/// Outcome of [`RouteGuard::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still resolving. Show a neutral placeholder and ask
    /// again when it changes.
    Pending,

    /// Render the route.
    Allow(Route),

    /// Send the user to the login view.
    Redirect(Redirect),
}

/// Outcome of [`RouteGuard::navigate_protected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Navigate to the route directly.
    Go(Route),

    /// Go straight to the login view instead.
    Login(Redirect),
}

// ---------------------------------------------------------------------------
// RouteGuard
// ---------------------------------------------------------------------------

/// Gates navigation on the session and remembers where a refused user
/// wanted to go.
///
/// One guard per client. Shared by reference between the router outlet
/// (calling [`authorize`](Self::authorize)) and the login view (calling
/// [`post_login_destination`](Self::post_login_destination)).
#[derive(Debug, Default)]
pub struct RouteGuard {
    /// The one-shot intent slot. A new refusal overwrites an unconsumed
    /// intent.
    pending: Mutex<Option<NavigationIntent>>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `path` may render for `session`.
    ///
    /// Never decides while the session is resolving: every path gets
    /// [`GuardDecision::Pending`] and nothing is remembered. A redirect
    /// stores its intent in the slot.
    ///
    /// # Errors
    /// [`RouteError::NotAbsolute`] for relative paths.
    pub fn authorize(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<GuardDecision, RouteError> {
        let route = Route::parse(path)?;

        if session.is_resolving() {
            tracing::debug!(path, "session resolving, navigation pending");
            return Ok(GuardDecision::Pending);
        }
        if !route.is_protected() || session.is_signed_in() {
            tracing::debug!(path, %route, "navigation allowed");
            return Ok(GuardDecision::Allow(route));
        }

        let redirect = Redirect::to_login(path);
        self.remember(redirect.intent.clone());
        tracing::info!(path, "protected route without a user, redirecting to login");
        Ok(GuardDecision::Redirect(redirect))
    }

    /// Navbar helper: checks before navigating so a known-absent user goes
    /// straight to login without a guard round-trip.
    ///
    /// While the session is resolving the navigation goes ahead and the
    /// guard decides on arrival.
    ///
    /// # Errors
    /// [`RouteError::NotAbsolute`] for relative paths.
    pub fn navigate_protected(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<Navigation, RouteError> {
        let route = Route::parse(path)?;
        let known_absent = !session.is_resolving() && !session.is_signed_in();
        if route.is_protected() && known_absent {
            let redirect = Redirect::to_login(path);
            self.remember(redirect.intent.clone());
            tracing::info!(path, "navbar sending signed-out user to login");
            return Ok(Navigation::Login(redirect));
        }
        Ok(Navigation::Go(route))
    }

    /// Consumes the pending intent, if any.
    pub fn take_intent(&self) -> Option<NavigationIntent> {
        self.slot().take()
    }

    /// Returns the pending intent without consuming it.
    pub fn pending_intent(&self) -> Option<NavigationIntent> {
        self.slot().clone()
    }

    /// Where the login view should go after a successful sign-in: the
    /// pending intent's origin, or `/`. Consumes the intent.
    pub fn post_login_destination(&self) -> String {
        let destination = self
            .take_intent()
            .map(|intent| intent.destination().to_string())
            .unwrap_or_else(|| HOME_PATH.to_string());
        tracing::debug!(%destination, "post-login destination");
        destination
    }

    /// Where the navbar goes after signing out. Drops any pending intent,
    /// which belonged to the previous visitor.
    pub fn sign_out_destination(&self) -> Route {
        self.slot().take();
        Route::Home
    }

    fn remember(&self, intent: NavigationIntent) {
        *self.slot() = Some(intent);
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<NavigationIntent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
