//! Client session management for BlogZone.
//!
//! This crate owns "who is logged in":
//!
//! 1. **Session state** ([`Session`]): resolving at startup, then resolved
//!    with or without a user
//! 2. **The manager** ([`SessionManager`]): the only caller of the identity
//!    gateway and the only writer of the session
//! 3. **Password policy** ([`PasswordPolicy`]): checked locally before a
//!    new password is sent anywhere
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← reads sessions to gate navigation
//!     ↕
//! Session Layer (this crate)  ← owns the session, calls the gateway
//!     ↕
//! Identity Layer (below)  ← gateway trait, identity types
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod policy;
mod session;

pub use error::{SessionError, SessionErrorKind};
pub use manager::{IdentitySubscription, SessionManager};
pub use policy::PasswordPolicy;
pub use session::{Session, SessionConfig, SessionState};
