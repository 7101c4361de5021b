//! Routing for BlogZone: the route table and the session-aware guard.
//!
//! # Key types
//!
//! - [`Route`]: every view, parsed from a path
//! - [`RouteGuard`]: allows, defers or redirects a navigation based on the
//!   session, and remembers where a refused user wanted to go
//! - [`NavigationIntent`]: that remembered destination
//!
//! # How it fits in the stack
//!
//! ```text
//! Views (above)  ← ask the guard before rendering
//!     ↕
//! Router (this crate)  ← reads session snapshots, never calls the gateway
//!     ↕
//! Session Layer (below)  ← owns the session
//! ```

mod error;
mod guard;
mod route;

pub use error::RouteError;
pub use guard::{GuardDecision, Navigation, NavigationIntent, Redirect, RouteGuard};
pub use route::Route;
