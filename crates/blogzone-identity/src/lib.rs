//! Identity gateway abstraction for BlogZone.
//!
//! BlogZone does not implement authentication, document storage or object
//! storage itself. Those live on a vendor platform (the "identity
//! gateway"). This crate defines the narrow surface the rest of the
//! workspace depends on:
//!
//! - **Identity types** ([`UserIdentity`], [`ProfileUpdate`]): immutable
//!   snapshots of who is signed in.
//! - **The gateway trait** ([`IdentityGateway`]): every call the site
//!   makes into the vendor platform, plus the identity change stream.
//! - **Errors** ([`GatewayError`]): the fine-grained failure codes the
//!   platform reports.
//! - **An in-memory gateway** ([`LocalGateway`], `local` feature): for
//!   development and tests.
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)    ← reads session state to gate navigation
//!     ↕
//! Session (above)   ← sole caller of the gateway, sole writer of "who is logged in"
//!     ↕
//! Identity (this crate) ← vendor surface, swappable and mockable
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod gateway;
mod identity;
#[cfg(feature = "local")]
mod local;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::{IdentityGateway, IdentityStream};
pub use identity::{
    Document, FederatedProvider, ObjectKey, ProfileUpdate, UserId,
    UserIdentity,
};
#[cfg(feature = "local")]
pub use local::{GatewayOp, LocalGateway, ResetEmail};
