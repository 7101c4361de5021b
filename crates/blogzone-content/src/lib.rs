//! Content API client for BlogZone.
//!
//! Blogs and wishlist entries live on a separate HTTP service. This crate
//! defines:
//!
//! - **Wire types** ([`BlogSummary`], [`BlogDetail`], [`WishlistEntry`],
//!   [`NewBlog`], [`Category`]): the JSON shapes the service speaks.
//! - **The store trait** ([`ContentStore`]): the five endpoints as async
//!   methods, so views can be tested against a fake.
//! - **An HTTP implementation** ([`HttpContentClient`], `http` feature).
//! - **View-level loaders** ([`assemble_wishlist`], [`Wishlist`]): the
//!   data-loading effects the wishlist and home pages run.
//!
//! Responses are never cached across views: each view owns whatever it
//! loaded and re-fetches when it needs fresh data.

#![allow(async_fn_in_trait)]

mod config;
mod error;
#[cfg(feature = "http")]
mod http;
mod store;
mod types;
mod wishlist;

pub use config::ContentConfig;
pub use error::ContentError;
#[cfg(feature = "http")]
pub use http::HttpContentClient;
pub use store::ContentStore;
pub use types::{
    BlogDetail, BlogId, BlogSummary, Category, NewBlog, WishlistEntry,
    WishlistItem,
};
pub use wishlist::{Wishlist, assemble_wishlist};
