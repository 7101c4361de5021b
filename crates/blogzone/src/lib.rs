//! # BlogZone
//!
//! Client core for the BlogZone blog site.
//!
//! The site's views (rendering, forms, styling) sit on top of this crate
//! and call into one [`Site`] value, which ties together:
//!
//! - the session ([`SessionManager`]): who is logged in, fed by the
//!   identity gateway's notifications
//! - the route guard ([`RouteGuard`]): which views need a user, and where
//!   to send someone after login
//! - the Content API ([`ContentStore`]): blogs and wishlists
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blogzone::prelude::*;
//!
//! # async fn demo() -> Result<(), BlogzoneError> {
//! let config = BlogzoneConfig::from_env()?;
//! blogzone::init_tracing(&config.log_filter)?;
//!
//! let site = Site::connect(&config, LocalGateway::new())?;
//! site.sessions().resolved().await;
//!
//! if let GuardDecision::Redirect(redirect) = site.authorize("/add-blog")? {
//!     println!("go to {}", redirect.to);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod logging;
mod site;

pub use config::{
    BlogzoneConfig, CONNECT_TIMEOUT_VAR, CONTENT_URL_VAR, ConfigError,
    DEFAULT_LOG_FILTER, GATEWAY_API_KEY_VAR, GATEWAY_AUTH_DOMAIN_VAR,
    GATEWAY_PROJECT_ID_VAR, GATEWAY_STORAGE_BUCKET_VAR, LOG_VAR,
    REQUEST_TIMEOUT_VAR,
};
pub use error::{BlogzoneError, ErrorKind};
pub use logging::init_tracing;
pub use site::{
    AUTHOR_EMAIL_FIELD, AuthoredBlog, BLOGS_COLLECTION,
    DEFAULT_IDENTITY_TIMEOUT, Site, SiteBuilder,
};

pub use blogzone_content::{
    BlogDetail, BlogId, BlogSummary, Category, ContentConfig, ContentError,
    ContentStore, HttpContentClient, NewBlog, Wishlist, WishlistEntry,
    WishlistItem,
};
pub use blogzone_identity::{
    FederatedProvider, GatewayConfig, GatewayError, IdentityGateway,
    LocalGateway, UserId, UserIdentity,
};
pub use blogzone_router::{
    GuardDecision, Navigation, NavigationIntent, Redirect, Route,
    RouteError, RouteGuard,
};
pub use blogzone_session::{
    PasswordPolicy, Session, SessionConfig, SessionError, SessionErrorKind,
    SessionManager, SessionState,
};

/// Convenience re-exports for views built on BlogZone.
pub mod prelude {
    pub use crate::{
        BlogId, BlogzoneConfig, BlogzoneError, Category, ContentStore,
        ErrorKind, FederatedProvider, GuardDecision, HttpContentClient,
        IdentityGateway, LocalGateway, Navigation, NewBlog, Route, Session,
        SessionConfig, Site, SiteBuilder,
    };
}
