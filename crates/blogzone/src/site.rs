//! The site facade: one value holding the session, the route guard and
//! the Content API, with the flows the views run.

use std::time::Duration;

use blogzone_content::{
    BlogDetail, BlogId, BlogSummary, Category, ContentError, ContentStore,
    HttpContentClient, NewBlog, Wishlist, WishlistItem, assemble_wishlist,
};
use blogzone_identity::{
    FederatedProvider, GatewayConfig, IdentityGateway, UserId, UserIdentity,
};
use blogzone_router::{GuardDecision, Navigation, Route, RouteGuard};
use blogzone_session::{
    IdentitySubscription, Session, SessionConfig, SessionError, SessionManager,
};
use serde::Serialize;

use crate::{BlogzoneConfig, BlogzoneError};

/// Gateway collection holding blogs written through the gateway.
pub const BLOGS_COLLECTION: &str = "blogs";

/// Field of [`BLOGS_COLLECTION`] matched against the user's email.
pub const AUTHOR_EMAIL_FIELD: &str = "email";

/// Default wait for the gateway's identity notification after a sign-in
/// or sign-out.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

/// One row of the "my blogs" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoredBlog {
    pub id: String,
    pub title: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// SiteBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a [`Site`].
///
/// # Example
///
/// ```rust,no_run
/// # use blogzone::prelude::*;
/// # async fn demo(content: HttpContentClient) -> Result<(), BlogzoneError> {
/// let site = Site::builder()
///     .session_config(SessionConfig::default())
///     .build(LocalGateway::new(), content)?;
/// # Ok(())
/// # }
/// ```
pub struct SiteBuilder {
    session_config: SessionConfig,
    identity_timeout: Duration,
}

impl SiteBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets how long login and logout wait for the gateway to confirm the
    /// identity change before navigating anyway.
    pub fn identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }

    /// Builds the site and subscribes its session to the gateway.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build<G: IdentityGateway, S: ContentStore>(
        self,
        gateway: G,
        content: S,
    ) -> Result<Site<G, S>, BlogzoneError> {
        let sessions = SessionManager::new(gateway, self.session_config);
        let subscription = sessions.subscribe_to_identity()?;
        Ok(Site {
            sessions,
            guard: RouteGuard::new(),
            content,
            identity_timeout: self.identity_timeout,
            _subscription: subscription,
        })
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// A running BlogZone client.
///
/// Dropping the site stops its identity subscription.
pub struct Site<G, S> {
    sessions: SessionManager<G>,
    guard: RouteGuard,
    content: S,
    identity_timeout: Duration,
    _subscription: IdentitySubscription,
}

impl Site<(), ()> {
    /// Returns a builder for configuring a site.
    pub fn builder() -> SiteBuilder {
        SiteBuilder::new()
    }
}

impl<G: IdentityGateway> Site<G, HttpContentClient> {
    /// Builds a site talking to the Content API at `config.content`.
    ///
    /// `gateway` is used as given; `config.gateway` is not consulted. Use
    /// [`connect_with`](Self::connect_with) to build the gateway from it.
    ///
    /// # Errors
    /// [`ContentError::ClientBuild`] if the HTTP client can't be set up.
    pub fn connect(
        config: &BlogzoneConfig,
        gateway: G,
    ) -> Result<Self, BlogzoneError> {
        let content = HttpContentClient::new(&config.content)?;
        tracing::info!(content_url = %content.base_url(), "connecting site");
        SiteBuilder::new().build(gateway, content)
    }

    /// Like [`connect`](Self::connect), but builds the gateway by handing
    /// `config.gateway` to `make_gateway`.
    ///
    /// # Errors
    /// Whatever `make_gateway` returns, or [`ContentError::ClientBuild`].
    pub fn connect_with<F, E>(
        config: &BlogzoneConfig,
        make_gateway: F,
    ) -> Result<Self, BlogzoneError>
    where
        F: FnOnce(&GatewayConfig) -> Result<G, E>,
        BlogzoneError: From<E>,
    {
        tracing::debug!(
            project_id = %config.gateway.project_id,
            auth_domain = %config.gateway.auth_domain(),
            "building identity gateway"
        );
        let gateway = make_gateway(&config.gateway)?;
        Self::connect(config, gateway)
    }
}

impl<G: IdentityGateway, S: ContentStore> Site<G, S> {
    pub fn sessions(&self) -> &SessionManager<G> {
        &self.sessions
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn content(&self) -> &S {
        &self.content
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.sessions.session()
    }

    // -----------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------

    /// Router outlet check for `path`. See [`RouteGuard::authorize`].
    pub fn authorize(&self, path: &str) -> Result<GuardDecision, BlogzoneError> {
        Ok(self.guard.authorize(&self.session(), path)?)
    }

    /// Navbar check for `path`. See [`RouteGuard::navigate_protected`].
    pub fn navigate_protected(
        &self,
        path: &str,
    ) -> Result<Navigation, BlogzoneError> {
        Ok(self.guard.navigate_protected(&self.session(), path)?)
    }

    // -----------------------------------------------------------------
    // Login / register / logout
    // -----------------------------------------------------------------

    /// The login form. On success returns the path to navigate to: where
    /// the user was headed before being sent to login, or `/`.
    ///
    /// Returns once the session shows the account that just signed in,
    /// even if another account was signed in before.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, BlogzoneError> {
        let id = self.sessions.sign_in(email, password).await?;
        self.await_identity(signed_in_as(id)).await;
        Ok(self.guard.post_login_destination())
    }

    /// The "sign in with Google" button. Same navigation as
    /// [`login`](Self::login).
    pub async fn login_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> Result<String, BlogzoneError> {
        let id = self
            .sessions
            .sign_in_with_federated_provider(provider)
            .await?;
        self.await_identity(signed_in_as(id)).await;
        Ok(self.guard.post_login_destination())
    }

    /// The registration form. On success the user is sent to the login
    /// view.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Route, BlogzoneError> {
        self.sessions
            .register(email, password, confirm_password)
            .await?;
        Ok(Route::Login)
    }

    /// The navbar's logout button. Returns once the session shows nobody
    /// signed in (or the identity timeout passes).
    pub async fn logout(&self) -> Result<Route, BlogzoneError> {
        self.sessions.sign_out().await?;
        self.await_identity(|s| !s.is_resolving() && !s.is_signed_in())
            .await;
        Ok(self.guard.sign_out_destination())
    }

    async fn await_identity(&self, predicate: impl FnMut(&Session) -> bool) {
        let wait = self.sessions.wait_for(predicate);
        if tokio::time::timeout(self.identity_timeout, wait).await.is_err() {
            tracing::warn!(
                timeout_ms = self.identity_timeout.as_millis() as u64,
                "identity notification did not arrive in time"
            );
        }
    }

    // -----------------------------------------------------------------
    // Blogs
    // -----------------------------------------------------------------

    /// The home page listing for `category`.
    pub async fn home_blogs(
        &self,
        category: Category,
    ) -> Result<Vec<BlogSummary>, BlogzoneError> {
        Ok(self.content.list_category(category).await?)
    }

    /// The blog detail page.
    pub async fn blog(&self, id: &BlogId) -> Result<BlogDetail, BlogzoneError> {
        Ok(self.content.get_blog(id).await?)
    }

    /// The add-blog form. Blank fields are rejected before any request.
    ///
    /// # Errors
    /// - [`ContentError::MissingField`] (as [`BlogzoneError::Content`])
    /// - [`BlogzoneError::BlogSubmission`] for any service failure
    pub async fn add_blog(&self, blog: &NewBlog) -> Result<BlogId, BlogzoneError> {
        match self.content.add_blog(blog).await {
            Ok(id) => {
                tracing::debug!(blog_id = %id, "add-blog form submitted");
                Ok(id)
            }
            Err(e @ ContentError::MissingField(_)) => Err(e.into()),
            Err(e) => Err(BlogzoneError::BlogSubmission(e)),
        }
    }

    /// The "my blogs" page: gateway documents written by the signed-in
    /// user. Documents missing a title or content show them as empty.
    pub async fn my_blogs(&self) -> Result<Vec<AuthoredBlog>, BlogzoneError> {
        let documents = self
            .sessions
            .documents_for_current_user(BLOGS_COLLECTION, AUTHOR_EMAIL_FIELD)
            .await?;
        Ok(documents
            .into_iter()
            .map(|doc| AuthoredBlog {
                title: doc.str_field("title").unwrap_or_default().to_string(),
                content: doc.str_field("content").unwrap_or_default().to_string(),
                id: doc.id,
            })
            .collect())
    }

    // -----------------------------------------------------------------
    // Wishlist
    // -----------------------------------------------------------------

    /// The wishlist page: every entry whose blog still exists.
    pub async fn wishlist(&self) -> Result<Vec<WishlistItem>, BlogzoneError> {
        let user = self.require_user()?;
        Ok(assemble_wishlist(&self.content, &user.id).await?)
    }

    /// Loads the signed-in user's wishlist for the home page's heart
    /// buttons.
    pub async fn load_wishlist(&self) -> Result<Wishlist, BlogzoneError> {
        let user = self.require_user()?;
        Ok(Wishlist::load(&self.content, user.id).await?)
    }

    /// A heart button click.
    ///
    /// If `wishlist` belongs to someone other than the signed-in user it
    /// is reloaded first.
    ///
    /// # Errors
    /// - [`BlogzoneError::WishlistSignedOut`] without a request
    /// - [`ContentError::AlreadyInWishlist`] without a request
    /// - [`BlogzoneError::WishlistUpdate`] for any service failure
    pub async fn add_to_wishlist(
        &self,
        wishlist: &mut Wishlist,
        blog_id: BlogId,
    ) -> Result<(), BlogzoneError> {
        let Some(user) = self.session().current_user().cloned() else {
            return Err(BlogzoneError::WishlistSignedOut);
        };
        if wishlist.user_id() != &user.id {
            tracing::debug!(user_id = %user.id, "wishlist belongs to another user, reloading");
            *wishlist = Wishlist::load(&self.content, user.id.clone())
                .await
                .map_err(BlogzoneError::WishlistUpdate)?;
        }

        match wishlist.add(&self.content, blog_id).await {
            Ok(entry) => {
                tracing::debug!(user_id = %user.id, blog_id = %entry.blog_id, "heart button applied");
                Ok(())
            }
            Err(e @ ContentError::AlreadyInWishlist(_)) => Err(e.into()),
            Err(e) => Err(BlogzoneError::WishlistUpdate(e)),
        }
    }

    fn require_user(&self) -> Result<UserIdentity, BlogzoneError> {
        self.session()
            .current_user()
            .cloned()
            .ok_or(BlogzoneError::Session(SessionError::NotSignedIn))
    }
}

fn signed_in_as(id: UserId) -> impl FnMut(&Session) -> bool {
    move |session: &Session| session.current_user().is_some_and(|user| user.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use blogzone_content::WishlistEntry;
    use blogzone_identity::LocalGateway;

    use super::*;
    use crate::ErrorKind;

    /// A content store backed by hash maps.
    #[derive(Default)]
    struct MemoryStore {
        blogs: HashMap<String, BlogDetail>,
        wishlists: Mutex<HashMap<UserId, Vec<WishlistEntry>>>,
        adds: AtomicUsize,
        fail_adds: bool,
    }

    impl MemoryStore {
        fn with_blog(mut self, id: &str, title: &str) -> Self {
            self.blogs.insert(
                id.to_string(),
                BlogDetail {
                    title: title.to_string(),
                    description: String::new(),
                    content: String::new(),
                },
            );
            self
        }
    }

    impl ContentStore for MemoryStore {
        async fn list_blogs(
            &self,
            _category: Category,
            limit: usize,
        ) -> Result<Vec<BlogSummary>, ContentError> {
            Ok(self
                .blogs
                .iter()
                .take(limit)
                .map(|(id, blog)| BlogSummary {
                    id: BlogId::from(id.as_str()),
                    title: blog.title.clone(),
                    description: String::new(),
                    category: String::new(),
                    date: String::new(),
                })
                .collect())
        }

        async fn get_blog(&self, id: &BlogId) -> Result<BlogDetail, ContentError> {
            self.blogs
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| ContentError::NotFound(format!("blog {id}")))
        }

        async fn wishlist(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<WishlistEntry>, ContentError> {
            let lists = self.wishlists.lock().unwrap();
            Ok(lists.get(user_id).cloned().unwrap_or_default())
        }

        async fn add_to_wishlist(
            &self,
            user_id: &UserId,
            blog_id: &BlogId,
        ) -> Result<WishlistEntry, ContentError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            if self.fail_adds {
                return Err(ContentError::Status { status: 500 });
            }
            let entry = WishlistEntry {
                blog_id: blog_id.clone(),
                user_id: Some(user_id.clone()),
            };
            self.wishlists
                .lock()
                .unwrap()
                .entry(user_id.clone())
                .or_default()
                .push(entry.clone());
            Ok(entry)
        }

        async fn add_blog(&self, blog: &NewBlog) -> Result<BlogId, ContentError> {
            blog.validate()?;
            Err(ContentError::Request("connection refused".into()))
        }
    }

    async fn site_with(
        gateway: &LocalGateway,
        store: MemoryStore,
    ) -> Site<LocalGateway, MemoryStore> {
        let site = Site::builder()
            .identity_timeout(Duration::from_secs(2))
            .build(gateway.clone(), store)
            .unwrap();
        site.sessions().resolved().await;
        site
    }

    #[tokio::test]
    async fn test_build_second_subscription_is_rejected() {
        let site = site_with(&LocalGateway::new(), MemoryStore::default()).await;

        let err = site.sessions().subscribe_to_identity().unwrap_err();

        assert!(matches!(err, SessionError::AlreadySubscribed));
    }

    #[tokio::test]
    async fn test_login_without_intent_goes_home() {
        let gateway = LocalGateway::new();
        gateway.add_account("ada@example.com", "Abc12!");
        let site = site_with(&gateway, MemoryStore::default()).await;

        let destination = site.login("ada@example.com", "Abc12!").await.unwrap();

        assert_eq!(destination, "/");
        assert!(site.session().is_signed_in());
    }

    #[tokio::test]
    async fn test_login_over_existing_user_waits_for_new_account() {
        let gateway = LocalGateway::new();
        gateway.add_account("ada@example.com", "Abc12!");
        let bob = gateway.add_account("bob@example.com", "Xyz34?");
        let site = site_with(&gateway, MemoryStore::default()).await;
        site.login("ada@example.com", "Abc12!").await.unwrap();

        site.login("bob@example.com", "Xyz34?").await.unwrap();

        let session = site.session();
        assert_eq!(session.current_user().map(|u| &u.id), Some(&bob.id));
    }

    #[tokio::test]
    async fn test_login_with_provider_over_existing_user_switches_user() {
        let gateway = LocalGateway::new();
        gateway.add_account("ada@example.com", "Abc12!");
        gateway.set_federated_identity(Some(UserIdentity::with_email(
            "g-1",
            "grace@example.com",
        )));
        let site = site_with(&gateway, MemoryStore::default()).await;
        site.login("ada@example.com", "Abc12!").await.unwrap();

        let destination = site
            .login_with_provider(FederatedProvider::default())
            .await
            .unwrap();

        assert_eq!(destination, "/");
        let session = site.session();
        assert_eq!(
            session.current_user().map(|u| u.id.as_str()),
            Some("g-1")
        );
    }

    #[tokio::test]
    async fn test_login_bad_password_keeps_intent() {
        let gateway = LocalGateway::new();
        gateway.add_account("ada@example.com", "Abc12!");
        let site = site_with(&gateway, MemoryStore::default()).await;
        site.authorize("/wishlist").unwrap();

        let err = site.login("ada@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(
            site.guard().pending_intent().unwrap().destination(),
            "/wishlist"
        );
    }

    #[tokio::test]
    async fn test_register_returns_login_route() {
        let site = site_with(&LocalGateway::new(), MemoryStore::default()).await;

        let route = site
            .register("new@example.com", "Abc12!", "Abc12!")
            .await
            .unwrap();

        assert_eq!(route, Route::Login);
    }

    #[tokio::test]
    async fn test_register_mismatch_is_password_mismatch() {
        let site = site_with(&LocalGateway::new(), MemoryStore::default()).await;

        let err = site
            .register("new@example.com", "Abc12!", "Abc12?")
            .await
            .unwrap_err();

        assert_eq!(err.notice(), "Passwords do not match");
    }

    #[tokio::test]
    async fn test_add_to_wishlist_signed_out_asks_to_login() {
        let store = MemoryStore::default().with_blog("b1", "One");
        let site = site_with(&LocalGateway::new(), store).await;
        let mut wishlist = Wishlist::from_entries(UserId::from("u1"), Vec::new());

        let err = site
            .add_to_wishlist(&mut wishlist, BlogId::from("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::WishlistNeedsLogin);
        assert_eq!(err.notice(), "Please login to add to wishlist.");
        assert_eq!(site.content().adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_to_wishlist_twice_posts_once() {
        let gateway = LocalGateway::new();
        gateway.add_account("ada@example.com", "Abc12!");
        let store = MemoryStore::default().with_blog("b1", "One");
        let site = site_with(&gateway, store).await;
        site.login("ada@example.com", "Abc12!").await.unwrap();
        let mut wishlist = site.load_wishlist().await.unwrap();

        site.add_to_wishlist(&mut wishlist, BlogId::from("b1"))
            .await
            .unwrap();
        let err = site
            .add_to_wishlist(&mut wishlist, BlogId::from("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyInWishlist);
        assert_eq!(site.content().adds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_to_wishlist_foreign_wishlist_is_reloaded() {
        let gateway = LocalGateway::new();
        let ada = gateway.add_account("ada@example.com", "Abc12!");
        let store = MemoryStore::default().with_blog("b1", "One");
        store.wishlists.lock().unwrap().insert(
            ada.id.clone(),
            vec![WishlistEntry {
                blog_id: BlogId::from("b1"),
                user_id: Some(ada.id.clone()),
            }],
        );
        let site = site_with(&gateway, store).await;
        site.login("ada@example.com", "Abc12!").await.unwrap();
        let mut stale = Wishlist::from_entries(UserId::from("someone-else"), Vec::new());

        let err = site
            .add_to_wishlist(&mut stale, BlogId::from("b1"))
            .await
            .unwrap_err();

        assert_eq!(stale.user_id(), &ada.id);
        assert_eq!(err.kind(), ErrorKind::AlreadyInWishlist);
        assert_eq!(site.content().adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_to_wishlist_service_failure_is_wishlist_update() {
        let gateway = LocalGateway::new();
        gateway.add_account("ada@example.com", "Abc12!");
        let store = MemoryStore {
            fail_adds: true,
            ..MemoryStore::default()
        };
        let site = site_with(&gateway, store).await;
        site.login("ada@example.com", "Abc12!").await.unwrap();
        let mut wishlist = site.load_wishlist().await.unwrap();

        let err = site
            .add_to_wishlist(&mut wishlist, BlogId::from("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.notice(), "Error adding to wishlist.");
        assert!(wishlist.entries().is_empty());
    }

    #[tokio::test]
    async fn test_add_blog_blank_field_is_invalid_input() {
        let site = site_with(&LocalGateway::new(), MemoryStore::default()).await;
        let blog = NewBlog {
            title: String::new(),
            image: "https://img/x.png".into(),
            short_description: "s".into(),
            long_description: "l".into(),
            category: Category::Health,
        };

        let err = site.add_blog(&blog).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.notice(), "❌ All fields are required.");
    }

    #[tokio::test]
    async fn test_add_blog_transport_failure_is_blog_submission() {
        let site = site_with(&LocalGateway::new(), MemoryStore::default()).await;
        let blog = NewBlog {
            title: "t".into(),
            image: "https://img/x.png".into(),
            short_description: "s".into(),
            long_description: "l".into(),
            category: Category::Health,
        };

        let err = site.add_blog(&blog).await.unwrap_err();

        assert!(matches!(err, BlogzoneError::BlogSubmission(_)));
        assert_eq!(err.notice(), "❌ Failed to add blog. Try again!");
    }

    #[tokio::test]
    async fn test_wishlist_signed_out_is_not_signed_in() {
        let site = site_with(&LocalGateway::new(), MemoryStore::default()).await;

        let err = site.wishlist().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotSignedIn);
    }
}
