//! Wishlist loaders: the data-loading effects behind the wishlist page and
//! the home page's heart buttons.

use blogzone_identity::UserId;
use futures_util::future::join_all;

use crate::{BlogId, ContentError, ContentStore, WishlistEntry, WishlistItem};

/// Loads a user's wishlist and resolves every entry to its blog.
///
/// Blogs are fetched concurrently. Entries whose blog can no longer be
/// fetched (404 or any other non-2xx reply, e.g. the blog was deleted)
/// are dropped from the result rather than failing the whole page.
/// Transport failures and unparseable bodies still fail the call.
///
/// Order follows the wishlist order returned by the service.
///
/// # Errors
/// Whatever [`ContentStore::wishlist`] returns, or the first transport or
/// decode failure while fetching blogs.
pub async fn assemble_wishlist<S: ContentStore>(
    store: &S,
    user_id: &UserId,
) -> Result<Vec<WishlistItem>, ContentError> {
    let entries = store.wishlist(user_id).await?;
    tracing::debug!(%user_id, entries = entries.len(), "wishlist fetched");

    let fetches = entries.iter().map(|entry| async move {
        (entry.blog_id.clone(), store.get_blog(&entry.blog_id).await)
    });
    let results = join_all(fetches).await;

    let mut items = Vec::with_capacity(results.len());
    for (blog_id, result) in results {
        match result {
            Ok(blog) => items.push(WishlistItem { blog_id, blog }),
            Err(ContentError::NotFound(_) | ContentError::Status { .. }) => {
                tracing::warn!(%user_id, %blog_id, "wishlist entry skipped, blog unavailable");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(items)
}

/// A view's local copy of one user's wishlist entries.
///
/// The home page loads this once per user and consults it before adding,
/// so a second click on the same heart doesn't post a duplicate row.
/// The copy is never shared with other views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wishlist {
    user_id: UserId,
    entries: Vec<WishlistEntry>,
}

impl Wishlist {
    /// Fetches the current entries for `user_id`.
    pub async fn load<S: ContentStore>(
        store: &S,
        user_id: UserId,
    ) -> Result<Self, ContentError> {
        let entries = store.wishlist(&user_id).await?;
        Ok(Self { user_id, entries })
    }

    /// Wraps entries that were fetched some other way.
    pub fn from_entries(user_id: UserId, entries: Vec<WishlistEntry>) -> Self {
        Self { user_id, entries }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    /// Returns `true` if `blog_id` is already in the local copy.
    pub fn contains(&self, blog_id: &BlogId) -> bool {
        self.entries.iter().any(|entry| &entry.blog_id == blog_id)
    }

    /// Adds `blog_id` to the wishlist, remote first, then locally.
    ///
    /// # Errors
    /// - [`ContentError::AlreadyInWishlist`] without a request if the
    ///   local copy already has it
    /// - whatever [`ContentStore::add_to_wishlist`] returns
    pub async fn add<S: ContentStore>(
        &mut self,
        store: &S,
        blog_id: BlogId,
    ) -> Result<WishlistEntry, ContentError> {
        if self.contains(&blog_id) {
            return Err(ContentError::AlreadyInWishlist(blog_id));
        }
        let entry = store.add_to_wishlist(&self.user_id, &blog_id).await?;
        self.entries.push(entry.clone());
        Ok(entry)
    }
}
