//! The [`ContentStore`] trait: the Content API as async methods.

use std::future::Future;

use blogzone_identity::UserId;

use crate::{
    BlogDetail, BlogId, BlogSummary, Category, ContentError, NewBlog,
    WishlistEntry,
};

/// Read/write access to blogs and wishlists.
///
/// [`HttpContentClient`](crate::HttpContentClient) implements this over
/// HTTP; tests implement it with a few hash maps.
pub trait ContentStore: Send + Sync + 'static {
    /// `GET /blogs?category={cat}&limit={n}`.
    fn list_blogs(
        &self,
        category: Category,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<BlogSummary>, ContentError>> + Send;

    /// `GET /blogs/{id}`. A missing blog is [`ContentError::NotFound`].
    fn get_blog(
        &self,
        id: &BlogId,
    ) -> impl Future<Output = Result<BlogDetail, ContentError>> + Send;

    /// `GET /wishlist/{userId}`.
    fn wishlist(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<WishlistEntry>, ContentError>> + Send;

    /// `POST /wishlist/add`. Any non-2xx reply is a failure.
    ///
    /// The service has no visible uniqueness rule, so adding the same blog
    /// twice may create two rows; [`Wishlist::add`](crate::Wishlist::add)
    /// checks locally first.
    fn add_to_wishlist(
        &self,
        user_id: &UserId,
        blog_id: &BlogId,
    ) -> impl Future<Output = Result<WishlistEntry, ContentError>> + Send;

    /// `POST /blogs/add`. Returns the id the service assigned.
    fn add_blog(
        &self,
        blog: &NewBlog,
    ) -> impl Future<Output = Result<BlogId, ContentError>> + Send;

    /// Lists `category` with the home page's default page size.
    fn list_category(
        &self,
        category: Category,
    ) -> impl Future<Output = Result<Vec<BlogSummary>, ContentError>> + Send
    {
        self.list_blogs(category, category.default_limit())
    }
}
