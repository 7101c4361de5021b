//! [`ContentStore`] over HTTP with `reqwest`.

use blogzone_identity::UserId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    BlogDetail, BlogId, BlogSummary, Category, ContentConfig, ContentError,
    ContentStore, NewBlog, WishlistEntry,
};

/// Content API client.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct HttpContentClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpContentClient {
    /// Builds a client with the timeouts from `config`.
    ///
    /// # Errors
    /// [`ContentError::ClientBuild`] if the TLS backend can't initialise.
    pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ContentError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends `request`, maps transport errors and non-2xx statuses, and
    /// parses the JSON body as `T`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        missing: impl FnOnce() -> String,
    ) -> Result<T, ContentError> {
        let response = request
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound(missing()));
        }
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "content request rejected");
            return Err(ContentError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;
        serde_json::from_slice(&body)
            .map_err(|e| ContentError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Request/response bodies that only exist on the wire
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddWishlistRequest<'a> {
    user_id: &'a UserId,
    blog_id: &'a BlogId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBlogResponse {
    #[serde(default)]
    blog_id: Option<BlogId>,
}

impl ContentStore for HttpContentClient {
    async fn list_blogs(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<BlogSummary>, ContentError> {
        tracing::debug!(%category, limit, "listing blogs");
        let limit = limit.to_string();
        let request = self.http.get(self.url("/blogs")).query(&[
            ("category", category.as_query()),
            ("limit", limit.as_str()),
        ]);
        self.fetch(request, || format!("category {category}")).await
    }

    async fn get_blog(&self, id: &BlogId) -> Result<BlogDetail, ContentError> {
        let request = self.http.get(self.url(&format!("/blogs/{id}")));
        self.fetch(request, || format!("blog {id}")).await
    }

    async fn wishlist(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<WishlistEntry>, ContentError> {
        let request = self.http.get(self.url(&format!("/wishlist/{user_id}")));
        self.fetch(request, || format!("wishlist of {user_id}")).await
    }

    async fn add_to_wishlist(
        &self,
        user_id: &UserId,
        blog_id: &BlogId,
    ) -> Result<WishlistEntry, ContentError> {
        let response = self
            .http
            .post(self.url("/wishlist/add"))
            .json(&AddWishlistRequest { user_id, blog_id })
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
            });
        }
        // The `{result}` body carries nothing the client needs beyond the
        // ids it already has.
        tracing::info!(%user_id, %blog_id, "added to wishlist");
        Ok(WishlistEntry {
            blog_id: blog_id.clone(),
            user_id: Some(user_id.clone()),
        })
    }

    async fn add_blog(&self, blog: &NewBlog) -> Result<BlogId, ContentError> {
        blog.validate()?;
        let request = self.http.post(self.url("/blogs/add")).json(blog);
        let reply: AddBlogResponse = self
            .fetch(request, || "blog submission endpoint".to_string())
            .await?;
        let id = reply.blog_id.ok_or(ContentError::Unconfirmed)?;
        tracing::info!(blog_id = %id, category = %blog.category, "blog created");
        Ok(id)
    }
}
