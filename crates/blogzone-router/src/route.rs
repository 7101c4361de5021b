//! The site's route table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RouteError;

/// Every view the site can show.
///
/// Parsing ignores the query string, the fragment and a trailing slash,
/// so `/wishlist/?tab=1#top` is [`Route::Wishlist`]. Paths that match no
/// view resolve to [`Route::NotFound`] rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Home,
    AddBlog,
    Wishlist,
    Login,
    Register,
    AllBlogs,
    Featured,
    Profile,
    /// `/blog/{id}`: one blog's detail page.
    BlogDetail(String),
    MyBlogs,
    /// The error view, carrying the path that matched nothing.
    NotFound(String),
}

impl Route {
    /// Routes that need a signed-in user.
    pub const PROTECTED: [Route; 4] = [
        Self::AddBlog,
        Self::Wishlist,
        Self::Profile,
        Self::MyBlogs,
    ];

    /// Resolves an absolute path.
    ///
    /// # Errors
    /// [`RouteError::NotAbsolute`] if `path` doesn't start with `/`.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::NotAbsolute(path.to_string()));
        }
        let bare = strip_query(path);
        let trimmed = match bare.trim_end_matches('/') {
            "" => "/",
            rest => rest,
        };

        let route = match trimmed {
            "/" => Self::Home,
            "/add-blog" => Self::AddBlog,
            "/wishlist" => Self::Wishlist,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/all-blogs" => Self::AllBlogs,
            "/featured" => Self::Featured,
            "/profile" => Self::Profile,
            "/my-blogs" => Self::MyBlogs,
            other => match other.strip_prefix("/blog/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Self::BlogDetail(id.to_string())
                }
                _ => Self::NotFound(path.to_string()),
            },
        };
        Ok(route)
    }

    /// The canonical path of this route.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::AddBlog => "/add-blog".to_string(),
            Self::Wishlist => "/wishlist".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::AllBlogs => "/all-blogs".to_string(),
            Self::Featured => "/featured".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::BlogDetail(id) => format!("/blog/{id}"),
            Self::MyBlogs => "/my-blogs".to_string(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Returns `true` if the view needs a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::AddBlog | Self::Wishlist | Self::Profile | Self::MyBlogs
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_static_route_round_trips_its_path() {
        let routes = [
            Route::Home,
            Route::AddBlog,
            Route::Wishlist,
            Route::Login,
            Route::Register,
            Route::AllBlogs,
            Route::Featured,
            Route::Profile,
            Route::MyBlogs,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()).unwrap(), route);
        }
    }

    #[test]
    fn test_parse_blog_detail_extracts_id() {
        assert_eq!(
            Route::parse("/blog/65f0c1").unwrap(),
            Route::BlogDetail("65f0c1".into())
        );
    }

    #[test]
    fn test_parse_blog_without_id_is_not_found() {
        assert!(matches!(
            Route::parse("/blog/").unwrap(),
            Route::NotFound(_)
        ));
        assert!(matches!(
            Route::parse("/blog/a/b").unwrap(),
            Route::NotFound(_)
        ));
    }

    #[test]
    fn test_parse_ignores_trailing_slash_query_and_fragment() {
        assert_eq!(Route::parse("/wishlist/").unwrap(), Route::Wishlist);
        assert_eq!(Route::parse("/profile?tab=email").unwrap(), Route::Profile);
        assert_eq!(Route::parse("/#top").unwrap(), Route::Home);
    }

    #[test]
    fn test_parse_unknown_path_keeps_it_in_not_found() {
        assert_eq!(
            Route::parse("/nope").unwrap(),
            Route::NotFound("/nope".into())
        );
    }

    #[test]
    fn test_parse_relative_path_returns_error() {
        assert_eq!(
            Route::parse("wishlist"),
            Err(RouteError::NotAbsolute("wishlist".into()))
        );
    }

    #[test]
    fn test_is_protected_matches_protected_list() {
        for route in Route::PROTECTED {
            assert!(route.is_protected(), "{route} should be protected");
        }
        assert!(!Route::Home.is_protected());
        assert!(!Route::Login.is_protected());
        assert!(!Route::BlogDetail("b1".into()).is_protected());
        assert!(!Route::NotFound("/x".into()).is_protected());
    }
}
