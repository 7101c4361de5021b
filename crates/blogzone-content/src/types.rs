//! Wire types for the Content API.
//!
//! Field names follow the service's JSON exactly (`_id`, `blogId`,
//! `shortDescription`, ...) via serde attributes; the Rust side uses
//! snake_case.

use std::fmt;
use std::str::FromStr;

use blogzone_identity::UserId;
use serde::{Deserialize, Serialize};

use crate::ContentError;

// ---------------------------------------------------------------------------
// BlogId
// ---------------------------------------------------------------------------

/// Identifier the Content API assigns to a blog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlogId(pub String);

impl BlogId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlogId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Blog categories offered by the site.
///
/// Two spellings exist on the wire: listing queries use the lowercase
/// form (`?category=travel`), while new blogs are submitted with the
/// capitalised label (`"category": "Travel"`). `Serialize` produces the
/// label; [`as_query`](Self::as_query) produces the query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Category {
    /// Every category. Only meaningful for listing.
    #[default]
    All,
    Technology,
    Travel,
    Health,
    Lifestyle,
    Education,
}

impl Category {
    /// Every category in the order the home page shows its filter buttons.
    pub const ALL: [Category; 6] = [
        Self::All,
        Self::Technology,
        Self::Travel,
        Self::Health,
        Self::Lifestyle,
        Self::Education,
    ];

    /// Lowercase value used in listing queries.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Technology => "technology",
            Self::Travel => "travel",
            Self::Health => "health",
            Self::Lifestyle => "lifestyle",
            Self::Education => "education",
        }
    }

    /// How many blogs the home page asks for: a longer list for the
    /// unfiltered view, a short teaser per category.
    pub fn default_limit(self) -> usize {
        match self {
            Self::All => 15,
            _ => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Category {
    type Err = ContentError;

    /// Case-insensitive, so both wire spellings parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_query().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ContentError::NotFound(format!("category {s}")))
    }
}

// ---------------------------------------------------------------------------
// Blogs
// ---------------------------------------------------------------------------

/// One row of a blog listing (`GET /blogs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogSummary {
    #[serde(rename = "_id")]
    pub id: BlogId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Kept as the raw string: the service echoes whatever spelling the
    /// blog was created with.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
}

/// Full blog (`GET /blogs/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDetail {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /blogs/add`. Every field is required; call
/// [`validate`](Self::validate) before submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    pub title: String,
    /// URL of the cover image.
    pub image: String,
    pub short_description: String,
    pub long_description: String,
    pub category: Category,
}

impl NewBlog {
    /// Checks that every field is filled in. Blank (whitespace-only)
    /// text counts as missing, and [`Category::All`] is not a category a
    /// blog can belong to.
    ///
    /// # Errors
    /// [`ContentError::MissingField`] naming the first missing field.
    pub fn validate(&self) -> Result<(), ContentError> {
        let text_fields = [
            ("title", &self.title),
            ("image", &self.image),
            ("shortDescription", &self.short_description),
            ("longDescription", &self.long_description),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                return Err(ContentError::MissingField(name));
            }
        }
        if self.category == Category::All {
            return Err(ContentError::MissingField("category"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wishlist
// ---------------------------------------------------------------------------

/// One wishlist row (`GET /wishlist/{userId}`).
///
/// Some service versions omit `userId` from list responses; it is
/// optional here so those rows still parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub blog_id: BlogId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// A wishlist entry whose blog was fetched successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistItem {
    pub blog_id: BlogId,
    pub blog: BlogDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_blog() -> NewBlog {
        NewBlog {
            title: "Rust on the road".into(),
            image: "https://img/cover.png".into(),
            short_description: "Short".into(),
            long_description: "Long".into(),
            category: Category::Travel,
        }
    }

    #[test]
    fn test_category_default_limit() {
        assert_eq!(Category::All.default_limit(), 15);
        assert_eq!(Category::Health.default_limit(), 3);
    }

    #[test]
    fn test_category_from_str_accepts_both_spellings() {
        assert_eq!("travel".parse::<Category>().unwrap(), Category::Travel);
        assert_eq!("Travel".parse::<Category>().unwrap(), Category::Travel);
        assert!("cooking".parse::<Category>().is_err());
    }

    #[test]
    fn test_new_blog_serializes_label_and_camel_case() {
        let json = serde_json::to_value(complete_blog()).unwrap();

        assert_eq!(json["category"], "Travel");
        assert_eq!(json["shortDescription"], "Short");
        assert_eq!(json["longDescription"], "Long");
    }

    #[test]
    fn test_new_blog_validate_complete_is_ok() {
        assert_eq!(complete_blog().validate(), Ok(()));
    }

    #[test]
    fn test_new_blog_validate_blank_title_is_missing() {
        let blog = NewBlog {
            title: "   ".into(),
            ..complete_blog()
        };
        assert_eq!(blog.validate(), Err(ContentError::MissingField("title")));
    }

    #[test]
    fn test_new_blog_validate_category_all_is_missing() {
        let blog = NewBlog {
            category: Category::All,
            ..complete_blog()
        };
        assert_eq!(
            blog.validate(),
            Err(ContentError::MissingField("category"))
        );
    }

    #[test]
    fn test_blog_summary_reads_underscore_id() {
        let summary: BlogSummary = serde_json::from_value(serde_json::json!({
            "_id": "b7",
            "title": "T",
            "description": "D",
            "category": "health",
            "date": "2024-01-01"
        }))
        .unwrap();

        assert_eq!(summary.id, BlogId::from("b7"));
        assert_eq!(summary.category, "health");
    }

    #[test]
    fn test_wishlist_entry_without_user_id_parses() {
        let entry: WishlistEntry =
            serde_json::from_value(serde_json::json!({ "blogId": "b1" }))
                .unwrap();

        assert_eq!(entry.blog_id, BlogId::from("b1"));
        assert!(entry.user_id.is_none());
    }
}
