use crate::model::{Id, Timestamp, ValidationErrors};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 3;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    pub author: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub published_at: Timestamp,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Fields of an edit. Absent or empty fields keep the stored value.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostFilter {
    pub search: Option<String>,
    pub author: Option<String>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
}

impl Post {
    #[must_use]
    pub fn merged_with(self, update: UpdatePost) -> Self {
        Self {
            id: self.id,
            title: overwrite(self.title, update.title),
            author: overwrite(self.author, update.author),
            content: overwrite(self.content, update.content),
            cover_image: non_empty(update.cover_image).or(self.cover_image),
            published_at: self.published_at,
        }
    }

    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn overwrite(current: String, update: Option<String>) -> String {
    non_empty(update).unwrap_or(current)
}

impl CreatePost {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("author", &self.author, "Author is required");
        errors.require("content", &self.content, "Content is required");
        errors.into_result()
    }

    #[must_use]
    pub fn into_post(self, id: Id<PostMarker>, published_at: Timestamp) -> Post {
        Post {
            id,
            title: self.title,
            author: self.author,
            content: self.content,
            cover_image: self
                .cover_image
                .filter(|cover_image| !cover_image.trim().is_empty()),
            published_at,
        }
    }
}

impl PostFilter {
    #[must_use]
    pub fn new(search: Option<String>, author: Option<String>, page: u32, limit: u32) -> Self {
        Self {
            search,
            author,
            page,
            limit,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.page < 1 {
            errors.add("page", "Page must be at least 1");
        }
        if self.limit < 1 {
            errors.add("limit", "Limit must be at least 1");
        }
        errors.into_result()
    }

    #[must_use]
    pub fn search_term(&self) -> Option<String> {
        normalize_term(self.search.as_deref())
    }

    #[must_use]
    pub fn author_term(&self) -> Option<String> {
        normalize_term(self.author.as_deref())
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PostFilter {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PAGE, DEFAULT_PAGE_LIMIT)
    }
}

fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

impl PostPage {
    #[must_use]
    pub fn has_more(&self, filter: &PostFilter) -> bool {
        filter.offset() + (self.posts.len() as u64) < self.total
    }
}

#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}
