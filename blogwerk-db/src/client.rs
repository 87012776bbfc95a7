use crate::{postgres::PgClient, sqlite::SqliteClient};
use async_trait::async_trait;
use blogwerk_common::model::{
    Id, ModelValidationError,
    comment::{Comment, CreateComment},
    post::{CreatePost, Post, PostFilter, PostMarker, PostPage, UpdatePost},
};
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;
use tracing::info;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Failed to {operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to connect to the database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Unsupported database url scheme: {0}")]
    UnsupportedUrl(String),
}

pub(crate) trait QueryContext<T> {
    fn context(self, operation: &'static str) -> Result<T>;
}

impl<T> QueryContext<T> for std::result::Result<T, sqlx::Error> {
    fn context(self, operation: &'static str) -> Result<T> {
        self.map_err(|source| DbError::Query { operation, source })
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn list_filtered_posts(&self, filter: &PostFilter) -> Result<PostPage>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>>;

    async fn create_post(&self, post: CreatePost) -> Result<Post>;

    async fn update_post(&self, post_id: Id<PostMarker>, update: UpdatePost)
    -> Result<Option<Post>>;

    /// Comments of the deleted post are left in place.
    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>>;

    async fn create_comment(&self, comment: CreateComment) -> Result<Comment>;
}

pub trait Repository: PostRepository + CommentRepository + Debug {}

impl<T> Repository for T where T: PostRepository + CommentRepository + Debug {}

pub type DbClient = Arc<dyn Repository>;

pub async fn connect(database_url: &str) -> Result<DbClient> {
    if database_url.starts_with("sqlite:") {
        info!("Using the embedded SQLite backend");
        Ok(Arc::new(SqliteClient::connect(database_url).await?))
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        info!("Using the PostgreSQL backend");
        Ok(Arc::new(PgClient::connect(database_url).await?))
    } else {
        let scheme = database_url
            .split_once(':')
            .map_or(database_url, |(scheme, _)| scheme);
        Err(DbError::UnsupportedUrl(scheme.to_owned()))
    }
}

/// Table definitions shared by both backends. Comments carry no foreign key
/// constraint: posts can be deleted while their comments stay behind.
pub(crate) const SCHEMA: &[&str] = &[
    "
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        content TEXT NOT NULL,
        cover_image TEXT,
        published_at TEXT NOT NULL
    )
    ",
    "
    CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY,
        post_id TEXT NOT NULL,
        author TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS posts_published_at ON posts (published_at)",
    "CREATE INDEX IF NOT EXISTS comments_post_id ON comments (post_id)",
];

// Filter terms are folded the way the adapter's `LOWER` folds columns.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub(crate) enum CaseFolding {
    Unicode,
    Ascii,
}

// A blank filter becomes `%`, which matches every row.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub(crate) struct FilterPatterns {
    pub search: String,
    pub author: String,
    pub limit: i64,
    pub offset: i64,
}

impl FilterPatterns {
    pub fn new(filter: &PostFilter, folding: CaseFolding) -> Self {
        let (search, author) = match folding {
            CaseFolding::Unicode => (filter.search_term(), filter.author_term()),
            CaseFolding::Ascii => (
                ascii_folded(filter.search.as_deref()),
                ascii_folded(filter.author.as_deref()),
            ),
        };

        Self {
            search: like_pattern(search),
            author: like_pattern(author),
            limit: i64::from(filter.limit),
            offset: i64::try_from(filter.offset()).unwrap_or(i64::MAX),
        }
    }
}

fn ascii_folded(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_ascii_lowercase)
}

fn like_pattern(term: Option<String>) -> String {
    match term {
        Some(term) => format!("%{}%", escape_like(&term)),
        None => "%".to_owned(),
    }
}

/// Escapes `LIKE` wildcards so terms match literally under `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
