use crate::{
    client::{
        CaseFolding, CommentRepository, DbError, FilterPatterns, PostRepository, QueryContext,
        Result, SCHEMA,
    },
    record::{CommentRecord, PostRecord, into_models},
};
use async_trait::async_trait;
use blogwerk_common::model::{
    Id, Timestamp,
    comment::{Comment, CreateComment},
    post::{CreatePost, Post, PostFilter, PostMarker, PostPage, UpdatePost},
};
use sqlx::{PgPool, postgres::PgPoolOptions, query, query_as, query_scalar};
use tracing::debug;

const MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct PgClient {
    pool: PgPool,
}

impl PgClient {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(DbError::Connect)?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        for statement in SCHEMA {
            query(statement)
                .execute(&pool)
                .await
                .context("apply the PostgreSQL schema")?;
        }
        debug!("PostgreSQL schema is up to date");

        Ok(Self { pool })
    }
}

#[async_trait]
impl PostRepository for PgClient {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT id, title, author, content, cover_image, published_at
            FROM posts
            ORDER BY published_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .context("list posts")?;

        Ok(into_models(records)?)
    }

    async fn list_filtered_posts(&self, filter: &PostFilter) -> Result<PostPage> {
        let patterns = FilterPatterns::new(filter, CaseFolding::Unicode);

        let records = query_as::<_, PostRecord>(
            "
            SELECT id, title, author, content, cover_image, published_at
            FROM posts
            WHERE (LOWER(title) LIKE $1 ESCAPE '\\' OR LOWER(content) LIKE $1 ESCAPE '\\')
                AND LOWER(author) LIKE $2 ESCAPE '\\'
            ORDER BY published_at DESC, id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(patterns.search.as_str())
        .bind(patterns.author.as_str())
        .bind(patterns.limit)
        .bind(patterns.offset)
        .fetch_all(&self.pool)
        .await
        .context("list filtered posts")?;

        let total = query_scalar::<_, i64>(
            "
            SELECT COUNT(*)
            FROM posts
            WHERE (LOWER(title) LIKE $1 ESCAPE '\\' OR LOWER(content) LIKE $1 ESCAPE '\\')
                AND LOWER(author) LIKE $2 ESCAPE '\\'
            ",
        )
        .bind(patterns.search.as_str())
        .bind(patterns.author.as_str())
        .fetch_one(&self.pool)
        .await
        .context("count filtered posts")?;

        Ok(PostPage {
            posts: into_models(records)?,
            total: total.try_into().unwrap_or_default(),
        })
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT id, title, author, content, cover_image, published_at
            FROM posts
            WHERE id = $1
            ",
        )
        .bind(post_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("fetch post")?;

        Ok(record.map(Post::try_from).transpose()?)
    }

    async fn create_post(&self, post: CreatePost) -> Result<Post> {
        let post = post.into_post(Id::generate(), Timestamp::now());

        query(
            "
            INSERT INTO posts (id, title, author, content, cover_image, published_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(post.id.to_string())
        .bind(post.title.as_str())
        .bind(post.author.as_str())
        .bind(post.content.as_str())
        .bind(post.cover_image.as_deref())
        .bind(post.published_at.to_storage_string())
        .execute(&self.pool)
        .await
        .context("create post")?;

        debug!(post_id = %post.id, "Created post");
        Ok(post)
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        update: UpdatePost,
    ) -> Result<Option<Post>> {
        let Some(existing) = self.fetch_post(post_id).await? else {
            return Ok(None);
        };
        let post = existing.merged_with(update);

        let updated = query(
            "
            UPDATE posts
            SET title = $1, author = $2, content = $3, cover_image = $4
            WHERE id = $5
            ",
        )
        .bind(post.title.as_str())
        .bind(post.author.as_str())
        .bind(post.content.as_str())
        .bind(post.cover_image.as_deref())
        .bind(post.id.to_string())
        .execute(&self.pool)
        .await
        .context("update post")?
        .rows_affected();

        Ok((updated > 0).then_some(post))
    }

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let deleted = query("DELETE FROM posts WHERE id = $1")
            .bind(post_id.to_string())
            .execute(&self.pool)
            .await
            .context("delete post")?
            .rows_affected();

        debug!(%post_id, deleted, "Deleted post");
        Ok(deleted > 0)
    }
}

#[async_trait]
impl CommentRepository for PgClient {
    async fn list_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let records = query_as::<_, CommentRecord>(
            "
            SELECT id, post_id, author, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(post_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("list comments")?;

        Ok(into_models(records)?)
    }

    async fn create_comment(&self, comment: CreateComment) -> Result<Comment> {
        let comment = comment.into_comment(Id::generate(), Timestamp::now());

        query(
            "
            INSERT INTO comments (id, post_id, author, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(comment.id.to_string())
        .bind(comment.post_id.to_string())
        .bind(comment.author.as_str())
        .bind(comment.content.as_str())
        .bind(comment.created_at.to_storage_string())
        .execute(&self.pool)
        .await
        .context("create comment")?;

        debug!(comment_id = %comment.id, post_id = %comment.post_id, "Created comment");
        Ok(comment)
    }
}
