use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedSession,
    extract::{Created, Json, Query},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use blogwerk_common::{
    content::render::{render_html, snippet},
    model::{
        Id,
        post::{
            CreatePost, DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, Post, PostFilter, PostMarker, PostPage,
            UpdatePost,
        },
    },
};
use blogwerk_db::DbClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
        .typed_get(get_rendered_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts", rejection(ServerError))]
struct PostsPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/posts/{id}/rendered", rejection(ServerError))]
struct RenderedPostPath {
    id: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct ListPostsQuery {
    search: Option<String>,
    author: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl ListPostsQuery {
    fn into_filter(self) -> Option<PostFilter> {
        if self == Self::default() {
            return None;
        }

        Some(PostFilter::new(
            self.search,
            self.author,
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        ))
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(untagged)]
enum PostListing {
    All(Vec<Post>),
    Page(PostPage),
}

async fn list_posts(
    PostsPath(): PostsPath,
    State(db): State<DbClient>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListing>> {
    let Some(filter) = query.into_filter() else {
        return Ok(Json(PostListing::All(db.list_posts().await?)));
    };
    filter.validate()?;

    let page = db.list_filtered_posts(&filter).await?;
    debug!(
        total = page.total,
        has_more = page.has_more(&filter),
        "Listed filtered posts"
    );

    Ok(Json(PostListing::Page(page)))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(db): State<DbClient>,
    _session: AuthenticatedSession,
    Json(post): Json<CreatePost>,
) -> Result<Created<Post>> {
    post.validate()?;
    let post = db.create_post(post).await?;

    Ok(Created(post))
}

async fn get_post(PostPath { id }: PostPath, State(db): State<DbClient>) -> Result<Json<Post>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn update_post(
    PostPath { id }: PostPath,
    State(db): State<DbClient>,
    _session: AuthenticatedSession,
    Json(update): Json<UpdatePost>,
) -> Result<Json<Post>> {
    let post = db
        .update_post(id, update)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(db): State<DbClient>,
    _session: AuthenticatedSession,
) -> Result<Json<MessageResponse>> {
    if !db.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Json(MessageResponse {
        message: "Post deleted",
    }))
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct RenderedPost {
    post: Post,
    slug: String,
    snippet: String,
    html: String,
}

async fn get_rendered_post(
    RenderedPostPath { id }: RenderedPostPath,
    State(db): State<DbClient>,
) -> Result<Json<RenderedPost>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(RenderedPost {
        slug: post.slug(),
        snippet: snippet(&post.content),
        html: render_html(&post.content),
        post,
    }))
}
