use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedSession,
    extract::{Created, Json, Query},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use blogwerk_common::model::{
    Id,
    comment::{Comment, CreateComment},
    post::PostMarker,
};
use blogwerk_db::DbClient;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_comments)
        .typed_post(create_comment)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/api/comments", rejection(ServerError))]
struct CommentsPath();

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsQuery {
    post_id: Option<Id<PostMarker>>,
}

async fn list_comments(
    CommentsPath(): CommentsPath,
    State(db): State<DbClient>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<Vec<Comment>>> {
    let post_id = query.post_id.ok_or(ServerError::MissingPostId)?;

    Ok(Json(db.list_comments(post_id).await?))
}

async fn create_comment(
    CommentsPath(): CommentsPath,
    State(db): State<DbClient>,
    _session: AuthenticatedSession,
    Json(comment): Json<CreateComment>,
) -> Result<Created<Comment>> {
    comment.validate()?;
    let comment = db.create_comment(comment).await?;

    Ok(Created(comment))
}
