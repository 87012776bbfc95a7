use crate::server::ServerRouter;
use axum::Router;

mod comments;
mod posts;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(posts::routes())
        .merge(comments::routes())
}
