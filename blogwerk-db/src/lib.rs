pub mod client;
pub mod postgres;
mod record;
pub mod sqlite;

pub use client::{
    CommentRepository, DbClient, DbError, PostRepository, Repository, Result, connect,
};
