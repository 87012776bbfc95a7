use crate::model::{Id, Timestamp, ValidationErrors, post::PostMarker};
use serde::{Deserialize, Serialize};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post_id: Id<PostMarker>,
    pub author: String,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub post_id: Id<PostMarker>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl CreateComment {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("content", &self.content, "Comment cannot be empty");
        errors.into_result()
    }

    #[must_use]
    pub fn into_comment(self, id: Id<CommentMarker>, created_at: Timestamp) -> Comment {
        let author = self
            .author
            .filter(|author| !author.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_owned());

        Comment {
            id,
            post_id: self.post_id,
            author,
            content: self.content,
            created_at,
        }
    }
}
