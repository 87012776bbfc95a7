use blogwerk_common::model::{ModelValidationError, comment::Comment, post::Post};
use sqlx::FromRow;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub published_at: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub content: String,
    pub created_at: String,
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.parse()?,
            title: value.title,
            author: value.author,
            content: value.content,
            cover_image: value.cover_image,
            published_at: value.published_at.parse()?,
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.parse()?,
            post_id: value.post_id.parse()?,
            author: value.author,
            content: value.content,
            created_at: value.created_at.parse()?,
        })
    }
}

pub(crate) fn into_models<R, M>(records: Vec<R>) -> Result<Vec<M>, ModelValidationError>
where
    M: TryFrom<R, Error = ModelValidationError>,
{
    records.into_iter().map(M::try_from).collect()
}
