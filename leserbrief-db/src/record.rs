use leserbrief_common::{
    model::{ModelValidationError, comment::Comment, post::Post},
    util::PresentText,
};
use sqlx::FromRow;
use time::{PrimitiveDateTime, UtcDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub content: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

/// Current time as stored in timestamp columns, which are always UTC.
pub(crate) fn timestamp_now() -> PrimitiveDateTime {
    let now = UtcDateTime::now();
    PrimitiveDateTime::new(now.date(), now.time())
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Self {
            id: value.id.into(),
            title: value.title,
            content: value.content,
            created_at: value.created_at.as_utc(),
            updated_at: value.updated_at.as_utc(),
        }
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            post_id: value.post_id.into(),
            name: PresentText::try_from(value.name)?,
            content: PresentText::try_from(value.content)?,
            created_at: value.created_at.as_utc(),
            updated_at: value.updated_at.as_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::CommentRecord;
    use leserbrief_common::{
        model::{ModelValidationError, comment::Comment},
        util::PresentText,
    };
    use time::macros::datetime;

    fn record(name: &str, content: &str) -> CommentRecord {
        CommentRecord {
            id: 3,
            post_id: 1,
            name: name.to_owned(),
            content: content.to_owned(),
            created_at: datetime!(2024-11-08 20:39:39),
            updated_at: datetime!(2024-11-09 08:00:00),
        }
    }

    #[test]
    fn comment_from_record() {
        let comment = Comment::try_from(record("Alice", "Nice post!")).unwrap();

        assert_eq!(comment.id.get(), 3);
        assert_eq!(comment.post_id.get(), 1);
        assert_eq!(comment.name, PresentText::new_unchecked("Alice".to_owned()));
        assert_eq!(comment.content.get(), "Nice post!");
        assert_eq!(
            comment.created_at,
            datetime!(2024-11-08 20:39:39).as_utc()
        );
        assert_eq!(
            comment.updated_at,
            datetime!(2024-11-09 08:00:00).as_utc()
        );
    }

    #[test]
    fn blank_stored_comment_is_rejected() {
        let err = Comment::try_from(record("Alice", " ")).unwrap_err();

        assert!(matches!(err, ModelValidationError::BlankText(_)));
    }
}
