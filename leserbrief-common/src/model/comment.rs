use crate::{
    model::{Id, post::PostMarker},
    util::PresentText,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

/// A stored comment. Always belongs to an existing post.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post_id: Id<PostMarker>,
    pub name: PresentText,
    pub content: PresentText,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

/// The user-submitted part of a comment, not yet validated.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CommentContent {
    pub name: String,
    pub content: String,
}

/// A [`CommentContent`] whose fields have passed presence validation.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct ValidCommentContent {
    name: PresentText,
    content: PresentText,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentField {
    Name,
    Content,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("Comment is invalid: {}", describe_blank_fields(.blank_fields))]
pub struct InvalidCommentError {
    blank_fields: Vec<CommentField>,
}

fn describe_blank_fields(fields: &[CommentField]) -> String {
    fields
        .iter()
        .map(|field| format!("{field} can't be blank"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CommentContent {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Checks every field and reports all of the blank ones at once.
    pub fn validate(&self) -> Result<ValidCommentContent, InvalidCommentError> {
        let name = PresentText::new(self.name.clone());
        let content = PresentText::new(self.content.clone());

        match (name, content) {
            (Some(name), Some(content)) => Ok(ValidCommentContent { name, content }),
            (name, content) => {
                let blank_fields = [
                    (CommentField::Name, name.is_none()),
                    (CommentField::Content, content.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, blank)| blank.then_some(field))
                .collect();

                Err(InvalidCommentError { blank_fields })
            }
        }
    }
}

impl ValidCommentContent {
    #[must_use]
    pub fn name(&self) -> &PresentText {
        &self.name
    }

    #[must_use]
    pub fn content(&self) -> &PresentText {
        &self.content
    }
}

impl From<&Comment> for CommentContent {
    fn from(value: &Comment) -> Self {
        Self {
            name: value.name.get().to_owned(),
            content: value.content.get().to_owned(),
        }
    }
}

impl CommentField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CommentField::Name => "name",
            CommentField::Content => "content",
        }
    }
}

impl Display for CommentField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InvalidCommentError {
    /// The offending fields, in declaration order.
    #[must_use]
    pub fn blank_fields(&self) -> &[CommentField] {
        &self.blank_fields
    }

    #[must_use]
    pub fn is_blank(&self, field: CommentField) -> bool {
        self.blank_fields.contains(&field)
    }
}
