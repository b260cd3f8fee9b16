//! Post aggregate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Handle;

/// Validation errors returned by [`PostDraft::new`] and [`PostId::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Title is blank after trimming.
    EmptyTitle,
    /// Content is blank after trimming.
    EmptyContent,
    /// Identifier is not a UUID.
    InvalidId,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::InvalidId => write!(f, "post id must be a valid UUID"),
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Stable post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an identifier from its textual form.
    pub fn parse(raw: &str) -> Result<Self, PostValidationError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated title and body for a new or edited post.
///
/// # Examples
/// ```
/// use agora_backend::domain::PostDraft;
///
/// let draft = PostDraft::new(" Hello ", "first post").expect("valid draft");
/// assert_eq!(draft.title(), "Hello");
/// assert!(PostDraft::new("", "body").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    content: String,
}

impl PostDraft {
    /// Trim and validate the supplied title and content.
    pub fn new(
        title: impl AsRef<str>,
        content: impl AsRef<str>,
    ) -> Result<Self, PostValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        let content = content.as_ref().trim();
        if content.is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        Ok(Self {
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    /// Trimmed title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Trimmed body.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Persisted post record.
///
/// ## Invariants
/// - `like_count` never drops below zero; dislikes at zero are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Random identifier assigned at creation.
    pub id: PostId,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Handle of the writing account.
    pub author: Handle,
    /// Current like total.
    pub like_count: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a fresh post with a zero like count.
    pub fn new(author: Handle, draft: PostDraft, now: DateTime<Utc>) -> Self {
        let PostDraft { title, content } = draft;
        Self {
            id: PostId::random(),
            title,
            content,
            author,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Direction of a like counter adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeDelta {
    /// Add one like.
    Increment,
    /// Decrement, clamped at zero.
    Decrement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "body", PostValidationError::EmptyTitle)]
    #[case("  ", "body", PostValidationError::EmptyTitle)]
    #[case("title", "", PostValidationError::EmptyContent)]
    #[case("title", "\n\t", PostValidationError::EmptyContent)]
    fn draft_rejects_blank_fields(
        #[case] title: &str,
        #[case] content: &str,
        #[case] expected: PostValidationError,
    ) {
        assert_eq!(PostDraft::new(title, content), Err(expected));
    }

    #[rstest]
    fn draft_trims_fields() {
        let draft = PostDraft::new("  Title ", " body\n").expect("valid draft");
        assert_eq!(draft.title(), "Title");
        assert_eq!(draft.content(), "body");
    }

    #[rstest]
    fn new_post_starts_with_zero_likes() {
        let author = Handle::new("ada").expect("valid handle");
        let draft = PostDraft::new("t", "c").expect("valid draft");
        let now = Utc::now();
        let post = Post::new(author, draft, now);
        assert_eq!(post.like_count, 0);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn post_id_rejects_invalid_input(#[case] raw: &str) {
        assert_eq!(PostId::parse(raw), Err(PostValidationError::InvalidId));
    }
}
