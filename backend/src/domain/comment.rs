//! Threaded comments.
//!
//! Comments form a forest per article: a comment either starts a thread or
//! replies to another comment on the same article. Storage keeps the flat
//! list; [`CommentThread::assemble`] rebuilds the tree.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{ArticleId, CommentId, ProfileId};

/// Validation errors for comment drafts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentValidationError {
    /// The body has no text.
    #[error("comment body must not be empty")]
    EmptyBody,
}

/// Stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub article: ArticleId,
    pub author: ProfileId,
    pub parent: Option<CommentId>,
    pub body: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to post a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub article: ArticleId,
    pub author: ProfileId,
    pub parent: Option<CommentId>,
    pub body: String,
}

/// Reject bodies with no visible text.
pub fn validate_comment_body(body: &str) -> Result<(), CommentValidationError> {
    if body.trim().is_empty() {
        return Err(CommentValidationError::EmptyBody);
    }
    Ok(())
}

impl NewComment {
    /// Start a new thread on `article`.
    pub fn new(
        article: ArticleId,
        author: ProfileId,
        body: impl Into<String>,
    ) -> Result<Self, CommentValidationError> {
        let body = body.into();
        validate_comment_body(&body)?;
        Ok(Self {
            article,
            author,
            parent: None,
            body,
        })
    }

    /// Reply to `parent` instead of starting a thread.
    #[must_use]
    pub const fn replying_to(mut self, parent: CommentId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A comment together with its direct and indirect replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, including the root.
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(Self::len).sum::<usize>()
    }

    /// A node always holds at least its own comment.
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Builder for comment forests.
pub struct CommentThread;

impl CommentThread {
    /// Arrange a flat comment list into threads.
    ///
    /// Roots and replies are ordered by `created_at`, then id. A comment
    /// whose parent is missing from `comments` is promoted to a root.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use conduit_backend::domain::{
    ///     ArticleId, Comment, CommentId, CommentThread, ProfileId,
    /// };
    ///
    /// let article = ArticleId::random();
    /// let author = ProfileId::random();
    /// let now = Utc::now();
    /// let root = Comment {
    ///     id: CommentId::random(),
    ///     article,
    ///     author,
    ///     parent: None,
    ///     body: "first".into(),
    ///     is_edited: false,
    ///     created_at: now,
    ///     updated_at: now,
    /// };
    /// let reply = Comment {
    ///     id: CommentId::random(),
    ///     parent: Some(root.id),
    ///     body: "reply".into(),
    ///     ..root.clone()
    /// };
    ///
    /// let forest = CommentThread::assemble(vec![reply, root]);
    /// assert_eq!(forest.len(), 1);
    /// assert_eq!(forest[0].replies.len(), 1);
    /// ```
    pub fn assemble(mut comments: Vec<Comment>) -> Vec<CommentNode> {
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });

        let present: HashSet<CommentId> = comments.iter().map(|c| c.id).collect();
        let mut children: HashMap<CommentId, Vec<Comment>> = HashMap::new();
        let mut roots = Vec::new();

        for comment in comments {
            match comment.parent {
                Some(parent) if parent != comment.id && present.contains(&parent) => {
                    children.entry(parent).or_default().push(comment);
                }
                _ => roots.push(comment),
            }
        }

        roots
            .into_iter()
            .map(|root| build_node(root, &mut children))
            .collect()
    }
}

fn build_node(comment: Comment, children: &mut HashMap<CommentId, Vec<Comment>>) -> CommentNode {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| build_node(child, children))
        .collect();
    CommentNode { comment, replies }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;

    struct Clock {
        base: DateTime<Utc>,
        article: ArticleId,
        author: ProfileId,
    }

    impl Clock {
        fn comment(&self, minute: i64, parent: Option<&Comment>, body: &str) -> Comment {
            let at = self.base + Duration::minutes(minute);
            Comment {
                id: CommentId::random(),
                article: self.article,
                author: self.author,
                parent: parent.map(|p| p.id),
                body: body.to_owned(),
                is_edited: false,
                created_at: at,
                updated_at: at,
            }
        }
    }

    #[fixture]
    fn clock() -> Clock {
        Clock {
            base: Utc
                .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
            article: ArticleId::random(),
            author: ProfileId::random(),
        }
    }

    fn bodies(nodes: &[CommentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.comment.body.as_str()).collect()
    }

    #[rstest]
    fn nests_replies_in_creation_order(clock: Clock) {
        let root = clock.comment(0, None, "root");
        let late = clock.comment(5, Some(&root), "late reply");
        let early = clock.comment(1, Some(&root), "early reply");
        let nested = clock.comment(6, Some(&early), "nested");

        let forest = CommentThread::assemble(vec![nested, late, root, early]);

        assert_eq!(bodies(&forest), ["root"]);
        let first = forest.first().expect("one root");
        assert_eq!(bodies(&first.replies), ["early reply", "late reply"]);
        let early_node = first.replies.first().expect("early reply");
        assert_eq!(bodies(&early_node.replies), ["nested"]);
        assert_eq!(first.len(), 4);
    }

    #[rstest]
    fn orphans_become_roots(clock: Clock) {
        let missing = clock.comment(0, None, "deleted elsewhere");
        let root = clock.comment(1, None, "root");
        let orphan = clock.comment(2, Some(&missing), "orphan");

        let forest = CommentThread::assemble(vec![orphan, root]);

        assert_eq!(bodies(&forest), ["root", "orphan"]);
    }

    #[rstest]
    fn empty_body_is_rejected(clock: Clock) {
        assert_eq!(
            NewComment::new(clock.article, clock.author, "  \n"),
            Err(CommentValidationError::EmptyBody)
        );
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(CommentThread::assemble(Vec::new()).is_empty());
    }
}
