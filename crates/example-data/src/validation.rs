//! Cross-reference validation for seed catalogues.
//!
//! Every username, article slug, category, and tag mentioned by a record must
//! be defined elsewhere in the catalogue. Checking this before seeding keeps
//! a half-applied catalogue from ever reaching the database.

use std::collections::HashSet;

use crate::catalogue::SeedCatalogue;
use crate::error::CatalogueError;
use crate::seed::{ArticleSeed, CommentSeed};

pub(crate) fn validate_references(catalogue: &SeedCatalogue) -> Result<(), CatalogueError> {
    let usernames = unique_usernames(catalogue)?;
    let slugs = unique_slugs(catalogue)?;

    let categories: HashSet<&str> = catalogue.categories().iter().map(String::as_str).collect();
    let tags: HashSet<&str> = catalogue.tags().iter().map(String::as_str).collect();

    for article in catalogue.articles() {
        validate_article(article, &usernames, &categories, &tags)?;
    }

    for thread in catalogue.comments() {
        if !slugs.contains(thread.article.as_str()) {
            return Err(CatalogueError::UnknownArticle {
                slug: thread.article.clone(),
            });
        }
        let context = format!("comment on '{}'", thread.article);
        validate_comment(&thread.root, &context, &usernames)?;
    }

    for notification in catalogue.notifications() {
        require_user(&usernames, &notification.recipient, "notification recipient")?;
        if let Some(actor) = notification.actor.as_deref() {
            require_user(&usernames, actor, "notification actor")?;
        }
    }

    for follow in catalogue.follows() {
        require_user(&usernames, &follow.follower, "follow edge")?;
        require_user(&usernames, &follow.followed, "follow edge")?;
    }

    Ok(())
}

fn unique_usernames(catalogue: &SeedCatalogue) -> Result<HashSet<&str>, CatalogueError> {
    let mut seen = HashSet::new();
    for user in catalogue.users() {
        if !seen.insert(user.username.as_str()) {
            return Err(CatalogueError::DuplicateUsername {
                username: user.username.clone(),
            });
        }
    }
    Ok(seen)
}

fn unique_slugs(catalogue: &SeedCatalogue) -> Result<HashSet<&str>, CatalogueError> {
    let mut seen = HashSet::new();
    for article in catalogue.articles() {
        if !seen.insert(article.slug.as_str()) {
            return Err(CatalogueError::DuplicateArticleSlug {
                slug: article.slug.clone(),
            });
        }
    }
    Ok(seen)
}

fn validate_article(
    article: &ArticleSeed,
    usernames: &HashSet<&str>,
    categories: &HashSet<&str>,
    tags: &HashSet<&str>,
) -> Result<(), CatalogueError> {
    let context = format!("article '{}'", article.slug);
    require_user(usernames, &article.author, &context)?;

    if let Some(category) = article.category.as_deref()
        && !categories.contains(category)
    {
        return Err(CatalogueError::UnknownCategory {
            slug: article.slug.clone(),
            category: category.to_owned(),
        });
    }

    if let Some(tag) = article.tags.iter().find(|tag| !tags.contains(tag.as_str())) {
        return Err(CatalogueError::UnknownTag {
            slug: article.slug.clone(),
            tag: tag.clone(),
        });
    }

    for (expected, revision) in (1_u32..).zip(&article.revisions) {
        if revision.version != expected {
            return Err(CatalogueError::RevisionOutOfSequence {
                slug: article.slug.clone(),
                version: revision.version,
                expected,
            });
        }
        require_user(usernames, &revision.edited_by, &context)?;
    }

    Ok(())
}

fn validate_comment(
    comment: &CommentSeed,
    context: &str,
    usernames: &HashSet<&str>,
) -> Result<(), CatalogueError> {
    require_user(usernames, &comment.author, context)?;
    comment
        .replies
        .iter()
        .try_for_each(|reply| validate_comment(reply, context, usernames))
}

fn require_user(
    usernames: &HashSet<&str>,
    username: &str,
    context: &str,
) -> Result<(), CatalogueError> {
    if usernames.contains(username) {
        Ok(())
    } else {
        Err(CatalogueError::UnknownUser {
            context: context.to_owned(),
            username: username.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{CatalogueError, SeedCatalogue};

    const USERS: &str = r#""users": [
        {"username": "ada", "email": "ada@example.com", "password": "pw"},
        {"username": "bob", "email": "bob@example.com", "password": "pw"}
    ]"#;

    fn catalogue_with(extra: &str) -> String {
        format!(r#"{{"version": 1, {USERS}, "categories": ["Tech"], "tags": ["rust"], {extra}}}"#)
    }

    #[rstest]
    #[case::article_author(
        r#""articles": [{"slug": "a", "title": "t", "description": "d", "body": "b", "author": "zed"}]"#,
        "zed"
    )]
    #[case::revision_editor(
        r#""articles": [{"slug": "a", "title": "t", "description": "d", "body": "b", "author": "ada",
            "revisions": [{"version": 1, "title": "t", "description": "d", "body": "b", "editedBy": "yan"}]}]"#,
        "yan"
    )]
    #[case::notification_actor(
        r#""notifications": [{"recipient": "ada", "kind": "follow", "message": "m", "actor": "quin"}]"#,
        "quin"
    )]
    #[case::follow_target(r#""follows": [{"follower": "ada", "followed": "pat"}]"#, "pat")]
    fn rejects_unknown_users(#[case] extra: &str, #[case] missing: &str) {
        let result = SeedCatalogue::from_json(&catalogue_with(extra));

        match result {
            Err(CatalogueError::UnknownUser { username, .. }) => assert_eq!(username, missing),
            other => panic!("expected UnknownUser, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let json = catalogue_with(
            r#""articles": [{"slug": "a", "title": "t", "description": "d", "body": "b",
                "author": "ada", "category": "Gardening"}]"#,
        );

        assert!(matches!(
            SeedCatalogue::from_json(&json),
            Err(CatalogueError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn rejects_unknown_tag() {
        let json = catalogue_with(
            r#""articles": [{"slug": "a", "title": "t", "description": "d", "body": "b",
                "author": "ada", "tags": ["rust", "go"]}]"#,
        );

        assert_eq!(
            SeedCatalogue::from_json(&json),
            Err(CatalogueError::UnknownTag {
                slug: "a".to_owned(),
                tag: "go".to_owned()
            })
        );
    }

    #[test]
    fn rejects_comment_on_unknown_article() {
        let json = catalogue_with(r#""comments": [{"article": "ghost", "author": "ada", "body": "b"}]"#);

        assert_eq!(
            SeedCatalogue::from_json(&json),
            Err(CatalogueError::UnknownArticle {
                slug: "ghost".to_owned()
            })
        );
    }

    #[test]
    fn rejects_unknown_reply_author() {
        let json = catalogue_with(
            r#""articles": [{"slug": "a", "title": "t", "description": "d", "body": "b", "author": "ada"}],
               "comments": [{"article": "a", "author": "ada", "body": "root",
                   "replies": [{"author": "bob", "body": "ok", "replies": [{"author": "kim", "body": "deep"}]}]}]"#,
        );

        assert!(matches!(
            SeedCatalogue::from_json(&json),
            Err(CatalogueError::UnknownUser { username, .. }) if username == "kim"
        ));
    }

    #[test]
    fn rejects_out_of_sequence_revisions() {
        let json = catalogue_with(
            r#""articles": [{"slug": "a", "title": "t", "description": "d", "body": "b", "author": "ada",
                "revisions": [
                    {"version": 1, "title": "t", "description": "d", "body": "b", "editedBy": "ada"},
                    {"version": 3, "title": "t", "description": "d", "body": "b", "editedBy": "bob"}
                ]}]"#,
        );

        assert_eq!(
            SeedCatalogue::from_json(&json),
            Err(CatalogueError::RevisionOutOfSequence {
                slug: "a".to_owned(),
                version: 3,
                expected: 2
            })
        );
    }

    #[rstest]
    #[case::usernames(
        r#"{"version": 1, "users": [
            {"username": "ada", "email": "a@example.com", "password": "pw"},
            {"username": "ada", "email": "b@example.com", "password": "pw"}
        ]}"#
    )]
    #[case::slugs(&catalogue_with(
        r#""articles": [
            {"slug": "a", "title": "t", "description": "d", "body": "b", "author": "ada"},
            {"slug": "a", "title": "t2", "description": "d", "body": "b", "author": "bob"}
        ]"#
    ))]
    fn rejects_duplicates(#[case] json: &str) {
        let result = SeedCatalogue::from_json(json);
        assert!(matches!(
            result,
            Err(CatalogueError::DuplicateUsername { .. } | CatalogueError::DuplicateArticleSlug { .. })
        ));
    }
}
