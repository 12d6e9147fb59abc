use crate::record::{CommentRecord, PostRecord, timestamp_now};
use leserbrief_common::model::{
    Id, ModelValidationError,
    comment::{Comment, CommentContent, CommentMarker, InvalidCommentError},
    post::{CreatePost, Post, PostDeletion, PostMarker},
};
use sqlx::{
    SqlitePool,
    migrate::{MigrateError, Migrator},
    query, query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use thiserror::Error;
use tracing::{debug, info};

pub static MIGRATOR: Migrator = sqlx::migrate!();

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Validation(#[from] InvalidCommentError),
    #[error("Post with id {0} does not exist")]
    PostNotFound(Id<PostMarker>),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Applying migrations failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Repository for posts and their comments.
///
/// Comment content is validated before any statement runs, and deleting a post
/// removes its comments in the same transaction.
#[derive(Clone, Debug)]
pub struct DbClient {
    pool: SqlitePool,
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl DbClient {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool with foreign keys enforced, creating the database file if needed.
    ///
    /// In-memory databases exist per connection, so they always get a single one.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let max_connections = if is_in_memory(database_url) {
            1
        } else {
            max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        debug!(max_connections, "Connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;

        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        let record = query_as::<_, PostRecord>(
            "
            INSERT INTO posts (title, content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING
                id,
                title,
                content,
                created_at,
                updated_at
            ",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await?;

        debug!(post_id = record.id, "Created post");
        Ok(record.into())
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                posts.id,
                posts.title,
                posts.content,
                posts.created_at,
                posts.updated_at
            FROM
                posts
            WHERE
                posts.id = ?1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Post::from))
    }

    /// Deletes a post and all of its comments.
    ///
    /// Returns `None` without changing anything if the post does not exist.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<Option<PostDeletion>> {
        let mut tx = self.pool.begin().await?;

        let deleted_comments = query("DELETE FROM comments WHERE comments.post_id = ?1")
            .bind(post_id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted_posts = query("DELETE FROM posts WHERE posts.id = ?1")
            .bind(post_id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted_posts == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;

        info!(%post_id, deleted_comments, "Deleted post");
        Ok(Some(PostDeletion {
            post_id,
            deleted_comments,
        }))
    }

    pub async fn create_comment(
        &self,
        post_id: Id<PostMarker>,
        comment: &CommentContent,
    ) -> Result<Comment> {
        let comment = comment
            .validate()
            .inspect_err(|err| debug!(%post_id, error = %err, "Rejected comment"))?;

        // A missing post surfaces as a foreign key violation.
        let record = query_as::<_, CommentRecord>(
            "
            INSERT INTO comments (post_id, name, content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING
                id,
                post_id,
                name,
                content,
                created_at,
                updated_at
            ",
        )
        .bind(post_id.get())
        .bind(comment.name().get())
        .bind(comment.content().get())
        .bind(timestamp_now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::PostNotFound(post_id)
            }
            err => DbError::Sqlx(err),
        })?;

        debug!(%post_id, comment_id = record.id, "Created comment");
        let comment = Comment::try_from(record)?;
        Ok(comment)
    }

    pub async fn fetch_comment(&self, comment_id: Id<CommentMarker>) -> Result<Option<Comment>> {
        let record = query_as::<_, CommentRecord>(
            "
            SELECT
                comments.id,
                comments.post_id,
                comments.name,
                comments.content,
                comments.created_at,
                comments.updated_at
            FROM
                comments
            WHERE
                comments.id = ?1
            ",
        )
        .bind(comment_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    /// Comments of a post in the order they were created, or `None` if the post does not exist.
    pub async fn fetch_post_comments(
        &self,
        post_id: Id<PostMarker>,
    ) -> Result<Option<Vec<Comment>>> {
        let mut tx = self.pool.begin().await?;

        let post_exists = query_scalar::<_, i64>("SELECT posts.id FROM posts WHERE posts.id = ?1")
            .bind(post_id.get())
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        if !post_exists {
            return Ok(None);
        }

        let records = query_as::<_, CommentRecord>(
            "
            SELECT
                comments.id,
                comments.post_id,
                comments.name,
                comments.content,
                comments.created_at,
                comments.updated_at
            FROM
                comments
            WHERE
                comments.post_id = ?1
            ORDER BY
                comments.id
            ",
        )
        .bind(post_id.get())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let comments = records
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(comments))
    }

    /// Replaces name and content of a comment, validated the same way as on creation.
    ///
    /// Returns `None` if the comment does not exist.
    pub async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        comment: &CommentContent,
    ) -> Result<Option<Comment>> {
        let comment = comment
            .validate()
            .inspect_err(|err| debug!(%comment_id, error = %err, "Rejected comment update"))?;

        let record = query_as::<_, CommentRecord>(
            "
            UPDATE comments
            SET
                name = ?1,
                content = ?2,
                updated_at = ?3
            WHERE
                comments.id = ?4
            RETURNING
                id,
                post_id,
                name,
                content,
                created_at,
                updated_at
            ",
        )
        .bind(comment.name().get())
        .bind(comment.content().get())
        .bind(timestamp_now())
        .bind(comment_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    /// Returns whether a comment was deleted.
    pub async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> Result<bool> {
        let deleted = query("DELETE FROM comments WHERE comments.id = ?1")
            .bind(comment_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!(%comment_id, deleted, "Deleted comment");
        Ok(deleted > 0)
    }
}
