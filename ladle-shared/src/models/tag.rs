/// Tag model and database operations
///
/// Tags label recipes and belong to exactly one user. Every query here is
/// scoped by `user_id`, so a tag owned by someone else behaves exactly like
/// a tag that does not exist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Tag owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Tag name (no uniqueness enforced beyond ownership)
    pub name: String,

    /// When the tag was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    /// Owning user
    pub user_id: Uuid,

    /// Tag name
    pub name: String,
}

impl Tag {
    /// Creates a new tag for a user
    pub async fn create(pool: &PgPool, data: CreateTag) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    /// Finds a tag by ID, scoped to its owner
    ///
    /// Returns None both for unknown IDs and for tags owned by another
    /// user; callers cannot distinguish the two.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Lists a user's tags, ordered by name descending
    ///
    /// With `assigned_only` set, only tags referenced by at least one
    /// recipe are returned. The EXISTS subquery de-duplicates: a tag on
    /// five recipes appears once.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = if assigned_only {
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE user_id = $1
              AND EXISTS (SELECT 1 FROM recipe_tags WHERE tag_id = tags.id)
            ORDER BY name DESC
            "#
        } else {
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE user_id = $1
            ORDER BY name DESC
            "#
        };

        let tags = sqlx::query_as::<_, Tag>(query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(tags)
    }

    /// Renames a tag, scoped to its owner
    ///
    /// Returns None when the tag does not exist for this user.
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Deletes a tag, scoped to its owner
    ///
    /// Returns false when nothing was deleted (unknown or foreign tag).
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches a user's tag by exact name, creating it when missing
    ///
    /// Used by nested recipe writes, where payloads carry tag names
    /// rather than IDs.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let existing = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE user_id = $1 AND name = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        if let Some(tag) = existing {
            return Ok(tag);
        }

        Self::create(
            pool,
            CreateTag {
                user_id,
                name: name.to_string(),
            },
        )
        .await
    }
}
