/// Ingredient model and database operations
///
/// Ingredients mirror tags: per-user rows with a name, linked to recipes
/// through `recipe_ingredients`, cascade-deleted with their owner. All
/// queries are scoped by `user_id`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Ingredient owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    /// Unique ingredient ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Ingredient name
    pub name: String,

    /// When the ingredient was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIngredient {
    /// Owning user
    pub user_id: Uuid,

    /// Ingredient name
    pub name: String,
}

impl Ingredient {
    /// Creates a new ingredient for a user
    pub async fn create(pool: &PgPool, data: CreateIngredient) -> Result<Self, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(ingredient)
    }

    /// Finds an ingredient by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name, created_at
            FROM ingredients
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Lists a user's ingredients, ordered by name descending
    ///
    /// With `assigned_only` set, only ingredients referenced by at least
    /// one recipe are returned, each exactly once.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = if assigned_only {
            r#"
            SELECT id, user_id, name, created_at
            FROM ingredients
            WHERE user_id = $1
              AND EXISTS (SELECT 1 FROM recipe_ingredients WHERE ingredient_id = ingredients.id)
            ORDER BY name DESC
            "#
        } else {
            r#"
            SELECT id, user_id, name, created_at
            FROM ingredients
            WHERE user_id = $1
            ORDER BY name DESC
            "#
        };

        let ingredients = sqlx::query_as::<_, Ingredient>(query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(ingredients)
    }

    /// Renames an ingredient, scoped to its owner
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
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

        Ok(ingredient)
    }

    /// Deletes an ingredient, scoped to its owner
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches a user's ingredient by exact name, creating it when missing
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let existing = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name, created_at
            FROM ingredients
            WHERE user_id = $1 AND name = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        if let Some(ingredient) = existing {
            return Ok(ingredient);
        }

        Self::create(
            pool,
            CreateIngredient {
                user_id,
                name: name.to_string(),
            },
        )
        .await
    }
}
