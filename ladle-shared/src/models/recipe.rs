/// Recipe model and database operations
///
/// Recipes are the central entity: per-user records with a decimal price,
/// many-to-many links to tags and ingredients, and an optional uploaded
/// image. Queries are scoped by `user_id` like the other domain models.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     time_minutes INTEGER NOT NULL,
///     price NUMERIC(8, 2) NOT NULL,
///     link VARCHAR(512) NOT NULL DEFAULT '',
///     image VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Link rows live in `recipe_tags` and `recipe_ingredients`; the schema
/// does not force a linked tag or ingredient to share the recipe's owner.
/// The HTTP layer only ever links entities resolved through user-scoped
/// queries, so the gap is not reachable from the API.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ingredient::Ingredient;
use super::tag::Tag;

/// Recipe owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    /// Unique recipe ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Recipe title
    pub title: String,

    /// Free-form description (empty string when unset)
    pub description: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price as an exact decimal (NUMERIC(8,2))
    pub price: Decimal,

    /// External link, e.g. the source website (empty string when unset)
    pub link: String,

    /// Relative media path of the uploaded image, if any
    pub image: Option<String>,

    /// When the recipe was created
    pub created_at: DateTime<Utc>,

    /// When the recipe was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipe {
    /// Owning user
    pub user_id: Uuid,

    /// Recipe title
    pub title: String,

    /// Description (defaults to empty)
    pub description: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price
    pub price: Decimal,

    /// External link (defaults to empty)
    pub link: String,
}

/// Input for updating a recipe
///
/// All fields optional; only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipe {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New preparation time
    pub time_minutes: Option<i32>,

    /// New price
    pub price: Option<Decimal>,

    /// New external link
    pub link: Option<String>,

    /// New image path (set by the upload endpoint)
    pub image: Option<String>,
}

/// Optional list filters for [`Recipe::list_by_user`]
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes linked to any of these tags
    pub tag_ids: Option<Vec<Uuid>>,

    /// Only recipes linked to any of these ingredients
    pub ingredient_ids: Option<Vec<Uuid>>,
}

/// Derives the storage path for an uploaded recipe image
///
/// The original filename is discarded except for its extension; the path
/// is built from a freshly generated UUID so uploads can never collide.
///
/// # Example
///
/// ```
/// use ladle_shared::models::recipe::recipe_image_path;
///
/// let path = recipe_image_path("dinner photo.JPG");
/// assert!(path.starts_with("uploads/recipe/"));
/// assert!(path.ends_with(".JPG"));
/// ```
pub fn recipe_image_path(original_filename: &str) -> String {
    image_path_for(Uuid::new_v4(), original_filename)
}

fn image_path_for(id: Uuid, original_filename: &str) -> String {
    match original_filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("uploads/recipe/{}.{}", id, ext)
        }
        _ => format!("uploads/recipe/{}", id),
    }
}

impl Recipe {
    /// Creates a new recipe
    pub async fn create(pool: &PgPool, data: CreateRecipe) -> Result<Self, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, description, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, description, time_minutes, price, link, image,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.time_minutes)
        .bind(data.price)
        .bind(data.link)
        .fetch_one(pool)
        .await?;

        Ok(recipe)
    }

    /// Finds a recipe by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, description, time_minutes, price, link, image,
                   created_at, updated_at
            FROM recipes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    /// Lists a user's recipes, newest first
    ///
    /// Filters are additive: with both tag and ingredient IDs present a
    /// recipe must match one of each. An empty ID list matches nothing.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: RecipeFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        // Same dynamic-query shape as User::update: grow the SQL and the
        // bind list in lockstep.
        let mut query = String::from(
            "SELECT id, user_id, title, description, time_minutes, price, link, image, \
             created_at, updated_at FROM recipes WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if filter.tag_ids.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM recipe_tags \
                 WHERE recipe_id = recipes.id AND tag_id = ANY(${}))",
                bind_count
            ));
        }
        if filter.ingredient_ids.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM recipe_ingredients \
                 WHERE recipe_id = recipes.id AND ingredient_id = ANY(${}))",
                bind_count
            ));
        }

        query.push_str(" ORDER BY created_at DESC, id DESC");

        let mut q = sqlx::query_as::<_, Recipe>(&query).bind(user_id);

        if let Some(tag_ids) = filter.tag_ids {
            q = q.bind(tag_ids);
        }
        if let Some(ingredient_ids) = filter.ingredient_ids {
            q = q.bind(ingredient_ids);
        }

        let recipes = q.fetch_all(pool).await?;

        Ok(recipes)
    }

    /// Updates a recipe, scoped to its owner
    ///
    /// Only non-None fields are written; `updated_at` is always refreshed.
    /// Returns None when the recipe does not exist for this user.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateRecipe,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE recipes SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.time_minutes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", time_minutes = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.link.is_some() {
            bind_count += 1;
            query.push_str(&format!(", link = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND user_id = $2 RETURNING id, user_id, title, description, \
             time_minutes, price, link, image, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Recipe>(&query).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(time_minutes) = data.time_minutes {
            q = q.bind(time_minutes);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(link) = data.link {
            q = q.bind(link);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        let recipe = q.fetch_optional(pool).await?;

        Ok(recipe)
    }

    /// Deletes a recipe, scoped to its owner
    ///
    /// Link rows go with it via cascade; tags and ingredients survive.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the recipe's tag links with exactly the given set
    pub async fn set_tags(
        pool: &PgPool,
        recipe_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Replaces the recipe's ingredient links with exactly the given set
    pub async fn set_ingredients(
        pool: &PgPool,
        recipe_id: Uuid,
        ingredient_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        for ingredient_id in ingredient_ids {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(recipe_id)
            .bind(ingredient_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Tags linked to this recipe, name descending
    pub async fn tags(&self, pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name DESC
            "#,
        )
        .bind(self.id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Ingredients linked to this recipe, name descending
    pub async fn ingredients(&self, pool: &PgPool) -> Result<Vec<Ingredient>, sqlx::Error> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT i.id, i.user_id, i.name, i.created_at
            FROM ingredients i
            JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = $1
            ORDER BY i.name DESC
            "#,
        )
        .bind(self.id)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_path_uses_generated_id_and_original_extension() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

        let path = image_path_for(id, "example.jpg");
        assert_eq!(
            path,
            "uploads/recipe/550e8400-e29b-41d4-a716-446655440000.jpg"
        );

        // Only the final extension survives; the rest of the name is gone.
        let path = image_path_for(id, "my dinner.photo.png");
        assert_eq!(
            path,
            "uploads/recipe/550e8400-e29b-41d4-a716-446655440000.png"
        );
    }

    #[test]
    fn test_image_path_without_extension() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

        assert_eq!(
            image_path_for(id, "rawfile"),
            "uploads/recipe/550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(
            image_path_for(id, ".hidden"),
            "uploads/recipe/550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_image_path_is_unique_per_call() {
        let a = recipe_image_path("photo.jpg");
        let b = recipe_image_path("photo.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_recipe_filter_default_is_unfiltered() {
        let filter = RecipeFilter::default();
        assert!(filter.tag_ids.is_none());
        assert!(filter.ingredient_ids.is_none());
    }
}
