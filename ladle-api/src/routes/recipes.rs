/// Recipe endpoints
///
/// All routes operate on the authenticated user's recipes only.
///
/// - `GET /v1/recipes?tags=&ingredients=` - list, newest first
/// - `POST /v1/recipes` - create, with nested tag/ingredient names
/// - `GET /v1/recipes/:id` - detail (includes tags and ingredients)
/// - `PATCH /v1/recipes/:id` - partial update
/// - `DELETE /v1/recipes/:id` - delete
/// - `POST /v1/recipes/:id/image` - multipart image upload
///
/// Nested writes carry names, not IDs: `"tags": ["Thai", "Dinner"]`
/// get-or-creates each tag under the authenticated user and replaces the
/// recipe's tag set. List filters carry IDs: `?tags=<uuid>,<uuid>`.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use ladle_shared::{
    auth::middleware::AuthContext,
    models::{
        ingredient::Ingredient,
        recipe::{recipe_image_path, CreateRecipe, Recipe, RecipeFilter, UpdateRecipe},
        tag::Tag,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Recipe list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListParams {
    /// Comma-separated tag IDs to filter by
    pub tags: Option<String>,

    /// Comma-separated ingredient IDs to filter by
    pub ingredients: Option<String>,
}

/// Recipe summary, returned by the list endpoint
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    /// Recipe ID
    pub id: Uuid,

    /// Recipe title
    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price
    pub price: Decimal,

    /// External link
    pub link: String,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

/// Full recipe, returned by detail/create/update endpoints
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    /// Recipe ID
    pub id: Uuid,

    /// Recipe title
    pub title: String,

    /// Description
    pub description: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price
    pub price: Decimal,

    /// External link
    pub link: String,

    /// Relative media path of the uploaded image, if any
    pub image: Option<String>,

    /// Linked tags, name descending
    pub tags: Vec<NamedRef>,

    /// Linked ingredients, name descending
    pub ingredients: Vec<NamedRef>,
}

/// Id/name pair for linked tags and ingredients
#[derive(Debug, Serialize)]
pub struct NamedRef {
    /// Entity ID
    pub id: Uuid,

    /// Entity name
    pub name: String,
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    /// Recipe title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Description (defaults to empty)
    #[serde(default)]
    pub description: String,

    /// Preparation time in minutes
    #[validate(range(min = 1, message = "Time must be at least one minute"))]
    pub time_minutes: i32,

    /// Price
    pub price: Decimal,

    /// External link (defaults to empty)
    #[serde(default)]
    #[validate(length(max = 512, message = "Link must be at most 512 characters"))]
    pub link: String,

    /// Tag names to link (get-or-created under the user)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Ingredient names to link (get-or-created under the user)
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New preparation time
    #[validate(range(min = 1, message = "Time must be at least one minute"))]
    pub time_minutes: Option<i32>,

    /// New price
    pub price: Option<Decimal>,

    /// New external link
    #[validate(length(max = 512, message = "Link must be at most 512 characters"))]
    pub link: Option<String>,

    /// Replacement tag name set
    pub tags: Option<Vec<String>>,

    /// Replacement ingredient name set
    pub ingredients: Option<Vec<String>>,
}

/// Image upload response
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    /// Recipe ID
    pub id: Uuid,

    /// Stored relative media path
    pub image: String,
}

/// Maps `validator` failures onto the API validation error shape.
fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Parses a comma-separated UUID list query parameter.
fn parse_id_list(param: Option<&str>) -> ApiResult<Option<Vec<Uuid>>> {
    let Some(raw) = param else {
        return Ok(None);
    };

    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part)
                .map_err(|_| ApiError::BadRequest(format!("Invalid id in filter: {}", part)))
        })
        .collect::<ApiResult<Vec<Uuid>>>()?;

    Ok(Some(ids))
}

/// Resolves tag names to the user's tags, creating missing ones.
async fn resolve_tags(state: &AppState, user_id: Uuid, names: &[String]) -> ApiResult<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let tag = Tag::get_or_create(&state.db, user_id, name.trim()).await?;
        ids.push(tag.id);
    }
    Ok(ids)
}

/// Resolves ingredient names to the user's ingredients, creating missing ones.
async fn resolve_ingredients(
    state: &AppState,
    user_id: Uuid,
    names: &[String],
) -> ApiResult<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let ingredient = Ingredient::get_or_create(&state.db, user_id, name.trim()).await?;
        ids.push(ingredient.id);
    }
    Ok(ids)
}

/// Builds the detail response, loading linked tags and ingredients.
async fn detail_response(state: &AppState, recipe: Recipe) -> ApiResult<RecipeDetail> {
    let tags = recipe
        .tags(&state.db)
        .await?
        .into_iter()
        .map(|t| NamedRef {
            id: t.id,
            name: t.name,
        })
        .collect();

    let ingredients = recipe
        .ingredients(&state.db)
        .await?
        .into_iter()
        .map(|i| NamedRef {
            id: i.id,
            name: i.name,
        })
        .collect();

    Ok(RecipeDetail {
        id: recipe.id,
        title: recipe.title,
        description: recipe.description,
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link,
        image: recipe.image,
        tags,
        ingredients,
    })
}

/// Lists the user's recipes, newest first
///
/// `tags` and `ingredients` accept comma-separated IDs; each present
/// filter keeps only recipes linked to at least one listed entity.
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<RecipeListParams>,
) -> ApiResult<Json<Vec<RecipeSummary>>> {
    let filter = RecipeFilter {
        tag_ids: parse_id_list(params.tags.as_deref())?,
        ingredient_ids: parse_id_list(params.ingredients.as_deref())?,
    };

    let recipes = Recipe::list_by_user(&state.db, auth.user_id, filter).await?;

    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

/// Creates a recipe, linking nested tag/ingredient names
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeDetail>)> {
    req.validate().map_err(validation_errors)?;

    let recipe = Recipe::create(
        &state.db,
        CreateRecipe {
            user_id: auth.user_id,
            title: req.title,
            description: req.description,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
        },
    )
    .await?;

    if !req.tags.is_empty() {
        let tag_ids = resolve_tags(&state, auth.user_id, &req.tags).await?;
        Recipe::set_tags(&state.db, recipe.id, &tag_ids).await?;
    }
    if !req.ingredients.is_empty() {
        let ingredient_ids = resolve_ingredients(&state, auth.user_id, &req.ingredients).await?;
        Recipe::set_ingredients(&state.db, recipe.id, &ingredient_ids).await?;
    }

    let detail = detail_response(&state, recipe).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Retrieves one of the user's recipes with its links
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = Recipe::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let detail = detail_response(&state, recipe).await?;

    Ok(Json(detail))
}

/// Partially updates one of the user's recipes
///
/// A present `tags` or `ingredients` list replaces the link set exactly;
/// an empty list clears it.
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeDetail>> {
    req.validate().map_err(validation_errors)?;

    let recipe = Recipe::update(
        &state.db,
        id,
        auth.user_id,
        UpdateRecipe {
            title: req.title,
            description: req.description,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            image: None,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    if let Some(names) = req.tags {
        let tag_ids = resolve_tags(&state, auth.user_id, &names).await?;
        Recipe::set_tags(&state.db, recipe.id, &tag_ids).await?;
    }
    if let Some(names) = req.ingredients {
        let ingredient_ids = resolve_ingredients(&state, auth.user_id, &names).await?;
        Recipe::set_ingredients(&state.db, recipe.id, &ingredient_ids).await?;
    }

    let detail = detail_response(&state, recipe).await?;

    Ok(Json(detail))
}

/// Deletes one of the user's recipes
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Recipe::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Recipe not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Uploads a recipe image
///
/// Accepts a multipart form with an `image` file field. The file is
/// stored under the media root at a collision-free derived path
/// (`uploads/recipe/<uuid>.<ext>`); the original filename contributes
/// only its extension.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImageResponse>> {
    let recipe = Recipe::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let mut stored_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        let relative_path = recipe_image_path(&original_name);
        let absolute_path =
            std::path::Path::new(&state.config.storage.media_root).join(&relative_path);

        if let Some(parent) = absolute_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::InternalError(format!("Failed to create media dir: {}", e)))?;
        }

        tokio::fs::write(&absolute_path, &data)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to store upload: {}", e)))?;

        stored_path = Some(relative_path);
        break;
    }

    let relative_path = stored_path
        .ok_or_else(|| ApiError::BadRequest("Missing 'image' file field".to_string()))?;

    Recipe::update(
        &state.db,
        recipe.id,
        auth.user_id,
        UpdateRecipe {
            image: Some(relative_path.clone()),
            ..Default::default()
        },
    )
    .await?;

    tracing::debug!(recipe_id = %recipe.id, path = %relative_path, "Stored recipe image");

    Ok(Json(ImageResponse {
        id: recipe.id,
        image: relative_path,
    }))
}
