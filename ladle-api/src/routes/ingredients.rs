/// Ingredient endpoints
///
/// Same surface and scoping rules as tags:
///
/// - `GET /v1/ingredients?assigned_only=1` - list, name descending
/// - `POST /v1/ingredients` - create
/// - `GET /v1/ingredients/:id` - retrieve
/// - `PATCH /v1/ingredients/:id` - rename
/// - `DELETE /v1/ingredients/:id` - delete
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::truthy_param,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use ladle_shared::{
    auth::middleware::AuthContext,
    models::ingredient::{CreateIngredient, Ingredient},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Ingredient list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct IngredientListParams {
    /// When truthy, only ingredients assigned to at least one recipe
    pub assigned_only: Option<String>,
}

/// Ingredient response
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    /// Ingredient ID
    pub id: Uuid,

    /// Ingredient name
    pub name: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

/// Create/rename payload
#[derive(Debug, Deserialize, Validate)]
pub struct IngredientPayload {
    /// Ingredient name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

impl IngredientPayload {
    fn validated(self) -> ApiResult<String> {
        self.validate().map_err(|_| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "name".to_string(),
                message: "Name must be 1-255 characters".to_string(),
            }])
        })?;
        Ok(self.name)
    }
}

/// Lists the user's ingredients, name descending
pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<IngredientListParams>,
) -> ApiResult<Json<Vec<IngredientResponse>>> {
    let assigned_only = truthy_param(params.assigned_only.as_deref());

    let ingredients = Ingredient::list_by_user(&state.db, auth.user_id, assigned_only).await?;

    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

/// Creates an ingredient for the user
pub async fn create_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<IngredientPayload>,
) -> ApiResult<(StatusCode, Json<IngredientResponse>)> {
    let name = payload.validated()?;

    let ingredient = Ingredient::create(
        &state.db,
        CreateIngredient {
            user_id: auth.user_id,
            name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

/// Retrieves one of the user's ingredients
pub async fn get_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IngredientResponse>> {
    let ingredient = Ingredient::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

    Ok(Json(ingredient.into()))
}

/// Renames one of the user's ingredients
pub async fn update_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngredientPayload>,
) -> ApiResult<Json<IngredientResponse>> {
    let name = payload.validated()?;

    let ingredient = Ingredient::rename(&state.db, id, auth.user_id, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

    Ok(Json(ingredient.into()))
}

/// Deletes one of the user's ingredients
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Ingredient::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Ingredient not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
