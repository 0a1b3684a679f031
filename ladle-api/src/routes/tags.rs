/// Tag endpoints
///
/// All routes operate on the authenticated user's tags only; a tag owned
/// by someone else is indistinguishable from a missing one.
///
/// - `GET /v1/tags?assigned_only=1` - list, name descending
/// - `POST /v1/tags` - create
/// - `GET /v1/tags/:id` - retrieve
/// - `PATCH /v1/tags/:id` - rename
/// - `DELETE /v1/tags/:id` - delete
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
    models::tag::{CreateTag, Tag},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tag list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TagListParams {
    /// When truthy, only tags assigned to at least one recipe
    pub assigned_only: Option<String>,
}

/// Tag response
#[derive(Debug, Serialize)]
pub struct TagResponse {
    /// Tag ID
    pub id: Uuid,

    /// Tag name
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Create/rename payload
#[derive(Debug, Deserialize, Validate)]
pub struct TagPayload {
    /// Tag name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

impl TagPayload {
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

/// Lists the user's tags, name descending
///
/// With `assigned_only` truthy, only tags referenced by at least one
/// recipe are returned, each exactly once.
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<TagListParams>,
) -> ApiResult<Json<Vec<TagResponse>>> {
    let assigned_only = truthy_param(params.assigned_only.as_deref());

    let tags = Tag::list_by_user(&state.db, auth.user_id, assigned_only).await?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Creates a tag for the user
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<TagPayload>,
) -> ApiResult<(StatusCode, Json<TagResponse>)> {
    let name = payload.validated()?;

    let tag = Tag::create(
        &state.db,
        CreateTag {
            user_id: auth.user_id,
            name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(tag.into())))
}

/// Retrieves one of the user's tags
pub async fn get_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TagResponse>> {
    let tag = Tag::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag.into()))
}

/// Renames one of the user's tags
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagPayload>,
) -> ApiResult<Json<TagResponse>> {
    let name = payload.validated()?;

    let tag = Tag::rename(&state.db, id, auth.user_id, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag.into()))
}

/// Deletes one of the user's tags
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Tag::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Tag not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
