//! Profile endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ServiceError;
use crate::models::{Location, UserProfile};
use crate::services::users::ProfileInput;
use crate::AppState;

use super::{validate, ApiResponse};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_own_profile).put(upsert_own_profile))
        .route("/users/:id", get(get_profile))
        .with_auth(state.auth.clone())
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses((status = 200, description = "The caller's profile", body = UserProfile)),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub(crate) async fn get_own_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, ServiceError> {
    let profile = state.users.get_profile(user.user_id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub bio: String,
    pub location: Option<Location>,
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpsertProfileRequest,
    responses((status = 200, description = "Profile saved", body = UserProfile)),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub(crate) async fn upsert_own_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ServiceError> {
    validate(&payload)?;
    let profile = state
        .users
        .upsert_own_profile(
            &user,
            ProfileInput {
                name: payload.name,
                phone: payload.phone,
                bio: payload.bio,
                location: payload.location,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The profile", body = UserProfile),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserProfile>>, ServiceError> {
    let profile = state.users.get_profile(id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
