use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{PublicUser, UserPatch};

use super::users::Registration;
use super::{AppState, CurrentUser};

/// Responses wrap the user the way the original backend did:
/// `{"user": {...}}` with the password hash stripped.
#[derive(Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Update payload: the target id travels in the body, alongside the patch.
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<u64>,
    #[serde(flatten)]
    pub patch: UserPatch,
}

pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = state.users_mut().register(registration)?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.users().login(&request.email, &request.password)?;
    Ok(Json(UserResponse { user }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}

pub async fn update_user(
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let id = request
        .id
        .ok_or_else(|| Error::Validation("user id is required".into()))?;
    let user = state.users_mut().update(id, request.patch)?;
    Ok(Json(UserResponse { user }))
}
