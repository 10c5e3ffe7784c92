//! HTTP handlers for the caller's own profile

use axum::{extract::State, Json};

use shared::models::User;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profile::{ChangePasswordInput, ProfileService, UpdateProfileInput};
use crate::AppState;

/// The caller's own account
pub async fn get_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let service = ProfileService::new(state.db);
    let user = service.me(current_user.0.user_id).await?;
    Ok(Json(user))
}

/// Update the caller's own profile
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<User>> {
    let service = ProfileService::new(state.db);
    let user = service.update(current_user.0.user_id, input).await?;
    Ok(Json(user))
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<Json<()>> {
    let service = ProfileService::new(state.db);
    service
        .change_password(current_user.0.user_id, input)
        .await?;
    Ok(Json(()))
}
