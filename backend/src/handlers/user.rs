//! HTTP handlers for user administration endpoints (admin)

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use shared::models::User;
use shared::types::{PaginatedResponse, Role};

use crate::error::AppResult;
use crate::handlers::pagination;
use crate::middleware::{require_role, CurrentUser};
use crate::services::user::{CreateUserInput, UpdateUserInput, UserFilter, UserService};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Create a user (cashier or admin account)
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UserService::new(state.db);
    let user = service.create(input).await?;
    Ok(Json(user))
}

/// List users with pagination, search, and role filter
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UserService::new(state.db);
    let filter = UserFilter {
        search: query.search,
        role: query.role,
    };
    let page = service
        .list(&filter, &pagination(query.page, query.per_page))
        .await?;
    Ok(Json(page))
}

/// Get one user
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UserService::new(state.db);
    let user = service.get(user_id).await?;
    Ok(Json(user))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UserService::new(state.db);
    let user = service.update(user_id, input).await?;
    Ok(Json(user))
}

/// Deactivate a user
pub async fn deactivate_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UserService::new(state.db);
    let user = service.deactivate(user_id).await?;
    Ok(Json(user))
}

/// Export users as CSV
pub async fn export_users_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    require_role(&current_user.0, Role::Admin)?;
    let service = UserService::new(state.db);
    let csv = service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"users.csv\"",
            ),
        ],
        csv,
    ))
}
