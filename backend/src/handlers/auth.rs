//! HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::services::auth::{
    AuthService, AuthTokens, LoginInput, RegisterInput, ResetPasswordInput, VerifyOtpInput,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordInput {
    pub email: String,
}

/// Start self-registration; an OTP is mailed to the address
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<Json<serde_json::Value>> {
    let service = AuthService::new(state.db, &state.config);
    service.register(input).await?;
    Ok(Json(json!({ "message": "OTP sent" })))
}

/// Verify the registration OTP and activate the account
pub async fn verify_registration(
    State(state): State<AppState>,
    Json(input): Json<VerifyOtpInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.verify_registration(input).await?;
    Ok(Json(tokens))
}

/// Log in with email or username
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(input).await?;
    Ok(Json(tokens))
}

/// Request a password reset OTP
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordInput>,
) -> AppResult<Json<serde_json::Value>> {
    let service = AuthService::new(state.db, &state.config);
    service.request_password_reset(&input.email).await?;
    Ok(Json(json!({ "message": "If the email is registered, an OTP was sent" })))
}

/// Complete a password reset
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> AppResult<Json<serde_json::Value>> {
    let service = AuthService::new(state.db, &state.config);
    service.reset_password(input).await?;
    Ok(Json(json!({ "message": "Password updated" })))
}
