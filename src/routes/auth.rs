// routes/auth.rs
// POST /api/auth/register, POST /api/auth/login, GET /api/auth/me.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::{AuthUser, hash_password, issue_token, verify_password};
use crate::error::AppError;
use crate::models::{User, UserRole, UserStatus};
use crate::state::AppState;

use super::helpers::{required_text, user_json};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Self-service registration creates a staff account; admin accounts are
/// seeded or promoted through the user-management API.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = required_text(body.name, "name")?;
    let email = required_text(body.email, "email")?.to_lowercase();
    let password = required_text(body.password, "password")?;
    if !email.contains('@') {
        return Err(AppError::Validation("invalid email address".into()));
    }
    if password.chars().count() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }

    let user = User {
        id: None,
        name,
        email,
        password_hash: hash_password(&password)?,
        role: UserRole::Staff,
        status: UserStatus::Active,
        created_at: None,
        updated_at: None,
    };
    let user = state.store.users.insert(user).await?;
    let token = issue_token(&state.config, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "token": token, "user": user_json(&user) })),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = required_text(body.email, "email")?.to_lowercase();
    let password = required_text(body.password, "password")?;

    // One message for a wrong email and a wrong password.
    let user = state
        .store
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("invalid email or password".into()))?;
    if !verify_password(&password, &user.password_hash) {
        return Err(AppError::Unauthenticated("invalid email or password".into()));
    }
    if !user.status.is_active() {
        return Err(AppError::Unauthenticated("account disabled".into()));
    }

    let token = issue_token(&state.config, &user)?;
    Ok(Json(
        json!({ "success": true, "token": token, "user": user_json(&user) }),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let user = state
        .store
        .users
        .find(&auth.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(user_json(&user)))
}
