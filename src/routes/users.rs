// routes/users.rs
// Admin-only staff account management under /api/users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, hash_password, require_role};
use crate::error::AppError;
use crate::models::{User, UserPatch, UserRole, UserStatus};
use crate::state::AppState;

use super::helpers::{optional_text, parse_object_id, required_text, user_json};

fn parse_role(value: Option<&str>) -> Result<Option<UserRole>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => UserRole::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("unknown role {raw:?}"))),
    }
}

fn parse_status(value: Option<&str>) -> Result<Option<UserStatus>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => UserStatus::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("unknown status {raw:?}"))),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    require_role(&auth, &[UserRole::Admin])?;
    let users = state.store.users.list().await?;
    Ok(Json(Value::Array(users.iter().map(user_json).collect())))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&auth, &[UserRole::Admin])?;
    let name = required_text(body.name, "name")?;
    let email = required_text(body.email, "email")?.to_lowercase();
    let password = required_text(body.password, "password")?;
    let role = parse_role(body.role.as_deref())?.unwrap_or_default();
    let status = parse_status(body.status.as_deref())?.unwrap_or_default();

    let user = User {
        id: None,
        name,
        email,
        password_hash: hash_password(&password)?,
        role,
        status,
        created_at: None,
        updated_at: None,
    };
    let user = state.store.users.insert(user).await?;
    Ok((StatusCode::CREATED, Json(user_json(&user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&auth, &[UserRole::Admin])?;
    let id = parse_object_id(&id, "user")?;
    let user = state
        .store
        .users
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(user_json(&user)))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&auth, &[UserRole::Admin])?;
    let id = parse_object_id(&id, "user")?;

    let password_hash = match optional_text(body.password) {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };
    let patch = UserPatch {
        name: optional_text(body.name),
        email: optional_text(body.email).map(|email| email.to_lowercase()),
        password_hash,
        role: parse_role(body.role.as_deref())?,
        status: parse_status(body.status.as_deref())?,
    };
    let user = state
        .store
        .users
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(user_json(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&auth, &[UserRole::Admin])?;
    let id = parse_object_id(&id, "user")?;
    if id == auth.id {
        return Err(AppError::Validation(
            "cannot delete your own account".into(),
        ));
    }
    if !state.store.users.delete(&id).await? {
        return Err(AppError::NotFound("user"));
    }
    Ok(Json(
        serde_json::json!({ "success": true, "message": "user deleted" }),
    ))
}
