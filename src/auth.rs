// auth.rs
// Bearer-token authentication middleware plus the ownership/role gate used
// by every protected route.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{User, UserRole};
use crate::state::AppState;
use crate::store::Scope;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, inserted as a request extension by
/// `authenticate` and read back through the extractor impl below.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub role: UserRole,
    pub name: String,
}

impl AuthUser {
    pub fn scope(&self) -> Scope {
        if self.role.is_admin() {
            Scope::All
        } else {
            Scope::Owner(self.id)
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(format!("password hash: {err}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(config: &Config, user: &User) -> Result<String, AppError> {
    let id = user
        .id
        .ok_or_else(|| AppError::Internal("user missing id".into()))?;
    let now = Utc::now();
    let claims = Claims {
        sub: id.to_hex(),
        role: user.role.as_str().to_string(),
        name: user.name.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(config.token_days)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|err| AppError::Internal(format!("token encode: {err}")))
}

fn decode_claims(config: &Config, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthenticated("invalid or expired token".into()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Middleware for the protected router: verifies the token, loads the
/// account, and rejects callers whose account is gone or inactive.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthenticated("missing bearer token".into()))?;
    let claims = decode_claims(&state.config, token)?;
    let id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthenticated("malformed token subject".into()))?;

    let user = state
        .store
        .users
        .find(&id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("account no longer exists".into()))?;
    if !user.status.is_active() {
        return Err(AppError::Unauthenticated("account disabled".into()));
    }

    request.extensions_mut().insert(AuthUser {
        id,
        role: user.role,
        name: user.name,
    });
    Ok(next.run(request).await)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("authentication required".into()))
    }
}

pub fn authorize_owner_or_admin(user: &AuthUser, owner: &ObjectId) -> Result<(), AppError> {
    if user.role.is_admin() || &user.id == owner {
        Ok(())
    } else {
        Err(AppError::Forbidden("not permitted for this record".into()))
    }
}

pub fn require_role(user: &AuthUser, roles: &[UserRole]) -> Result<(), AppError> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden("insufficient role".into()))
    }
}
