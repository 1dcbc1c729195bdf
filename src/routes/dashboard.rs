// routes/dashboard.rs
// GET /api/dashboard: admins see the global statistics, staff their own.

use axum::{Json, extract::State};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::dashboard;
use crate::normalize::normalize_record;
use crate::state::AppState;

pub async fn stats(State(state): State<AppState>, auth: AuthUser) -> Json<Value> {
    let stats = if auth.role.is_admin() {
        dashboard::global_stats(&state.store).await
    } else {
        dashboard::owner_stats(&state.store, &auth.id).await
    };
    Json(normalize_record(&stats))
}
