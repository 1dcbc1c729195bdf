// routes/refurbishments.rs
// Reconditioning work logs under /api/refurbishments, filterable by car.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{Refurbishment, RefurbishmentPatch, WorkItem};
use crate::normalize::{normalize_record, normalize_records};
use crate::state::AppState;

use super::helpers::{nonnegative_amount, optional_text, parse_object_id, required_text};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RefurbishmentPayload {
    pub car_id: Option<String>,
    pub work_items: Option<Vec<WorkItemPayload>>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct WorkItemPayload {
    pub description: Option<String>,
    pub cost: Option<f64>,
}

fn parse_work_items(items: Vec<WorkItemPayload>) -> Result<Vec<WorkItem>, AppError> {
    if items.is_empty() {
        return Err(AppError::Validation(
            "at least one work item is required".into(),
        ));
    }
    items
        .into_iter()
        .map(|item| {
            Ok(WorkItem {
                description: required_text(item.description, "workItems.description")?,
                cost: nonnegative_amount(item.cost.unwrap_or(0.0), "workItems.cost")?,
            })
        })
        .collect()
}

pub async fn create_refurbishment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RefurbishmentPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let car_id = parse_object_id(&required_text(body.car_id, "carId")?, "car")?;
    state
        .store
        .cars
        .find(&car_id)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    let work_items = parse_work_items(
        body.work_items
            .ok_or_else(|| AppError::Validation("workItems is required".into()))?,
    )?;

    let refurbishment = Refurbishment {
        id: None,
        car_id,
        work_items,
        notes: optional_text(body.notes),
        created_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    let refurbishment = state.store.refurbishments.insert(refurbishment).await?;
    Ok((StatusCode::CREATED, Json(normalize_record(&refurbishment))))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RefurbishmentQuery {
    pub car_id: Option<String>,
}

pub async fn list_refurbishments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RefurbishmentQuery>,
) -> Result<Json<Value>, AppError> {
    let mut rows = match query.car_id.as_deref() {
        Some(raw) => {
            let car_id = parse_object_id(raw, "car")?;
            state.store.refurbishments.list_for_car(&car_id).await?
        }
        None => state.store.refurbishments.list(auth.scope()).await?,
    };
    // The per-car finder is unscoped, so staff results still narrow to
    // their own records.
    if !auth.role.is_admin() {
        rows.retain(|row| row.created_by == auth.id);
    }
    Ok(Json(normalize_records(&rows)))
}

pub async fn get_refurbishment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "refurbishment")?;
    let refurbishment = state
        .store
        .refurbishments
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("refurbishment"))?;
    authorize_owner_or_admin(&auth, &refurbishment.created_by)?;
    Ok(Json(normalize_record(&refurbishment)))
}

pub async fn update_refurbishment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RefurbishmentPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "refurbishment")?;
    let existing = state
        .store
        .refurbishments
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("refurbishment"))?;
    authorize_owner_or_admin(&auth, &existing.created_by)?;

    let patch = RefurbishmentPatch {
        work_items: body.work_items.map(parse_work_items).transpose()?,
        notes: optional_text(body.notes),
    };
    let refurbishment = state
        .store
        .refurbishments
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("refurbishment"))?;
    Ok(Json(normalize_record(&refurbishment)))
}

pub async fn delete_refurbishment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "refurbishment")?;
    let refurbishment = state
        .store
        .refurbishments
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("refurbishment"))?;
    authorize_owner_or_admin(&auth, &refurbishment.created_by)?;
    state.store.refurbishments.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "refurbishment deleted" }),
    ))
}
